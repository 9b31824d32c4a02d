//! Security token extraction from `RequestSecurityTokenResponse` nodes.

use crate::document::{Document, NodeExt};
use crate::error::{WsTrustError, WsTrustResult};
use crate::namespaces::{NamespaceRole, NamespaceSet};
use crate::parser::WarningSink;
use roxmltree::Node;
use tracing::debug;

const RSTR: &str = "RequestSecurityTokenResponse";
const RSTR_COLLECTION: &str = "RequestSecurityTokenResponseCollection";
const REQUESTED_SECURITY_TOKEN: &str = "RequestedSecurityToken";

/// Token found in a response, before its type is validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedToken {
    /// Collapsed serialization of the `Assertion` element
    pub token: String,
    /// Declared token type URI; empty when the response has none
    pub token_type: String,
}

/// Find the first response node carrying an assertion.
///
/// Candidates are every `RequestSecurityTokenResponse` directly under the
/// SOAP body or inside a `RequestSecurityTokenResponseCollection`, in
/// document order. A candidate with no `RequestedSecurityToken` is skipped
/// with a warning; one with several is a protocol violation.
pub fn extract_token(
    document: &Document,
    namespaces: &NamespaceSet,
    sink: &dyn WarningSink,
) -> WsTrustResult<ExtractedToken> {
    let Some(trust) = namespaces.uri(NamespaceRole::Trust) else {
        return Err(WsTrustError::TokenNotFound);
    };

    let candidates = response_nodes(document, namespaces);
    debug!(
        dialect = ?namespaces.dialect(),
        candidates = candidates.len(),
        "Scanning WS-Trust response nodes"
    );

    for node in candidates {
        match node.children_named(trust, REQUESTED_SECURITY_TOKEN).as_slice() {
            [] => {
                sink.warn("No RequestedSecurityToken found in response node");
            }
            [requested] => {
                let Some(assertion) = requested
                    .descendants()
                    .find(|e| e.has_local_name("Assertion"))
                else {
                    continue;
                };
                return Ok(ExtractedToken {
                    token: collapse_lines(assertion.source()),
                    token_type: declared_token_type(node, sink),
                });
            }
            _ => return Err(WsTrustError::TooManyRequestedTokens),
        }
    }

    Err(WsTrustError::TokenNotFound)
}

fn response_nodes<'a, 'input>(
    document: &'a Document<'input>,
    namespaces: &NamespaceSet,
) -> Vec<Node<'a, 'input>> {
    let (Some(envelope), Some(trust)) = (
        namespaces.uri(NamespaceRole::SoapEnvelope),
        namespaces.uri(NamespaceRole::Trust),
    ) else {
        return Vec::new();
    };

    let root = document.root();
    if !root.has_tag_name((envelope, "Envelope")) {
        return Vec::new();
    }

    let mut nodes = Vec::new();
    for body in root.children_named(envelope, "Body") {
        for child in body.children().filter(Node::is_element) {
            if child.has_tag_name((trust, RSTR)) {
                nodes.push(child);
            } else if child.has_tag_name((trust, RSTR_COLLECTION)) {
                nodes.extend(child.children_named(trust, RSTR));
            }
        }
    }
    nodes
}

fn declared_token_type(node: Node<'_, '_>, sink: &dyn WarningSink) -> String {
    match node.children_with_local_name("TokenType").first() {
        Some(token_type) => collapse_lines(&token_type.text_content()),
        None => {
            sink.warn("No TokenType found in response node");
            String::new()
        }
    }
}

/// Trim every line of `xml` and join them with no separator.
pub fn collapse_lines(xml: &str) -> String {
    xml.lines().map(str::trim).collect()
}
