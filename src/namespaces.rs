//! WS-Trust dialects and the namespace bindings each one uses.
//!
//! The dialect is read from the WS-Addressing `Action` header of the
//! response itself, so detection runs on the parsed document before any
//! trust-namespace query is made.

use crate::document::{Document, NodeExt};
use roxmltree::Node;
use std::fmt;
use tracing::debug;

/// SOAP namespace URIs.
pub const SOAP_12_NS: &str = "http://www.w3.org/2003/05/soap-envelope";
pub const SOAP_11_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const WS_ADDRESSING_NS: &str = "http://www.w3.org/2005/08/addressing";

/// WS-Trust namespace URIs.
pub const WSTRUST_13_NS: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512";
pub const WSTRUST_2005_NS: &str = "http://schemas.xmlsoap.org/ws/2005/02/trust";

/// WS-Trust response Action URIs.
pub const WSTRUST_13_RSTRC_ISSUE_FINAL: &str =
    "http://docs.oasis-open.org/ws-sx/ws-trust/200512/RSTRC/IssueFinal";
pub const WSTRUST_13_RSTR_ISSUE_FINAL: &str =
    "http://docs.oasis-open.org/ws-sx/ws-trust/200512/RSTR/IssueFinal";
pub const WSTRUST_2005_RSTR_ISSUE: &str = "http://schemas.xmlsoap.org/ws/2005/02/trust/RSTR/Issue";

/// SOAP envelope namespaces a response may use.
pub const SOAP_ENVELOPE_NAMESPACES: [&str; 2] = [SOAP_12_NS, SOAP_11_NS];

/// WS-Trust protocol dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// WS-Trust 1.3 (OASIS, 2005/12 namespace)
    WsTrust13,
    /// WS-Trust 2005 (February 2005 namespace)
    WsTrust2005,
}

impl Dialect {
    /// All dialects, in detection order.
    pub const ALL: [Dialect; 2] = [Dialect::WsTrust13, Dialect::WsTrust2005];

    /// Namespace bindings for this dialect.
    pub fn namespaces(self) -> NamespaceSet {
        let bindings: &'static [(NamespaceRole, &'static str)] = match self {
            Self::WsTrust13 => &WSTRUST_13_BINDINGS,
            Self::WsTrust2005 => &WSTRUST_2005_BINDINGS,
        };
        NamespaceSet {
            dialect: Some(self),
            bindings,
        }
    }

    /// Dialect announced by a response Action URI.
    pub fn from_action(action: &str) -> Option<Self> {
        let action = action.trim();
        ACTION_TABLE
            .iter()
            .find(|(uri, _)| *uri == action)
            .map(|(_, dialect)| *dialect)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WsTrust13 => "WS-Trust 1.3",
            Self::WsTrust2005 => "WS-Trust 2005",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical namespace roles used by response queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamespaceRole {
    SoapEnvelope,
    SoapAddressing,
    Trust,
}

static WSTRUST_13_BINDINGS: [(NamespaceRole, &str); 3] = [
    (NamespaceRole::SoapEnvelope, SOAP_12_NS),
    (NamespaceRole::SoapAddressing, WS_ADDRESSING_NS),
    (NamespaceRole::Trust, WSTRUST_13_NS),
];

static WSTRUST_2005_BINDINGS: [(NamespaceRole, &str); 3] = [
    (NamespaceRole::SoapEnvelope, SOAP_12_NS),
    (NamespaceRole::SoapAddressing, WS_ADDRESSING_NS),
    (NamespaceRole::Trust, WSTRUST_2005_NS),
];

static ACTION_TABLE: [(&str, Dialect); 3] = [
    (WSTRUST_13_RSTRC_ISSUE_FINAL, Dialect::WsTrust13),
    (WSTRUST_13_RSTR_ISSUE_FINAL, Dialect::WsTrust13),
    (WSTRUST_2005_RSTR_ISSUE, Dialect::WsTrust2005),
];

/// Namespace bindings selected for one response.
///
/// The empty set binds nothing; every namespaced query against it matches
/// no nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceSet {
    dialect: Option<Dialect>,
    bindings: &'static [(NamespaceRole, &'static str)],
}

impl NamespaceSet {
    /// A set with no bindings, used when the dialect is unknown.
    pub fn empty() -> Self {
        Self {
            dialect: None,
            bindings: &[],
        }
    }

    /// The dialect these bindings belong to.
    pub fn dialect(&self) -> Option<Dialect> {
        self.dialect
    }

    /// URI bound to `role`, if any.
    pub fn uri(&self, role: NamespaceRole) -> Option<&'static str> {
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == role)
            .map(|(_, uri)| *uri)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for NamespaceSet {
    fn default() -> Self {
        Self::empty()
    }
}

/// Select the namespace bindings announced by the response's Action header.
///
/// Returns [`NamespaceSet::empty`] when the Action is absent or unknown.
pub fn detect_dialect(document: &Document) -> NamespaceSet {
    let Some(action) = read_action(document) else {
        debug!("No WS-Addressing Action header in response");
        return NamespaceSet::empty();
    };

    match Dialect::from_action(&action) {
        Some(dialect) => dialect.namespaces(),
        None => {
            debug!(action = %action, "Unrecognized WS-Trust response action");
            NamespaceSet::empty()
        }
    }
}

fn read_action(document: &Document) -> Option<String> {
    let root = document.root();

    for dialect in Dialect::ALL {
        let namespaces = dialect.namespaces();
        let (Some(envelope), Some(addressing)) = (
            namespaces.uri(NamespaceRole::SoapEnvelope),
            namespaces.uri(NamespaceRole::SoapAddressing),
        ) else {
            continue;
        };
        if !root.has_tag_name((envelope, "Envelope")) {
            continue;
        }
        let action = root
            .children_named(envelope, "Header")
            .into_iter()
            .flat_map(|header| header.children_named(addressing, "Action"))
            .find_map(action_text);
        if action.is_some() {
            return action;
        }
    }

    // Envelope namespace outside the known bindings: fall back to local names.
    // Both binding tables use the SOAP 1.2 envelope, so a dialect found here
    // (e.g. for a SOAP 1.1 envelope) names the trust namespace but the body
    // queries still match nothing and extraction ends in TokenNotFound.
    if !root.has_local_name("Envelope") {
        return None;
    }
    root.children_with_local_name("Header")
        .into_iter()
        .flat_map(|header| header.children_with_local_name("Action"))
        .find_map(action_text)
}

fn action_text(action: Node<'_, '_>) -> Option<String> {
    let text = action.text_content();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
