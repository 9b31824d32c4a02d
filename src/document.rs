//! Read-only XML tree for STS responses.
//!
//! Parsing is delegated to roxmltree, which keeps the source text and the
//! byte range of every node, so an embedded assertion can be handed
//! downstream without re-serialization. This module layers the configured
//! size, depth and XXE limits on top and adds the few namespace-aware
//! queries the response walkers need.

use crate::config::{WsTrustConfig, XxePreventionConfig};
use crate::error::{WsTrustError, WsTrustResult};
use quick_xml::events::Event;
use quick_xml::Reader;
use roxmltree::{Edge, Node, ParsingOptions};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// A parsed XML document borrowing its source text.
#[derive(Debug)]
pub struct Document<'input> {
    tree: roxmltree::Document<'input>,
}

impl<'input> Document<'input> {
    /// Parse a document with the default limits.
    pub fn parse(source: &'input str) -> WsTrustResult<Self> {
        Self::parse_with_config(source, &WsTrustConfig::default())
    }

    /// Parse raw bytes with the default limits.
    pub fn from_bytes(data: &'input [u8]) -> WsTrustResult<Self> {
        let source = std::str::from_utf8(data)
            .map_err(|e| WsTrustError::XmlParse(format!("Invalid UTF-8: {}", e)))?;
        Self::parse(source)
    }

    /// Parse a document, enforcing the size, depth and XXE settings of `config`.
    pub fn parse_with_config(source: &'input str, config: &WsTrustConfig) -> WsTrustResult<Self> {
        let max = config.settings.max_document_size;
        if source.len() > max {
            return Err(WsTrustError::DocumentTooLarge {
                size: source.len(),
                max,
            });
        }

        let xxe = &config.xxe_prevention;
        if xxe.enabled {
            check_xxe_patterns(source, xxe)?;
            check_declarations(source, xxe)?;
        }

        // Node ranges index into the text handed to roxmltree, so the BOM
        // goes before parsing rather than after.
        let text = source.strip_prefix(BYTE_ORDER_MARK).unwrap_or(source);
        let mut options = ParsingOptions::default();
        options.allow_dtd = !(xxe.enabled && xxe.block_doctype);
        let tree = roxmltree::Document::parse_with_options(text, options).map_err(|e| match e {
            roxmltree::Error::DtdDetected => {
                WsTrustError::XxeDetected("DOCTYPE declarations are not allowed".to_string())
            }
            other => WsTrustError::XmlParse(other.to_string()),
        })?;

        check_depth(&tree, config.settings.max_depth)?;
        Ok(Self { tree })
    }

    /// The document element.
    pub fn root(&self) -> Node<'_, 'input> {
        self.tree.root_element()
    }

    /// The text this document was parsed from, without any byte order mark.
    pub fn source(&self) -> &'input str {
        self.tree.input_text()
    }
}

/// Namespace-aware queries over element nodes.
pub trait NodeExt<'a, 'input: 'a> {
    /// Whether this is an element with the given local name, in any namespace.
    fn has_local_name(&self, local_name: &str) -> bool;

    /// First child element with the given namespace URI and local name.
    fn child_named(&self, namespace: &str, local_name: &str) -> Option<Node<'a, 'input>>;

    /// Child elements with the given namespace URI and local name.
    fn children_named(&self, namespace: &str, local_name: &str) -> Vec<Node<'a, 'input>>;

    /// Child elements with the given local name, in any namespace.
    fn children_with_local_name(&self, local_name: &str) -> Vec<Node<'a, 'input>>;

    /// Concatenated text of all descendant text nodes, in document order.
    fn text_content(&self) -> String;

    /// The exact source text of this node, start tag through end tag.
    fn source(&self) -> &'input str;
}

impl<'a, 'input: 'a> NodeExt<'a, 'input> for Node<'a, 'input> {
    fn has_local_name(&self, local_name: &str) -> bool {
        self.is_element() && self.tag_name().name() == local_name
    }

    fn child_named(&self, namespace: &str, local_name: &str) -> Option<Node<'a, 'input>> {
        self.children()
            .find(|child| child.is_element() && child.has_tag_name((namespace, local_name)))
    }

    fn children_named(&self, namespace: &str, local_name: &str) -> Vec<Node<'a, 'input>> {
        self.children()
            .filter(|child| child.is_element() && child.has_tag_name((namespace, local_name)))
            .collect()
    }

    fn children_with_local_name(&self, local_name: &str) -> Vec<Node<'a, 'input>> {
        self.children()
            .filter(|child| child.has_local_name(local_name))
            .collect()
    }

    fn text_content(&self) -> String {
        self.descendants()
            .filter(Node::is_text)
            .filter_map(|node| node.text())
            .collect()
    }

    fn source(&self) -> &'input str {
        self.document()
            .input_text()
            .get(self.range())
            .unwrap_or_default()
    }
}

fn check_depth(tree: &roxmltree::Document<'_>, max_depth: usize) -> WsTrustResult<()> {
    let mut depth = 0usize;
    for edge in tree.root().traverse() {
        match edge {
            Edge::Open(node) if node.is_element() => {
                depth += 1;
                if depth > max_depth {
                    return Err(WsTrustError::DepthExceeded(max_depth));
                }
            }
            Edge::Close(node) if node.is_element() => depth -= 1,
            _ => {}
        }
    }
    Ok(())
}

/// Check for XXE attack patterns.
fn check_xxe_patterns(xml: &str, config: &XxePreventionConfig) -> WsTrustResult<()> {
    if config.block_doctype && contains_ignore_ascii_case(xml, "<!DOCTYPE") {
        return Err(WsTrustError::XxeDetected(
            "DOCTYPE declarations are not allowed".to_string(),
        ));
    }

    if config.block_external_entities && contains_ignore_ascii_case(xml, "<!ENTITY") {
        return Err(WsTrustError::XxeDetected(
            "Entity declarations are not allowed".to_string(),
        ));
    }

    Ok(())
}

/// Reject SYSTEM/PUBLIC identifiers in the prolog's DOCTYPE declaration.
///
/// Only declarations are inspected; the same words in element text or
/// comments are ordinary content. Read errors end the scan and are left
/// for the tree parser to report.
fn check_declarations(xml: &str, config: &XxePreventionConfig) -> WsTrustResult<()> {
    if !config.block_external_entities {
        return Ok(());
    }

    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::DocType(ref e)) => {
                let declaration = String::from_utf8_lossy(e);
                if declaration.contains("SYSTEM") || declaration.contains("PUBLIC") {
                    return Err(WsTrustError::XxeDetected(
                        "External entity references are not allowed".to_string(),
                    ));
                }
            }
            // A DOCTYPE may only precede the document element.
            Ok(Event::Start(_)) | Ok(Event::Empty(_)) | Ok(Event::Eof) | Err(_) => return Ok(()),
            Ok(_) => {}
        }
    }
}

fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}
