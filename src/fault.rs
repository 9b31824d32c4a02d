//! SOAP fault detection.
//!
//! A response can be well-formed and still be a denial. The fault check runs
//! before any token search, and a fault wins over a token present elsewhere
//! in the same envelope.

use crate::document::{Document, NodeExt};
use crate::error::WsTrustError;
use crate::extract::collapse_lines;
use crate::namespaces::{SOAP_11_NS, SOAP_ENVELOPE_NAMESPACES};
use roxmltree::Node;

/// Denial details found in a response body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fault {
    /// Human-readable fault reason
    pub reason: Option<String>,
    /// STS error code, with any `prefix:` removed
    pub code: Option<String>,
}

impl From<Fault> for WsTrustError {
    fn from(fault: Fault) -> Self {
        WsTrustError::Fault {
            reason: fault.reason.unwrap_or_default(),
            code: fault.code.unwrap_or_default(),
        }
    }
}

/// Look for a SOAP fault in `Envelope/Body/Fault`.
pub fn check_fault(document: &Document) -> Option<Fault> {
    let root = document.root();
    let envelope_ns = SOAP_ENVELOPE_NAMESPACES
        .into_iter()
        .find(|ns| root.tag_name().namespace() == Some(*ns))?;
    if !root.has_local_name("Envelope") {
        return None;
    }

    let mut fault = Fault::default();
    let faults = root
        .children_named(envelope_ns, "Body")
        .into_iter()
        .flat_map(|body| body.children_named(envelope_ns, "Fault"));
    for node in faults {
        if envelope_ns == SOAP_11_NS {
            fault.reason = fault.reason.or_else(|| unqualified_child_text(node, "faultstring"));
            fault.code = fault
                .code
                .or_else(|| unqualified_child_text(node, "faultcode").map(|c| strip_code_prefix(&c)));
        } else {
            fault.reason = fault.reason.or_else(|| soap12_reason(node, envelope_ns));
            fault.code = fault.code.or_else(|| soap12_subcode(node, envelope_ns));
        }
    }

    (fault.reason.is_some() || fault.code.is_some()).then_some(fault)
}

fn soap12_reason(fault: Node<'_, '_>, ns: &str) -> Option<String> {
    let reason = fault.child_named(ns, "Reason")?;
    let text = reason.child_named(ns, "Text").unwrap_or(reason);
    Some(collapse_lines(&text.text_content()))
}

fn soap12_subcode(fault: Node<'_, '_>, ns: &str) -> Option<String> {
    let value = fault
        .child_named(ns, "Code")?
        .child_named(ns, "Subcode")?
        .child_named(ns, "Value")?;
    Some(strip_code_prefix(&collapse_lines(&value.text_content())))
}

fn unqualified_child_text(fault: Node<'_, '_>, local_name: &str) -> Option<String> {
    fault
        .children()
        .find(|child| child.has_local_name(local_name) && child.tag_name().namespace().is_none())
        .map(|child| collapse_lines(&child.text_content()))
}

/// Keep the part of a `prefix:code` value after the first colon.
///
/// Values without a colon, or with nothing after it, are kept verbatim.
pub fn strip_code_prefix(raw: &str) -> String {
    match raw.split_once(':') {
        Some((_, code)) if !code.is_empty() => code.to_string(),
        _ => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOAP_12_FAULT: &str = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:a="http://www.w3.org/2005/08/addressing">
  <s:Header>
    <a:Action s:mustUnderstand="1">http://www.w3.org/2005/08/addressing/soap/fault</a:Action>
  </s:Header>
  <s:Body>
    <s:Fault>
      <s:Code>
        <s:Value>s:Sender</s:Value>
        <s:Subcode>
          <s:Value xmlns:a="http://docs.oasis-open.org/ws-sx/ws-trust/200512">a:RequestFailed</s:Value>
        </s:Subcode>
      </s:Code>
      <s:Reason>
        <s:Text xml:lang="en-US">MSIS3127: The specified request failed.</s:Text>
      </s:Reason>
    </s:Fault>
  </s:Body>
</s:Envelope>"#;

    #[test]
    fn test_soap_12_fault() {
        let doc = Document::parse(SOAP_12_FAULT).unwrap();
        let fault = check_fault(&doc).unwrap();
        assert_eq!(
            fault.reason.as_deref(),
            Some("MSIS3127: The specified request failed.")
        );
        assert_eq!(fault.code.as_deref(), Some("RequestFailed"));

        let err: WsTrustError = fault.into();
        assert_eq!(
            err.to_string(),
            "Fault: MSIS3127: The specified request failed.. Error: RequestFailed."
        );
    }

    #[test]
    fn test_reason_only() {
        let xml = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope">
  <s:Body><s:Fault><s:Reason><s:Text>
      denied
  </s:Text></s:Reason></s:Fault></s:Body>
</s:Envelope>"#;
        let doc = Document::parse(xml).unwrap();
        let fault = check_fault(&doc).unwrap();
        assert_eq!(fault.reason.as_deref(), Some("denied"));
        assert_eq!(fault.code, None);
        assert_eq!(WsTrustError::from(fault).to_string(), "Fault: denied. Error: .");
    }

    #[test]
    fn test_subcode_without_prefix_kept_verbatim() {
        let xml = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope">
  <s:Body><s:Fault><s:Code><s:Value>s:Receiver</s:Value>
    <s:Subcode><s:Value>InvalidRequest</s:Value></s:Subcode>
  </s:Code></s:Fault></s:Body>
</s:Envelope>"#;
        let doc = Document::parse(xml).unwrap();
        let fault = check_fault(&doc).unwrap();
        assert_eq!(fault.reason, None);
        assert_eq!(fault.code.as_deref(), Some("InvalidRequest"));
    }

    #[test]
    fn test_soap_11_fault() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <soap:Fault>
      <faultcode>soap:Client</faultcode>
      <faultstring>Authentication failed</faultstring>
    </soap:Fault>
  </soap:Body>
</soap:Envelope>"#;
        let doc = Document::parse(xml).unwrap();
        let fault = check_fault(&doc).unwrap();
        assert_eq!(fault.reason.as_deref(), Some("Authentication failed"));
        assert_eq!(fault.code.as_deref(), Some("Client"));
    }

    #[test]
    fn test_no_fault() {
        let xml = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"><s:Body/></s:Envelope>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(check_fault(&doc), None);
    }

    #[test]
    fn test_non_soap_document_has_no_fault() {
        let doc = Document::parse("<Fault><Reason>nope</Reason></Fault>").unwrap();
        assert_eq!(check_fault(&doc), None);
    }

    #[test]
    fn test_strip_code_prefix() {
        assert_eq!(strip_code_prefix("a:RequestFailed"), "RequestFailed");
        assert_eq!(strip_code_prefix("RequestFailed"), "RequestFailed");
        assert_eq!(strip_code_prefix("a:b:c"), "b:c");
        assert_eq!(strip_code_prefix("a:"), "a:");
    }
}
