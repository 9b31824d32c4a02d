//! STS response parsing pipeline.
//!
//! `parse` runs fault detection, dialect selection and token extraction in
//! that order over one document. Nothing is kept between calls, so a single
//! [`ResponseParser`] can be shared across threads.

use crate::config::WsTrustConfig;
use crate::document::Document;
use crate::error::{WsTrustError, WsTrustResult};
use crate::extract::extract_token;
use crate::fault::check_fault;
use crate::namespaces::detect_dialect;
use crate::response::ParsedResponse;
use std::fmt;
use tracing::{debug, warn};

/// Receiver for non-fatal parse conditions.
///
/// Warnings are advisory; no implementation can change a parse outcome.
pub trait WarningSink: Send + Sync {
    fn warn(&self, message: &str);
}

/// Forwards warnings to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn warn(&self, message: &str) {
        warn!("{}", message);
    }
}

/// Drops warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl WarningSink for NoopSink {
    fn warn(&self, _message: &str) {}
}

/// WS-Trust response parser.
pub struct ResponseParser {
    config: WsTrustConfig,
    sink: Box<dyn WarningSink>,
}

impl ResponseParser {
    /// Create a parser that reports warnings through `tracing`.
    pub fn new(config: WsTrustConfig) -> Self {
        Self {
            config,
            sink: Box::new(TracingSink),
        }
    }

    /// Replace the warning sink.
    pub fn with_sink(mut self, sink: impl WarningSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn config(&self) -> &WsTrustConfig {
        &self.config
    }

    /// Parse a raw STS response.
    pub fn parse(&self, raw: &str) -> WsTrustResult<ParsedResponse> {
        if raw.trim().is_empty() {
            return Err(WsTrustError::EmptyInput);
        }

        let document = Document::parse_with_config(raw, &self.config)?;
        self.parse_document(&document)
    }

    /// Parse a raw STS response body.
    pub fn parse_bytes(&self, data: &[u8]) -> WsTrustResult<ParsedResponse> {
        let raw = std::str::from_utf8(data)
            .map_err(|e| WsTrustError::XmlParse(format!("Invalid UTF-8: {}", e)))?;
        self.parse(raw)
    }

    /// Parse an already-parsed STS response.
    pub fn parse_document(&self, document: &Document) -> WsTrustResult<ParsedResponse> {
        if let Some(fault) = check_fault(document) {
            debug!(
                reason = ?fault.reason,
                code = ?fault.code,
                "STS returned a fault"
            );
            return Err(fault.into());
        }

        let namespaces = detect_dialect(document);
        debug!(dialect = ?namespaces.dialect(), "Selected WS-Trust namespace set");

        let extracted = extract_token(document, &namespaces, self.sink.as_ref())?;
        ParsedResponse::new(extracted.token, &extracted.token_type)
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new(WsTrustConfig::default())
    }
}

impl fmt::Debug for ResponseParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseParser")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{GrantType, TokenType};

    const WSTRUST_2005_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:a="http://www.w3.org/2005/08/addressing">
  <s:Header>
    <a:Action s:mustUnderstand="1">http://schemas.xmlsoap.org/ws/2005/02/trust/RSTR/Issue</a:Action>
  </s:Header>
  <s:Body>
    <t:RequestSecurityTokenResponse xmlns:t="http://schemas.xmlsoap.org/ws/2005/02/trust">
      <t:TokenType>urn:oasis:names:tc:SAML:1.0:assertion</t:TokenType>
      <t:RequestedSecurityToken>
        <saml:Assertion MajorVersion="1" MinorVersion="1" AssertionID="_b2" xmlns:saml="urn:oasis:names:tc:SAML:1.0:assertion">
          <saml:AttributeStatement/>
        </saml:Assertion>
      </t:RequestedSecurityToken>
    </t:RequestSecurityTokenResponse>
  </s:Body>
</s:Envelope>"#;

    #[test]
    fn test_parse_wstrust_2005_saml1() {
        let parser = ResponseParser::default().with_sink(NoopSink);
        let response = parser.parse(WSTRUST_2005_RESPONSE).unwrap();
        assert_eq!(response.token_type(), TokenType::SamlV1);
        assert_eq!(response.grant_type(), GrantType::Saml1Bearer);
        assert_eq!(
            response.token(),
            r#"<saml:Assertion MajorVersion="1" MinorVersion="1" AssertionID="_b2" xmlns:saml="urn:oasis:names:tc:SAML:1.0:assertion"><saml:AttributeStatement/></saml:Assertion>"#
        );
    }

    #[test]
    fn test_parse_bytes_matches_parse() {
        let parser = ResponseParser::default();
        assert_eq!(
            parser.parse_bytes(WSTRUST_2005_RESPONSE.as_bytes()).unwrap(),
            parser.parse(WSTRUST_2005_RESPONSE).unwrap()
        );
    }

    #[test]
    fn test_parse_document() {
        let document = Document::parse(WSTRUST_2005_RESPONSE).unwrap();
        let response = ResponseParser::default().parse_document(&document).unwrap();
        assert_eq!(response.token_type(), TokenType::SamlV1);
    }

    #[test]
    fn test_empty_input() {
        let parser = ResponseParser::default();
        assert_eq!(parser.parse("").unwrap_err(), WsTrustError::EmptyInput);
        assert_eq!(parser.parse("  \n\t").unwrap_err(), WsTrustError::EmptyInput);
        assert_eq!(parser.parse_bytes(b"").unwrap_err(), WsTrustError::EmptyInput);
    }

    #[test]
    fn test_config_limits_applied() {
        let mut config = WsTrustConfig::default();
        config.settings.max_document_size = 64;
        let err = ResponseParser::new(config)
            .parse(WSTRUST_2005_RESPONSE)
            .unwrap_err();
        assert_eq!(err.code(), "DOCUMENT_TOO_LARGE");
    }

    #[test]
    fn test_unknown_action_surfaces_token_not_found() {
        let xml = WSTRUST_2005_RESPONSE.replace(
            "http://schemas.xmlsoap.org/ws/2005/02/trust/RSTR/Issue",
            "urn:example:unknown",
        );
        let err = ResponseParser::default().parse(&xml).unwrap_err();
        assert_eq!(err, WsTrustError::TokenNotFound);
    }
}
