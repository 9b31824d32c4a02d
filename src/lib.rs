//! WS-Trust STS response parser
//!
//! Reads the SOAP envelope a security token service returns during a
//! federated sign-in and turns it into either a denial or exactly one SAML
//! assertion, classified by the OAuth grant type used to exchange it.
//!
//! # Features
//!
//! - SOAP 1.2 and SOAP 1.1 fault detection (fault wins over any token)
//! - WS-Trust 1.3 and WS-Trust 2005 dialect selection from the Action header
//! - Single response and response-collection shapes
//! - SAML 1.x / 2.0 token type validation and grant type mapping
//! - XXE screening and size/depth limits
//!
//! The assertion's signature is not verified; it is returned as collapsed
//! source text for the token endpoint to consume.
//!
//! # Example
//!
//! ```ignore
//! use wstrust_response::{ResponseParser, WsTrustConfig};
//!
//! let parser = ResponseParser::new(WsTrustConfig::default());
//! let response = parser.parse(&body)?;
//! println!("{} -> {}", response.token_type(), response.grant_type());
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod fault;
pub mod namespaces;
pub mod parser;
pub mod response;

pub use config::WsTrustConfig;
pub use document::{Document, NodeExt};
pub use error::{WsTrustError, WsTrustResult};
pub use namespaces::{Dialect, NamespaceRole, NamespaceSet};
pub use parser::{NoopSink, ResponseParser, TracingSink, WarningSink};
pub use response::{GrantType, ParsedResponse, TokenType};

/// Parse an STS response with the default configuration.
pub fn parse_response(raw: &str) -> WsTrustResult<ParsedResponse> {
    ResponseParser::default().parse(raw)
}
