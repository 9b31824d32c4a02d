//! Parsed STS response and its token/grant classification.

use crate::error::{WsTrustError, WsTrustResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// SAML token type URIs.
pub const SAML_V1_TOKEN_TYPE: &str = "urn:oasis:names:tc:SAML:1.0:assertion";
pub const SAML_V2_TOKEN_TYPE: &str = "urn:oasis:names:tc:SAML:2.0:assertion";

/// OAuth assertion grant type URIs.
pub const SAML1_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:saml1_1-bearer";
pub const SAML2_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:saml2-bearer";

/// Token types an STS response may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    /// SAML 1.x assertion
    #[serde(rename = "urn:oasis:names:tc:SAML:1.0:assertion")]
    SamlV1,
    /// SAML 2.0 assertion
    #[serde(rename = "urn:oasis:names:tc:SAML:2.0:assertion")]
    SamlV2,
}

impl TokenType {
    /// Get the token type URI.
    pub fn as_uri(&self) -> &'static str {
        match self {
            Self::SamlV1 => SAML_V1_TOKEN_TYPE,
            Self::SamlV2 => SAML_V2_TOKEN_TYPE,
        }
    }

    /// OAuth grant type used to exchange a token of this type.
    pub fn grant_type(&self) -> GrantType {
        match self {
            Self::SamlV1 => GrantType::Saml1Bearer,
            Self::SamlV2 => GrantType::Saml2Bearer,
        }
    }
}

impl FromStr for TokenType {
    type Err = WsTrustError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            SAML_V1_TOKEN_TYPE => Ok(Self::SamlV1),
            SAML_V2_TOKEN_TYPE => Ok(Self::SamlV2),
            other => Err(WsTrustError::UnrecognizedTokenType(other.to_string())),
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_uri())
    }
}

/// OAuth grant types a parsed response maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantType {
    #[serde(rename = "urn:ietf:params:oauth:grant-type:saml1_1-bearer")]
    Saml1Bearer,
    #[serde(rename = "urn:ietf:params:oauth:grant-type:saml2-bearer")]
    Saml2Bearer,
}

impl GrantType {
    /// Get the grant type URI.
    pub fn as_uri(&self) -> &'static str {
        match self {
            Self::Saml1Bearer => SAML1_BEARER_GRANT,
            Self::Saml2Bearer => SAML2_BEARER_GRANT,
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_uri())
    }
}

/// A security token accepted from an STS response.
///
/// The token type is checked once, when the value is built; a
/// `ParsedResponse` always holds a recognized type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedResponse {
    token: String,
    token_type: TokenType,
}

impl ParsedResponse {
    /// Build a response from a serialized token and its declared type URI.
    pub fn new(token: impl Into<String>, token_type: &str) -> WsTrustResult<Self> {
        Ok(Self {
            token: token.into(),
            token_type: token_type.parse()?,
        })
    }

    /// The serialized assertion, collapsed to a single line.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    pub fn grant_type(&self) -> GrantType {
        self.token_type.grant_type()
    }

    /// Consume the response, returning the token.
    pub fn into_token(self) -> String {
        self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saml2_maps_to_saml2_bearer() {
        let response = ParsedResponse::new("<Assertion/>", SAML_V2_TOKEN_TYPE).unwrap();
        assert_eq!(response.token(), "<Assertion/>");
        assert_eq!(response.token_type(), TokenType::SamlV2);
        assert_eq!(response.grant_type(), GrantType::Saml2Bearer);
        assert_eq!(response.grant_type().as_uri(), SAML2_BEARER_GRANT);
    }

    #[test]
    fn test_saml1_maps_to_saml1_bearer() {
        let response = ParsedResponse::new("<Assertion/>", SAML_V1_TOKEN_TYPE).unwrap();
        assert_eq!(response.token_type(), TokenType::SamlV1);
        assert_eq!(response.grant_type(), GrantType::Saml1Bearer);
    }

    #[test]
    fn test_unrecognized_token_type() {
        let err = ParsedResponse::new(
            "<Assertion/>",
            "http://docs.oasis-open.org/wss/oasis-wss-saml-token-profile-1.1#SAMLV2.0",
        )
        .unwrap_err();
        assert_eq!(
            err,
            WsTrustError::UnrecognizedTokenType(
                "http://docs.oasis-open.org/wss/oasis-wss-saml-token-profile-1.1#SAMLV2.0"
                    .to_string()
            )
        );
    }

    #[test]
    fn test_empty_token_type_rejected() {
        let err = ParsedResponse::new("<Assertion/>", "").unwrap_err();
        assert_eq!(err, WsTrustError::UnrecognizedTokenType(String::new()));
    }

    #[test]
    fn test_token_type_serializes_as_uri() {
        let yaml = serde_yaml::to_string(&TokenType::SamlV1).unwrap();
        assert!(yaml.contains(SAML_V1_TOKEN_TYPE));
        let parsed: TokenType = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, TokenType::SamlV1);
        assert_eq!(TokenType::SamlV2.to_string(), SAML_V2_TOKEN_TYPE);
    }
}
