//! Error types for WS-Trust response parsing.

use thiserror::Error;

/// Result type for WS-Trust response operations.
pub type WsTrustResult<T> = Result<T, WsTrustError>;

/// WS-Trust response parsing errors.
///
/// Every variant is terminal: callers should treat any of them as a rejected
/// authentication response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WsTrustError {
    #[error("Response is empty")]
    EmptyInput,

    #[error("Response size {size} exceeds maximum {max}")]
    DocumentTooLarge { size: usize, max: usize },

    #[error("XML parsing error: {0}")]
    XmlParse(String),

    #[error("XML nesting depth exceeds maximum {0}")]
    DepthExceeded(usize),

    #[error("XXE attack detected: {0}")]
    XxeDetected(String),

    /// The STS explicitly denied the request.
    #[error("Fault: {reason}. Error: {code}.")]
    Fault { reason: String, code: String },

    #[error("Found too many requested tokens in a single response")]
    TooManyRequestedTokens,

    #[error("unable to parse token from response")]
    TokenNotFound,

    #[error("Unrecognized token type: {0}")]
    UnrecognizedTokenType(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WsTrustError {
    /// Get the stable string code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyInput => "EMPTY_INPUT",
            Self::DocumentTooLarge { .. } => "DOCUMENT_TOO_LARGE",
            Self::XmlParse(_) => "INVALID_XML",
            Self::DepthExceeded(_) => "DEPTH_EXCEEDED",
            Self::XxeDetected(_) => "XXE_DETECTED",
            Self::Fault { .. } => "WSTRUST_FAULT",
            Self::TooManyRequestedTokens => "TOO_MANY_REQUESTED_TOKENS",
            Self::TokenNotFound => "TOKEN_NOT_FOUND",
            Self::UnrecognizedTokenType(_) => "UNRECOGNIZED_TOKEN_TYPE",
            Self::Config(_) => "CONFIG",
        }
    }

    /// Whether the STS answered with an explicit denial.
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault { .. })
    }
}
