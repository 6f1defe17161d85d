//! Error types for the paywall

use http::StatusCode;
use thiserror::Error;

/// Result type alias for paywall operations
pub type Result<T> = std::result::Result<T, PaywallError>;

/// Errors produced by the token codec, the invoice service and the gate
#[derive(Error, Debug)]
pub enum PaywallError {
    /// Authorization header could not be parsed into a token
    #[error("Token parse error: {message}")]
    TokenParse { message: String },

    /// Node refused or failed to create an invoice
    #[error("Invoice creation failed: {message}")]
    InvoiceCreate { message: String },

    /// No invoice exists for the payment hash
    #[error("Invoice not found for payment hash {payment_hash}")]
    InvoiceNotFound { payment_hash: String },

    /// Any other lookup failure
    #[error("Invoice lookup failed: {message}")]
    InvoiceLookup { message: String },

    /// Structured settlement failure reported by the node
    #[error(
        "Settlement failed: {}",
        .message.as_deref().unwrap_or("node returned an error")
    )]
    Settlement {
        status: Option<StatusCode>,
        message: Option<String>,
        details: Option<String>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Token signing or signature verification error
    #[error("Token signature error: {0}")]
    Signature(#[from] jsonwebtoken::errors::Error),

    /// Hex decoding error
    #[error("Hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Base64 decoding error
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl PaywallError {
    /// Create a token parse error
    pub fn token_parse(message: impl Into<String>) -> Self {
        Self::TokenParse {
            message: message.into(),
        }
    }

    /// Create an invoice creation error
    pub fn invoice_create(message: impl Into<String>) -> Self {
        Self::InvoiceCreate {
            message: message.into(),
        }
    }

    /// Create an invoice-not-found error
    pub fn invoice_not_found(payment_hash: impl Into<String>) -> Self {
        Self::InvoiceNotFound {
            payment_hash: payment_hash.into(),
        }
    }

    /// Create a generic invoice lookup error
    pub fn invoice_lookup(message: impl Into<String>) -> Self {
        Self::InvoiceLookup {
            message: message.into(),
        }
    }

    /// Create a structured settlement error
    pub fn settlement(
        status: Option<StatusCode>,
        message: Option<String>,
        details: Option<String>,
    ) -> Self {
        Self::Settlement {
            status,
            message,
            details,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this is a lookup miss rather than a node failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::InvoiceNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settlement_display_falls_back() {
        let err = PaywallError::settlement(None, None, None);
        assert_eq!(err.to_string(), "Settlement failed: node returned an error");

        let err = PaywallError::settlement(
            Some(StatusCode::BAD_REQUEST),
            Some("invoice still open".to_string()),
            None,
        );
        assert_eq!(err.to_string(), "Settlement failed: invoice still open");
    }

    #[test]
    fn test_not_found_classification() {
        assert!(PaywallError::invoice_not_found("abc").is_not_found());
        assert!(!PaywallError::invoice_lookup("timeout").is_not_found());
    }
}
