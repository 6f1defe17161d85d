//! Gate outcomes and their HTTP mapping

use http::StatusCode;

/// Fixed messages attached to verdicts
pub mod messages {
    pub const PAYMENT_REQUIRED: &str = "Payment required";
    pub const INVOICE_GENERATION_FAILED: &str = "Problem generating invoice";
    pub const MISSING_AUTH_URI: &str = "Missing auth_uri in query string, required for oauth";
    pub const INVOICE_NOT_FOUND: &str = "Unable to find invoice with that payment hash";
    pub const INVOICE_LOOKUP_FAILED: &str = "Server error looking up invoice";
    pub const MALFORMED_INVOICE: &str = "Malformed invoice response from node";
    pub const HODL_PAID: &str = "HODL invoice paid and LSAT expired";
    pub const HODL_SETTLE_FAILED: &str = "Error processing hodl invoice, retry later";
}

/// Authorization decision for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Let the request through
    Continue,
    /// Ask the caller to pay; `challenge` goes in `WWW-Authenticate`
    ChallengeRequired { challenge: String },
    /// Token refused
    Unauthorized { message: String },
    /// Token names an invoice the node does not know
    NotFound { message: String },
    /// Node or configuration failure, retry later
    ServerError {
        status: StatusCode,
        message: String,
        details: Option<String>,
    },
}

impl Verdict {
    /// Create a 500 verdict with a fixed message
    pub fn server_error(message: impl Into<String>) -> Self {
        Self::ServerError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            details: None,
        }
    }

    /// HTTP status to respond with; `None` means pass the request through
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Verdict::Continue => None,
            Verdict::ChallengeRequired { .. } => Some(StatusCode::PAYMENT_REQUIRED),
            Verdict::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            Verdict::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            Verdict::ServerError { status, .. } => Some(*status),
        }
    }

    /// Message to put in the error body
    pub fn message(&self) -> Option<&str> {
        match self {
            Verdict::Continue => None,
            Verdict::ChallengeRequired { .. } => Some(messages::PAYMENT_REQUIRED),
            Verdict::Unauthorized { message }
            | Verdict::NotFound { message }
            | Verdict::ServerError { message, .. } => Some(message),
        }
    }

    /// Whether the request may proceed
    pub fn is_continue(&self) -> bool {
        matches!(self, Verdict::Continue)
    }
}
