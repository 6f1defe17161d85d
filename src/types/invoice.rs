//! Invoice-related types

use serde::{Deserialize, Serialize};

/// Status of an invoice as seen by the paywall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Open, cancelled or otherwise not paid
    Unpaid,
    /// Hodl invoice with an accepted HTLC that has not been settled
    Held,
    /// Settled
    Paid,
}

impl InvoiceStatus {
    /// Get the wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Unpaid => "unpaid",
            InvoiceStatus::Held => "held",
            InvoiceStatus::Paid => "paid",
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an invoice lookup
///
/// Both fields are optional because a node may return a partial record; the
/// gate treats a snapshot missing either one as malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSnapshot {
    /// BOLT11 payment request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_request: Option<String>,
    /// Current status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InvoiceStatus>,
}

impl InvoiceSnapshot {
    /// Create a complete snapshot
    pub fn new(payment_request: impl Into<String>, status: InvoiceStatus) -> Self {
        Self {
            payment_request: Some(payment_request.into()),
            status: Some(status),
        }
    }

    /// Both fields, if present
    pub fn complete(&self) -> Option<(&str, InvoiceStatus)> {
        match (&self.payment_request, self.status) {
            (Some(payment_request), Some(status)) => Some((payment_request.as_str(), status)),
            _ => None,
        }
    }
}

/// A freshly created invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Payment hash, lowercase hex
    pub payment_hash: String,
    /// BOLT11 payment request
    pub payment_request: String,
}

/// Parameters for creating an invoice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRequest {
    /// Amount in satoshis
    pub amount_sats: u64,
    /// Invoice memo
    pub memo: String,
    /// Seconds until the invoice expires
    pub expiry_secs: u64,
    /// Create a hodl invoice
    pub hodl: bool,
    /// Payment hash chosen by the payer, required for hodl invoices
    pub payment_hash: Option<String>,
}

impl InvoiceRequest {
    /// Create a standard invoice request
    pub fn new(amount_sats: u64, memo: impl Into<String>) -> Self {
        Self {
            amount_sats,
            memo: memo.into(),
            expiry_secs: crate::types::defaults::INVOICE_EXPIRY_SECS,
            hodl: false,
            payment_hash: None,
        }
    }

    /// Set the expiry
    pub fn with_expiry_secs(mut self, expiry_secs: u64) -> Self {
        self.expiry_secs = expiry_secs;
        self
    }

    /// Request a hodl invoice locked to the given payment hash
    pub fn with_hodl(mut self, payment_hash: Option<String>) -> Self {
        self.hodl = true;
        self.payment_hash = payment_hash;
        self
    }
}

/// Whether `value` is a 32-byte payment hash in hex
pub fn is_payment_hash(value: &str) -> bool {
    value.len() == 64 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Public identity of the backing node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    /// Node public key, hex
    pub pubkey: String,
    /// Node alias
    #[serde(default)]
    pub alias: String,
    /// Connection URIs (`pubkey@host:port`)
    #[serde(default)]
    pub uris: Vec<String>,
}
