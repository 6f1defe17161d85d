//! Core types for the paywall
//!
//! This module defines the data structures shared by the token codec, the
//! invoice service and the gate.
//!
//! # Architecture
//!
//! - [`invoice`] - Invoice status, lookup snapshots and creation requests
//! - [`node`] - Lightning node connection configuration
//! - [`constants`] - Auth schemes, header names and defaults
//!
//! # Examples
//!
//! ```
//! use lsat_paywall::types::{InvoiceSnapshot, InvoiceStatus};
//!
//! let snapshot = InvoiceSnapshot::new("lnbc10n1...", InvoiceStatus::Held);
//! assert_eq!(snapshot.complete(), Some(("lnbc10n1...", InvoiceStatus::Held)));
//! ```

pub mod constants;
pub mod invoice;
pub mod node;

// Re-export commonly used types
pub use constants::{defaults, headers, params, schemes};
pub use invoice::{
    is_payment_hash, Invoice, InvoiceRequest, InvoiceSnapshot, InvoiceStatus, NodeInfo,
};
pub use node::NodeConfig;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_support() {
        assert!(schemes::is_supported("LSAT"));
        assert!(schemes::is_supported("l402"));
        assert!(!schemes::is_supported("Bearer"));
    }

    #[test]
    fn test_snapshot_complete() {
        let partial = InvoiceSnapshot {
            payment_request: Some("lnbc1".to_string()),
            status: None,
        };
        assert!(partial.complete().is_none());

        let full = InvoiceSnapshot::new("lnbc1", InvoiceStatus::Unpaid);
        assert_eq!(full.complete(), Some(("lnbc1", InvoiceStatus::Unpaid)));
    }

    #[test]
    fn test_payment_hash_format() {
        assert!(is_payment_hash(&"aB".repeat(32)));
        assert!(!is_payment_hash(&"ab".repeat(31)));
        assert!(!is_payment_hash(&"zz".repeat(32)));
        assert!(!is_payment_hash("../getinfo"));
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&InvoiceStatus::Held).unwrap();
        assert_eq!(json, "\"held\"");
        assert_eq!(InvoiceStatus::Paid.to_string(), "paid");
    }

    #[test]
    fn test_node_config_validation() {
        assert!(NodeConfig::new("https://localhost:8080/").validate().is_ok());
        assert_eq!(NodeConfig::new("https://localhost:8080/").url, "https://localhost:8080");
        assert!(NodeConfig::new("").validate().is_err());
        assert!(NodeConfig::new("localhost:8080").validate().is_err());
        assert!(NodeConfig::default()
            .with_macaroon("not-hex")
            .validate()
            .is_err());
        assert!(NodeConfig::default()
            .with_macaroon("0201036c6e64")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_node_config_debug_redacts_macaroon() {
        let config = NodeConfig::default().with_macaroon("0201036c6e64");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("0201036c6e64"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_invoice_request_builder() {
        let request = InvoiceRequest::new(10, "memo")
            .with_expiry_secs(60)
            .with_hodl(Some("ab".repeat(32)));
        assert!(request.hodl);
        assert_eq!(request.expiry_secs, 60);
        assert_eq!(request.payment_hash, Some("ab".repeat(32)));
    }
}
