//! Paywall configuration

use super::{GateMode, GateRequest};
use crate::types::{defaults, params, InvoiceRequest};
use crate::{PaywallError, Result};
use std::time::Duration;

/// Configuration for the paywall gate
#[derive(Debug, Clone)]
pub struct PaywallConfig {
    /// Invoice amount in satoshis
    pub amount_sats: u64,
    /// Invoice memo
    pub description: Option<String>,
    /// Lifetime of issued tokens
    pub token_ttl: Duration,
    /// Seconds until issued invoices expire
    pub invoice_expiry_secs: u64,
    /// Issue hodl invoices and settle them when the preimage is presented
    pub hodl: bool,
    /// Token caveats are verified by an upstream oauth flow
    pub oauth: bool,
}

impl PaywallConfig {
    /// Create a new paywall config
    pub fn new(amount_sats: u64) -> Self {
        Self {
            amount_sats,
            description: None,
            token_ttl: Duration::from_secs(defaults::TOKEN_TTL_SECS),
            invoice_expiry_secs: defaults::INVOICE_EXPIRY_SECS,
            hodl: false,
            oauth: false,
        }
    }

    /// Set the invoice memo
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the token lifetime
    pub fn with_token_ttl(mut self, token_ttl: Duration) -> Self {
        self.token_ttl = token_ttl;
        self
    }

    /// Set the invoice expiry
    pub fn with_invoice_expiry_secs(mut self, invoice_expiry_secs: u64) -> Self {
        self.invoice_expiry_secs = invoice_expiry_secs;
        self
    }

    /// Set hodl mode
    pub fn with_hodl(mut self, hodl: bool) -> Self {
        self.hodl = hodl;
        self
    }

    /// Set oauth mode
    pub fn with_oauth(mut self, oauth: bool) -> Self {
        self.oauth = oauth;
        self
    }

    /// Mode flags the gate runs under
    pub fn mode(&self) -> GateMode {
        GateMode {
            hodl: self.hodl,
            oauth: self.oauth,
        }
    }

    /// Token lifetime as a signed duration
    pub fn token_ttl(&self) -> Result<chrono::Duration> {
        chrono::Duration::from_std(self.token_ttl)
            .map_err(|e| PaywallError::config(format!("Token TTL out of range: {}", e)))
    }

    /// Build the invoice request for an incoming request
    pub fn invoice_request(&self, request: &GateRequest) -> Result<InvoiceRequest> {
        if self.amount_sats == 0 {
            return Err(PaywallError::config("Invoice amount must be positive"));
        }

        let memo = self.description.as_deref().unwrap_or(defaults::DESCRIPTION);
        let invoice_request = InvoiceRequest::new(self.amount_sats, memo)
            .with_expiry_secs(self.invoice_expiry_secs);

        if self.hodl {
            let payment_hash = request.query_param(params::PAYMENT_HASH).map(str::to_string);
            Ok(invoice_request.with_hodl(payment_hash))
        } else {
            Ok(invoice_request)
        }
    }
}

impl Default for PaywallConfig {
    fn default() -> Self {
        Self::new(defaults::AMOUNT_SATS)
    }
}
