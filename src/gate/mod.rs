//! Paywall gate
//!
//! The gate decides, once per protected request, whether to issue a payment
//! challenge, refuse the token, grant access, or settle a held invoice and
//! then grant access.
//!
//! # Architecture
//!
//! - [`config`] - Amount, token lifetime and mode flags
//! - [`decision`] - Ordered rule tables, free of I/O
//! - [`verdict`] - Outcomes and their HTTP mapping
//!
//! # Examples
//!
//! ```no_run
//! use lsat_paywall::gate::{GateRequest, PaywallConfig, PaywallGate, Verdict};
//! use lsat_paywall::node::InMemoryNode;
//! use lsat_paywall::token::JwtTokenCodec;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let gate = PaywallGate::new(
//!     PaywallConfig::new(10).with_description("Premium API"),
//!     Arc::new(InMemoryNode::new()),
//!     Arc::new(JwtTokenCodec::new("secret")),
//! );
//!
//! match gate.evaluate(&GateRequest::new("/protected")).await {
//!     Verdict::ChallengeRequired { challenge } => println!("402: {}", challenge),
//!     other => println!("{:?}", other),
//! }
//! # }
//! ```
//!
//! # Decision Flow
//!
//! 1. Unparseable `Authorization` headers count as absent
//! 2. Absent or expired token → new invoice and challenge (402)
//! 3. Oauth mode → grant without asking the node
//! 4. Look up the token's invoice (404 / 500 on failure)
//! 5. No preimage → challenge again, except for a held hodl invoice
//! 6. Preimage on a hodl invoice → settle if held, refuse if already paid
//! 7. Otherwise grant

use crate::node::InvoiceService;
use crate::token::{Lsat, TokenCodec, TokenGrant};
use crate::types::params;
use crate::{PaywallError, Result};
use std::collections::HashMap;
use std::sync::Arc;

pub mod config;
pub mod decision;
pub mod verdict;


pub use config::PaywallConfig;
pub use decision::{Entry, IssueFailure, Resolution};
pub use verdict::{messages, Verdict};

/// Mode flags resolved before the gate runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateMode {
    pub hodl: bool,
    pub oauth: bool,
}

/// The parts of an HTTP request the gate looks at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GateRequest {
    /// Raw `Authorization` header value
    pub authorization: Option<String>,
    /// Decoded query parameters
    pub query: HashMap<String, String>,
    /// Request path
    pub path: String,
}

impl GateRequest {
    /// Create a request for a path
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Create a request from a path and raw query string
    pub fn from_parts(
        path: impl Into<String>,
        query: Option<&str>,
        authorization: Option<String>,
    ) -> Self {
        let query = query
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Self {
            authorization,
            query,
            path: path.into(),
        }
    }

    /// Set the `Authorization` header value
    pub fn with_authorization(mut self, authorization: impl Into<String>) -> Self {
        self.authorization = Some(authorization.into());
        self
    }

    /// Add a query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Get a non-empty query parameter
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Per-request state; discarded when the request completes
#[derive(Debug, Clone)]
pub struct GateContext {
    pub mode: GateMode,
    pub token: Option<Lsat>,
}

/// Payment-gated access decision engine
#[derive(Clone)]
pub struct PaywallGate {
    config: Arc<PaywallConfig>,
    invoices: Arc<dyn InvoiceService>,
    codec: Arc<dyn TokenCodec>,
}

impl std::fmt::Debug for PaywallGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaywallGate")
            .field("config", &self.config)
            .field("invoices", &"<service>")
            .field("codec", &"<codec>")
            .finish()
    }
}

impl PaywallGate {
    /// Create a new gate
    pub fn new(
        config: PaywallConfig,
        invoices: Arc<dyn InvoiceService>,
        codec: Arc<dyn TokenCodec>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            invoices,
            codec,
        }
    }

    /// Get the gate configuration
    pub fn config(&self) -> &PaywallConfig {
        &self.config
    }

    /// Get the invoice service
    pub fn invoices(&self) -> &Arc<dyn InvoiceService> {
        &self.invoices
    }

    /// Parse the request's token, treating parse failures as no token
    pub fn context(&self, request: &GateRequest) -> GateContext {
        let token = request
            .authorization
            .as_deref()
            .and_then(|header| match self.codec.parse(header) {
                Ok(token) => Some(token),
                Err(e) => {
                    tracing::warn!("Ignoring unparseable authorization header: {}", e);
                    None
                }
            });

        GateContext {
            mode: self.config.mode(),
            token,
        }
    }

    /// Decide what to do with a request
    pub async fn evaluate(&self, request: &GateRequest) -> Verdict {
        let context = self.context(request);
        let facts = decision::EntryFacts::new(context.token.as_ref(), context.mode);
        let (rule, entry) = decision::entry(&facts);
        tracing::debug!("Gate entry for {}: {} → {:?}", request.path, rule, entry);

        match (entry, context.token) {
            (Entry::OauthPassThrough, Some(token)) => {
                if !token.is_satisfied() {
                    tracing::warn!(
                        "Oauth token {} has a valid signature but no preimage",
                        token.id
                    );
                }
                Verdict::Continue
            }
            (Entry::LookupInvoice, Some(token)) => self.check_invoice(token, context.mode).await,
            _ => self.issue_challenge(request, context.mode).await,
        }
    }

    /// Create an invoice and a token bound to it
    async fn mint(&self, request: &GateRequest, mode: GateMode) -> Result<Lsat> {
        let auth_uri = match request.query_param(params::AUTH_URI) {
            Some(auth_uri) => Some(auth_uri),
            None if mode.oauth => return Err(PaywallError::config("Missing auth_uri")),
            None => None,
        };

        let invoice_request = self.config.invoice_request(request)?;
        let invoice = self.invoices.create(&invoice_request).await?;

        let mut grant = TokenGrant::new(invoice.payment_hash, self.config.token_ttl()?);
        if let Some(auth_uri) = auth_uri.filter(|_| mode.oauth) {
            grant = grant.with_auth_uri(auth_uri);
        }

        let mut token = self.codec.issue(grant)?;
        token.add_invoice(invoice.payment_request);
        Ok(token)
    }

    async fn issue_challenge(&self, request: &GateRequest, mode: GateMode) -> Verdict {
        match self.mint(request, mode).await {
            Ok(token) => {
                tracing::debug!("Issued challenge for token {}", token.id);
                Verdict::ChallengeRequired {
                    challenge: token.to_challenge(),
                }
            }
            Err(e) => {
                tracing::error!("Failed to issue challenge for {}: {}", request.path, e);
                let facts = decision::IssueFailureFacts {
                    oauth: mode.oauth,
                    has_auth_uri: request.query_param(params::AUTH_URI).is_some(),
                };
                match decision::diagnose_issue_failure(&facts).1 {
                    IssueFailure::MissingAuthUri => Verdict::ServerError {
                        status: http::StatusCode::BAD_REQUEST,
                        message: messages::MISSING_AUTH_URI.to_string(),
                        details: None,
                    },
                    IssueFailure::InvoiceGeneration => {
                        Verdict::server_error(messages::INVOICE_GENERATION_FAILED)
                    }
                }
            }
        }
    }

    async fn check_invoice(&self, mut token: Lsat, mode: GateMode) -> Verdict {
        let snapshot = match self.invoices.lookup(&token.payment_hash).await {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_not_found() => {
                tracing::warn!("No invoice for token {}: {}", token.id, e);
                return Verdict::NotFound {
                    message: messages::INVOICE_NOT_FOUND.to_string(),
                };
            }
            Err(e) => {
                tracing::error!("Invoice lookup failed for token {}: {}", token.id, e);
                return Verdict::server_error(messages::INVOICE_LOOKUP_FAILED);
            }
        };

        let Some((payment_request, status)) = snapshot.complete() else {
            tracing::error!("Malformed invoice for token {}: {:?}", token.id, snapshot);
            return Verdict::server_error(messages::MALFORMED_INVOICE);
        };

        let facts = decision::InvoiceFacts {
            has_preimage: token.payment_preimage.is_some(),
            hodl: mode.hodl,
            status,
        };
        let (rule, resolution) = decision::resolve(&facts);

        match resolution {
            Resolution::Grant => {
                tracing::debug!("Authorized request with valid token {} ({})", token.id, rule);
                Verdict::Continue
            }
            Resolution::Rechallenge => {
                token.add_invoice(payment_request);
                Verdict::ChallengeRequired {
                    challenge: token.to_challenge(),
                }
            }
            Resolution::RejectReplay => {
                tracing::warn!("Rejected settled hodl token {}", token.id);
                Verdict::Unauthorized {
                    message: messages::HODL_PAID.to_string(),
                }
            }
            Resolution::Settle => self.settle(&token).await,
        }
    }

    async fn settle(&self, token: &Lsat) -> Verdict {
        let Some(preimage) = token.payment_preimage.as_deref() else {
            return Verdict::server_error(messages::HODL_SETTLE_FAILED);
        };

        match self.invoices.settle(preimage).await {
            Ok(()) => {
                tracing::info!("Settled hodl invoice {}", token.payment_hash);
                Verdict::Continue
            }
            Err(PaywallError::Settlement {
                status,
                message: Some(message),
                details,
            }) => {
                tracing::error!("Node refused settlement of {}: {}", token.payment_hash, message);
                Verdict::ServerError {
                    status: status.unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR),
                    message,
                    details,
                }
            }
            Err(e) => {
                tracing::error!("Settlement of {} failed: {}", token.payment_hash, e);
                Verdict::server_error(messages::HODL_SETTLE_FAILED)
            }
        }
    }
}
