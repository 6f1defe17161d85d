//! Lightning node access for invoice creation, lookup and settlement
//!
//! This module provides the [`InvoiceService`] seam the gate talks to, a REST
//! client for LND, and an in-memory node for tests and local development.
//! Remote error shapes are normalized here into [`PaywallError`] variants so
//! the gate never inspects node-specific payloads.
//!
//! # Architecture
//!
//! - [`InvoiceService`] - Async trait consumed by the gate
//! - [`LndClient`] - LND REST gateway client
//! - [`memory`] - In-memory node with simulated payer actions
//!
//! # Examples
//!
//! ```no_run
//! use lsat_paywall::node::{InvoiceService, LndClient};
//! use lsat_paywall::types::{InvoiceRequest, NodeConfig};
//!
//! # async fn example() -> lsat_paywall::Result<()> {
//! let config = NodeConfig::new("https://localhost:8080")
//!     .with_macaroon("0201036c6e64...")
//!     .with_accept_invalid_certs(true);
//! let node = LndClient::new(config)?;
//!
//! let invoice = node.create(&InvoiceRequest::new(10, "API access")).await?;
//! let snapshot = node.lookup(&invoice.payment_hash).await?;
//! println!("{:?}", snapshot.status);
//! # Ok(())
//! # }
//! ```
//!
//! # Error mapping
//!
//! - lookup of an unknown hash → [`PaywallError::InvoiceNotFound`]
//! - any other lookup failure → [`PaywallError::InvoiceLookup`] or transport errors
//! - settlement refused with an error body → [`PaywallError::Settlement`]

use crate::types::{
    headers, is_payment_hash, Invoice, InvoiceRequest, InvoiceSnapshot, InvoiceStatus,
    NodeConfig, NodeInfo,
};
use crate::{PaywallError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use http::StatusCode;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

pub mod memory;

#[cfg(test)]
mod tests;

pub use memory::InMemoryNode;

/// gRPC status code LND reports for unknown invoices
const GRPC_NOT_FOUND: i64 = 5;

/// Invoice operations backed by a Lightning node
#[async_trait]
pub trait InvoiceService: Send + Sync {
    /// Create an invoice for the current request
    async fn create(&self, request: &InvoiceRequest) -> Result<Invoice>;

    /// Look up the current state of an invoice
    async fn lookup(&self, payment_hash: &str) -> Result<InvoiceSnapshot>;

    /// Settle a held invoice with its preimage
    ///
    /// May be called more than once for the same invoice; later calls are
    /// expected to fail without changing the invoice.
    async fn settle(&self, preimage: &str) -> Result<()>;

    /// Public identity of the node
    async fn node_info(&self) -> Result<NodeInfo>;
}

#[derive(Debug, Serialize)]
struct AddInvoiceRequest<'a> {
    value: String,
    memo: &'a str,
    expiry: String,
}

#[derive(Debug, Deserialize)]
struct AddInvoiceResponse {
    r_hash: String,
    payment_request: String,
}

#[derive(Debug, Serialize)]
struct AddHoldInvoiceRequest<'a> {
    hash: String,
    value: String,
    memo: &'a str,
    expiry: String,
}

#[derive(Debug, Deserialize)]
struct AddHoldInvoiceResponse {
    payment_request: String,
}

#[derive(Debug, Deserialize)]
struct LookupInvoiceResponse {
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    payment_request: Option<String>,
}

#[derive(Debug, Serialize)]
struct SettleInvoiceRequest {
    preimage: String,
}

#[derive(Debug, Deserialize)]
struct GetInfoResponse {
    identity_pubkey: String,
    #[serde(default)]
    alias: String,
    #[serde(default)]
    uris: Vec<String>,
}

/// Error body returned by the LND REST gateway
#[derive(Debug, Default, Deserialize)]
struct LndErrorBody {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<serde_json::Value>,
}

impl LndErrorBody {
    fn details_string(&self) -> Option<String> {
        match &self.details {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::Array(items)) if items.is_empty() => None,
            Some(details) => Some(details.to_string()),
        }
    }
}

/// Map an LND invoice state to a paywall status
pub fn status_from_state(state: &str) -> Option<InvoiceStatus> {
    match state {
        "OPEN" | "CANCELED" => Some(InvoiceStatus::Unpaid),
        "ACCEPTED" => Some(InvoiceStatus::Held),
        "SETTLED" => Some(InvoiceStatus::Paid),
        _ => None,
    }
}

/// Client for the LND REST gateway
#[derive(Clone)]
pub struct LndClient {
    /// Base URL of the gateway
    url: String,
    /// HTTP client
    client: Client,
    /// Hex macaroon sent with every request
    macaroon: Option<String>,
}

impl std::fmt::Debug for LndClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LndClient")
            .field("url", &self.url)
            .field("macaroon", &self.macaroon.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl LndClient {
    /// Create a new LND client
    pub fn new(config: NodeConfig) -> Result<Self> {
        config.validate()?;

        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        if config.accept_invalid_certs {
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder
            .build()
            .map_err(|e| PaywallError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url: config.url,
            client,
            macaroon: config.macaroon,
        })
    }

    /// Get the base URL of this node
    pub fn url(&self) -> &str {
        &self.url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.client.request(method, format!("{}{}", self.url, path));
        match &self.macaroon {
            Some(macaroon) => request.header(headers::LND_MACAROON, macaroon),
            None => request,
        }
    }

    /// Read an error response into its status and, if parseable, its body
    async fn read_error(response: Response) -> (StatusCode, Option<LndErrorBody>, String) {
        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response body".to_string());
        let body = serde_json::from_str::<LndErrorBody>(&text).ok();
        (status, body, text)
    }

    async fn create_standard(&self, request: &InvoiceRequest) -> Result<Invoice> {
        let body = AddInvoiceRequest {
            value: request.amount_sats.to_string(),
            memo: &request.memo,
            expiry: request.expiry_secs.to_string(),
        };

        let response = self
            .request(Method::POST, "/v1/invoices")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, _, text) = Self::read_error(response).await;
            tracing::error!("LND add invoice failed with status {}: {}", status, text);
            return Err(PaywallError::invoice_create(format!(
                "Node returned status {}",
                status
            )));
        }

        let added: AddInvoiceResponse = response.json().await?;
        let payment_hash = hex::encode(general_purpose::STANDARD.decode(&added.r_hash)?);

        Ok(Invoice {
            payment_hash,
            payment_request: added.payment_request,
        })
    }

    async fn create_hodl(&self, request: &InvoiceRequest) -> Result<Invoice> {
        let payment_hash = request
            .payment_hash
            .as_deref()
            .ok_or_else(|| PaywallError::invoice_create("Hodl invoices require a payment hash"))?
            .to_lowercase();
        let hash_bytes = hex::decode(&payment_hash)
            .map_err(|e| PaywallError::invoice_create(format!("Invalid payment hash: {}", e)))?;

        let body = AddHoldInvoiceRequest {
            hash: general_purpose::STANDARD.encode(hash_bytes),
            value: request.amount_sats.to_string(),
            memo: &request.memo,
            expiry: request.expiry_secs.to_string(),
        };

        let response = self
            .request(Method::POST, "/v2/invoices/hodl")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, _, text) = Self::read_error(response).await;
            tracing::error!("LND add hodl invoice failed with status {}: {}", status, text);
            return Err(PaywallError::invoice_create(format!(
                "Node returned status {}",
                status
            )));
        }

        let added: AddHoldInvoiceResponse = response.json().await?;
        Ok(Invoice {
            payment_hash,
            payment_request: added.payment_request,
        })
    }
}

#[async_trait]
impl InvoiceService for LndClient {
    async fn create(&self, request: &InvoiceRequest) -> Result<Invoice> {
        tracing::debug!(
            "Creating {} invoice for {} sats",
            if request.hodl { "hodl" } else { "standard" },
            request.amount_sats
        );

        if request.hodl {
            self.create_hodl(request).await
        } else {
            self.create_standard(request).await
        }
    }

    async fn lookup(&self, payment_hash: &str) -> Result<InvoiceSnapshot> {
        if !is_payment_hash(payment_hash) {
            return Err(PaywallError::invoice_lookup("Invalid payment hash"));
        }

        let response = self
            .request(Method::GET, &format!("/v1/invoice/{}", payment_hash))
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, body, text) = Self::read_error(response).await;
            let grpc_code = body.as_ref().and_then(|b| b.code);
            if status == StatusCode::NOT_FOUND || grpc_code == Some(GRPC_NOT_FOUND) {
                return Err(PaywallError::invoice_not_found(payment_hash));
            }
            tracing::error!("LND lookup failed with status {}: {}", status, text);
            return Err(PaywallError::invoice_lookup(format!(
                "Node returned status {}",
                status
            )));
        }

        let found: LookupInvoiceResponse = response.json().await?;
        Ok(InvoiceSnapshot {
            payment_request: found.payment_request.filter(|p| !p.is_empty()),
            status: found.state.as_deref().and_then(status_from_state),
        })
    }

    async fn settle(&self, preimage: &str) -> Result<()> {
        let preimage_bytes = hex::decode(preimage)?;
        let body = SettleInvoiceRequest {
            preimage: general_purpose::STANDARD.encode(preimage_bytes),
        };

        let response = self
            .request(Method::POST, "/v2/invoices/settle")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, body, text) = Self::read_error(response).await;
            tracing::error!("LND settle failed with status {}: {}", status, text);
            let body = body.unwrap_or_default();
            let details = body.details_string();
            return Err(PaywallError::settlement(Some(status), body.message, details));
        }

        Ok(())
    }

    async fn node_info(&self) -> Result<NodeInfo> {
        let response = self.request(Method::GET, "/v1/getinfo").send().await?;

        if !response.status().is_success() {
            return Err(PaywallError::invoice_lookup(format!(
                "Failed to get node info with status: {}",
                response.status()
            )));
        }

        let info: GetInfoResponse = response.json().await?;
        Ok(NodeInfo {
            pubkey: info.identity_pubkey,
            alias: info.alias,
            uris: info.uris,
        })
    }
}
