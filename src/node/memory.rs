//! In-memory Lightning node
//!
//! Keeps invoices in a process-local map. Payer behaviour is simulated with
//! [`InMemoryNode::mark_held`] and [`InMemoryNode::mark_paid`]. Data is lost
//! when the process exits.

use super::InvoiceService;
use crate::token::{generate_preimage, payment_hash_of, PREIMAGE_LEN};
use crate::types::{Invoice, InvoiceRequest, InvoiceSnapshot, InvoiceStatus, NodeInfo};
use crate::{PaywallError, Result};
use async_trait::async_trait;
use http::StatusCode;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct InvoiceRecord {
    payment_request: String,
    status: InvoiceStatus,
    hodl: bool,
    /// Known only for standard invoices, where the node picks the preimage
    preimage: Option<String>,
}

/// In-memory invoice store
#[derive(Debug, Clone)]
pub struct InMemoryNode {
    invoices: Arc<RwLock<HashMap<String, InvoiceRecord>>>,
    pubkey: String,
}

impl InMemoryNode {
    /// Create a new in-memory node with a random identity
    pub fn new() -> Self {
        Self {
            invoices: Arc::new(RwLock::new(HashMap::new())),
            pubkey: format!("02{}", generate_preimage()),
        }
    }

    /// Simulate the payer locking funds to a hodl invoice
    pub async fn mark_held(&self, payment_hash: &str) -> Result<()> {
        let mut invoices = self.invoices.write().await;
        let record = invoices
            .get_mut(&payment_hash.to_lowercase())
            .ok_or_else(|| PaywallError::invoice_not_found(payment_hash))?;

        if !record.hodl {
            return Err(PaywallError::config("Only hodl invoices can be held"));
        }
        if record.status != InvoiceStatus::Unpaid {
            return Err(PaywallError::config(format!(
                "Invoice is already {}",
                record.status
            )));
        }

        record.status = InvoiceStatus::Held;
        Ok(())
    }

    /// Simulate the payer paying a standard invoice, returning its preimage
    pub async fn mark_paid(&self, payment_hash: &str) -> Result<String> {
        let mut invoices = self.invoices.write().await;
        let record = invoices
            .get_mut(&payment_hash.to_lowercase())
            .ok_or_else(|| PaywallError::invoice_not_found(payment_hash))?;

        let preimage = record
            .preimage
            .clone()
            .ok_or_else(|| PaywallError::config("Hodl invoices are paid by settling them"))?;

        record.status = InvoiceStatus::Paid;
        Ok(preimage)
    }

    /// Number of invoices created so far
    pub async fn len(&self) -> usize {
        self.invoices.read().await.len()
    }

    /// Whether no invoices have been created
    pub async fn is_empty(&self) -> bool {
        self.invoices.read().await.is_empty()
    }
}

impl Default for InMemoryNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InvoiceService for InMemoryNode {
    async fn create(&self, request: &InvoiceRequest) -> Result<Invoice> {
        let (payment_hash, preimage) = if request.hodl {
            let payment_hash = request
                .payment_hash
                .as_deref()
                .ok_or_else(|| {
                    PaywallError::invoice_create("Hodl invoices require a payment hash")
                })?
                .to_lowercase();
            match hex::decode(&payment_hash) {
                Ok(bytes) if bytes.len() == PREIMAGE_LEN => {}
                _ => return Err(PaywallError::invoice_create("Invalid payment hash")),
            }
            (payment_hash, None)
        } else {
            let preimage = generate_preimage();
            (payment_hash_of(&preimage)?, Some(preimage))
        };

        let amount_decisats = request
            .amount_sats
            .checked_mul(10)
            .ok_or_else(|| PaywallError::invoice_create("Invoice amount is too large"))?;
        let payment_request = format!("lnbcrt{}n1p{}", amount_decisats, &payment_hash[..16]);

        let mut invoices = self.invoices.write().await;
        if invoices.contains_key(&payment_hash) {
            return Err(PaywallError::invoice_create("Invoice with that hash already exists"));
        }
        invoices.insert(
            payment_hash.clone(),
            InvoiceRecord {
                payment_request: payment_request.clone(),
                status: InvoiceStatus::Unpaid,
                hodl: request.hodl,
                preimage,
            },
        );

        Ok(Invoice {
            payment_hash,
            payment_request,
        })
    }

    async fn lookup(&self, payment_hash: &str) -> Result<InvoiceSnapshot> {
        let invoices = self.invoices.read().await;
        invoices
            .get(&payment_hash.to_lowercase())
            .map(|record| InvoiceSnapshot::new(record.payment_request.clone(), record.status))
            .ok_or_else(|| PaywallError::invoice_not_found(payment_hash))
    }

    async fn settle(&self, preimage: &str) -> Result<()> {
        let payment_hash = payment_hash_of(preimage)?;

        let mut invoices = self.invoices.write().await;
        let record = invoices.get_mut(&payment_hash).ok_or_else(|| {
            PaywallError::settlement(
                Some(StatusCode::NOT_FOUND),
                Some("unable to locate invoice".to_string()),
                None,
            )
        })?;

        match record.status {
            InvoiceStatus::Held => {
                record.status = InvoiceStatus::Paid;
                record.preimage = Some(preimage.to_lowercase());
                Ok(())
            }
            InvoiceStatus::Paid => Err(PaywallError::settlement(
                Some(StatusCode::CONFLICT),
                Some("invoice is already settled".to_string()),
                None,
            )),
            InvoiceStatus::Unpaid => Err(PaywallError::settlement(
                Some(StatusCode::BAD_REQUEST),
                Some("invoice is still open".to_string()),
                Some(format!("payment_hash={}", payment_hash)),
            )),
        }
    }

    async fn node_info(&self) -> Result<NodeInfo> {
        Ok(NodeInfo {
            pubkey: self.pubkey.clone(),
            alias: "in-memory".to_string(),
            uris: Vec::new(),
        })
    }
}
