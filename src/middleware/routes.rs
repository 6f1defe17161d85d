//! Public routes exposing invoice and node information

use super::paywall::gate_request;
use crate::gate::PaywallGate;
use crate::types::{is_payment_hash, params, InvoiceStatus, NodeInfo};
use crate::{PaywallError, Result};
use axum::{
    extract::{Query, Request, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use std::collections::HashMap;

/// Response of `GET /invoice`
#[derive(Debug, Serialize)]
pub struct InvoiceStatusResponse {
    pub id: String,
    pub status: InvoiceStatus,
    pub payment_request: String,
}

/// Response of `POST /invoice`
#[derive(Debug, Serialize)]
pub struct InvoiceCreatedResponse {
    pub payment_hash: String,
    pub payment_request: String,
}

/// Routes that stay reachable without a token
pub fn paywall_routes(gate: PaywallGate) -> Router {
    Router::new()
        .route("/invoice", get(get_invoice).post(create_invoice))
        .route("/node", get(node_info))
        .route("/health", get(health))
        .with_state(gate)
}

async fn get_invoice(
    State(gate): State<PaywallGate>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<InvoiceStatusResponse>> {
    let id = query
        .get(params::INVOICE_ID)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| PaywallError::config("Missing invoice id in query string"))?;
    if !is_payment_hash(id) {
        return Err(PaywallError::config("Invoice id must be a hex payment hash"));
    }

    let snapshot = gate.invoices().lookup(id).await?;
    let (payment_request, status) = snapshot
        .complete()
        .ok_or_else(|| PaywallError::invoice_lookup("Malformed invoice response from node"))?;

    Ok(Json(InvoiceStatusResponse {
        id: id.clone(),
        status,
        payment_request: payment_request.to_string(),
    }))
}

async fn create_invoice(
    State(gate): State<PaywallGate>,
    request: Request,
) -> Result<Json<InvoiceCreatedResponse>> {
    let invoice_request = gate.config().invoice_request(&gate_request(&request))?;
    let invoice = gate.invoices().create(&invoice_request).await?;
    tracing::debug!("Created invoice {}", invoice.payment_hash);

    Ok(Json(InvoiceCreatedResponse {
        payment_hash: invoice.payment_hash,
        payment_request: invoice.payment_request,
    }))
}

async fn node_info(State(gate): State<PaywallGate>) -> Result<Json<NodeInfo>> {
    Ok(Json(gate.invoices().node_info().await?))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
