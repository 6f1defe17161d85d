//! LSAT Paywall Server
//!
//! A standalone server putting a demo route behind a Lightning paywall.
//!
//! ## Node Backends
//!
//! - **LND**: Default; talks to an LND REST gateway
//! - **Memory**: Simulated node for local development (invoices never get paid)

use axum::{response::Json, routing::get, Router};
use std::sync::Arc;

use lsat_paywall::{
    config::{AppConfig, NodeBackend},
    gate::PaywallGate,
    middleware::create_paywall_app,
    node::{InMemoryNode, InvoiceService, LndClient},
    token::JwtTokenCodec,
};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env()?;

    let invoices: Arc<dyn InvoiceService> = match config.backend {
        NodeBackend::Lnd => {
            tracing::info!("Using LND node at {}", config.node.url);
            Arc::new(LndClient::new(config.node.clone())?)
        }
        NodeBackend::Memory => {
            tracing::warn!("Using in-memory node; invoices are simulated");
            Arc::new(InMemoryNode::new())
        }
    };

    let codec = match &config.secret {
        Some(secret) => JwtTokenCodec::new(secret),
        None => {
            tracing::warn!("PAYWALL_SECRET not set; tokens will not survive a restart");
            JwtTokenCodec::random()
        }
    };

    let gate = PaywallGate::new(config.paywall.clone(), invoices, Arc::new(codec));
    let app = create_paywall_app(gate, |router: Router| {
        router.route("/protected", get(protected_handler))
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    tracing::info!(
        "Paywall server running on http://{} (hodl: {}, oauth: {})",
        config.bind_address,
        config.paywall.hodl,
        config.paywall.oauth
    );
    tracing::info!("Endpoints: GET /protected, GET|POST /invoice, GET /node, GET /health");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Content behind the paywall
async fn protected_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Protected content",
        "paid": true
    }))
}
