//! # LSAT Paywall
//!
//! A Lightning-backed HTTP 402 paywall. Requests to protected routes must carry
//! an LSAT: a signed token bound to a Lightning invoice, plus the invoice's
//! preimage once it has been paid.
//!
//! ## Features
//!
//! - **HTTP 402 challenges**: `WWW-Authenticate: LSAT macaroon="...", invoice="..."`
//! - **Hodl invoices**: Payments are held until the client reveals the preimage,
//!   then settled by the paywall; settled preimages cannot be replayed
//! - **OAuth mode**: Tokens whose caveats are verified upstream skip invoice lookups
//! - **LND integration**: REST client for invoice creation, lookup and settlement
//! - **Axum middleware**: Drop-in router layer with request tracing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use axum::{response::Json, routing::get, Router};
//! use lsat_paywall::{
//!     gate::{PaywallConfig, PaywallGate},
//!     middleware::create_paywall_app,
//!     node::LndClient,
//!     token::JwtTokenCodec,
//!     types::NodeConfig,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let node = LndClient::new(
//!         NodeConfig::new("https://localhost:8080").with_macaroon("0201036c6e64..."),
//!     )?;
//!
//!     let gate = PaywallGate::new(
//!         PaywallConfig::new(10).with_description("Premium API access"),
//!         Arc::new(node),
//!         Arc::new(JwtTokenCodec::new("change me")),
//!     );
//!
//!     let app = create_paywall_app(gate, |router: Router| {
//!         router.route("/joke", get(joke_handler))
//!     });
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//!     axum::serve(listener, app).await?;
//!
//!     Ok(())
//! }
//!
//! async fn joke_handler() -> Json<serde_json::Value> {
//!     Json(serde_json::json!({
//!         "joke": "Why did the node go to therapy? Too many unresolved HTLCs."
//!     }))
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`types`**: Invoice, node and constant definitions
//! - **`token`**: LSAT parsing, issuance and challenge rendering
//! - **`node`**: Invoice service trait, LND client and in-memory node
//! - **`gate`**: The access decision engine
//! - **`middleware`**: Axum integration (feature `axum`)
//! - **`config`**: Environment configuration for the server binary
//! - **`error`**: Error handling

pub mod config;
pub mod error;
pub mod gate;
pub mod node;
pub mod token;
pub mod types;

// Feature-gated framework support
#[cfg(feature = "axum")]
pub mod middleware;

// Re-exports for convenience
pub use error::{PaywallError, Result};
pub use gate::{GateMode, GateRequest, PaywallConfig, PaywallGate, Verdict};
pub use node::{InMemoryNode, InvoiceService, LndClient};
pub use token::{JwtTokenCodec, Lsat, TokenCodec};

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
