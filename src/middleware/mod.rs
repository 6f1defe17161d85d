//! Axum middleware for the paywall
//!
//! This module wires [`PaywallGate`](crate::gate::PaywallGate) into axum
//! applications and renders its verdicts as HTTP responses.
//!
//! # Architecture
//!
//! - [`paywall`] - Middleware function and verdict → response mapping
//! - [`service`] - Router helpers stacking tower layers
//! - [`routes`] - Public `/invoice`, `/node` and `/health` routes
//!
//! # Examples
//!
//! ```no_run
//! use axum::{routing::get, Router};
//! use lsat_paywall::gate::{PaywallConfig, PaywallGate};
//! use lsat_paywall::middleware::create_paywall_app;
//! use lsat_paywall::node::InMemoryNode;
//! use lsat_paywall::token::JwtTokenCodec;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gate = PaywallGate::new(
//!     PaywallConfig::new(10).with_description("Premium API"),
//!     Arc::new(InMemoryNode::new()),
//!     Arc::new(JwtTokenCodec::new("secret")),
//! );
//!
//! let app = create_paywall_app(gate, |router: Router| {
//!     router.route("/protected", get(|| async { "Protected content" }))
//! });
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Response Handling
//!
//! - Continue → the inner handler runs
//! - ChallengeRequired → 402 with `WWW-Authenticate: LSAT macaroon="...", invoice="..."`
//! - Unauthorized / NotFound / ServerError → 401 / 404 / 5xx with
//!   `{"error": {"message": ..., "details": ...}}`

pub mod paywall;
pub mod routes;
pub mod service;


// Re-export commonly used types
pub use paywall::{gate_request, paywall_middleware, verdict_response, ErrorBody};
pub use routes::paywall_routes;
pub use service::{create_paywall_app, protect};
