//! Router helpers applying the paywall with tower layers

use super::paywall::paywall_middleware;
use crate::gate::PaywallGate;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Put every route of `router` behind the paywall, with request tracing
pub fn protect(router: Router, gate: PaywallGate) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(axum::middleware::from_fn_with_state(gate, paywall_middleware)),
    )
}

/// Build an app from protected and public routes sharing one gate
pub fn create_paywall_app<F>(gate: PaywallGate, protected: F) -> Router
where
    F: FnOnce(Router) -> Router,
{
    let protected = protect(protected(Router::new()), gate.clone());
    super::routes::paywall_routes(gate).merge(protected)
}
