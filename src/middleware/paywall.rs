//! Paywall middleware implementation

use crate::gate::{GateRequest, PaywallGate, Verdict};
use crate::types::headers;
use crate::PaywallError;
use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Message and optional details of an error body
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    /// Create an error body
    pub fn new(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                details,
            },
        }
    }
}

/// Extract what the gate needs from an HTTP request
pub fn gate_request<B>(request: &http::Request<B>) -> GateRequest {
    let authorization = request
        .headers()
        .get(headers::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    GateRequest::from_parts(request.uri().path(), request.uri().query(), authorization)
}

/// Render a refusing verdict as an HTTP response
pub fn verdict_response(verdict: Verdict) -> Response {
    let status = verdict
        .status_code()
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = verdict.message().unwrap_or_default().to_string();

    match verdict {
        Verdict::ChallengeRequired { challenge } => {
            let mut response = (status, Json(ErrorBody::new(message, None))).into_response();
            match HeaderValue::from_str(&challenge) {
                Ok(value) => {
                    response
                        .headers_mut()
                        .insert(http::header::WWW_AUTHENTICATE, value);
                }
                Err(e) => {
                    tracing::error!("Challenge is not a valid header value: {}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(ErrorBody::new(
                            crate::gate::messages::INVOICE_GENERATION_FAILED,
                            None,
                        )),
                    )
                        .into_response();
                }
            }
            response
        }
        Verdict::ServerError { details, .. } => {
            (status, Json(ErrorBody::new(message, details))).into_response()
        }
        _ => (status, Json(ErrorBody::new(message, None))).into_response(),
    }
}

/// Axum middleware function guarding routes behind the paywall
pub async fn paywall_middleware(
    State(gate): State<PaywallGate>,
    request: Request,
    next: Next,
) -> Response {
    let verdict = gate.evaluate(&gate_request(&request)).await;

    match verdict {
        Verdict::Continue => next.run(request).await,
        refused => verdict_response(refused),
    }
}

impl IntoResponse for PaywallError {
    fn into_response(self) -> Response {
        let status = match &self {
            PaywallError::TokenParse { .. } => StatusCode::UNAUTHORIZED,
            PaywallError::InvoiceNotFound { .. } => StatusCode::NOT_FOUND,
            PaywallError::Config { .. } | PaywallError::Hex(_) | PaywallError::Base64(_) => {
                StatusCode::BAD_REQUEST
            }
            PaywallError::Settlement {
                status: Some(status),
                ..
            } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        (status, Json(ErrorBody::new(self.to_string(), None))).into_response()
    }
}
