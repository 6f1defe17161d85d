//! Environment configuration for the paywall server

use crate::gate::PaywallConfig;
use crate::types::{defaults, NodeConfig};
use crate::{PaywallError, Result};
use std::time::Duration;

/// Which invoice service backs the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeBackend {
    /// LND REST gateway
    Lnd,
    /// Process-local simulated node
    Memory,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind address (e.g., "0.0.0.0:5000")
    pub bind_address: String,
    /// Invoice service backend
    pub backend: NodeBackend,
    /// LND connection, used with [`NodeBackend::Lnd`]
    pub node: NodeConfig,
    /// Gate settings
    pub paywall: PaywallConfig,
    /// Token signing secret; a random one is generated when absent
    pub secret: Option<String>,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_address = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:5000".to_string());

        let backend = match lookup("NODE_BACKEND").as_deref() {
            None | Some("lnd") => NodeBackend::Lnd,
            Some("memory") => NodeBackend::Memory,
            Some(other) => {
                return Err(PaywallError::config(format!(
                    "NODE_BACKEND must be 'lnd' or 'memory', got '{}'",
                    other
                )))
            }
        };

        let mut node = NodeConfig::new(
            lookup("LND_REST_URL").unwrap_or_else(|| NodeConfig::default().url),
        )
        .with_timeout(Duration::from_secs(30))
        .with_accept_invalid_certs(parse_bool(&lookup, "LND_ACCEPT_INVALID_CERTS")?);
        if let Some(macaroon) = lookup("LND_MACAROON") {
            node = node.with_macaroon(macaroon);
        }
        if backend == NodeBackend::Lnd {
            node.validate()?;
        }

        let amount_sats = parse_u64(&lookup, "PAYWALL_AMOUNT_SATS")?.unwrap_or(defaults::AMOUNT_SATS);
        let token_ttl =
            parse_u64(&lookup, "PAYWALL_TOKEN_TTL_SECS")?.unwrap_or(defaults::TOKEN_TTL_SECS);

        let mut paywall = PaywallConfig::new(amount_sats)
            .with_token_ttl(Duration::from_secs(token_ttl))
            .with_hodl(parse_bool(&lookup, "PAYWALL_HODL")?)
            .with_oauth(parse_bool(&lookup, "PAYWALL_OAUTH")?);
        if let Some(description) = lookup("PAYWALL_DESCRIPTION") {
            paywall = paywall.with_description(description);
        }

        Ok(Self {
            bind_address,
            backend,
            node,
            paywall,
            secret: lookup("PAYWALL_SECRET").filter(|s| !s.is_empty()),
        })
    }
}

fn parse_bool<F>(lookup: &F, key: &str) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("") | Some("0") | Some("false") | Some("no") => Ok(false),
        Some("1") | Some("true") | Some("yes") => Ok(true),
        Some(other) => Err(PaywallError::config(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}

fn parse_u64<F>(lookup: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| {
            value.parse().map_err(|_| {
                PaywallError::config(format!("{} must be an integer, got '{}'", key, value))
            })
        })
        .transpose()
}
