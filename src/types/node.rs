//! Lightning node connection configuration

use std::time::Duration;

/// Configuration for the LND REST client
#[derive(Clone)]
pub struct NodeConfig {
    /// Base URL of the LND REST gateway
    pub url: String,
    /// Admin or invoice macaroon, hex encoded
    pub macaroon: Option<String>,
    /// Request timeout
    pub timeout: Option<Duration>,
    /// Accept self-signed TLS certificates (LND's default setup)
    pub accept_invalid_certs: bool,
}

impl std::fmt::Debug for NodeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeConfig")
            .field("url", &self.url)
            .field("macaroon", &self.macaroon.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

impl NodeConfig {
    /// Create a new node config
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            macaroon: None,
            timeout: None,
            accept_invalid_certs: false,
        }
    }

    /// Validate the node configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.url.is_empty() {
            return Err(crate::PaywallError::config("Node URL cannot be empty"));
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(crate::PaywallError::config(
                "Node URL must start with http:// or https://",
            ));
        }

        if let Some(macaroon) = &self.macaroon {
            hex::decode(macaroon)
                .map_err(|e| crate::PaywallError::config(format!("Macaroon is not hex: {}", e)))?;
        }

        Ok(())
    }

    /// Set the macaroon
    pub fn with_macaroon(mut self, macaroon: impl Into<String>) -> Self {
        self.macaroon = Some(macaroon.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Accept self-signed certificates
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::new("https://localhost:8080")
    }
}
