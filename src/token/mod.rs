//! LSAT tokens
//!
//! An LSAT pairs a signed macaroon naming a payment hash with, once the
//! invoice is paid, the preimage of that hash. Clients present it as
//! `Authorization: LSAT <macaroon>:<preimage>`; servers issue it inside a
//! `WWW-Authenticate: LSAT macaroon="...", invoice="..."` challenge.
//!
//! # Architecture
//!
//! - [`Lsat`] - Parsed token, read-only view used by the gate
//! - [`TokenCodec`] - Parsing and issuance seam
//! - [`jwt`] - HS256-signed codec used by default
//!
//! # Examples
//!
//! ```
//! use lsat_paywall::token::{generate_preimage, payment_hash_of, JwtTokenCodec, TokenCodec, TokenGrant};
//!
//! # fn example() -> lsat_paywall::Result<()> {
//! let codec = JwtTokenCodec::new("super secret");
//! let preimage = generate_preimage();
//! let payment_hash = payment_hash_of(&preimage)?;
//!
//! let mut token = codec.issue(TokenGrant::new(payment_hash, chrono::Duration::hours(1)))?;
//! token.add_invoice("lnbc10n1...");
//! assert!(token.to_challenge().starts_with("LSAT macaroon="));
//!
//! let header = format!("LSAT {}:{}", token.macaroon(), preimage);
//! let parsed = codec.parse(&header)?;
//! assert!(parsed.is_satisfied());
//! # Ok(())
//! # }
//! ```

use crate::types::schemes;
use crate::{PaywallError, Result};
use chrono::{DateTime, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

pub mod jwt;


pub use jwt::JwtTokenCodec;

/// Length of a preimage and of a payment hash in bytes
pub const PREIMAGE_LEN: usize = 32;

/// A parsed LSAT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lsat {
    /// Token identifier, unique per issued challenge
    pub id: String,
    /// Payment hash of the invoice this token is bound to, hex
    pub payment_hash: String,
    /// Preimage presented by the client, hex
    pub payment_preimage: Option<String>,
    /// Absolute expiry
    pub expiry: DateTime<Utc>,
    /// OAuth callback URI caveat
    pub auth_uri: Option<String>,
    macaroon: String,
    invoice: Option<String>,
}

impl Lsat {
    /// Create a token from its signed macaroon and decoded identity
    pub fn new(
        id: impl Into<String>,
        payment_hash: impl Into<String>,
        expiry: DateTime<Utc>,
        macaroon: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            payment_hash: payment_hash.into(),
            payment_preimage: None,
            expiry,
            auth_uri: None,
            macaroon: macaroon.into(),
            invoice: None,
        }
    }

    /// Attach the preimage presented with the token
    pub fn with_preimage(mut self, preimage: impl Into<String>) -> Self {
        self.payment_preimage = Some(preimage.into());
        self
    }

    /// Attach the oauth callback caveat
    pub fn with_auth_uri(mut self, auth_uri: Option<String>) -> Self {
        self.auth_uri = auth_uri;
        self
    }

    /// Whether the token is past its expiry
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether the token is past its expiry at the given instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiry
    }

    /// Whether the token carries a preimage matching its payment hash
    pub fn is_satisfied(&self) -> bool {
        match &self.payment_preimage {
            Some(preimage) => payment_hash_of(preimage)
                .map(|hash| hash.eq_ignore_ascii_case(&self.payment_hash))
                .unwrap_or(false),
            None => false,
        }
    }

    /// Bind a payment request for rendering in a challenge
    pub fn add_invoice(&mut self, payment_request: impl Into<String>) {
        self.invoice = Some(payment_request.into());
    }

    /// Bound payment request, if any
    pub fn invoice(&self) -> Option<&str> {
        self.invoice.as_deref()
    }

    /// Serialized macaroon
    pub fn macaroon(&self) -> &str {
        &self.macaroon
    }

    /// Render the value of a `WWW-Authenticate` challenge header
    pub fn to_challenge(&self) -> String {
        match &self.invoice {
            Some(invoice) => format!(
                "{} macaroon=\"{}\", invoice=\"{}\"",
                schemes::LSAT,
                self.macaroon,
                invoice
            ),
            None => format!("{} macaroon=\"{}\"", schemes::LSAT, self.macaroon),
        }
    }

    /// Render the value of an `Authorization` header
    pub fn to_token(&self) -> String {
        format!(
            "{} {}:{}",
            schemes::LSAT,
            self.macaroon,
            self.payment_preimage.as_deref().unwrap_or("")
        )
    }
}

/// What a freshly issued token is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    /// Payment hash of the new invoice, hex
    pub payment_hash: String,
    /// Absolute expiry
    pub expiry: DateTime<Utc>,
    /// OAuth callback URI caveat
    pub auth_uri: Option<String>,
}

impl TokenGrant {
    /// Create a grant expiring `ttl` from now
    pub fn new(payment_hash: impl Into<String>, ttl: chrono::Duration) -> Self {
        Self {
            payment_hash: payment_hash.into(),
            expiry: Utc::now() + ttl,
            auth_uri: None,
        }
    }

    /// Set an absolute expiry
    pub fn with_expiry(mut self, expiry: DateTime<Utc>) -> Self {
        self.expiry = expiry;
        self
    }

    /// Set the oauth callback caveat
    pub fn with_auth_uri(mut self, auth_uri: impl Into<String>) -> Self {
        self.auth_uri = Some(auth_uri.into());
        self
    }
}

/// Parses presented tokens and issues new ones
pub trait TokenCodec: Send + Sync {
    /// Parse an `Authorization` header value
    fn parse(&self, header_value: &str) -> Result<Lsat>;

    /// Issue a token bound to a payment hash
    fn issue(&self, grant: TokenGrant) -> Result<Lsat>;
}

/// Split an `Authorization` value into macaroon and optional preimage
pub fn split_header(header_value: &str) -> Result<(&str, Option<&str>)> {
    let (scheme, credentials) = header_value
        .trim()
        .split_once(' ')
        .ok_or_else(|| PaywallError::token_parse("Missing authorization scheme"))?;

    if !schemes::is_supported(scheme) {
        return Err(PaywallError::token_parse(format!(
            "Unsupported authorization scheme: {}",
            scheme
        )));
    }

    let credentials = credentials.trim();
    let (macaroon, preimage) = match credentials.split_once(':') {
        Some((macaroon, preimage)) => (macaroon, Some(preimage.trim())),
        None => (credentials, None),
    };

    if macaroon.is_empty() {
        return Err(PaywallError::token_parse("Missing macaroon"));
    }

    Ok((macaroon, preimage.filter(|p| !p.is_empty())))
}

/// Generate a random preimage, hex
pub fn generate_preimage() -> String {
    let mut bytes = [0u8; PREIMAGE_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 payment hash of a hex preimage
pub fn payment_hash_of(preimage: &str) -> Result<String> {
    let bytes = hex::decode(preimage)?;
    if bytes.len() != PREIMAGE_LEN {
        return Err(PaywallError::token_parse(format!(
            "Preimage must be {} bytes, got {}",
            PREIMAGE_LEN,
            bytes.len()
        )));
    }
    Ok(hex::encode(Sha256::digest(&bytes)))
}
