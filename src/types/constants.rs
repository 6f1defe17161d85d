//! Common constants for auth schemes, headers and defaults

/// Authorization schemes understood by the token codec
pub mod schemes {
    /// Scheme used when rendering challenges and tokens
    pub const LSAT: &str = "LSAT";
    /// Newer name for the same scheme, accepted when parsing
    pub const L402: &str = "L402";

    /// Check if a scheme name is accepted (case-insensitive)
    pub fn is_supported(scheme: &str) -> bool {
        scheme.eq_ignore_ascii_case(LSAT) || scheme.eq_ignore_ascii_case(L402)
    }
}

/// Header names
pub mod headers {
    /// Request header carrying the token
    pub const AUTHORIZATION: &str = "Authorization";
    /// Response header carrying the challenge
    pub const WWW_AUTHENTICATE: &str = "WWW-Authenticate";
    /// LND REST macaroon header
    pub const LND_MACAROON: &str = "Grpc-Metadata-macaroon";
}

/// Query parameters read by the gate
pub mod params {
    /// OAuth callback URI required when the gate runs in oauth mode
    pub const AUTH_URI: &str = "auth_uri";
    /// Client-supplied payment hash for hodl invoices
    pub const PAYMENT_HASH: &str = "payment_hash";
    /// Payment hash lookup key on the `/invoice` route
    pub const INVOICE_ID: &str = "id";
}

/// Default values
pub mod defaults {
    /// Default invoice amount in satoshis
    pub const AMOUNT_SATS: u64 = 1;
    /// Default token lifetime in seconds (one day)
    pub const TOKEN_TTL_SECS: u64 = 86_400;
    /// Default invoice expiry in seconds
    pub const INVOICE_EXPIRY_SECS: u64 = 3_600;
    /// Default invoice memo
    pub const DESCRIPTION: &str = "Payment required to access protected content";
}
