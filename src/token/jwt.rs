//! HS256-signed token codec

use super::{payment_hash_of, split_header, Lsat, TokenCodec, TokenGrant};
use crate::{PaywallError, Result};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Claims carried by the macaroon
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    jti: String,
    sub: String,
    exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_uri: Option<String>,
}

/// Token codec signing macaroons as HS256 JWTs
#[derive(Clone)]
pub struct JwtTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtTokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenCodec")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl JwtTokenCodec {
    /// Create a codec from a shared secret
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Create a codec with a random secret; tokens do not survive a restart
    pub fn random() -> Self {
        let mut secret = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        Self::new(secret)
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is reported through `Lsat::is_expired` so the gate can re-challenge
        validation.validate_exp = false;
        validation
    }
}

impl TokenCodec for JwtTokenCodec {
    fn parse(&self, header_value: &str) -> Result<Lsat> {
        let (macaroon, preimage) = split_header(header_value)?;

        let data = jsonwebtoken::decode::<Claims>(macaroon, &self.decoding_key, &Self::validation())
            .map_err(|e| PaywallError::token_parse(format!("Invalid macaroon: {}", e)))?;
        let claims = data.claims;

        let expiry = DateTime::<Utc>::from_timestamp(claims.exp, 0)
            .ok_or_else(|| PaywallError::token_parse("Expiry out of range"))?;

        let mut token =
            Lsat::new(claims.jti, claims.sub, expiry, macaroon).with_auth_uri(claims.auth_uri);

        if let Some(preimage) = preimage {
            let hash = payment_hash_of(preimage)
                .map_err(|e| PaywallError::token_parse(format!("Invalid preimage: {}", e)))?;
            if !hash.eq_ignore_ascii_case(&token.payment_hash) {
                return Err(PaywallError::token_parse(
                    "Preimage does not match payment hash",
                ));
            }
            token = token.with_preimage(preimage.to_lowercase());
        }

        Ok(token)
    }

    fn issue(&self, grant: TokenGrant) -> Result<Lsat> {
        if let Some(auth_uri) = &grant.auth_uri {
            url::Url::parse(auth_uri)
                .map_err(|e| PaywallError::config(format!("Invalid auth_uri: {}", e)))?;
        }

        let claims = Claims {
            jti: uuid::Uuid::new_v4().to_string(),
            sub: grant.payment_hash.to_lowercase(),
            exp: grant.expiry.timestamp(),
            auth_uri: grant.auth_uri,
        };

        let macaroon =
            jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        // Re-read the expiry at second precision so issued and parsed tokens agree
        let expiry = DateTime::<Utc>::from_timestamp(claims.exp, 0)
            .ok_or_else(|| PaywallError::config("Expiry out of range"))?;

        Ok(Lsat::new(claims.jti, claims.sub, expiry, macaroon).with_auth_uri(claims.auth_uri))
    }
}
