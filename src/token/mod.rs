//! Access token minting and verification.
//!
//! Tokens are HS256 JWTs signed with the configured token secret. A token
//! asserts one thing: that `sub` logged in within the last hour. Verification
//! is purely local, so the access gate never touches the database.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by an access token.
/// `sub` is the account id; `iat`/`exp` bound the validity window.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Mint a token for `subject`, valid for `ttl_minutes` from now.
pub fn mint(
    subject: &str,
    secret: &str,
    ttl_minutes: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expires = now + Duration::minutes(ttl_minutes as i64);

    let claims = Claims {
        sub: subject.to_string(),
        iat: now.timestamp(),
        exp: expires.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify signature and expiry, returning the claims on success.
///
/// Leeway is zero: the one-hour window is exact, and an expired or tampered
/// token fails identically from the caller's point of view.
pub fn verify(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}
