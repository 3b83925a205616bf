//! JWT issuance and verification for access and refresh tokens.
//!
//! DESIGN
//! ======
//! Both token kinds are HS256 JWTs with the same claim shape. They are signed
//! with different secrets and carry a `typ` claim, so a refresh token never
//! verifies as an access token (and vice versa) even if the secrets leak
//! independently. Refresh tokens are stateless: logout clears the cookie but
//! does not revoke outstanding tokens.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::ErrorCode;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims embedded in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: Uuid,
    pub typ: TokenKind,
    /// Expiration (UTC Unix seconds).
    pub exp: i64,
    /// Issued-at (UTC Unix seconds).
    pub iat: i64,
    /// Unique token id.
    pub jti: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("wrong token type")]
    WrongKind,
    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
}

impl ErrorCode for TokenError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Expired => "TOKEN_EXPIRED",
            Self::WrongKind | Self::Invalid(_) => "TOKEN_INVALID",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Invalid(err),
        }
    }
}

// =============================================================================
// ISSUE / VERIFY
// =============================================================================

fn secret(kind: TokenKind, config: &JwtConfig) -> &[u8] {
    match kind {
        TokenKind::Access => config.access_secret.as_bytes(),
        TokenKind::Refresh => config.refresh_secret.as_bytes(),
    }
}

/// Lifetime of a token kind in seconds.
#[must_use]
pub fn lifetime_secs(kind: TokenKind, config: &JwtConfig) -> i64 {
    match kind {
        TokenKind::Access => config.access_expires_mins * 60,
        TokenKind::Refresh => config.refresh_expires_days * 24 * 60 * 60,
    }
}

/// Sign a token of `kind` for `user_id`.
///
/// # Errors
///
/// Returns [`TokenError::Invalid`] if encoding fails.
pub fn issue(user_id: Uuid, kind: TokenKind, config: &JwtConfig) -> Result<String, TokenError> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        typ: kind,
        exp: now + lifetime_secs(kind, config),
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };
    Ok(encode(&Header::default(), &claims, &EncodingKey::from_secret(secret(kind, config)))?)
}

/// Verify a token of the expected `kind` and return its subject.
///
/// # Errors
///
/// Returns [`TokenError::Expired`] past `exp`, [`TokenError::WrongKind`] on a
/// `typ` mismatch, and [`TokenError::Invalid`] for anything else.
pub fn verify(token: &str, kind: TokenKind, config: &JwtConfig) -> Result<Uuid, TokenError> {
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret(kind, config)), &Validation::default())?;
    if data.claims.typ != kind {
        return Err(TokenError::WrongKind);
    }
    Ok(data.claims.sub)
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
