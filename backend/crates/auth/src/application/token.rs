//! Bearer Token Codec
//!
//! Compact HS256 tokens: `base64url(header).base64url(claims).base64url(sig)`
//! where `sig = HMAC-SHA256(secret, header "." claims)`. Base64url is
//! unpadded. Tokens are stateless; nothing is stored server-side.
//!
//! Parse order: shape, header, algorithm, signature, time fields. The
//! signature is checked before any claim is trusted.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use kernel::clock::Clock;
use platform::crypto::{from_base64url, hmac_sha256, to_base64url, verify_hmac_sha256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::config::AuthConfig;
use crate::domain::value_object::user_id::UserId;

const ALGORITHM: &str = "HS256";

/// Why a token was rejected
///
/// All variants render the same message at the HTTP boundary; only
/// internal callers see the distinction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature does not match")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is not valid yet")]
    NotYetValid,

    #[error("unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

impl TokenError {
    pub fn is_expired(&self) -> bool {
        matches!(self, TokenError::Expired)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// Verified token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject user id
    pub sub: UserId,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expires at (Unix seconds, exclusive)
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
}

impl TokenClaims {
    pub fn user_id(&self) -> UserId {
        self.sub
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

/// Sign `claims` with `secret`
pub fn encode(claims: &TokenClaims, secret: &[u8]) -> Result<String, serde_json::Error> {
    let header = TokenHeader {
        alg: ALGORITHM.to_string(),
        typ: Some("JWT".to_string()),
    };

    let header_b64 = to_base64url(&serde_json::to_vec(&header)?);
    let claims_b64 = to_base64url(&serde_json::to_vec(claims)?);
    let signing_input = format!("{header_b64}.{claims_b64}");
    let signature = hmac_sha256(secret, signing_input.as_bytes());

    Ok(format!("{signing_input}.{}", to_base64url(&signature)))
}

/// Verify `token` against `secret` and the time window at `now`
///
/// `leeway` only widens the not-before side; `exp` is exclusive and exact.
pub fn decode(
    token: &str,
    secret: &[u8],
    now: DateTime<Utc>,
    leeway: Duration,
) -> Result<TokenClaims, TokenError> {
    let mut parts = token.split('.');
    let (Some(header_b64), Some(claims_b64), Some(sig_b64), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed);
    };

    let header_raw = from_base64url(header_b64).map_err(|_| TokenError::Malformed)?;
    let header: TokenHeader =
        serde_json::from_slice(&header_raw).map_err(|_| TokenError::Malformed)?;
    if header.alg != ALGORITHM {
        return Err(TokenError::UnsupportedAlgorithm(header.alg));
    }

    let signature = from_base64url(sig_b64).map_err(|_| TokenError::Malformed)?;
    let signing_input = &token[..header_b64.len() + 1 + claims_b64.len()];
    if !verify_hmac_sha256(secret, signing_input.as_bytes(), &signature) {
        return Err(TokenError::BadSignature);
    }

    let claims_raw = from_base64url(claims_b64).map_err(|_| TokenError::Malformed)?;
    let value: serde_json::Value =
        serde_json::from_slice(&claims_raw).map_err(|_| TokenError::Malformed)?;

    // Time fields must be present and integral
    let iat = value.get("iat").and_then(serde_json::Value::as_i64);
    let exp = value.get("exp").and_then(serde_json::Value::as_i64);
    if iat.is_none() || exp.is_none() {
        return Err(TokenError::Malformed);
    }

    let claims: TokenClaims = serde_json::from_value(value).map_err(|_| TokenError::Malformed)?;

    let now = now.timestamp();
    if now < claims.iat - leeway.num_seconds() {
        return Err(TokenError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}

/// A freshly minted token and its expiry
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub claims: TokenClaims,
}

/// Secret, lifetime and clock bundled for minting and parsing
///
/// Shared by the service (mint) and the request filter (parse).
#[derive(Clone)]
pub struct TokenCodec {
    secret: Arc<[u8]>,
    ttl: Duration,
    leeway: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: Arc::from(config.token_secret()),
            ttl: config.token_ttl(),
            leeway: config.token_leeway(),
            clock,
        }
    }

    /// Mint a token for a user, valid from now for the configured TTL
    pub fn mint(
        &self,
        user_id: UserId,
        username: &str,
        is_superuser: bool,
    ) -> Result<IssuedToken, serde_json::Error> {
        let iat = self.clock.now().timestamp();
        let exp = iat + self.ttl.num_seconds();
        let claims = TokenClaims {
            sub: user_id,
            iat,
            exp,
            username: Some(username.to_string()),
            is_superuser,
        };

        let token = encode(&claims, &self.secret)?;
        let expires_at = claims.expires_at().unwrap_or(DateTime::<Utc>::MAX_UTC);

        Ok(IssuedToken {
            token,
            expires_at,
            claims,
        })
    }

    /// Verify a token at the current clock time
    pub fn parse(&self, token: &str) -> Result<TokenClaims, TokenError> {
        decode(token, &self.secret, self.clock.now(), self.leeway)
    }
}
