//! Signed identity tokens.
//!
//! Tokens are HS256 JWTs with the claims `{ id, type, iat, exp, ...extensions }`.
//! Two decode paths exist and callers depend on their different failure
//! semantics:
//!
//! - [`TokenCodec::parse`] is the optimistic path used while building the
//!   per-request [`AuthContext`](super::AuthContext). It verifies algorithm and
//!   signature but does not look at `exp`, so an expired token still yields an
//!   identity there.
//! - [`TokenCodec::validate_strict`] additionally requires `exp` and compares it
//!   against the clock itself, independent of the library's own expiry check.
//!
//! Extension claims are merged last when issuing, so an extension named `id`,
//! `type`, `iat` or `exp` replaces the reserved value. That precedence is kept
//! on purpose and logged at `warn`.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};
use thiserror::Error;

/// Lifetime of an issued token.
pub const TOKEN_VALIDITY_HOURS: i64 = 24;

/// The only algorithm tokens are signed or accepted with.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Claim names with a fixed meaning; everything else is an extension.
pub const RESERVED_CLAIMS: [&str; 4] = ["id", "type", "iat", "exp"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(String),

    #[error("malformed token")]
    Malformed,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("unexpected signing algorithm")]
    UnexpectedAlgorithm,

    #[error("token has expired")]
    Expired,

    #[error("{0} not found in the token claims")]
    MissingClaim(&'static str),

    #[error("{0} in the token claims has an unexpected type")]
    InvalidClaim(&'static str),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => TokenError::UnexpectedAlgorithm,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            // `exp` is the only claim strict validation marks as required
            ErrorKind::MissingRequiredClaim(_) => TokenError::MissingClaim("exp"),
            _ => TokenError::Malformed,
        }
    }
}

/// Decoded claims with the reserved fields split from the extensions.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenClaims {
    pub subject_id: String,
    pub subject_role: String,
    pub issued_at: Option<i64>,
    pub expires_at: Option<i64>,
    pub extensions: Map<String, Value>,
}

impl TokenClaims {
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        self.expires_at.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VerifyMode {
    Lax,
    Strict,
}

/// Issues and verifies tokens under one shared symmetric key.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &SIGNING_ALGORITHM)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Issue a token for `subject_id` acting as `role`, valid for 24 hours.
    pub fn issue(
        &self,
        role: &str,
        subject_id: &str,
        extensions: Option<&Map<String, Value>>,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let mut claims = Map::new();
        claims.insert("type".to_string(), Value::from(role));
        claims.insert("id".to_string(), Value::from(subject_id));
        claims.insert("iat".to_string(), Value::from(now.timestamp()));
        claims.insert(
            "exp".to_string(),
            Value::from((now + Duration::hours(TOKEN_VALIDITY_HOURS)).timestamp()),
        );

        for (key, value) in extensions.into_iter().flatten() {
            if RESERVED_CLAIMS.contains(&key.as_str()) {
                tracing::warn!(claim = %key, "extension claim replaces a reserved claim");
            }
            claims.insert(key.clone(), value.clone());
        }

        self.sign(&claims)
    }

    /// Optimistic decode: algorithm and signature only, expiry is not checked.
    pub fn parse(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let raw = self.verify(token, VerifyMode::Lax)?;
        split_claims(raw)
    }

    /// Hard validation: algorithm, signature and an explicit `exp` comparison.
    pub fn validate_strict(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let raw = self.verify(token, VerifyMode::Strict)?;
        let claims = split_claims(raw)?;

        let expires_at = claims.expires_at.ok_or(TokenError::MissingClaim("exp"))?;
        if expires_at <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    pub(crate) fn sign(&self, claims: &Map<String, Value>) -> Result<String, TokenError> {
        encode(&Header::new(SIGNING_ALGORITHM), claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str, mode: VerifyMode) -> Result<Map<String, Value>, TokenError> {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        // `aud` is an opaque extension here
        validation.validate_aud = false;
        match mode {
            VerifyMode::Lax => {
                validation.validate_exp = false;
                validation.required_spec_claims.clear();
            }
            VerifyMode::Strict => {
                validation.leeway = 0;
            }
        }

        let data = decode::<Map<String, Value>>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

fn split_claims(mut raw: Map<String, Value>) -> Result<TokenClaims, TokenError> {
    let subject_id = take_string(&mut raw, "id")?;
    let subject_role = take_string(&mut raw, "type")?;
    let issued_at = take_timestamp(&mut raw, "iat")?;
    let expires_at = take_timestamp(&mut raw, "exp")?;

    Ok(TokenClaims {
        subject_id,
        subject_role,
        issued_at,
        expires_at,
        extensions: raw,
    })
}

fn take_string(raw: &mut Map<String, Value>, key: &'static str) -> Result<String, TokenError> {
    match raw.remove(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(TokenError::InvalidClaim(key)),
        None => Err(TokenError::MissingClaim(key)),
    }
}

/// NumericDate may carry a fractional part; it is truncated to whole seconds.
fn take_timestamp(raw: &mut Map<String, Value>, key: &'static str) -> Result<Option<i64>, TokenError> {
    let Some(value) = raw.remove(key) else {
        return Ok(None);
    };
    if let Some(seconds) = value.as_i64() {
        return Ok(Some(seconds));
    }
    match value.as_f64() {
        Some(seconds) if seconds.is_finite() && seconds.abs() < i64::MAX as f64 => Ok(Some(seconds.trunc() as i64)),
        _ => Err(TokenError::InvalidClaim(key)),
    }
}
