//! HS256 token issuance and verification.
//!
//! The current instant is always passed in, so expiry is decided here rather
//! than inside `jsonwebtoken`. A token is expired once `now >= exp`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use thiserror::Error;
use tracing::{debug, warn};

use super::claims::Claims;
use crate::config::{AuthConfig, MAX_LEEWAY_SECONDS};
use crate::models::Account;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("failed to sign token")]
    Encoding,
}

/// Secret material for signing. `active` signs new tokens; `previous` keys
/// are only tried when verifying, so a secret can be rotated without
/// invalidating tokens already in flight.
#[derive(Clone)]
pub struct SigningKeys {
    pub active: Vec<u8>,
    pub previous: Vec<Vec<u8>>,
}

impl SigningKeys {
    #[must_use]
    pub fn new(active: impl Into<Vec<u8>>) -> Self {
        Self {
            active: active.into(),
            previous: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_previous(mut self, previous: impl Into<Vec<u8>>) -> Self {
        self.previous.push(previous.into());
        self
    }

    /// Builds keys from config, generating an ephemeral active secret when
    /// none is configured.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        let active = if let Some(secret) = &config.jwt_secret {
            secret.as_bytes().to_vec()
        } else {
            use rand::Rng;

            warn!("No JWT secret configured; generated a random one. Tokens will not survive a restart");
            let bytes: [u8; 32] = rand::rng().random();
            bytes.to_vec()
        };

        Self {
            active,
            previous: config
                .previous_jwt_secrets
                .iter()
                .map(|s| s.as_bytes().to_vec())
                .collect(),
        }
    }
}

impl std::fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeys")
            .field("active", &"<redacted>")
            .field("previous", &self.previous.len())
            .finish()
    }
}

const MAX_TTL_HOURS: i64 = 24 * 365 * 10;

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_keys: Vec<DecodingKey>,
    validation: Validation,
    ttl: Duration,
    leeway_seconds: i64,
}

impl TokenService {
    #[must_use]
    pub fn new(keys: &SigningKeys, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        let decoding_keys = std::iter::once(&keys.active)
            .chain(keys.previous.iter())
            .map(|k| DecodingKey::from_secret(k))
            .collect();

        Self {
            encoding_key: EncodingKey::from_secret(&keys.active),
            decoding_keys,
            validation,
            ttl,
            leeway_seconds: 0,
        }
    }

    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        let hours = i64::try_from(config.token_ttl_hours)
            .unwrap_or(MAX_TTL_HOURS)
            .min(MAX_TTL_HOURS);
        let ttl = Duration::hours(hours);
        let leeway = config.leeway_seconds.min(MAX_LEEWAY_SECONDS);
        if leeway != config.leeway_seconds {
            warn!(
                configured = config.leeway_seconds,
                applied = leeway,
                "Token leeway clamped"
            );
        }
        Self::new(&SigningKeys::from_config(config), ttl)
            .with_leeway(i64::try_from(leeway).unwrap_or(i64::MAX))
    }

    #[must_use]
    pub const fn with_leeway(mut self, seconds: i64) -> Self {
        self.leeway_seconds = seconds;
        self
    }

    /// Signs a token for `account` valid from `now` until `now + ttl`.
    pub fn issue(&self, account: &Account, now: DateTime<Utc>) -> Result<String, TokenError> {
        let issued_at = now.timestamp();
        let claims = Claims::for_account(account, issued_at, (now + self.ttl).timestamp());

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            warn!(error = %e, "Failed to encode token");
            TokenError::Encoding
        })
    }

    /// Checks structure, signature against every known key, then expiry.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut outcome = Err(TokenError::InvalidSignature);

        for key in &self.decoding_keys {
            match decode::<Claims>(token, key, &self.validation) {
                Ok(data) => {
                    outcome = Ok(data.claims);
                    break;
                }
                Err(e) if matches!(e.kind(), ErrorKind::InvalidSignature) => {}
                Err(e) => {
                    debug!(error = %e, "Rejected malformed token");
                    return Err(TokenError::Malformed);
                }
            }
        }

        let claims = outcome?;
        if now.timestamp() >= claims.exp.saturating_add(self.leeway_seconds) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
