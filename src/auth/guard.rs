//! Ordered guard pipeline run in front of protected handlers.
//!
//! Guards run in order and the first failure wins, so authentication
//! failures always take precedence over role checks.

use axum::http::{HeaderMap, header::AUTHORIZATION};
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::claims::Claims;
use super::token::{TokenError, TokenService};
use crate::domain::{AccountId, Role};

/// Verified identity attached to a request once the gate passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub claims: Claims,
}

impl AuthContext {
    #[must_use]
    pub const fn user_id(&self) -> AccountId {
        self.claims.user_id
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.claims.status
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("missing authorization header")]
    MissingCredentials,

    #[error("authorization header must be 'Bearer <token>'")]
    MalformedHeader,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] TokenError),

    #[error("requires role '{required}'")]
    Forbidden { required: Role },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// A valid, unexpired bearer token must be presented.
    Authenticate,
    /// The authenticated role must equal the given role.
    RequireRole(Role),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardPipeline {
    guards: Vec<Guard>,
}

impl GuardPipeline {
    #[must_use]
    pub const fn new(guards: Vec<Guard>) -> Self {
        Self { guards }
    }

    #[must_use]
    pub fn authenticated() -> Self {
        Self::new(vec![Guard::Authenticate])
    }

    #[must_use]
    pub fn privileged() -> Self {
        Self::new(vec![Guard::Authenticate, Guard::RequireRole(Role::Privileged)])
    }

    pub fn evaluate(
        &self,
        headers: &HeaderMap,
        tokens: &TokenService,
        now: DateTime<Utc>,
    ) -> Result<AuthContext, GateError> {
        let mut context: Option<AuthContext> = None;

        for guard in &self.guards {
            match guard {
                Guard::Authenticate => {
                    let token = extract_bearer(headers)?;
                    let claims = tokens.verify(token, now)?;
                    context = Some(AuthContext { claims });
                }
                Guard::RequireRole(required) => {
                    let ctx = context.as_ref().ok_or(GateError::MissingCredentials)?;
                    if ctx.role() != *required {
                        return Err(GateError::Forbidden {
                            required: *required,
                        });
                    }
                }
            }
        }

        context.ok_or(GateError::MissingCredentials)
    }
}

/// Pulls the token out of `Authorization: Bearer <token>`.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, GateError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(GateError::MissingCredentials)?;

    let token = value
        .to_str()
        .map_err(|_| GateError::MalformedHeader)?
        .strip_prefix("Bearer ")
        .ok_or(GateError::MalformedHeader)?
        .trim();

    if token.is_empty() {
        return Err(GateError::MalformedHeader);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::SigningKeys;
    use crate::models::Account;
    use axum::http::HeaderValue;
    use chrono::Duration;

    fn tokens() -> TokenService {
        TokenService::new(&SigningKeys::new("guard-secret"), Duration::hours(24))
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn bearer(tokens: &TokenService, role: Role) -> HeaderMap {
        let account = Account {
            id: AccountId::new(5),
            name: "N".into(),
            email: "n@x".into(),
            role,
        };
        let token = tokens.issue(&account, now()).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn missing_header_fails_authentication_before_role_check() {
        let err = GuardPipeline::privileged()
            .evaluate(&HeaderMap::new(), &tokens(), now())
            .unwrap_err();
        assert_eq!(err, GateError::MissingCredentials);
    }

    #[test]
    fn non_bearer_scheme_is_malformed() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_bearer(&headers), Err(GateError::MalformedHeader));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_bearer(&headers), Err(GateError::MalformedHeader));
    }

    #[test]
    fn standard_role_is_forbidden_on_privileged_pipeline() {
        let tokens = tokens();
        let headers = bearer(&tokens, Role::Standard);

        assert!(GuardPipeline::authenticated().evaluate(&headers, &tokens, now()).is_ok());
        assert_eq!(
            GuardPipeline::privileged().evaluate(&headers, &tokens, now()),
            Err(GateError::Forbidden {
                required: Role::Privileged
            })
        );
    }

    #[test]
    fn privileged_role_passes_and_context_carries_claims() {
        let tokens = tokens();
        let headers = bearer(&tokens, Role::Privileged);

        let ctx = GuardPipeline::privileged()
            .evaluate(&headers, &tokens, now())
            .unwrap();
        assert_eq!(ctx.user_id(), AccountId::new(5));
        assert_eq!(ctx.role(), Role::Privileged);
    }

    #[test]
    fn expired_token_is_rejected_not_forbidden() {
        let tokens = tokens();
        let headers = bearer(&tokens, Role::Standard);
        let later = now() + Duration::hours(25);

        assert_eq!(
            GuardPipeline::privileged().evaluate(&headers, &tokens, later),
            Err(GateError::InvalidToken(TokenError::Expired))
        );
    }

    #[test]
    fn role_check_without_authentication_is_unauthenticated() {
        let pipeline = GuardPipeline::new(vec![Guard::RequireRole(Role::Standard)]);
        let tokens = tokens();
        let headers = bearer(&tokens, Role::Standard);

        assert_eq!(
            pipeline.evaluate(&headers, &tokens, now()),
            Err(GateError::MissingCredentials)
        );
    }
}
