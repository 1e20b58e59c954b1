use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use std::sync::Arc;

use super::extractors::{Authenticated, ValidatedJson};
use super::{ApiError, AppState, AuthResponse, LoginRequest, RegisterRequest};
use crate::auth::{GuardPipeline, TokenService};
use crate::services::{Profile, Registration};

// ============================================================================
// Middleware
// ============================================================================

/// State handed to [`gate`]: the pipeline to run and the keys to verify with.
#[derive(Clone)]
pub struct GateState {
    pub tokens: Arc<TokenService>,
    pub pipeline: Arc<GuardPipeline>,
}

impl GateState {
    #[must_use]
    pub fn new(tokens: Arc<TokenService>, pipeline: GuardPipeline) -> Self {
        Self {
            tokens,
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Runs the guard pipeline and, on success, attaches the verified
/// [`crate::auth::AuthContext`] to the request.
pub async fn gate(
    State(gate): State<GateState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let context = gate
        .pipeline
        .evaluate(request.headers(), &gate.tokens, Utc::now())
        .map_err(|e| {
            tracing::debug!(error = %e, "Auth gate rejected request");
            ApiError::from(e)
        })?;

    tracing::Span::current().record("user_id", context.user_id().value());
    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let issued = state
        .identity
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(AuthResponse::new(issued, "Login successful")))
}

/// POST /api/register
/// Any role supplied in the body is ignored.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if let Some(requested) = payload.status.as_deref() {
        tracing::debug!(requested, "Ignoring role hint on registration");
    }

    let issued = state
        .identity
        .register(Registration {
            name: payload.name,
            email: payload.email,
            password: payload.password,
        })
        .await?;

    Ok(Json(AuthResponse::new(issued, "Registration successful")))
}

/// GET /api/profile
pub async fn profile(
    State(state): State<Arc<AppState>>,
    Authenticated(context): Authenticated,
) -> Json<Profile> {
    Json(state.identity.profile(&context))
}
