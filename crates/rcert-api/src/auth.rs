//! # Bearer Authentication
//!
//! Dashboard routes require `Authorization: Bearer <token>` when
//! `AUTH_TOKEN` is configured.
//!
//! ```text
//! Bearer {secret}            — service token; the caller names the actor per request
//! Bearer {actor}:{secret}    — token bound to one actor
//! ```
//!
//! The public verification route and the health probes are mounted
//! outside this middleware.
//!
//! With `AUTH_TOKEN` unset every dashboard caller is anonymous. Anonymous
//! callers may read and issue but can never act as an actor, so
//! revocation is refused until a token is configured.

use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rcert_core::ActorId;
use subtle::ConstantTimeEq;

use crate::error::{AppError, ErrorBody};

/// Identity attached to an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// Actor bound by the token, if any.
    pub actor: Option<ActorId>,
    /// Presented a valid token. False only when auth is disabled.
    pub authenticated: bool,
}

impl CallerIdentity {
    /// Caller admitted without a token.
    pub fn anonymous() -> Self {
        Self {
            actor: None,
            authenticated: false,
        }
    }

    /// Resolve the acting party. A bound actor wins; a request naming a
    /// different actor is refused, as is any anonymous caller.
    pub fn acting_as(&self, requested: Option<&str>) -> Result<ActorId, AppError> {
        if !self.authenticated {
            return Err(AppError::Forbidden(
                "acting as an actor requires authentication; AUTH_TOKEN is not configured".into(),
            ));
        }
        match (&self.actor, requested) {
            (Some(bound), None) => Ok(bound.clone()),
            (Some(bound), Some(req)) if req == bound.as_str() => Ok(bound.clone()),
            (Some(bound), Some(req)) => Err(AppError::Forbidden(format!(
                "token is bound to actor {bound}, request names {req}"
            ))),
            (None, Some(req)) => ActorId::new(req).map_err(|e| AppError::BadRequest(e.to_string())),
            (None, None) => Err(AppError::BadRequest("actor is required".to_string())),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

/// Expected token, injected as an extension. `Debug` redacts it.
#[derive(Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse `{secret}` or `{actor}:{secret}`.
pub fn parse_bearer_token(provided: &str, expected_secret: &str) -> Result<CallerIdentity, String> {
    if constant_time_token_eq(provided, expected_secret) {
        return Ok(CallerIdentity {
            actor: None,
            authenticated: true,
        });
    }
    let Some((actor, secret)) = provided.split_once(':') else {
        return Err("invalid bearer token".into());
    };
    if !constant_time_token_eq(secret, expected_secret) {
        return Err("invalid bearer token".into());
    }
    let actor = ActorId::new(actor).map_err(|e| format!("invalid actor in token: {e}"))?;
    Ok(CallerIdentity {
        actor: Some(actor),
        authenticated: true,
    })
}

/// Validate the bearer token and attach a [`CallerIdentity`].
///
/// With no configured token every request passes as an anonymous caller.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let expected = request
        .extensions()
        .get::<AuthConfig>()
        .and_then(|c| c.token.clone());

    let Some(expected) = expected else {
        request.extensions_mut().insert(CallerIdentity::anonymous());
        return next.run(request).await;
    };

    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let identity = match header_value {
        Some(v) => match v.strip_prefix("Bearer ") {
            Some(provided) => parse_bearer_token(provided, &expected),
            None => Err("authorization header must use Bearer scheme".to_string()),
        },
        None => Err("missing authorization header".to_string()),
    };

    match identity {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(msg) => {
            tracing::warn!(reason = %msg, "authentication failed");
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody::new("UNAUTHORIZED", msg)),
            )
                .into_response()
        }
    }
}
