/// Actor resolution and per-request context
///
/// Every operation receives a [`RequestContext`] built once at the edge of
/// the request. Resolving the actor never fails: a missing, malformed,
/// expired or orphaned token simply yields no actor, and operations that
/// need one return `UNAUTHENTICATED`.
///
/// # Token sources
///
/// 1. `Authorization: Bearer <token>`
/// 2. The session cookie (name is configurable)

use axum::http::{header, HeaderMap};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::jwt::validate_token;
use crate::error::{ServiceError, ServiceResult};
use crate::models::user::{User, UserProfile};

/// Explicit per-request context passed to every operation
#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    /// Resolved actor, if any
    pub actor: Option<UserProfile>,

    /// Correlation ID for logs and responses
    pub correlation_id: String,
}

impl RequestContext {
    pub fn new(actor: Option<UserProfile>, correlation_id: impl Into<String>) -> Self {
        Self {
            actor,
            correlation_id: correlation_id.into(),
        }
    }

    /// Context without an actor and with a fresh correlation ID
    pub fn anonymous() -> Self {
        Self::new(None, Uuid::new_v4().to_string())
    }

    /// Returns the actor or `UNAUTHENTICATED`
    pub fn actor(&self) -> ServiceResult<&UserProfile> {
        self.actor.as_ref().ok_or(ServiceError::Unauthenticated)
    }
}

/// Pulls the session token out of the request headers
///
/// The bearer header wins over the cookie when both are present.
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Resolves a token to the user it was issued for
///
/// Returns `None` for any failure; store errors are logged, not raised.
pub async fn resolve_actor(pool: &PgPool, secret: &str, token: Option<&str>) -> Option<UserProfile> {
    let token = token?;

    let claims = match validate_token(token, secret) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring invalid session token");
            return None;
        }
    };

    match User::find_by_id(pool, claims.sub).await {
        Ok(Some(user)) => Some(UserProfile::from(&user)),
        Ok(None) => {
            tracing::debug!(user_id = %claims.sub, "Session token for unknown user");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load session user");
            None
        }
    }
}
