/// Request context middleware
///
/// Builds the [`RequestContext`] every handler receives:
///
/// 1. Takes the correlation ID from `x-request-id` or generates one
/// 2. Resolves the actor from the bearer token or session cookie
/// 3. Records the correlation ID on the request span
/// 4. Echoes the correlation ID in the response
///
/// Resolution never rejects the request; handlers that need an actor fail
/// with `UNAUTHENTICATED` themselves.

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use parallel_shared::auth::session::{extract_token, resolve_actor, RequestContext};
use uuid::Uuid;

use crate::app::AppState;

/// Header carrying the correlation ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LENGTH: usize = 128;

/// Uses the caller's request ID when it is sane, otherwise a fresh UUID
pub fn correlation_id(incoming: Option<&HeaderValue>) -> String {
    incoming
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LENGTH)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

pub async fn request_context_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let correlation_id = correlation_id(req.headers().get(REQUEST_ID_HEADER));
    tracing::Span::current().record("request_id", correlation_id.as_str());

    let token = extract_token(req.headers(), &state.config.session.cookie_name);
    let actor = resolve_actor(&state.db, &state.config.session.secret, token.as_deref()).await;
    if let Some(actor) = &actor {
        tracing::Span::current().record("user_id", tracing::field::display(actor.id));
    }

    req.extensions_mut()
        .insert(RequestContext::new(actor, correlation_id.clone()));

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}
