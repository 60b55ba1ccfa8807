/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/signup` - Create an account and sign in
/// - `POST /v1/auth/signin` - Sign in with e-mail and password
/// - `POST /v1/auth/logout` - Clear the session cookie
/// - `GET /v1/auth/me` - Current user
/// - `PATCH /v1/auth/me` - Change display name and/or password
///
/// Signup and signin return the session token in the body and also set it
/// as an `HttpOnly; SameSite=Strict` cookie.

use crate::{
    app::AppState,
    config::Config,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};
use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Extension, Json,
};
use parallel_shared::{
    auth::{password::MIN_PASSWORD_LENGTH, session::RequestContext},
    models::user::UserProfile,
    services::{
        accounts::{self, Session, SigninInput, SignupInput, UpdateProfileInput},
        MAX_NAME_LENGTH,
    },
};
use serde::Deserialize;
use validator::Validate;

// validator takes u64 length bounds
const NAME_MAX: u64 = MAX_NAME_LENGTH as u64;
const PASSWORD_MIN: u64 = MIN_PASSWORD_LENGTH as u64;

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = NAME_MAX, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = PASSWORD_MIN, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Signin request
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Profile update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMeRequest {
    #[validate(length(min = 1, max = NAME_MAX, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(length(min = PASSWORD_MIN, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
}

/// Builds the `Set-Cookie` value carrying a session token
///
/// An empty token with `max_age` zero clears the cookie.
pub fn session_cookie(config: &Config, token: &str, max_age_seconds: i64) -> ApiResult<HeaderValue> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        config.session.cookie_name, token, max_age_seconds
    );
    if config.api.production {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::InternalError(format!("Invalid session cookie: {}", e)))
}

fn with_session_cookie(state: &AppState, session: Session) -> ApiResult<Response> {
    let ttl = state.config.session_ttl().num_seconds();
    let cookie = session_cookie(&state.config, &session.token, ttl)?;

    Ok(([(header::SET_COOKIE, cookie)], Json(session)).into_response())
}

/// Create an account
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/signup
/// Content-Type: application/json
///
/// { "name": "Ada", "email": "ada@example.com", "password": "correct horse" }
/// ```
///
/// # Response
///
/// ```json
/// { "token": "eyJ...", "user": { "id": "uuid", "name": "Ada", "email": "ada@example.com" } }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: E-mail already registered
/// - `422 Unprocessable Entity`: Validation failed
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> ApiResult<Response> {
    req.validate()?;

    let session = accounts::signup(
        &state.db,
        &state.keys,
        SignupInput {
            name: req.name,
            email: req.email,
            password: req.password,
        },
    )
    .await?;

    with_session_cookie(&state, session)
}

/// Sign in
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown e-mail or wrong password
pub async fn signin(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SigninRequest>,
) -> ApiResult<Response> {
    let session = accounts::signin(
        &state.db,
        &state.keys,
        SigninInput {
            email: req.email,
            password: req.password,
        },
    )
    .await?;

    with_session_cookie(&state, session)
}

/// Clears the session cookie
///
/// Tokens are stateless, so a bearer token stays valid until it expires.
pub async fn logout(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> ApiResult<Response> {
    let cookie = session_cookie(&state.config, "", 0)?;

    if let Some(actor) = &ctx.actor {
        tracing::info!(user_id = %actor.id, "User logged out");
    }

    Ok(([(header::SET_COOKIE, cookie)], Json(serde_json::json!({ "success": true }))).into_response())
}

pub async fn me(Extension(ctx): Extension<RequestContext>) -> ApiResult<Json<UserProfile>> {
    Ok(Json(accounts::current(&ctx)?))
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<UpdateMeRequest>,
) -> ApiResult<Json<UserProfile>> {
    req.validate()?;

    let profile = accounts::update_profile(
        &state.db,
        &ctx,
        UpdateProfileInput {
            name: req.name,
            password: req.password,
        },
    )
    .await?;

    Ok(Json(profile))
}
