/// Account operations: signup, signin, current user, profile update

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::clean_name;
use crate::auth::jwt::SessionKeys;
use crate::auth::password::{hash_password, validate_password, verify_password};
use crate::auth::session::RequestContext;
use crate::error::{ServiceError, ServiceResult};
use crate::models::user::{CreateUser, UpdateUser, User, UserProfile};

#[derive(Debug, Clone, Deserialize)]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SigninInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// A signed-in user and their session token
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

/// Lowercases and trims an e-mail, rejecting obviously malformed ones
pub fn normalize_email(email: &str) -> ServiceResult<String> {
    let email = email.trim().to_lowercase();

    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };

    if !valid {
        return Err(ServiceError::bad_input("Invalid email address"));
    }

    Ok(email)
}

/// Creates an account and signs it in
pub async fn signup(pool: &PgPool, keys: &SessionKeys, input: SignupInput) -> ServiceResult<Session> {
    let name = clean_name(&input.name, "Name")?;
    let email = normalize_email(&input.email)?;
    validate_password(&input.password).map_err(ServiceError::BadUserInput)?;

    if User::find_by_email(pool, &email).await?.is_some() {
        return Err(ServiceError::bad_input("Email already exists"));
    }

    let password_hash = hash_password(&input.password)?;
    let user = User::create(
        pool,
        CreateUser {
            name,
            email,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User signed up");

    Ok(Session {
        token: keys.issue(user.id)?,
        user: UserProfile::from(&user),
    })
}

/// Verifies credentials and issues a session token
///
/// Unknown e-mail and wrong password fail the same way.
pub async fn signin(pool: &PgPool, keys: &SessionKeys, input: SigninInput) -> ServiceResult<Session> {
    let email = input.email.trim().to_lowercase();

    let user = User::find_by_email(pool, &email)
        .await?
        .ok_or(ServiceError::InvalidCredentials)?;

    if !verify_password(&input.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Rejected sign-in with wrong password");
        return Err(ServiceError::InvalidCredentials);
    }

    tracing::info!(user_id = %user.id, "User signed in");

    Ok(Session {
        token: keys.issue(user.id)?,
        user: UserProfile::from(&user),
    })
}

/// Returns the actor's profile
pub fn current(ctx: &RequestContext) -> ServiceResult<UserProfile> {
    ctx.actor().cloned()
}

/// Changes the actor's display name and/or password
pub async fn update_profile(
    pool: &PgPool,
    ctx: &RequestContext,
    input: UpdateProfileInput,
) -> ServiceResult<UserProfile> {
    let actor = ctx.actor()?;

    let name = input
        .name
        .as_deref()
        .map(|name| clean_name(name, "Name"))
        .transpose()?;

    let password_hash = match input.password.as_deref() {
        Some(password) => {
            validate_password(password).map_err(ServiceError::BadUserInput)?;
            Some(hash_password(password)?)
        }
        None => None,
    };

    let user = User::update(pool, actor.id, UpdateUser { name, password_hash })
        .await?
        .ok_or(ServiceError::Unauthenticated)?;

    tracing::info!(user_id = %user.id, "Profile updated");
    Ok(UserProfile::from(&user))
}
