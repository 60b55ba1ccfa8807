/// Integration tests for signup, signin and sessions
///
/// Require a PostgreSQL database in DATABASE_URL; skipped otherwise.

mod common;

use parallel_shared::auth::session::{resolve_actor, RequestContext};
use parallel_shared::error::{ErrorKind, ServiceError};
use parallel_shared::services::accounts::{self, SigninInput, SignupInput, UpdateProfileInput};
use uuid::Uuid;

fn unique_email(prefix: &str) -> String {
    format!("{}-{}@Example.com", prefix, Uuid::new_v4())
}

#[tokio::test]
async fn test_signup_then_signin() {
    let Some(pool) = common::setup().await else { return };
    let email = unique_email("Ada");

    let signed_up = accounts::signup(
        &pool,
        &common::keys(),
        SignupInput {
            name: "  Ada  ".to_string(),
            email: email.clone(),
            password: "correct horse".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(signed_up.user.name, "Ada");
    assert_eq!(signed_up.user.email, email.to_lowercase());

    let signed_in = accounts::signin(
        &pool,
        &common::keys(),
        SigninInput {
            email: email.to_uppercase(),
            password: "correct horse".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(signed_in.user, signed_up.user);

    let actor = resolve_actor(&pool, common::TEST_SECRET, Some(&signed_in.token)).await;
    assert_eq!(actor.map(|a| a.id), Some(signed_up.user.id));
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let Some(pool) = common::setup().await else { return };
    let email = unique_email("dup");

    let input = SignupInput {
        name: "First".to_string(),
        email: email.clone(),
        password: "password123".to_string(),
    };
    accounts::signup(&pool, &common::keys(), input.clone()).await.unwrap();

    let again = accounts::signup(
        &pool,
        &common::keys(),
        SignupInput {
            email: email.to_lowercase(),
            ..input
        },
    )
    .await;

    match again {
        Err(ServiceError::BadUserInput(message)) => assert_eq!(message, "Email already exists"),
        other => panic!("expected BAD_USER_INPUT, got {:?}", other.map(|s| s.user)),
    }
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_fail_alike() {
    let Some(pool) = common::setup().await else { return };
    let ctx = common::signed_in(&pool, "Grace").await;
    let email = ctx.actor.as_ref().unwrap().email.clone();

    let wrong = accounts::signin(
        &pool,
        &common::keys(),
        SigninInput {
            email,
            password: "not the password".to_string(),
        },
    )
    .await
    .unwrap_err();

    let unknown = accounts::signin(
        &pool,
        &common::keys(),
        SigninInput {
            email: unique_email("nobody"),
            password: "password123".to_string(),
        },
    )
    .await
    .unwrap_err();

    assert_eq!(wrong.kind(), ErrorKind::Unauthenticated);
    assert_eq!(wrong.to_string(), unknown.to_string());
}

#[tokio::test]
async fn test_short_password_is_rejected() {
    let Some(pool) = common::setup().await else { return };

    let result = accounts::signup(
        &pool,
        &common::keys(),
        SignupInput {
            name: "Short".to_string(),
            email: unique_email("short"),
            password: "1234567".to_string(),
        },
    )
    .await;

    assert_eq!(result.unwrap_err().kind(), ErrorKind::BadUserInput);
}

#[tokio::test]
async fn test_update_profile() {
    let Some(pool) = common::setup().await else { return };
    let ctx = common::signed_in(&pool, "Linus").await;
    let email = ctx.actor.as_ref().unwrap().email.clone();

    let updated = accounts::update_profile(
        &pool,
        &ctx,
        UpdateProfileInput {
            name: Some("Linus T".to_string()),
            password: Some("new password".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "Linus T");

    let old = accounts::signin(
        &pool,
        &common::keys(),
        SigninInput {
            email: email.clone(),
            password: "password123".to_string(),
        },
    )
    .await;
    assert!(old.is_err());

    let new = accounts::signin(
        &pool,
        &common::keys(),
        SigninInput {
            email,
            password: "new password".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(new.user.name, "Linus T");
}

#[tokio::test]
async fn test_anonymous_context_has_no_profile() {
    let result = accounts::current(&RequestContext::anonymous());
    assert!(matches!(result, Err(ServiceError::Unauthenticated)));
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_ignored() {
    let Some(pool) = common::setup().await else { return };
    let ctx = common::signed_in(&pool, "Eve").await;
    let forged = parallel_shared::auth::jwt::SessionKeys::new(
        "some-other-secret-that-is-long-enough-too",
        chrono::Duration::hours(1),
    )
    .issue(common::actor_id(&ctx))
    .unwrap();

    assert!(resolve_actor(&pool, common::TEST_SECRET, Some(&forged)).await.is_none());
    assert!(resolve_actor(&pool, common::TEST_SECRET, None).await.is_none());
}
