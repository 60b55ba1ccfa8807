//! Shared harness for database integration tests
//!
//! Tests connect to the Postgres given by `DATABASE_URL`. When it is not
//! set, `setup` returns `None` and the calling test returns early.

#![allow(dead_code)]

use chrono::Duration;
use parallel_shared::auth::jwt::SessionKeys;
use parallel_shared::auth::session::RequestContext;
use parallel_shared::db::migrations::{ensure_database_exists, run_migrations};
use parallel_shared::db::pool::{create_pool, DatabaseConfig};
use parallel_shared::models::project::Project;
use parallel_shared::models::workspace::Workspace;
use parallel_shared::services::accounts::{self, SignupInput};
use parallel_shared::services::projects::{self, CreateProjectInput};
use parallel_shared::services::workspaces::{self, CreateWorkspaceInput};
use sqlx::PgPool;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Connects and migrates, or `None` without a database
pub async fn setup() -> Option<PgPool> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set; skipping database test");
            return None;
        }
    };

    ensure_database_exists(&url)
        .await
        .expect("Failed to create test database");

    let pool = create_pool(DatabaseConfig {
        url,
        max_connections: 5,
        ..Default::default()
    })
    .await
    .expect("Failed to connect to test database");

    run_migrations(&pool).await.expect("Failed to run migrations");
    Some(pool)
}

pub fn keys() -> SessionKeys {
    SessionKeys::new(TEST_SECRET, Duration::hours(1))
}

/// Signs up a fresh user and returns a context acting as them
pub async fn signed_in(pool: &PgPool, name: &str) -> RequestContext {
    let session = accounts::signup(
        pool,
        &keys(),
        SignupInput {
            name: name.to_string(),
            email: format!("{}-{}@example.com", name.to_lowercase(), Uuid::new_v4()),
            password: "password123".to_string(),
        },
    )
    .await
    .expect("Failed to sign up test user");

    RequestContext::new(Some(session.user), format!("test-{}", name))
}

pub fn actor_id(ctx: &RequestContext) -> Uuid {
    ctx.actor.as_ref().expect("context has an actor").id
}

pub async fn workspace(pool: &PgPool, ctx: &RequestContext) -> Workspace {
    workspaces::create(
        pool,
        ctx,
        CreateWorkspaceInput {
            name: format!("Workspace {}", Uuid::new_v4()),
            image: None,
        },
    )
    .await
    .expect("Failed to create workspace")
}

pub async fn project(pool: &PgPool, ctx: &RequestContext, workspace_id: Uuid) -> Project {
    projects::create(
        pool,
        ctx,
        CreateProjectInput {
            workspace_id,
            name: "Project".to_string(),
            image: None,
        },
    )
    .await
    .expect("Failed to create project")
}
