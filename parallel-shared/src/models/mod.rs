/// Database models for Parallel
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts and credentials
/// - `workspace`: Workspaces, the tenancy root
/// - `membership`: User-workspace relationships with roles
/// - `project`: Projects inside a workspace
/// - `task`: Tasks on a workspace board
///
/// Functions that take a generic `PgExecutor` can run either on the pool or
/// inside a transaction (`&mut *tx`).
///
/// # Example
///
/// ```no_run
/// use parallel_shared::models::user::{User, CreateUser};
/// use parallel_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     name: "Ada".to_string(),
///     email: "ada@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod membership;
pub mod project;
pub mod task;
pub mod user;
pub mod workspace;

use serde::{Deserialize, Deserializer};

/// Deserializes a present field into `Some`, including an explicit `null`
///
/// Used with `#[serde(default, deserialize_with = "present")]` on
/// `Option<Option<T>>` fields: absent → `None`, `null` → `Some(None)`,
/// value → `Some(Some(v))`.
pub fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
