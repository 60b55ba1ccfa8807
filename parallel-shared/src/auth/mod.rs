/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: HS256 session tokens
/// - [`session`]: Actor resolution and the per-request context
/// - [`authorization`]: Workspace membership and role guard
/// - [`invite_code`]: Workspace invite code generation
///
/// # Example
///
/// ```no_run
/// use parallel_shared::auth::password::{hash_password, verify_password};
/// use parallel_shared::auth::jwt::SessionKeys;
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let keys = SessionKeys::new("secret-key-of-at-least-thirty-two-bytes", Duration::days(30));
/// let token = keys.issue(Uuid::new_v4())?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod invite_code;
pub mod jwt;
pub mod password;
pub mod session;
