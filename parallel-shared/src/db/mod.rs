/// Database layer for Parallel
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with a health check
/// - `migrations`: Schema migration runner
///
/// The pool is created once at process start, passed explicitly to every
/// operation, and closed on shutdown.
///
/// # Example
///
/// ```no_run
/// use parallel_shared::db::pool::{create_pool, close_pool, DatabaseConfig};
/// use parallel_shared::db::migrations::run_migrations;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     })
///     .await?;
///
///     run_migrations(&pool).await?;
///     close_pool(pool).await;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
