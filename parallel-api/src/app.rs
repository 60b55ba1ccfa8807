/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use parallel_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config)?;
/// let app = parallel_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::request_context::request_context_layer};
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, Request},
    routing::{get, post},
    Router,
};
use chrono::{FixedOffset, Offset, Utc};
use parallel_shared::auth::jwt::SessionKeys;
use parallel_shared::upload::{AssetUploader, DisabledUploader, HttpAssetUploader, UploadError};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Session token issuer
    pub keys: Arc<SessionKeys>,

    /// Asset store boundary
    pub uploader: Arc<dyn AssetUploader>,

    /// Reference time zone of analytics months
    pub reporting_offset: FixedOffset,
}

impl AppState {
    /// Creates application state, wiring the asset store from configuration
    pub fn new(db: PgPool, config: Config) -> Result<Self, UploadError> {
        let uploader: Arc<dyn AssetUploader> = match &config.upload.endpoint {
            Some(endpoint) => Arc::new(HttpAssetUploader::new(endpoint.clone())?),
            None => {
                tracing::warn!("UPLOAD_ENDPOINT not set; uploads are disabled");
                Arc::new(DisabledUploader)
            }
        };

        Ok(Self::with_uploader(db, config, uploader))
    }

    /// Creates application state with an explicit uploader
    pub fn with_uploader(db: PgPool, config: Config, uploader: Arc<dyn AssetUploader>) -> Self {
        let keys = SessionKeys::new(config.session.secret.clone(), config.session_ttl());
        let reporting_offset = config.reporting_offset().unwrap_or_else(|| Utc.fix());

        Self {
            db,
            config: Arc::new(config),
            keys: Arc::new(keys),
            uploader,
            reporting_offset,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                               # Health check
/// └── /v1/
///     ├── /auth/                            # signup, signin, logout, me
///     ├── /uploads                          # Asset upload
///     ├── /workspaces/                      # Workspaces, members, invites
///     │   ├── /:id/members/:user_id
///     │   ├── /:id/analytics
///     │   └── /:id/board/:status/rebalance
///     ├── /projects/                        # Projects and their analytics
///     └── /tasks/                           # Tasks and bulk reorder
/// ```
///
/// # Middleware Stack
///
/// Outermost first:
/// 1. CORS (tower-http CorsLayer)
/// 2. Compression (gzip, brotli)
/// 3. Logging (tower-http TraceLayer)
/// 4. Request context (correlation ID + actor)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/signin", post(routes::auth::signin))
        .route("/logout", post(routes::auth::logout))
        .route("/me", get(routes::auth::me).patch(routes::auth::update_me));

    let upload_routes = Router::new()
        .route("/", post(routes::uploads::upload))
        .layer(DefaultBodyLimit::max(state.config.upload.max_bytes));

    let workspace_routes = Router::new()
        .route(
            "/",
            get(routes::workspaces::list_workspaces).post(routes::workspaces::create_workspace),
        )
        .route(
            "/:id",
            get(routes::workspaces::get_workspace)
                .patch(routes::workspaces::update_workspace)
                .delete(routes::workspaces::delete_workspace),
        )
        .route("/:id/join", post(routes::workspaces::join_workspace))
        .route("/:id/invite-code", post(routes::workspaces::reset_invite_code))
        .route("/:id/members", get(routes::members::list_members))
        .route(
            "/:id/members/:user_id",
            axum::routing::delete(routes::members::remove_member).patch(routes::members::update_member_role),
        )
        .route("/:id/analytics", get(routes::analytics::workspace_analytics))
        .route(
            "/:id/board/:status/rebalance",
            post(routes::tasks::rebalance_column),
        );

    let project_routes = Router::new()
        .route(
            "/",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/:id",
            get(routes::projects::get_project)
                .patch(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route("/:id/analytics", get(routes::analytics::project_analytics));

    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks).post(routes::tasks::create_task))
        .route("/reorder", post(routes::tasks::reorder_tasks))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        );

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/uploads", upload_routes)
        .nest("/workspaces", workspace_routes)
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes);

    let cors = cors_layer(&state.config);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            request_context_layer,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                    )
                })
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Configures CORS from the allowed origins
///
/// Session cookies need credentialed requests, which browsers refuse with a
/// wildcard origin, so `*` mirrors the caller's origin instead.
fn cors_layer(config: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-request-id"),
        ])
        .expose_headers([header::HeaderName::from_static("x-request-id")])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600));

    if config.allows_any_origin() {
        base.allow_origin(tower_http::cors::AllowOrigin::mirror_request())
    } else {
        let origins: Vec<HeaderValue> = config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        base.allow_origin(origins)
    }
}
