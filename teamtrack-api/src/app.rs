//! Application state and router builder
//!
//! This module defines the shared application state and builds the Axum
//! router with all routes and middleware.

use crate::{
    config::Config,
    middleware::{auth::require_identity, security::SecurityHeadersLayer},
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET  /health                          public
/// └── /v1
///     ├── POST /auth/login                  public
///     ├── GET  /auth/me
///     ├── POST /auth/change-password
///     ├── /users        GET POST, /:id PUT DELETE          Admin
///     ├── /roles        GET POST, /:id PUT DELETE          Admin
///     ├── /departments  GET POST, /:id PUT DELETE          Admin
///     ├── /tasks        GET POST, /:id GET PUT DELETE
///     │   └── PUT /:id/status                              Staff assignee
///     ├── /qa/review    GET, POST /:task_id                QA department
///     ├── GET /qa/reviews/:task_id                         QA department, Admin
///     ├── GET /metrics/global                              Admin
///     └── GET /metrics/:user_id                            self, Admin
/// ```
///
/// Everything under `/v1` except login requires a bearer token.
pub fn build_router(state: AppState) -> Router {
    let users = Router::new()
        .route("/", get(routes::users::list_users).post(routes::users::create_user))
        .route(
            "/:id",
            put(routes::users::update_user).delete(routes::users::delete_user),
        );

    let roles = Router::new()
        .route("/", get(routes::roles::list_roles).post(routes::roles::create_role))
        .route(
            "/:id",
            put(routes::roles::update_role).delete(routes::roles::delete_role),
        );

    let departments = Router::new()
        .route(
            "/",
            get(routes::departments::list_departments).post(routes::departments::create_department),
        )
        .route(
            "/:id",
            put(routes::departments::update_department)
                .delete(routes::departments::delete_department),
        );

    let tasks = Router::new()
        .route("/", get(routes::tasks::list_tasks).post(routes::tasks::create_task))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::edit_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/:id/status", put(routes::tasks::update_status));

    let qa = Router::new()
        .route("/review", get(routes::qa::review_queue))
        .route("/review/:task_id", post(routes::qa::submit_review))
        .route("/reviews/:task_id", get(routes::qa::review_history));

    let metrics = Router::new()
        .route("/global", get(routes::metrics::global_metrics))
        .route("/:user_id", get(routes::metrics::user_metrics));

    let protected = Router::new()
        .route("/auth/me", get(routes::auth::me))
        .route("/auth/change-password", post(routes::auth::change_password))
        .nest("/users", users)
        .nest("/roles", roles)
        .nest("/departments", departments)
        .nest("/tasks", tasks)
        .nest("/qa", qa)
        .nest("/metrics", metrics)
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_identity,
        ));

    let v1_routes = Router::new()
        .route("/auth/login", post(routes::auth::login))
        .merge(protected);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
