use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::database::Database;
use crate::error::ApiError;
use crate::handlers::{admin, public};
use crate::middleware::{login_rate_limit, require_admin, with_security_headers};
use crate::rate_limit::LoginRateLimiter;

/// Multipart framing overhead allowed on top of the image ceiling.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared per-request state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
    pub login_limiter: Arc<LoginRateLimiter>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        let login_limiter = Arc::new(LoginRateLimiter::in_memory(&config.security));
        Self {
            db,
            config: Arc::new(config),
            login_limiter,
        }
    }

    pub fn with_limiter(db: Database, config: AppConfig, login_limiter: LoginRateLimiter) -> Self {
        Self {
            db,
            config: Arc::new(config),
            login_limiter: Arc::new(login_limiter),
        }
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let api = api_routes(state.clone());

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(api.clone())
        .nest("/api", api)
        .with_state(state.clone());

    let app = with_security_headers(app, &state.config.security);

    let app = match cors_layer(&state.config) {
        Some(cors) => app.layer(cors),
        None => app,
    };

    let app = app.layer(CookieManagerLayer::new());

    if state.config.api.enable_request_logging {
        app.layer(TraceLayer::new_for_http())
    } else {
        app
    }
}

fn api_routes(state: AppState) -> Router<AppState> {
    let image_body_limit = state.config.api.max_image_bytes + MULTIPART_OVERHEAD_BYTES;

    // Anonymous access
    let public = Router::new()
        .route("/auth/logout", post(public::auth::logout))
        .route("/auth/me", get(public::auth::me))
        .route(
            "/auth/login",
            post(public::auth::login).route_layer(from_fn_with_state(state.clone(), login_rate_limit)),
        )
        .route("/products", get(public::products::list))
        .route("/products/:id", get(public::products::show))
        .route("/products/:id/image", get(public::images::show))
        .route("/branches", get(public::branches::list))
        .route("/branches/:id", get(public::branches::show))
        .route("/settings", get(public::settings::show));

    // Active admin session required
    let admin = Router::new()
        .route("/products", post(admin::products::create))
        .route("/products/:id", put(admin::products::update).delete(admin::products::delete))
        .route(
            "/products/:id/image",
            post(admin::images::upload)
                .delete(admin::images::delete)
                .layer(DefaultBodyLimit::max(image_body_limit)),
        )
        .route("/branches", post(admin::branches::create))
        .route("/branches/:id", put(admin::branches::update).delete(admin::branches::delete))
        .route("/settings", put(admin::settings::update))
        .route("/users", get(admin::users::list).post(admin::users::create))
        .route(
            "/users/:id",
            get(admin::users::show).put(admin::users::update).delete(admin::users::delete),
        )
        .route("/users/email/:email", get(admin::users::show_by_email))
        .route_layer(from_fn_with_state(state, require_admin));

    public.merge(admin)
}

fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    if !config.security.enable_cors || config.security.cors_origins.is_empty() {
        return None;
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .allow_credentials(true),
    )
}

/// GET / - Service banner
async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "public": ["/products", "/branches", "/settings", "/auth/login", "/auth/logout", "/auth/me"],
                "admin": ["/products", "/branches", "/settings", "/users"]
            }
        }
    }))
}

/// GET /health - Database connectivity check
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.db.health_check().await {
        Ok(()) => Json(json!({
            "success": true,
            "data": { "status": "ok", "database": "connected" }
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            ApiError::service_unavailable("Database unavailable").into_response()
        }
    }
}
