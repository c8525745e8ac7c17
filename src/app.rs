//! Router assembly and the shared state handed to every handler.

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Extension, Router,
};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::warn;

use crate::attendance::AttendanceRecorder;
use crate::auth::TokenCodec;
use crate::config::AppConfig;
use crate::handlers::{protected, public};
use crate::middleware::auth_context_middleware;
use crate::store::AccountStore;

#[derive(Clone)]
pub struct AppState {
    pub codec: Arc<TokenCodec>,
    pub recorder: Arc<AttendanceRecorder>,
    pub accounts: Arc<dyn AccountStore>,
    /// Present when backed by PostgreSQL; used by `/health`.
    pub pool: Option<PgPool>,
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let codec = state.codec.clone();

    let router = Router::new()
        .merge(public_routes())
        .merge(protected_routes().route_layer(middleware::from_fn_with_state(codec, auth_context_middleware)))
        .layer(ServiceBuilder::new().layer(cors_layer(config)).layer(Extension(state)))
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes));

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn public_routes() -> Router {
    Router::new()
        .route("/health", get(public::health::get))
        .route("/login", post(public::login::post))
}

fn protected_routes() -> Router {
    use protected::{arrivals, whoami};

    Router::new()
        .route("/api/whoami", get(whoami::get))
        .route("/api/arrivals/home", post(arrivals::home_post))
        .route("/api/arrivals/school", post(arrivals::school_post))
        .route("/api/arrivals/:kind/today", get(arrivals::today_get))
        .route("/api/arrivals/:kind/today/:actor_id", get(arrivals::today_actor_get))
        .route("/api/arrivals/:kind/week", get(arrivals::week_get))
        .route("/api/arrivals/:kind/week/:actor_id", get(arrivals::week_actor_get))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if !config.security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::AUTHORIZATION, axum::http::header::CONTENT_TYPE])
}
