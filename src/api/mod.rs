//! HTTP surface: routing, middleware and shared handler state.

pub mod rate_limit;
pub mod routes;
pub mod types;


use crate::config::AppConfig;
use crate::fetchers::PageFetcher;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, header};
use axum::routing::{get, post};
use axum::{Router, middleware};
use rate_limit::RateLimiter;
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

/// Application state shared across handlers.
pub struct AppState {
    pub config: AppConfig,
    /// Static strategy with browser fallback
    pub smart: Arc<dyn PageFetcher>,
    /// Browser strategy, used directly for advanced requests
    pub browser: Arc<dyn PageFetcher>,
}

/// Builds the application router with every route and middleware layer.
pub fn router(state: Arc<AppState>) -> Router {
    let server = &state.config.server;
    let limiter = Arc::new(RateLimiter::new(
        Duration::from_millis(state.config.rate_limit.window_ms),
        state.config.rate_limit.max_requests,
    ));

    let api = Router::new()
        .route("/status", get(routes::status))
        .route("/scrape", post(routes::scrape))
        .route("/scrape/all", get(routes::scrape_all));

    let base_path = server.base_path.trim_end_matches('/');
    let app = if base_path.is_empty() {
        api
    } else {
        Router::new().nest(base_path, api)
    };

    app.fallback(routes::not_found)
        .layer(DefaultBodyLimit::max(server.body_limit_bytes))
        .layer(middleware::from_fn_with_state(limiter, rate_limit::limit))
        .layer(CorsLayer::permissive())
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(CatchPanicLayer::custom(routes::handle_panic))
        .with_state(state)
}
