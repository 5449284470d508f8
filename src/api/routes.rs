//! API route handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use std::any::Any;
use std::sync::Arc;

use crate::api::AppState;
use crate::api::types::{
    ErrorResponse, ScrapeMetadata, ScrapeMethod, ScrapeRequest, ScrapeResponse, StatusResponse,
};
use crate::crawlers::{BatchOptions, run_batch};
use crate::utils::to_unquoted_json;

/// Error type for API handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    details: Option<String>,
    message: Option<String>,
}

impl ApiError {
    /// Malformed request body
    pub fn validation(details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "Invalid request data".to_string(),
            details: Some(details.into()),
            message: None,
        }
    }

    pub fn internal(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: error.into(),
            details: None,
            message: Some(message.into()),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: "Endpoint not found".to_string(),
            details: None,
            message: None,
        }
    }

    pub fn too_many_requests() -> Self {
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            error: "Too many requests, please try again later".to_string(),
            details: None,
            message: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            success: false,
            error: self.error,
            details: self.details,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Health check endpoint.
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        success: true,
        status: "API running".to_string(),
        timestamp: now_iso(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Scrapes a single URL with the smart dispatcher or, for advanced requests, the browser.
pub async fn scrape(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let Json(req) = body.map_err(|rejection| ApiError::validation(rejection.body_text()))?;
    let validated = req.validate().map_err(ApiError::validation)?;

    let start = std::time::Instant::now();
    let url = validated.fetch.url.clone();
    ::log::info!("Starting scrape of {}", url);

    let fetcher = match validated.method {
        ScrapeMethod::Smart => &state.smart,
        ScrapeMethod::Browser => &state.browser,
    };
    let data = fetcher.fetch(&validated.fetch).await.map_err(|e| {
        ::log::error!("Scraping {} failed: {}", url, e);
        ApiError::internal("Internal server error", e.to_string())
    })?;

    let elapsed_ms = start.elapsed().as_millis();
    ::log::info!("Scrape of {} completed in {}ms", url, elapsed_ms);

    Ok(Json(ScrapeResponse {
        success: true,
        data,
        metadata: ScrapeMetadata {
            url,
            scraped_at: now_iso(),
            execution_time: format!("{elapsed_ms}ms"),
            method: validated.method,
        },
    }))
}

/// Crawls every configured category and returns the products found.
pub async fn scrape_all(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let batch = &state.config.batch;
    let options = BatchOptions::from(batch);

    let records = run_batch(state.smart.as_ref(), &batch.categories, &options).await;

    let serialized = if batch.quote_keys {
        serde_json::to_string_pretty(&records)
    } else {
        to_unquoted_json(&records)
    };
    let body = serialized.map_err(|e| {
        ::log::error!("Failed to serialize batch results: {}", e);
        ApiError::internal("Internal error in batch scraping", e.to_string())
    })?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Fallback for unmatched routes.
pub async fn not_found() -> ApiError {
    ApiError::not_found()
}

/// Turns a handler panic into a generic 500.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    ::log::error!("Unhandled error: {}", detail);

    ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        error: "Internal server error".to_string(),
        details: None,
        message: None,
    }
    .into_response()
}
