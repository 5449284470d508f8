//! Fixed-window rate limiter keyed by client address.

use crate::api::routes::ApiError;
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Counts requests per client within fixed time windows
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    clients: Mutex<HashMap<Option<IpAddr>, Window>>,
}

struct Window {
    started: Instant,
    count: u32,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Records one request from `client`; false once its window is exhausted
    pub async fn check(&self, client: Option<IpAddr>) -> bool {
        let now = Instant::now();
        let mut clients = self.clients.lock().await;

        // Forget clients whose window has passed
        clients.retain(|_, w| now.duration_since(w.started) < self.window);

        let window = clients.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });
        window.count += 1;
        window.count <= self.max_requests
    }
}

/// Middleware rejecting requests over the limit with 429
pub async fn limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if !limiter.check(client).await {
        ::log::warn!("Rate limit exceeded for {:?}", client);
        return ApiError::too_many_requests().into_response();
    }

    next.run(request).await
}
