//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, Request, State, rejection::QueryRejection},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Json, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;

use crate::demo::WaitTask;
use crate::resolver::WORKER_PATH;
use crate::service::FrontDoorService;
use crate::worker::worker_endpoint;

#[derive(Debug, Deserialize)]
pub struct WaitOneParams {
    /// Deadline in seconds.
    pub d: f64,
    /// Per-item wait in milliseconds.
    pub w: u64,
}

#[derive(Debug, Deserialize)]
pub struct WaitManyParams {
    /// Number of items to fork.
    pub n: usize,
    /// Deadline in seconds.
    pub d: f64,
    /// Per-item wait in milliseconds.
    pub w: u64,
}

fn bad_request(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

/// Bounce the first request of a cold instance back to the same URI.
///
/// 307 keeps method and body, so a redirected worker call is replayed intact.
async fn warmup_redirect(
    State(service): State<Arc<FrontDoorService>>,
    request: Request,
    next: Next,
) -> Response {
    if service.warmup().take_cold() {
        let location = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());
        tracing::warn!(location = %location, "Spin-up request, redirecting");
        return Redirect::temporary(&location).into_response();
    }

    next.run(request).await
}

async fn index() -> &'static str {
    "Hello, world\n"
}

async fn health_check(State(service): State<Arc<FrontDoorService>>) -> impl IntoResponse {
    Json(service.health())
}

async fn wait_one(
    State(service): State<Arc<FrontDoorService>>,
    params: Result<Query<WaitOneParams>, QueryRejection>,
) -> Response {
    match params {
        Ok(Query(params)) => run_wait_batch(service, 1, params.d, params.w).await,
        Err(e) => bad_request(e.body_text()),
    }
}

async fn wait_many(
    State(service): State<Arc<FrontDoorService>>,
    params: Result<Query<WaitManyParams>, QueryRejection>,
) -> Response {
    match params {
        Ok(Query(params)) => run_wait_batch(service, params.n, params.d, params.w).await,
        Err(e) => bad_request(e.body_text()),
    }
}

async fn run_wait_batch(
    service: Arc<FrontDoorService>,
    count: usize,
    deadline_secs: f64,
    wait_ms: u64,
) -> Response {
    match service.run_wait_batch(count, deadline_secs, wait_ms).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) if e.is_client_error() => bad_request(e.to_string()),
        Err(e) => {
            tracing::error!(error = %e, "Wait batch could not start");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

pub fn routes(service: Arc<FrontDoorService>) -> Router {
    Router::new()
        .route("/index", get(index))
        .route("/health-check", get(health_check))
        .route("/wait1", get(wait_one))
        .route("/wait2", get(wait_many))
        .route(WORKER_PATH, post(worker_endpoint::<WaitTask>))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&service),
            warmup_redirect,
        ))
        .with_state(service)
}
