//! Worker responder - the endpoint side of a dispatched call.
//!
//! Each call is stateless: decode the task, run it, encode the output.
//! Empty bodies are padding calls and succeed without doing anything.

use std::time::Instant;

use axum::{
    body::Bytes,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::codec;
use crate::error::DecodeError;
use crate::task::{Task, TaskError};

/// Outcome of one worker invocation.
#[derive(Debug)]
pub enum WorkerReply {
    /// Empty body: nothing to run.
    Padding,
    /// Encoded task output.
    Completed(Bytes),
    /// Body was not a task of the expected type.
    Rejected(DecodeError),
    /// Task raised, or its output could not be encoded.
    Failed(String),
}

impl WorkerReply {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Padding | Self::Completed(_) => StatusCode::OK,
            Self::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WorkerReply {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Padding => status.into_response(),
            Self::Completed(body) => {
                (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
            }
            Self::Rejected(e) => (status, e.to_string()).into_response(),
            Self::Failed(message) => (status, message).into_response(),
        }
    }
}

/// Run one call synchronously on the current thread.
pub fn respond<T: Task>(body: &[u8]) -> WorkerReply {
    if body.is_empty() {
        tracing::debug!("Padding call, nothing to run");
        return WorkerReply::Padding;
    }

    let task: T = match codec::decode(body) {
        Ok(task) => task,
        Err(e) => {
            tracing::warn!(error = %e, "Rejecting undecodable task");
            return WorkerReply::Rejected(e);
        }
    };

    let start = Instant::now();
    let output = match task.call() {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!(task = ?task, error = %e, "Task failed");
            return WorkerReply::Failed(e.to_string());
        }
    };

    match codec::encode(&output) {
        Ok(encoded) => {
            tracing::debug!(
                task = ?task,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Task completed"
            );
            WorkerReply::Completed(encoded)
        }
        Err(e) => {
            tracing::warn!(task = ?task, error = %e, "Task output could not be encoded");
            WorkerReply::Failed(e.to_string())
        }
    }
}

/// axum handler for the worker endpoint.
///
/// Tasks may sleep or burn CPU, so they run on the blocking pool.
pub async fn worker_endpoint<T: Task>(body: Bytes) -> WorkerReply {
    if body.is_empty() {
        return WorkerReply::Padding;
    }

    match tokio::task::spawn_blocking(move || respond::<T>(&body)).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(error = %e, "Worker task did not complete");
            WorkerReply::Failed(TaskError::Panicked.to_string())
        }
    }
}
