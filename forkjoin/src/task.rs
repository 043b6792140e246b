//! Units of deferred work.

use std::fmt::Debug;

use serde::{Serialize, de::DeserializeOwned};

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task failed: {0}")]
    Failed(String),

    #[error("task panicked")]
    Panicked,
}

impl TaskError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// A self-contained unit of work that can be shipped to a worker and run there.
///
/// The coordinator never calls `call` itself; it only encodes the task,
/// dispatches it and keeps it for correlation. Several kinds of work are
/// expressed as one serde-tagged enum implementing this trait.
pub trait Task: Serialize + DeserializeOwned + Debug + Send + 'static {
    type Output: Serialize + DeserializeOwned + Debug + Send + 'static;

    /// Execute the work synchronously.
    fn call(&self) -> Result<Self::Output, TaskError>;
}
