//! FrontDoorService: state shared by the front-door routes.
//!
//! This service owns:
//! - The warm-up gate (process lifetime, created once at startup)
//! - The worker address resolver and the remote call channel
//! - Batch construction for the demo wait routes
//!
//! Transports delegate to this service and only translate requests and responses.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::channel::RemoteChannel;
use crate::coordinator::{DEFAULT_CONCURRENCY_FLOOR, ForkJoin, ForkJoinConfig};
use crate::demo::{MAX_WAIT_MS, WaitTask};
use crate::error::{ConfigError, ForkError};
use crate::health::Health;
use crate::resolver::{AddressResolver, ResolveError};
use crate::task::Task;
use crate::version::VersionInfo;
use crate::warmup::WarmupGate;

/// Largest batch a single front-door request may fork.
pub const MAX_BATCH: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum CreateBatchError {
    #[error(transparent)]
    InvalidDeadline(#[from] ConfigError),

    #[error("batch of {0} exceeds the limit of {max}", max = MAX_BATCH)]
    TooLarge(usize),

    #[error("wait of {0}ms exceeds the limit of {max}ms", max = MAX_WAIT_MS)]
    WaitTooLong(u64),

    #[error("worker address unavailable: {0}")]
    Unresolved(#[from] ResolveError),

    #[error(transparent)]
    Fork(#[from] ForkError),
}

impl CreateBatchError {
    /// Errors caused by the request rather than the deployment.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDeadline(_) | Self::TooLarge(_) | Self::WaitTooLong(_)
        )
    }
}

/// Outcome of one demo batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub forked: usize,
    pub joined: usize,
    pub values: Vec<String>,
}

/// Snapshot of service health for transports to query.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub status: Health,
    pub started_at: String,
    pub version: VersionInfo,
}

pub struct FrontDoorService {
    resolver: Arc<dyn AddressResolver>,
    channel: Arc<dyn RemoteChannel>,
    warmup: WarmupGate,
    concurrency_floor: usize,
    started_at: String,
    version: VersionInfo,
}

impl FrontDoorService {
    /// Create for a freshly started process (cold warm-up gate).
    pub fn new(resolver: Arc<dyn AddressResolver>, channel: Arc<dyn RemoteChannel>) -> Self {
        Self {
            resolver,
            channel,
            warmup: WarmupGate::cold(),
            concurrency_floor: DEFAULT_CONCURRENCY_FLOOR,
            started_at: chrono::Utc::now().to_rfc3339(),
            version: VersionInfo::new(),
        }
    }

    pub fn with_warmup(mut self, warmup: WarmupGate) -> Self {
        self.warmup = warmup;
        self
    }

    pub fn with_concurrency_floor(mut self, floor: usize) -> Self {
        self.concurrency_floor = floor;
        self
    }

    pub fn with_version(mut self, version: VersionInfo) -> Self {
        self.version = version;
        self
    }

    pub fn warmup(&self) -> &WarmupGate {
        &self.warmup
    }

    pub fn health(&self) -> HealthSnapshot {
        let status = if self.warmup.is_cold() {
            Health::Warming
        } else {
            Health::Ready
        };

        HealthSnapshot {
            status,
            started_at: self.started_at.clone(),
            version: self.version.clone(),
        }
    }

    /// Start a batch against this deployment's worker endpoint.
    pub fn fork_join<T: Task>(&self, deadline: Duration) -> Result<ForkJoin<T>, ResolveError> {
        let config = ForkJoinConfig::with_deadline(deadline).concurrency_floor(self.concurrency_floor);
        ForkJoin::new(config, self.resolver.as_ref(), Arc::clone(&self.channel))
    }

    /// Fork `count` waits of `wait_ms` each and join them.
    pub async fn run_wait_batch(
        &self,
        count: usize,
        deadline_secs: f64,
        wait_ms: u64,
    ) -> Result<BatchSummary, CreateBatchError> {
        if count > MAX_BATCH {
            return Err(CreateBatchError::TooLarge(count));
        }
        if wait_ms > MAX_WAIT_MS {
            return Err(CreateBatchError::WaitTooLong(wait_ms));
        }
        let deadline = ForkJoinConfig::from_secs(deadline_secs)?.deadline;

        let mut batch = self.fork_join::<WaitTask>(deadline)?;
        batch.fork_all((0..count).map(|_| WaitTask::new(wait_ms)))?;

        let results = batch.join().await;
        let values: Vec<String> = results.outputs().map(|v| v.val.clone()).collect();

        tracing::info!(
            forked = count,
            joined = values.len(),
            wait_ms,
            deadline_secs,
            "Wait batch finished"
        );

        Ok(BatchSummary {
            forked: count,
            joined: values.len(),
            values,
        })
    }
}
