//! ForkJoin - fans work out as independent remote calls and joins the results.
//!
//! Flow:
//! 1. `fork` encodes a task, dispatches it and pushes the pending call
//! 2. `join` pads the batch up to the concurrency floor with empty calls
//! 3. `join` pops pending calls (last forked first), awaits each in turn and
//!    collects the decoded outputs keyed by fork token
//!
//! Failed calls are logged and left out of the result; there is no batch error.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::channel::{CallHandle, RemoteChannel};
use crate::codec;
use crate::error::{ConfigError, ForkError};
use crate::resolver::{AddressResolver, ResolveError};
use crate::task::Task;

pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(5);
pub const DEFAULT_CONCURRENCY_FLOOR: usize = 3;

/// Identifies one fork. Generated per call, so forking equal tasks twice
/// yields two separate entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForkToken(uuid::Uuid);

impl ForkToken {
    fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl fmt::Display for ForkToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct ForkJoinConfig {
    /// Applied to every dispatched call, padding included.
    pub deadline: Duration,
    /// Minimum number of calls in flight when `join` starts.
    pub concurrency_floor: usize,
}

impl Default for ForkJoinConfig {
    fn default() -> Self {
        Self {
            deadline: DEFAULT_DEADLINE,
            concurrency_floor: DEFAULT_CONCURRENCY_FLOOR,
        }
    }
}

impl ForkJoinConfig {
    pub fn with_deadline(deadline: Duration) -> Self {
        Self {
            deadline,
            ..Default::default()
        }
    }

    /// Deadline given as floating-point seconds.
    pub fn from_secs(seconds: f64) -> Result<Self, ConfigError> {
        let deadline = Duration::try_from_secs_f64(seconds)
            .map_err(|_| ConfigError::InvalidDeadline(seconds))?;
        Ok(Self::with_deadline(deadline))
    }

    pub fn concurrency_floor(mut self, floor: usize) -> Self {
        self.concurrency_floor = floor;
        self
    }
}

/// Lifecycle of a `ForkJoin`. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Created,
    Forking,
    Joining,
    Drained,
}

/// A forked task together with its decoded output.
#[derive(Debug)]
pub struct Joined<T: Task> {
    pub item: T,
    pub output: T::Output,
}

/// Result of `join`: one entry per call that completed and decoded.
#[derive(Debug)]
pub struct CorrelationMap<T: Task> {
    entries: HashMap<ForkToken, Joined<T>>,
}

impl<T: Task> CorrelationMap<T> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, token: &ForkToken) -> Option<&Joined<T>> {
        self.entries.get(token)
    }

    pub fn contains(&self, token: &ForkToken) -> bool {
        self.entries.contains_key(token)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ForkToken, &Joined<T>)> {
        self.entries.iter()
    }

    pub fn outputs(&self) -> impl Iterator<Item = &T::Output> {
        self.entries.values().map(|joined| &joined.output)
    }

    pub fn into_inner(self) -> HashMap<ForkToken, Joined<T>> {
        self.entries
    }
}

impl<T: Task> Default for CorrelationMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Task> IntoIterator for CorrelationMap<T> {
    type Item = (ForkToken, Joined<T>);
    type IntoIter = std::collections::hash_map::IntoIter<ForkToken, Joined<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

struct PendingCall<T> {
    token: ForkToken,
    item: T,
    call: CallHandle,
}

/// Fork/join coordinator for one batch.
///
/// Single use: construct, `fork` any number of tasks, `join` once. With
/// `HttpChannel`, tasks forked outside a Tokio runtime are never sent and
/// are skipped at join.
pub struct ForkJoin<T: Task> {
    target: String,
    config: ForkJoinConfig,
    channel: Arc<dyn RemoteChannel>,
    stack: Vec<PendingCall<T>>,
    phase: Phase,
}

impl<T: Task> ForkJoin<T> {
    /// Resolve the worker address once and start an empty batch.
    pub fn new(
        config: ForkJoinConfig,
        resolver: &dyn AddressResolver,
        channel: Arc<dyn RemoteChannel>,
    ) -> Result<Self, ResolveError> {
        let target = resolver.resolve()?;
        tracing::debug!(
            worker = %target,
            deadline_ms = config.deadline.as_millis() as u64,
            "Created fork/join batch"
        );
        Ok(Self {
            target,
            config,
            channel,
            stack: Vec::new(),
            phase: Phase::Created,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn deadline(&self) -> Duration {
        self.config.deadline
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Number of dispatched calls not yet joined.
    pub fn pending(&self) -> usize {
        self.stack.len()
    }

    /// Dispatch `item` without waiting for its result.
    pub fn fork(&mut self, item: T) -> Result<ForkToken, ForkError> {
        if matches!(self.phase, Phase::Joining | Phase::Drained) {
            return Err(ForkError::AlreadyJoined);
        }

        let payload = codec::encode(&item)?;
        let call = self
            .channel
            .dispatch(&self.target, Some(payload), self.config.deadline);

        let token = ForkToken::new();
        tracing::trace!(token = %token, item = ?item, "Forked");
        self.stack.push(PendingCall { token, item, call });
        self.phase = Phase::Forking;
        Ok(token)
    }

    /// Fork every item in order, stopping at the first encode failure.
    /// Items forked before the failure stay in flight.
    pub fn fork_all(
        &mut self,
        items: impl IntoIterator<Item = T>,
    ) -> Result<Vec<ForkToken>, ForkError> {
        items.into_iter().map(|item| self.fork(item)).collect()
    }

    /// Harvest every pending call. A second call returns an empty map.
    ///
    /// If a `join` future is dropped part way, the next `join` resumes the
    /// drain without padding again. The call being awaited when the future
    /// was dropped is lost.
    pub async fn join(&mut self) -> CorrelationMap<T> {
        match self.phase {
            Phase::Drained => return CorrelationMap::new(),
            Phase::Joining => {}
            Phase::Created | Phase::Forking => {
                self.phase = Phase::Joining;
                self.pad_to_floor();
            }
        }

        let forked = self.stack.len();
        let mut results = CorrelationMap::new();

        while let Some(PendingCall { token, item, call }) = self.stack.pop() {
            let body = match call.wait().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(token = %token, item = ?item, error = %e, "Call failed");
                    continue;
                }
            };

            match codec::decode::<T::Output>(&body) {
                Ok(output) => {
                    results.entries.insert(token, Joined { item, output });
                }
                Err(e) => {
                    tracing::warn!(token = %token, item = ?item, error = %e, "Undecodable result");
                }
            }
        }

        self.phase = Phase::Drained;
        tracing::debug!(
            forked,
            joined = results.len(),
            failed = forked - results.len(),
            "Join complete"
        );
        results
    }

    fn pad_to_floor(&self) {
        let padding = self.config.concurrency_floor.saturating_sub(self.stack.len());
        if padding == 0 {
            return;
        }

        tracing::debug!(padding, "Padding batch to concurrency floor");
        for _ in 0..padding {
            // Padding results are never read.
            drop(
                self.channel
                    .dispatch(&self.target, None, self.config.deadline),
            );
        }
    }
}

impl<T: Task> fmt::Debug for ForkJoin<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForkJoin")
            .field("target", &self.target)
            .field("config", &self.config)
            .field("pending", &self.stack.len())
            .field("phase", &self.phase)
            .finish()
    }
}
