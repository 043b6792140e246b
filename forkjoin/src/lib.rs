//! forkjoin: fork/join over independent remote calls.
//!
//! For platforms that forbid background threads but allow outbound calls to
//! short-lived workers: each forked task becomes one call, and `join` gathers
//! whatever completed within the deadline.

mod health;
mod version;

pub mod channel;
pub mod codec;
pub mod coordinator;
pub mod demo;
pub mod error;
pub mod resolver;
pub mod service;
pub mod task;
pub mod transport;
pub mod warmup;
pub mod worker;

pub use channel::{CallHandle, HttpChannel, HttpChannelConfig, RemoteChannel};
pub use coordinator::{CorrelationMap, ForkJoin, ForkJoinConfig, ForkToken, Joined, Phase};
pub use error::{ChannelError, ConfigError, DecodeError, EncodeError, ForkError};
pub use health::Health;
pub use resolver::{
    AddressResolver, EnvironmentConfig, EnvironmentResolver, ResolveError, StaticResolver,
};
pub use service::{BatchSummary, CreateBatchError, FrontDoorService, HealthSnapshot};
pub use task::{Task, TaskError};
pub use version::{FORKJOIN_VERSION, VersionInfo};
pub use warmup::WarmupGate;
