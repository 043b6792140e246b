//! Transport layer for forkjoin.
//!
//! Provides the HTTP front door and worker endpoint via axum.

pub mod http;

pub use http::{ServerConfig, routes, serve};
