//! Worker endpoint address resolution.
//!
//! The coordinator only needs a URL. Where that URL comes from depends on the
//! deployment, so it is injected as an `AddressResolver`:
//! - `StaticResolver`: a fixed URL (tests, embedding)
//! - `EnvironmentResolver`: debug address locally, versioned app host in production

/// Path the worker endpoint is mounted on.
pub const WORKER_PATH: &str = "/forkface";

/// Base address used in debug mode unless overridden.
pub const DEFAULT_DEV_ADDRESS: &str = "http://localhost:8888";

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("application id is not set")]
    MissingAppId,

    #[error("application version id is not set")]
    MissingVersion,
}

/// Capability to locate the worker endpoint for this deployment.
pub trait AddressResolver: Send + Sync {
    fn resolve(&self) -> Result<String, ResolveError>;
}

#[derive(Debug, Clone)]
pub struct StaticResolver {
    url: String,
}

impl StaticResolver {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl AddressResolver for StaticResolver {
    fn resolve(&self) -> Result<String, ResolveError> {
        Ok(self.url.clone())
    }
}

/// Deployment identity, read once at the edge of the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentConfig {
    pub debug: bool,
    pub app_id: Option<String>,
    pub version_id: Option<String>,
    /// Explicit worker URL; wins over every other rule.
    pub worker_url: Option<String>,
    /// Base address for debug mode.
    pub dev_address: Option<String>,
}

impl EnvironmentConfig {
    /// Read `FORKJOIN_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            debug: lookup("FORKJOIN_DEBUG")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            app_id: non_empty("FORKJOIN_APP_ID"),
            version_id: non_empty("FORKJOIN_VERSION_ID"),
            worker_url: non_empty("FORKJOIN_WORKER_URL"),
            dev_address: non_empty("FORKJOIN_DEV_ADDRESS"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnvironmentResolver {
    config: EnvironmentConfig,
}

impl EnvironmentResolver {
    pub fn new(config: EnvironmentConfig) -> Self {
        Self { config }
    }
}

impl AddressResolver for EnvironmentResolver {
    fn resolve(&self) -> Result<String, ResolveError> {
        if let Some(ref url) = self.config.worker_url {
            return Ok(url.clone());
        }

        if self.config.debug {
            let base = self
                .config
                .dev_address
                .as_deref()
                .unwrap_or(DEFAULT_DEV_ADDRESS)
                .trim_end_matches('/');
            return Ok(format!("{}{}", base, WORKER_PATH));
        }

        let version = self
            .config
            .version_id
            .as_deref()
            .ok_or(ResolveError::MissingVersion)?;
        let app_id = self
            .config
            .app_id
            .as_deref()
            .ok_or(ResolveError::MissingAppId)?;

        // Deployed version ids look like "<major>.<minor>"; only the major part
        // addresses a serving version.
        let major = version.split('.').next().unwrap_or(version);

        Ok(format!(
            "http://{}.latest.{}.appspot.com{}",
            major, app_id, WORKER_PATH
        ))
    }
}
