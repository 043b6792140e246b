//! Remote call channel.
//!
//! Dispatch sends one payload to the worker endpoint and returns a handle to
//! the eventual response body:
//! - The call is in flight before `dispatch` returns (spawned on the runtime)
//! - The deadline is applied per call, never on the shared client
//! - Redirects are followed transparently, keeping method and body on 307/308
//! - An empty payload is a padding call; callers drop its handle

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::task::JoinHandle;

use crate::error::ChannelError;
use crate::version::VersionInfo;

const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Future yielding the raw body of one dispatched call.
pub type CallFuture = Pin<Box<dyn Future<Output = Result<Bytes, ChannelError>> + Send>>;

/// Handle to one in-flight call. Awaited at most once via `wait`.
pub struct CallHandle {
    inner: CallFuture,
}

impl CallHandle {
    pub fn new(future: impl Future<Output = Result<Bytes, ChannelError>> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(future),
        }
    }

    /// A handle that is already resolved.
    pub fn ready(result: Result<Bytes, ChannelError>) -> Self {
        Self::new(std::future::ready(result))
    }

    /// Wrap a spawned request task. Dropping the handle detaches the task,
    /// the request itself keeps running.
    pub fn spawned(handle: JoinHandle<Result<Bytes, ChannelError>>) -> Self {
        Self::new(async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => Err(ChannelError::Aborted(e.to_string())),
            }
        })
    }

    pub async fn wait(self) -> Result<Bytes, ChannelError> {
        self.inner.await
    }
}

impl fmt::Debug for CallHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallHandle").finish_non_exhaustive()
    }
}

/// Capability to issue independent remote calls against a worker endpoint.
pub trait RemoteChannel: Send + Sync {
    /// Send `payload` (or nothing, for padding) to `target`. Must not block.
    fn dispatch(&self, target: &str, payload: Option<Bytes>, deadline: Duration) -> CallHandle;
}

impl<C: RemoteChannel + ?Sized> RemoteChannel for Arc<C> {
    fn dispatch(&self, target: &str, payload: Option<Bytes>, deadline: Duration) -> CallHandle {
        (**self).dispatch(target, payload, deadline)
    }
}

#[derive(Debug, Clone)]
pub struct HttpChannelConfig {
    pub max_redirects: usize,
}

impl Default for HttpChannelConfig {
    fn default() -> Self {
        Self {
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

/// `RemoteChannel` over HTTP POST.
///
/// Every dispatch spawns its request on the current Tokio runtime. Outside a
/// runtime the call fails at once with `ChannelError::Aborted`.
#[derive(Debug, Clone)]
pub struct HttpChannel {
    client: reqwest::Client,
}

impl HttpChannel {
    pub fn new() -> Result<Self, ChannelError> {
        Self::with_config(HttpChannelConfig::default())
    }

    pub fn with_config(config: HttpChannelConfig) -> Result<Self, ChannelError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Ok(value) = reqwest::header::HeaderValue::from_str(&VersionInfo::user_agent()) {
            headers.insert(reqwest::header::USER_AGENT, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| ChannelError::Transport(e.to_string()))?;

        Ok(Self { client })
    }

    fn build_request(
        &self,
        target: &str,
        payload: Option<Bytes>,
        deadline: Duration,
    ) -> reqwest::RequestBuilder {
        let request = self.client.post(target).timeout(deadline);
        match payload {
            Some(body) => request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body),
            None => request,
        }
    }
}

impl RemoteChannel for HttpChannel {
    fn dispatch(&self, target: &str, payload: Option<Bytes>, deadline: Duration) -> CallHandle {
        let padding = payload.is_none();

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(padding, "No Tokio runtime, remote call not sent");
            return CallHandle::ready(Err(ChannelError::Aborted(
                "no Tokio runtime".to_string(),
            )));
        };

        let request = self.build_request(target, payload, deadline);
        let handle = runtime.spawn(async move {
            let response = request
                .send()
                .await
                .map_err(|e| ChannelError::from_reqwest(e, deadline))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ChannelError::Status {
                    status: status.as_u16(),
                });
            }

            response
                .bytes()
                .await
                .map_err(|e| ChannelError::from_reqwest(e, deadline))
        });

        tracing::trace!(
            padding,
            deadline_ms = deadline.as_millis() as u64,
            "Dispatched remote call"
        );
        CallHandle::spawned(handle)
    }
}
