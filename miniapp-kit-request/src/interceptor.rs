//! Request interceptors and response handlers
//!
//! Request interceptors are chain-style: each receives the request and a
//! [`Next`] handle, may rewrite the request, must call [`Next::run`] to
//! continue, and sees the raw response (or error) on the way back. The end
//! of the chain is the [`Transport`](crate::Transport).
//!
//! Response handlers run after the chain, in order, on the raw response.
//! The default client has none; the list is the place to translate
//! application-level failures into errors.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use miniapp_kit_storage::LocalStorage;

use crate::error::{RequestError, Result};
use crate::transport::Transport;
use crate::types::{HttpRequest, RawResponse};
use crate::utils::log_sanitizer::{redact_header, truncate_for_log, value_for_log};

/// Local-storage key and outgoing header name of the auth token.
pub const TOKEN_KEY: &str = "token";

// ============ Chain ============

/// Chain-style request interceptor.
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    /// Short identifier, used in logs and `Debug` output.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    async fn intercept(&self, request: HttpRequest, next: Next<'_>) -> Result<RawResponse>;
}

/// The remainder of an interceptor chain.
pub struct Next<'a> {
    interceptors: &'a [Arc<dyn RequestInterceptor>],
    transport: &'a dyn Transport,
}

impl<'a> Next<'a> {
    pub(crate) fn new(
        interceptors: &'a [Arc<dyn RequestInterceptor>],
        transport: &'a dyn Transport,
    ) -> Self {
        Self {
            interceptors,
            transport,
        }
    }

    /// Pass the request to the next interceptor, or to the transport when
    /// the chain is exhausted.
    pub async fn run(self, request: HttpRequest) -> Result<RawResponse> {
        match self.interceptors.split_first() {
            Some((current, rest)) => {
                current
                    .intercept(request, Next::new(rest, self.transport))
                    .await
            }
            None => self.transport.send(&request).await,
        }
    }
}

/// Post-processing step applied to every raw response.
#[async_trait]
pub trait ResponseHandler: Send + Sync {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Return the (possibly rewritten) response, or an error to reject it.
    async fn handle(&self, response: RawResponse) -> Result<RawResponse>;
}

/// Adapts a plain function into a [`ResponseHandler`].
pub struct FnResponseHandler<F> {
    name: &'static str,
    f: F,
}

impl<F> FnResponseHandler<F>
where
    F: Fn(RawResponse) -> Result<RawResponse> + Send + Sync,
{
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

#[async_trait]
impl<F> ResponseHandler for FnResponseHandler<F>
where
    F: Fn(RawResponse) -> Result<RawResponse> + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    async fn handle(&self, response: RawResponse) -> Result<RawResponse> {
        (self.f)(response)
    }
}

// ============ Built-in interceptors ============

/// Injects the auth token from local storage into the outgoing header.
///
/// The token is read synchronously on every request and always overwrites a
/// caller-supplied `token` header. A missing token is sent as an empty
/// string; a storage failure rejects the request.
pub struct TokenInterceptor {
    storage: Arc<dyn LocalStorage>,
}

impl TokenInterceptor {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl RequestInterceptor for TokenInterceptor {
    fn name(&self) -> &'static str {
        "token"
    }

    async fn intercept(&self, mut request: HttpRequest, next: Next<'_>) -> Result<RawResponse> {
        let token = self.storage.get_item(TOKEN_KEY)?.unwrap_or_default();
        request.header.insert(TOKEN_KEY.to_string(), token);
        next.run(request).await
    }
}

/// Logs each request before dispatch and its outcome after resolution.
pub struct LogInterceptor;

#[async_trait]
impl RequestInterceptor for LogInterceptor {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn intercept(&self, request: HttpRequest, next: Next<'_>) -> Result<RawResponse> {
        let url = request.url.clone();
        log::debug!(
            "http {} --> {url} data: {}",
            request.method,
            value_for_log(request.data.as_ref())
        );
        log::trace!("http --> {url} header: {:?}", redact_header(&request.header));

        let started = Instant::now();
        let result = next.run(request).await;
        let elapsed = started.elapsed();

        match &result {
            Ok(response) => log::debug!(
                "http <-- {url} result: {} {} ({}ms)",
                response.status,
                truncate_for_log(&response.text()),
                elapsed.as_millis()
            ),
            Err(e) => log::warn!("http <-- {url} failed after {}ms: {e}", elapsed.as_millis()),
        }

        result
    }
}

/// Bounds the rest of the chain by the request's timeout.
pub struct TimeoutInterceptor;

#[async_trait]
impl RequestInterceptor for TimeoutInterceptor {
    fn name(&self) -> &'static str {
        "timeout"
    }

    async fn intercept(&self, request: HttpRequest, next: Next<'_>) -> Result<RawResponse> {
        let url = request.url.clone();
        let timeout = request.timeout;
        tokio::time::timeout(timeout, next.run(request))
            .await
            .map_err(|_| RequestError::Timeout {
                url,
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            })?
    }
}
