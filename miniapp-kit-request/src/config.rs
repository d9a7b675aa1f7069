//! Client configuration
//!
//! A client is configured once, explicitly: base host, option defaults, the
//! ordered request interceptor chain and the ordered response handler list.
//! Nothing is registered globally.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use miniapp_kit_storage::LocalStorage;

use crate::interceptor::{
    LogInterceptor, RequestInterceptor, ResponseHandler, TimeoutInterceptor, TokenInterceptor,
};
use crate::types::{DataType, Method};

/// Environment variable holding the base host for relative urls.
pub const BASE_HOST_ENV: &str = "BASE_HOST";

/// 默认请求超时（毫秒）
pub const DEFAULT_TIMEOUT_MS: u64 = 6000;

/// Values applied to every request field the caller leaves unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDefaults {
    pub timeout: Duration,
    pub method: Method,
    pub data_type: DataType,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            method: Method::Get,
            data_type: DataType::Json,
        }
    }
}

/// Configuration of a [`RequestClient`](crate::RequestClient).
#[derive(Clone, Default)]
pub struct ClientConfig {
    /// Prefix for relative urls; `None` leaves every url verbatim.
    pub base_host: Option<String>,
    pub defaults: RequestDefaults,
    /// Applied in order, outermost first.
    pub request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    /// Applied in order to each raw response before decoding.
    pub response_handlers: Vec<Arc<dyn ResponseHandler>>,
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Standard configuration: base host from `BASE_HOST`, library defaults,
    /// and the default interceptor chain reading the token from `storage`.
    pub fn from_env(storage: Arc<dyn LocalStorage>) -> Self {
        Self::builder()
            .base_host_from_env()
            .default_chain(storage)
            .build()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_host", &self.base_host)
            .field("defaults", &self.defaults)
            .field(
                "request_interceptors",
                &self
                    .request_interceptors
                    .iter()
                    .map(|i| i.name())
                    .collect::<Vec<_>>(),
            )
            .field(
                "response_handlers",
                &self
                    .response_handlers
                    .iter()
                    .map(|h| h.name())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base host. An empty value counts as unset.
    #[must_use]
    pub fn base_host(mut self, host: impl Into<String>) -> Self {
        let host = host.into();
        self.config.base_host = (!host.is_empty()).then_some(host);
        self
    }

    /// Read the base host from the `BASE_HOST` environment variable.
    #[must_use]
    pub fn base_host_from_env(mut self) -> Self {
        self.config.base_host = std::env::var(BASE_HOST_ENV)
            .ok()
            .filter(|v| !v.is_empty());
        self
    }

    #[must_use]
    pub fn defaults(mut self, defaults: RequestDefaults) -> Self {
        self.config.defaults = defaults;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.defaults.timeout = timeout;
        self
    }

    /// Append a request interceptor to the chain.
    #[must_use]
    pub fn interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.config.request_interceptors.push(interceptor);
        self
    }

    /// Append the standard chain: token injection, logging, timeout.
    #[must_use]
    pub fn default_chain(self, storage: Arc<dyn LocalStorage>) -> Self {
        self.interceptor(Arc::new(TokenInterceptor::new(storage)))
            .interceptor(Arc::new(LogInterceptor))
            .interceptor(Arc::new(TimeoutInterceptor))
    }

    /// Append a response handler.
    #[must_use]
    pub fn response_handler(mut self, handler: Arc<dyn ResponseHandler>) -> Self {
        self.config.response_handlers.push(handler);
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
