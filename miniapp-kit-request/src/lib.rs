//! # miniapp-kit-request
//!
//! HTTP request client for mini-program backends that answer with a
//! `{code, data, message}` envelope.
//!
//! ## What the client adds on top of the transport
//!
//! | Concern | Behaviour |
//! |---------|-----------|
//! | Base host | Relative urls are prefixed with `BASE_HOST`; `http(s)://` urls are used verbatim |
//! | Defaults | timeout 6000 ms, method GET, data type JSON, applied only to unset fields |
//! | Auth | `token` header read from local storage on every call, overriding the caller's |
//! | Logging | method/url/data before dispatch, result after resolution |
//! | Timeout | enforced around the whole chain |
//! | Responses | ordered response handlers, empty by default |
//!
//! Every call is a single attempt: no retry, no backoff, no deduplication.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use miniapp_kit_request::{ClientConfig, RequestClient};
//! use miniapp_kit_storage::MemoryStorage;
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Debug, Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let storage = Arc::new(MemoryStorage::new());
//!     let client = RequestClient::with_reqwest(ClientConfig::from_env(storage))?;
//!
//!     let response = client.get::<User>("/users", Some(json!({"id": 1})), None).await?;
//!     if response.data.code == 0 {
//!         println!("{:?}", response.data.data);
//!     } else {
//!         eprintln!("{}", response.data.message);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, RequestError>`](RequestError). The
//! envelope `code` is never turned into an error by default; install a
//! [`ResponseHandler`] for that.

mod client;
mod config;
mod error;
mod interceptor;
mod transport;
mod types;
mod utils;

pub use client::{RequestClient, is_absolute_url, resolve_request, resolve_url};
pub use config::{
    BASE_HOST_ENV, ClientConfig, ClientConfigBuilder, DEFAULT_TIMEOUT_MS, RequestDefaults,
};
pub use error::{RequestError, Result};
pub use interceptor::{
    FnResponseHandler, LogInterceptor, Next, RequestInterceptor, ResponseHandler,
    TOKEN_KEY, TimeoutInterceptor, TokenInterceptor,
};
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    DataType, Envelope, Header, HttpRequest, Method, RawResponse, RequestOptions, Response,
};
