//! Network transport
//!
//! The transport is the single collaborator that actually performs the HTTP
//! round trip. It sits at the end of the interceptor chain and knows nothing
//! about envelopes, tokens or base hosts.
//!
//! # Design principles
//! - **Single attempt** - no retry, no backoff; every failure is returned
//! - **Any status resolves** - non-2xx responses are data, not errors
//! - **Pluggable** - tests and embedders provide their own [`Transport`]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::error::{RequestError, Result};
use crate::types::{DataType, Header, HttpRequest, Method, RawResponse};
use crate::utils::log_sanitizer::truncate_for_log;

/// 默认连接超时（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Executes a resolved request against the network.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<RawResponse>;
}

/// [`Transport`] backed by `reqwest`.
///
/// GET data becomes query parameters; POST/PUT/DELETE data is sent as a JSON
/// body. The request timeout is applied per call.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with its own connection pool.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| RequestError::Network {
                url: String::new(),
                detail: format!("Failed to create HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    /// Reuse an existing `reqwest::Client`.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn build(&self, request: &HttpRequest) -> Result<RequestBuilder> {
        let url = match (request.method, &request.data) {
            (Method::Get, Some(Value::String(query))) => with_raw_query(&request.url, query),
            _ => request.url.clone(),
        };

        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };

        let mut builder = builder.timeout(request.timeout);

        for (name, value) in &request.header {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| RequestError::Serialization(format!("header name '{name}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| RequestError::Serialization(format!("header '{name}': {e}")))?;
            builder = builder.header(name, value);
        }

        if request.data_type == DataType::Json && !has_header(&request.header, ACCEPT.as_str()) {
            builder = builder.header(ACCEPT, "application/json");
        }

        match (&request.method, &request.data) {
            (_, None | Some(Value::Null)) | (Method::Get, Some(Value::String(_))) => {}
            (Method::Get, Some(data)) => builder = builder.query(&query_pairs(data)?),
            (_, Some(data)) => builder = builder.json(data),
        }

        Ok(builder)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<RawResponse> {
        let url = request.url.as_str();
        log::debug!("{} {url}", request.method);

        let response = self.build(request)?.send().await.map_err(|e| {
            if e.is_timeout() {
                RequestError::Timeout {
                    url: url.to_string(),
                    timeout_ms: u64::try_from(request.timeout.as_millis()).unwrap_or(u64::MAX),
                }
            } else {
                RequestError::Network {
                    url: url.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        log::debug!("Response Status: {status}");

        let header: Header = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| RequestError::Network {
                url: url.to_string(),
                detail: format!("Failed to read response body: {e}"),
            })?
            .to_vec();

        log::debug!(
            "Response Body: {}",
            truncate_for_log(&String::from_utf8_lossy(&body))
        );

        Ok(RawResponse {
            status,
            header,
            body,
        })
    }
}

fn has_header(header: &Header, name: &str) -> bool {
    header.keys().any(|k| k.eq_ignore_ascii_case(name))
}

/// Append a pre-encoded query string to `url`, sent verbatim.
fn with_raw_query(url: &str, query: &str) -> String {
    let query = query.trim_start_matches('?');
    if query.is_empty() {
        url.to_string()
    } else if url.contains('?') {
        format!("{url}&{query}")
    } else {
        format!("{url}?{query}")
    }
}

/// Flatten GET data into query pairs.
///
/// Object members become `key=value` (strings verbatim, other values as
/// JSON text, nulls skipped). Strings are handled by [`with_raw_query`];
/// any other non-object is rejected.
fn query_pairs(data: &Value) -> Result<Vec<(String, String)>> {
    let Value::Object(map) = data else {
        return Err(RequestError::Serialization(format!(
            "GET data must be an object, got: {}",
            truncate_for_log(&data.to_string())
        )));
    };

    Ok(map
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect())
}
