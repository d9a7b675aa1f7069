//! Request client
//!
//! Resolves caller options against the configured defaults and base host,
//! drives the interceptor chain, applies the response handlers and decodes
//! the envelope.

use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde::de::value::{Error as ValueError, SeqDeserializer};
use serde_json::Value;

use crate::config::{ClientConfig, RequestDefaults};
use crate::error::{RequestError, Result};
use crate::interceptor::Next;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{
    DataType, Envelope, Header, HttpRequest, Method, RawResponse, RequestOptions, Response,
};
use crate::utils::log_sanitizer::truncate_for_log;

/// Whether `url` carries an explicit `http://` or `https://` scheme.
pub fn is_absolute_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Prefix a relative url with the base host, when one is configured.
pub fn resolve_url(url: &str, base_host: Option<&str>) -> String {
    match base_host {
        Some(host) if !host.is_empty() && !is_absolute_url(url) => format!("{host}{url}"),
        _ => url.to_string(),
    }
}

/// Merge caller options over the defaults; the resolved url always wins.
pub fn resolve_request(
    options: RequestOptions,
    defaults: &RequestDefaults,
    base_host: Option<&str>,
) -> Result<HttpRequest> {
    if options.url.is_empty() {
        return Err(RequestError::InvalidUrl(options.url));
    }

    Ok(HttpRequest {
        url: resolve_url(&options.url, base_host),
        method: options.method.unwrap_or(defaults.method),
        header: options.header,
        data: options.data,
        timeout: options.timeout.unwrap_or(defaults.timeout),
        data_type: options.data_type.unwrap_or(defaults.data_type),
    })
}

/// HTTP client producing [`Envelope`]s.
///
/// Cheap to share: wrap in an `Arc` or pass by reference. Calls are
/// independent of each other.
#[derive(Clone)]
pub struct RequestClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl RequestClient {
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    /// Create a client over a fresh [`ReqwestTransport`].
    pub fn with_reqwest(config: ClientConfig) -> Result<Self> {
        Ok(Self::new(config, Arc::new(ReqwestTransport::new()?)))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve options exactly as [`request`](Self::request) would.
    pub fn resolve(&self, options: RequestOptions) -> Result<HttpRequest> {
        resolve_request(
            options,
            &self.config.defaults,
            self.config.base_host.as_deref(),
        )
    }

    /// Perform a single request.
    pub async fn request<T: DeserializeOwned>(&self, options: RequestOptions) -> Result<Response<T>> {
        let request = self.resolve(options)?;
        let data_type = request.data_type;

        let mut response = Next::new(&self.config.request_interceptors, self.transport.as_ref())
            .run(request)
            .await?;

        for handler in &self.config.response_handlers {
            response = handler.handle(response).await?;
        }

        decode(response, data_type)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        data: Option<Value>,
        header: Option<Header>,
    ) -> Result<Response<T>> {
        self.request(verb_options(url, Method::Get, data, header))
            .await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        url: &str,
        data: Option<Value>,
        header: Option<Header>,
    ) -> Result<Response<T>> {
        self.request(verb_options(url, Method::Post, data, header))
            .await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        url: &str,
        data: Option<Value>,
        header: Option<Header>,
    ) -> Result<Response<T>> {
        self.request(verb_options(url, Method::Put, data, header))
            .await
    }

    /// DELETE request.
    pub async fn del<T: DeserializeOwned>(
        &self,
        url: &str,
        data: Option<Value>,
        header: Option<Header>,
    ) -> Result<Response<T>> {
        self.request(verb_options(url, Method::Delete, data, header))
            .await
    }
}

fn verb_options(
    url: &str,
    method: Method,
    data: Option<Value>,
    header: Option<Header>,
) -> RequestOptions {
    RequestOptions {
        url: url.to_string(),
        method: Some(method),
        header: header.unwrap_or_default(),
        data: Some(data.unwrap_or_else(|| Value::Object(serde_json::Map::new()))),
        ..RequestOptions::default()
    }
}

/// Decode a raw response into an envelope.
///
/// - `Json` parses the body as an envelope.
/// - `Text` requires a UTF-8 body and wraps it verbatim, with the HTTP status
///   as `code`.
/// - `ArrayBuffer` wraps the body bytes unchanged, with the HTTP status as
///   `code`; `T` must accept a byte sequence (`Vec<u8>`).
///
/// An undecodable body on a non-2xx status is reported as
/// [`RequestError::HttpStatus`].
fn decode<T: DeserializeOwned>(raw: RawResponse, data_type: DataType) -> Result<Response<T>> {
    let status = raw.status;
    let wrap = |data: T| Envelope {
        code: i64::from(status),
        data,
        message: String::new(),
    };

    let decoded = match data_type {
        DataType::Json => {
            serde_json::from_slice::<Envelope<T>>(&raw.body).map_err(|e| e.to_string())
        }
        DataType::Text => std::str::from_utf8(&raw.body)
            .map_err(|e| format!("response body is not valid UTF-8: {e}"))
            .and_then(|text| {
                serde_json::from_value::<T>(Value::String(text.to_string()))
                    .map_err(|e| e.to_string())
            })
            .map(wrap),
        DataType::ArrayBuffer => {
            let bytes = SeqDeserializer::<_, ValueError>::new(raw.body.iter().copied());
            <T as Deserialize>::deserialize(bytes)
                .map_err(|e| e.to_string())
                .map(wrap)
        }
    };

    match decoded {
        Ok(data) => Ok(Response {
            status: raw.status,
            header: raw.header,
            data,
        }),
        Err(_) if !raw.is_success() => Err(RequestError::HttpStatus {
            status: raw.status,
            body: truncate_for_log(&raw.text()),
        }),
        Err(e) => {
            log::error!("Envelope decode failed: {e}");
            log::error!("Raw response: {}", truncate_for_log(&raw.text()));
            Err(RequestError::Decode(e))
        }
    }
}
