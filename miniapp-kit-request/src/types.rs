use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Header mapping sent with a request or received with a response.
pub type Header = BTreeMap<String, String>;

// ============ Method / DataType ============

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected encoding of the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    /// Body is a JSON envelope `{code, data, message}`.
    #[default]
    Json,
    /// Body must be UTF-8; it is kept verbatim and wrapped into an envelope
    /// by the client.
    Text,
    /// Body bytes are kept as-is and wrapped into an envelope by the client.
    #[serde(rename = "ARRAYBUFFER")]
    ArrayBuffer,
}

// ============ Envelope ============

/// Normalized response shape every request resolves to.
///
/// `code` and `message` are always present; a body missing either is a
/// decode error, never a partial envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    pub data: T,
    pub message: String,
}

// ============ Request ============

/// Caller-supplied options for a single request.
///
/// Fields left as `None` are filled from
/// [`RequestDefaults`](crate::RequestDefaults) when the request is resolved.
/// Built fresh per call; the client never keeps it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Absolute (`http://` / `https://`) or base-host-relative url.
    pub url: String,
    pub method: Option<Method>,
    pub header: Header,
    /// JSON body for POST/PUT/DELETE. For GET, an object becomes query
    /// parameters and a string is used as a pre-encoded query string; other
    /// values are rejected.
    pub data: Option<Value>,
    pub timeout: Option<Duration>,
    pub data_type: Option<DataType>,
}

impl RequestOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    #[must_use]
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.header.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }
}

/// A fully resolved request, as seen by interceptors and the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub header: Header,
    pub data: Option<Value>,
    pub timeout: Duration,
    pub data_type: DataType,
}

// ============ Response ============

/// Response as returned by the transport, before envelope decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub header: Header,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            header: Header::new(),
            body: body.into(),
        }
    }

    /// Body as text, with invalid UTF-8 replaced. For logs and error messages.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Result of a successful call: transport metadata plus the decoded envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<T> {
    pub status: u16,
    pub header: Header,
    pub data: Envelope<T>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn method_serializes_uppercase() {
        assert_eq!(serde_json::to_value(Method::Delete).unwrap(), json!("DELETE"));
        assert_eq!(Method::Put.to_string(), "PUT");
        assert_eq!(Method::default(), Method::Get);
    }

    #[test]
    fn data_type_defaults_to_json() {
        assert_eq!(DataType::default(), DataType::Json);
        assert_eq!(serde_json::to_value(DataType::Json).unwrap(), json!("JSON"));
    }

    #[test]
    fn envelope_requires_code_and_message() {
        let ok: Envelope<Value> =
            serde_json::from_value(json!({"code": 0, "data": {"id": 1}, "message": "ok"})).unwrap();
        assert_eq!(ok.data["id"], 1);

        let missing_message =
            serde_json::from_value::<Envelope<Value>>(json!({"code": 0, "data": null}));
        assert!(missing_message.is_err());
    }

    #[test]
    fn options_builder_only_sets_given_fields() {
        let opts = RequestOptions::new("/users")
            .method(Method::Post)
            .header("x-trace", "1");
        assert_eq!(opts.method, Some(Method::Post));
        assert_eq!(opts.header.get("x-trace").map(String::as_str), Some("1"));
        assert!(opts.timeout.is_none());
        assert!(opts.data_type.is_none());
        assert!(opts.data.is_none());
    }

    #[test]
    fn array_buffer_serializes_like_the_platform() {
        assert_eq!(
            serde_json::to_value(DataType::ArrayBuffer).unwrap(),
            json!("ARRAYBUFFER")
        );
    }

    #[test]
    fn raw_response_keeps_bytes() {
        let raw = RawResponse::new(200, vec![0xff, 0x41]);
        assert_eq!(raw.body, vec![0xff, 0x41]);
        assert_eq!(raw.text(), "\u{fffd}A");
    }

    #[test]
    fn raw_response_success_range() {
        assert!(RawResponse::new(204, "").is_success());
        assert!(!RawResponse::new(302, "").is_success());
        assert!(!RawResponse::new(500, "").is_success());
    }
}
