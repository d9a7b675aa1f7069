//! Log sanitization utilities
//!
//! Keeps request logs readable and free of credentials: long bodies are
//! truncated and the auth token never reaches the log output.

use serde_json::Value;

use crate::interceptor::TOKEN_KEY;
use crate::types::Header;

/// Maximum number of bytes of a body included in log output.
const TRUNCATE_LIMIT: usize = 512;

/// Placeholder logged instead of a credential.
const REDACTED: &str = "***";

/// Largest char boundary not after `index`.
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    (0..=index).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}

/// Truncate a string for logging, noting the total length when cut.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        return s.to_string();
    }
    format!(
        "{}... [truncated, total {} bytes]",
        &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
        s.len()
    )
}

/// Render optional request data for logging.
pub fn value_for_log(value: Option<&Value>) -> String {
    value.map_or_else(|| "{}".to_string(), |v| truncate_for_log(&v.to_string()))
}

/// Copy of `header` with credential values masked.
pub fn redact_header(header: &Header) -> Header {
    header
        .iter()
        .map(|(name, value)| {
            let sensitive =
                name.eq_ignore_ascii_case(TOKEN_KEY) || name.eq_ignore_ascii_case("authorization");
            let shown = if sensitive && !value.is_empty() {
                REDACTED.to_string()
            } else {
                value.clone()
            };
            (name.clone(), shown)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn short_string_unchanged() {
        assert_eq!(truncate_for_log("ok"), "ok");
    }

    #[test]
    fn over_limit_truncated() {
        let s = "a".repeat(TRUNCATE_LIMIT + 10);
        let result = truncate_for_log(&s);
        assert!(result.starts_with(&"a".repeat(TRUNCATE_LIMIT)));
        assert!(result.ends_with(&format!("total {} bytes]", TRUNCATE_LIMIT + 10)));
    }

    #[test]
    fn multibyte_chars_safe() {
        let s = "数".repeat(300);
        assert!(truncate_for_log(&s).contains("[truncated"));
    }

    #[test]
    fn missing_data_logs_as_empty_object() {
        assert_eq!(value_for_log(None), "{}");
        assert_eq!(value_for_log(Some(&json!({"id": 1}))), r#"{"id":1}"#);
    }

    #[test]
    fn token_and_authorization_are_masked() {
        let mut header = Header::new();
        header.insert("token".to_string(), "secret".to_string());
        header.insert("Authorization".to_string(), "Bearer x".to_string());
        header.insert("x-trace".to_string(), "42".to_string());

        let redacted = redact_header(&header);
        assert_eq!(redacted["token"], "***");
        assert_eq!(redacted["Authorization"], "***");
        assert_eq!(redacted["x-trace"], "42");
    }

    #[test]
    fn empty_token_stays_visible() {
        let mut header = Header::new();
        header.insert("token".to_string(), String::new());
        assert_eq!(redact_header(&header)["token"], "");
    }
}
