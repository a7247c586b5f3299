//! HTTP transport helper for the vectorization service.
//!
//! Issues a single JSON or multipart request and returns a normalized
//! `{status, data}` reply. Status codes are data, not failures: only a
//! connection that cannot be established at all surfaces as an error.

use crate::multipart;
use crate::result::{TrazarError, TrazarResult};
use serde_json::Value;
use std::path::Path;

/// A normalized service reply.
#[derive(Debug, Clone)]
pub struct HttpReply {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body when the body parses as JSON, else the raw text
    /// wrapped in `Value::String`.
    pub data: Value,
}

impl HttpReply {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The server-supplied failure message, if any (`message` or `error`
    /// field of a structured body), surfaced verbatim.
    pub fn server_message(&self) -> Option<&str> {
        self.data
            .get("message")
            .or_else(|| self.data.get("error"))
            .and_then(Value::as_str)
    }
}

/// Parse a response body: structured data when it parses, raw text otherwise.
pub(crate) fn parse_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Stateless request issuer. Holds one `reqwest::Client` and nothing else;
/// no retries, no session state.
#[derive(Debug, Clone)]
pub struct Transport {
    client: reqwest::Client,
}

impl Transport {
    /// Create a new transport.
    ///
    /// The client carries no request timeout: a hang in the service blocks
    /// the run, which is acceptable for a developer-run harness.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Send a JSON request and return the normalized reply.
    ///
    /// Attaches a bearer header when `token` is given. Non-2xx statuses are
    /// returned as data; only connection-level failures are errors.
    pub async fn send_json(
        &self,
        url: &str,
        method: reqwest::Method,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> TrazarResult<HttpReply> {
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TrazarError::transport(e.to_string()))?;

        Self::into_reply(response).await
    }

    /// Send a multipart request carrying one file from disk plus scalar
    /// fields, and return the normalized reply.
    pub async fn send_multipart(
        &self,
        url: &str,
        token: Option<&str>,
        file_path: &Path,
        file_field: &str,
        fields: &[(String, String)],
    ) -> TrazarResult<HttpReply> {
        let file_bytes = tokio::fs::read(file_path).await?;
        let file_name = file_path
            .file_name()
            .map_or_else(|| "upload.png".to_string(), |n| n.to_string_lossy().to_string());

        let body = multipart::encode(fields, file_field, &file_name, &file_bytes);

        let mut request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, body.content_type())
            .body(body.bytes);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TrazarError::transport(e.to_string()))?;

        Self::into_reply(response).await
    }

    async fn into_reply(response: reqwest::Response) -> TrazarResult<HttpReply> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TrazarError::transport(e.to_string()))?;
        Ok(HttpReply {
            status,
            data: parse_body(&text),
        })
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_body_structured() {
        let data = parse_body(r#"{"success": true, "method": "ai"}"#);
        assert_eq!(data["success"], json!(true));
        assert_eq!(data["method"], json!("ai"));
    }

    #[test]
    fn test_parse_body_raw_text_fallback() {
        let data = parse_body("Internal Server Error");
        assert_eq!(data, Value::String("Internal Server Error".to_string()));
    }

    #[test]
    fn test_parse_body_empty() {
        let data = parse_body("");
        assert_eq!(data, Value::String(String::new()));
    }

    #[test]
    fn test_reply_is_success() {
        let ok = HttpReply {
            status: 200,
            data: Value::Null,
        };
        let created = HttpReply {
            status: 201,
            data: Value::Null,
        };
        let unauthorized = HttpReply {
            status: 401,
            data: Value::Null,
        };
        assert!(ok.is_success());
        assert!(created.is_success());
        assert!(!unauthorized.is_success());
    }

    #[test]
    fn test_server_message_prefers_message_field() {
        let reply = HttpReply {
            status: 400,
            data: json!({"message": "bad image", "error": "ignored"}),
        };
        assert_eq!(reply.server_message(), Some("bad image"));
    }

    #[test]
    fn test_server_message_falls_back_to_error_field() {
        let reply = HttpReply {
            status: 500,
            data: json!({"error": "engine crashed"}),
        };
        assert_eq!(reply.server_message(), Some("engine crashed"));
    }

    #[test]
    fn test_server_message_absent_for_raw_text() {
        let reply = HttpReply {
            status: 502,
            data: Value::String("Bad Gateway".to_string()),
        };
        assert_eq!(reply.server_message(), None);
    }
}
