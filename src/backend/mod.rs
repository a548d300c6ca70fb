pub mod http;
pub mod memory;

pub use http::HttpBackend;
pub use memory::MemoryBackend;

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppResult;

/// HTTP verbs used by the content API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
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

/// One call against the content API
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Absolute path, e.g. `/api/team/42`
    pub path: String,
    pub body: Option<Value>,
    /// Bearer token; `None` sends no Authorization header
    pub token: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            token: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }
}

/// Transport to the remote store of record
///
/// A call either succeeds with the decoded JSON body (`Value::Null` when the
/// body is empty) or fails as a whole; there is no partial success.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn send(&self, request: ApiRequest) -> AppResult<Value>;
}

/// Flatten a backend error body into one line
///
/// `detail` is either a string or a list of `{msg, loc}` validation entries.
pub fn extract_detail(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::String(detail) => Some(detail.clone()),
        Value::Array(entries) => {
            let messages: Vec<String> = entries
                .iter()
                .filter_map(|entry| {
                    let msg = entry.get("msg")?.as_str()?;
                    let field = entry
                        .get("loc")
                        .and_then(Value::as_array)
                        .and_then(|loc| loc.last())
                        .and_then(Value::as_str);
                    Some(match field {
                        Some(field) => format!("{}: {}", field, msg),
                        None => msg.to_string(),
                    })
                })
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_detail() {
        let body = json!({ "detail": "Invalid credentials" });
        assert_eq!(extract_detail(&body).as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn test_validation_detail_list_is_flattened() {
        let body = json!({
            "detail": [
                { "loc": ["body", "title"], "msg": "Field required", "type": "missing" },
                { "loc": ["body", "date"], "msg": "Field required", "type": "missing" }
            ]
        });
        assert_eq!(
            extract_detail(&body).as_deref(),
            Some("title: Field required; date: Field required")
        );
    }

    #[test]
    fn test_missing_detail() {
        assert_eq!(extract_detail(&json!({ "error": "boom" })), None);
        assert_eq!(extract_detail(&json!("plain")), None);
    }

    #[test]
    fn test_request_builders() {
        let request = ApiRequest::put("/api/team/7", json!({ "name": "Asha" }))
            .with_token(Some("tok".to_string()));

        assert_eq!(request.method, Method::Put);
        assert_eq!(request.path, "/api/team/7");
        assert_eq!(request.token.as_deref(), Some("tok"));
        assert!(request.body.is_some());
    }
}
