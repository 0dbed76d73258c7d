use std::path::PathBuf;

use async_trait::async_trait;

use crate::Result;

/// Request body for one API method call.
///
/// The two variants mirror the API's two content types: a JSON object body,
/// or a multipart form when a local file is uploaded.
#[derive(Clone, Debug)]
pub enum Body {
    Json(serde_json::Value),
    Multipart(Vec<FormField>),
}

/// One multipart form field.
#[derive(Clone, Debug, PartialEq)]
pub enum FormField {
    Text { name: String, value: String },
    /// File content is read and attached by the transport with its detected
    /// media type and base file name, never the path string.
    File { name: String, path: PathBuf },
}

impl FormField {
    pub fn text(name: &str, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.to_string(),
            value: value.into(),
        }
    }

    pub fn file(name: &str, path: impl Into<PathBuf>) -> Self {
        Self::File {
            name: name.to_string(),
            path: path.into(),
        }
    }
}

/// Wire port for the bot API.
///
/// `invoke` performs exactly one POST to `{base_url}/bot{token}/{method}`
/// and decodes the response body as JSON. Connection failures, timeouts and
/// non-JSON bodies surface as [`crate::Error::Transport`]; an `ok: false`
/// API response is not an error at this layer — callers map it per
/// operation. No retries happen here.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn invoke(&self, method: &str, body: Body) -> Result<serde_json::Value>;
}

/// `true` when a decoded response envelope reports success.
pub(crate) fn is_ok(response: &serde_json::Value) -> bool {
    response.get("ok").and_then(serde_json::Value::as_bool) == Some(true)
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn envelope_success_requires_ok_true() {
        assert!(is_ok(&json!({"ok": true, "result": {}})));
        assert!(!is_ok(&json!({"ok": false})));
        assert!(!is_ok(&json!({"result": {}})));
        assert!(!is_ok(&json!({"ok": "true"})));
    }
}
