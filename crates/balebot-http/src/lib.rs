//! HTTP transport adapter for the Bale Bot API, built on `reqwest`.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use balebot_core::{
    config::BotConfig,
    errors::Error,
    transport::{Body, FormField, Transport},
    Result,
};

/// One synchronous POST per `invoke`; no retries at this layer.
///
/// The request timeout is the single knob exposed here so callers can bound
/// a blocking poll or send. It defaults to none, which keeps server-side
/// long polling intact.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    token: String,
    base_url: String,
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &BotConfig) -> Result<Self> {
        Self::with_timeout(config, None)
    }

    /// Build a transport whose requests abort after `timeout`.
    pub fn with_timeout(config: &BotConfig, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Transport(format!("http client build failed: {e}")))?;

        Ok(Self {
            token: config.token.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn invoke(&self, method: &str, body: Body) -> Result<Value> {
        let url = self.endpoint(method);
        tracing::debug!(%method, "invoking bot api method");

        let request = match body {
            Body::Json(payload) => self.http.post(&url).json(&payload),
            Body::Multipart(fields) => self.http.post(&url).multipart(build_form(fields).await?),
        };

        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(format!("{method} request failed: {e}")))?;

        response
            .json()
            .await
            .map_err(|e| Error::Transport(format!("{method} returned a non-JSON body: {e}")))
    }
}

/// Assemble a multipart form. File fields carry the file's bytes, detected
/// media type and base name; the read handle is dropped before the request
/// is issued.
async fn build_form(fields: Vec<FormField>) -> Result<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();
    for field in fields {
        form = match field {
            FormField::Text { name, value } => form.text(name, value),
            FormField::File { name, path } => {
                let bytes = tokio::fs::read(&path).await.map_err(Error::Io)?;
                let file_name = path
                    .file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or("file")
                    .to_string();
                let part = reqwest::multipart::Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(media_type(&path))
                    .map_err(|e| Error::Transport(format!("multipart field {name}: {e}")))?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

/// Media type from the file extension; octet-stream when unrecognized.
fn media_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("mp3") => "audio/mpeg",
        Some("ogg" | "oga") => "audio/ogg",
        Some("wav") => "audio/wav",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn transport(token: &str, base_url: &str) -> HttpTransport {
        let cfg = BotConfig::new(token).with_base_url(base_url);
        HttpTransport::new(&cfg).unwrap()
    }

    #[test]
    fn endpoint_embeds_token_and_method() {
        let t = transport("123:ABC", "https://tapi.bale.ai");
        assert_eq!(
            t.endpoint("sendMessage"),
            "https://tapi.bale.ai/bot123:ABC/sendMessage"
        );
    }

    #[test]
    fn endpoint_tolerates_a_trailing_slash() {
        let t = transport("123:ABC", "https://example.test/");
        assert_eq!(
            t.endpoint("getUpdates"),
            "https://example.test/bot123:ABC/getUpdates"
        );
    }

    #[test]
    fn media_type_follows_the_extension() {
        assert_eq!(media_type(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(media_type(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(media_type(Path::new("voice.ogg")), "audio/ogg");
        assert_eq!(media_type(Path::new("clip.mp4")), "video/mp4");
        assert_eq!(media_type(Path::new("blob.xyz")), "application/octet-stream");
        assert_eq!(media_type(Path::new("noext")), "application/octet-stream");
    }

    #[tokio::test]
    async fn build_form_accepts_text_fields() {
        let fields = vec![
            FormField::text("chat_id", "9"),
            FormField::text("caption", "hello"),
        ];
        assert!(build_form(fields).await.is_ok());
    }

    #[tokio::test]
    async fn build_form_surfaces_io_errors_for_missing_files() {
        let fields = vec![FormField::file(
            "photo",
            PathBuf::from("/no/such/balebot-file.jpg"),
        )];
        let err = build_form(fields).await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
