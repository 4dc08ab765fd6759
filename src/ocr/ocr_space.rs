//! HTTP bridge to an OCR.space-compatible recognition endpoint.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::multipart::Form;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::RasterImage;

use super::OcrEngine;

/// Public OCR.space endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.ocr.space/parse/image";
/// Arabic language hint.
pub const DEFAULT_LANGUAGE: &str = "ara";
/// Engine 2 is the service's higher-accuracy model.
pub const DEFAULT_ENGINE: &str = "2";
/// Transport-level limit for one request. The per-page budget in
/// `ExtractOptions` is usually the tighter bound.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const ENV_API_KEY: &str = "OCR_SPACE_API_KEY";
const ENV_API_KEY_LEGACY: &str = "VITE_OCR_SPACE_API_KEY";
const ENV_ENDPOINT: &str = "OCR_SPACE_ENDPOINT";

/// OCR service settings.
#[derive(Clone)]
pub struct OcrConfig {
    /// Service credential; `None` disables OCR
    pub api_key: Option<String>,
    /// Recognition endpoint URL
    pub endpoint: String,
    /// Language hint sent with every request
    pub language: String,
    /// Engine variant sent with every request
    pub engine: String,
    /// HTTP client timeout
    pub timeout: Duration,
}

impl OcrConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            api_key: non_empty(ENV_API_KEY).or_else(|| non_empty(ENV_API_KEY_LEGACY)),
            endpoint: non_empty(ENV_ENDPOINT).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether a usable credential is present.
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            engine: DEFAULT_ENGINE.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

// The key never shows up in logs.
impl std::fmt::Debug for OcrConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("language", &self.language)
            .field("engine", &self.engine)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// OCR.space client.
#[derive(Debug)]
pub struct OcrSpaceClient {
    client: Client,
    config: OcrConfig,
}

impl OcrSpaceClient {
    /// Create a client. Fails with [`Error::OcrUnavailable`] when the
    /// configuration carries no credential.
    pub fn from_config(config: OcrConfig) -> Result<Self> {
        if !config.is_configured() {
            return Err(Error::OcrUnavailable);
        }

        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Shortcut for `from_config(OcrConfig::from_env())`.
    pub fn from_env() -> Result<Self> {
        Self::from_config(OcrConfig::from_env())
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    fn form(&self, png: &[u8]) -> Form {
        Form::new()
            .text("apikey", self.config.api_key.clone().unwrap_or_default())
            .text("language", self.config.language.clone())
            .text("OCREngine", self.config.engine.clone())
            .text(
                "base64Image",
                format!("data:image/png;base64,{}", STANDARD.encode(png)),
            )
    }
}

#[async_trait]
impl OcrEngine for OcrSpaceClient {
    fn name(&self) -> &str {
        "ocr.space"
    }

    async fn recognize(&self, image: &RasterImage) -> Result<String> {
        let png = image.to_png()?;
        log::debug!(
            "submitting page {} ({}x{}, {} bytes PNG) for OCR",
            image.page_number,
            image.width,
            image.height,
            png.len()
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .multipart(self.form(&png))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::OcrService(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        parse_response(&body)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrSpaceResponse {
    #[serde(default)]
    is_errored_on_processing: bool,
    #[serde(default)]
    error_message: Option<ErrorMessage>,
    #[serde(default)]
    parsed_results: Option<Vec<ParsedResult>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParsedResult {
    #[serde(default)]
    parsed_text: String,
}

/// The service sends either a single message or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessage {
    fn into_text(self) -> String {
        match self {
            ErrorMessage::One(msg) => msg,
            ErrorMessage::Many(msgs) => msgs.join("; "),
        }
    }
}

/// Turn a service response body into recognized text.
fn parse_response(body: &str) -> Result<String> {
    let response: OcrSpaceResponse = serde_json::from_str(body)
        .map_err(|e| Error::OcrService(format!("unreadable response: {}", e)))?;

    if response.is_errored_on_processing {
        let message = response
            .error_message
            .map(ErrorMessage::into_text)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(Error::OcrService(message));
    }

    Ok(response
        .parsed_results
        .unwrap_or_default()
        .into_iter()
        .map(|r| r.parsed_text)
        .collect::<Vec<_>>()
        .join("\n"))
}
