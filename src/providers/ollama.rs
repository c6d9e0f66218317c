/// HTTP client for a local Ollama text-generation endpoint.
///
/// All transport, timeout, and parse failures are caught at this boundary,
/// logged, and collapsed into an absent result. Callers only ever see
/// `Option<String>` from `generate` and `bool` from `is_available`.
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::config::ConnectionSettings;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const NUM_PREDICT: u32 = 50;

pub struct OllamaClient {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default, alias = "Response")]
    response: Option<String>,
    #[serde(default, alias = "Model")]
    model: Option<String>,
    #[serde(default, alias = "Done")]
    done: bool,
}

impl OllamaClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    /// Ask the model for an exception-type suggestion. Settings are read
    /// fresh by the caller per request and passed in, never cached here.
    /// Returns `None` for every failure mode; nothing propagates.
    pub async fn generate(&self, prompt: &str, settings: &ConnectionSettings) -> Option<String> {
        match self.request_completion(prompt, settings).await {
            Ok(Some(text)) => Some(normalize_exception_name(&text)),
            Ok(None) => {
                tracing::warn!("Ollama returned an empty response");
                None
            }
            Err(err) => {
                tracing::error!(error = %err, "Ollama generate failed");
                None
            }
        }
    }

    async fn request_completion(
        &self,
        prompt: &str,
        settings: &ConnectionSettings,
    ) -> Result<Option<String>> {
        let url = endpoint_url(settings, "api/generate")?;
        let body = generate_request_body(prompt, settings);
        tracing::info!(%url, model = %settings.model,
            temperature = settings.temperature as f64 / 100.0,
            "Requesting exception suggestion");

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Ollama")?;

        let status = response.status();
        tracing::info!(%status, "Ollama response received");
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama API error ({status}): {error_text}");
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;
        tracing::debug!(model = ?parsed.model, done = parsed.done, "Ollama response parsed");

        match parsed.response {
            Some(text) if !text.trim().is_empty() => Ok(Some(text)),
            _ => Ok(None),
        }
    }

    /// Probe the endpoint. True iff the tags route answers with a success
    /// status; connection refused, DNS failure, and timeout all yield false.
    pub async fn is_available(&self, settings: &ConnectionSettings) -> bool {
        let url = match endpoint_url(settings, "api/tags") {
            Ok(url) => url,
            Err(err) => {
                tracing::warn!(error = %err, "Invalid Ollama endpoint");
                return false;
            }
        };
        match self.client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::warn!(error = %err, "Ollama not available");
                false
            }
        }
    }
}

fn endpoint_url(settings: &ConnectionSettings, path: &str) -> Result<Url> {
    let base = Url::parse(&format!("{}/", settings.normalized_endpoint()))
        .with_context(|| format!("Invalid Ollama endpoint: {}", settings.endpoint))?;
    base.join(path)
        .with_context(|| format!("Cannot join {path} onto {base}"))
}

/// Request body for `/api/generate`. The temperature travels on a 0.0-1.0
/// scale; settings hold it as an integer percentage.
pub fn generate_request_body(prompt: &str, settings: &ConnectionSettings) -> serde_json::Value {
    serde_json::json!({
        "model": settings.model,
        "prompt": prompt,
        "stream": false,
        "options": {
            "temperature": settings.temperature as f64 / 100.0,
            "num_predict": NUM_PREDICT,
        }
    })
}

/// Trim the raw model output and guarantee the "Exception" suffix. The suffix
/// check is case-insensitive, so an already-suffixed name passes through
/// unchanged; the operation is idempotent.
pub fn normalize_exception_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.to_ascii_lowercase().ends_with("exception") {
        trimmed.to_string()
    } else {
        format!("{trimmed}Exception")
    }
}
