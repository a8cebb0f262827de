use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::{normalize, GenerationError, TextGenerator};
use crate::prompt::PromptSpec;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Gemini `generateContent` REST endpoint.
///
/// Constructed once at startup and shared through the app state; the
/// `initialize` probe must have run before the server accepts traffic.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    initialized: AtomicBool,
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build reqwest client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            initialized: AtomicBool::new(false),
        }
    }

    /// Startup barrier: verify the configured model is usable for this key.
    /// Runs once before the listener binds; failure is fatal to the process.
    pub async fn initialize(&self) -> Result<(), GenerationError> {
        let url = format!(
            "{}/v1beta/models/{}?key={}",
            self.base_url, self.model, self.api_key
        );

        let resp = self.client.get(&url).send().await.map_err(map_reqwest)?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Upstream { status, body });
        }

        self.initialized.store(true, Ordering::Relaxed);
        tracing::info!("Generation model {} is available", self.model);
        Ok(())
    }

    async fn generate_once(&self, spec: &PromptSpec) -> Result<String, GenerationError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: spec.prompt.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: spec.temperature,
                max_output_tokens: spec.max_output_tokens,
            },
        };

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest)?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Upstream { status, body });
        }

        let raw: Value = resp
            .json()
            .await
            .map_err(|e| GenerationError::Transport(format!("invalid JSON from provider: {e}")))?;

        Ok(normalize::extract_text(&raw))
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, spec: &PromptSpec) -> Result<String, GenerationError> {
        match self.generate_once(spec).await {
            Err(err) if err.is_transient() => {
                tracing::warn!("Transient generation failure, retrying once: {err}");
                self.generate_once(spec).await
            }
            other => other,
        }
    }

    fn model_initialized(&self) -> bool {
        self.initialized.load(Ordering::Relaxed)
    }
}

fn map_reqwest(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::Transport(err.to_string())
    }
}
