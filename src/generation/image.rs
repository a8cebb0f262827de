use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde_json::json;

use super::{GenerationError, ImageGenerator};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the text-to-image diffusion endpoint. The provider returns the
/// PNG bytes directly in the response body.
pub struct DiffusionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl DiffusionClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build reqwest client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl ImageGenerator for DiffusionClient {
    async fn generate_png(&self, prompt: &str) -> Result<Vec<u8>, GenerationError> {
        let url = format!("{}/text-to-image", self.base_url);

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&json!({ "prompt": prompt }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout
                } else {
                    GenerationError::Transport(e.to_string())
                }
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Upstream { status, body });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}

/// Base64-encode PNG bytes as a `data:` URI suitable for an `<img>` src.
pub fn to_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", BASE64_STANDARD.encode(png))
}
