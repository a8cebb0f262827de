pub mod gemini;
pub mod image;
pub mod normalize;

use async_trait::async_trait;

use crate::prompt::PromptSpec;

/// Failures talking to a generation provider. Full detail is logged
/// server-side; `client_message` is what callers are allowed to see.
#[derive(Debug)]
pub enum GenerationError {
    /// Non-2xx from the provider, with the response body for the logs.
    Upstream { status: u16, body: String },
    Timeout,
    Transport(String),
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationError::Upstream { status, body } => {
                write!(f, "upstream returned {status}: {body}")
            }
            GenerationError::Timeout => write!(f, "upstream request timed out"),
            GenerationError::Transport(msg) => write!(f, "upstream request failed: {msg}"),
        }
    }
}

impl GenerationError {
    /// Sanitized message for the HTTP response. Surfacing the upstream status
    /// code is fine; upstream bodies and headers are not.
    pub fn client_message(&self) -> String {
        match self {
            GenerationError::Upstream { status, .. } => {
                format!("Generation failed (upstream status {status})")
            }
            GenerationError::Timeout => "Generation timed out".to_string(),
            GenerationError::Transport(_) => "Generation failed".to_string(),
        }
    }

    /// Timeouts and 5xx responses are worth one retry; everything else is not.
    pub fn is_transient(&self) -> bool {
        match self {
            GenerationError::Timeout => true,
            GenerationError::Upstream { status, .. } => *status >= 500,
            GenerationError::Transport(_) => false,
        }
    }
}

/// Text-generation provider, injected into the app state so tests can stand
/// in a stub and so nothing races a module-level client.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, spec: &PromptSpec) -> Result<String, GenerationError>;

    /// Whether the startup model probe has completed successfully.
    fn model_initialized(&self) -> bool;
}

/// Image-generation provider. Returns raw PNG bytes.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_png(&self, prompt: &str) -> Result<Vec<u8>, GenerationError>;
}
