use crate::error::AppError;

/// The tools exposed by the proxy, one per `/api/v1/ai/*` route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Summarize,
    Paragraph,
    Chat,
    CodeConvert,
    Image,
}

/// A fully rendered generation request: instructional template wrapped around
/// the literal user text, plus the per-tool sampling knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSpec {
    pub prompt: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

/// Render the prompt for a tool. Pure and deterministic.
///
/// Empty or whitespace-only text is rejected here, before any upstream call
/// is made.
pub fn build(tool: ToolKind, text: &str) -> Result<PromptSpec, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::BadRequest("text is required".to_string()));
    }

    let spec = match tool {
        ToolKind::Summarize => PromptSpec {
            prompt: format!("Summarize this: {text}"),
            max_output_tokens: 500,
            temperature: 0.2,
        },
        ToolKind::Paragraph => PromptSpec {
            prompt: format!("Write a detailed paragraph about: {text}"),
            max_output_tokens: 500,
            temperature: 0.5,
        },
        ToolKind::Chat => PromptSpec {
            prompt: format!("Answer in a friendly tone: {text}"),
            max_output_tokens: 300,
            temperature: 0.7,
        },
        ToolKind::CodeConvert => PromptSpec {
            prompt: format!("Convert these instructions into JavaScript code: {text}"),
            max_output_tokens: 400,
            temperature: 0.25,
        },
        // Sampling knobs are ignored by the diffusion API; only the framing
        // matters here.
        ToolKind::Image => PromptSpec {
            prompt: format!("A science fiction themed scene, digital art: {text}"),
            max_output_tokens: 0,
            temperature: 0.0,
        },
    };

    Ok(spec)
}
