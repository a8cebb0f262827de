//! Normalizes the provider's variably-shaped JSON into plain text.
//!
//! Provider SDKs have not kept their response shape stable across versions,
//! so extraction classifies the raw payload into a closed set of known shapes
//! and degrades to serializing the whole payload when none match, rather than
//! failing the request.

use serde_json::Value;

/// The known response shapes, probed in this order.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    /// `{"text": "..."}` or `{"response": {"text": "..."}}`.
    TextField(String),
    /// Gemini REST: `{"candidates": [{"content": {"parts": [{"text": ...}]}}]}`.
    Candidates(Vec<String>),
    /// `{"items": [...]}` with `text` or `content[0].text` per item.
    ItemsArray(Vec<String>),
    /// `{"output": ["...", ...]}`.
    OutputArray(Vec<String>),
    Unrecognized,
}

/// Single classification step over the raw payload.
pub fn classify(raw: &Value) -> ResponseShape {
    // A top-level "response" wrapper is unwrapped first.
    let body = raw.get("response").unwrap_or(raw);

    if let Some(text) = body.get("text").and_then(Value::as_str) {
        return ResponseShape::TextField(text.to_string());
    }

    if let Some(candidates) = body.get("candidates").and_then(Value::as_array) {
        let parts: Vec<String> = candidates
            .iter()
            .filter_map(|c| c.pointer("/content/parts").and_then(Value::as_array))
            .flatten()
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .map(str::to_string)
            .collect();
        if !parts.is_empty() {
            return ResponseShape::Candidates(parts);
        }
    }

    if let Some(items) = body.get("items").and_then(Value::as_array) {
        let texts: Vec<String> = items
            .iter()
            .filter_map(|it| {
                it.get("text")
                    .or_else(|| it.pointer("/content/0/text"))
                    .and_then(Value::as_str)
            })
            .map(str::to_string)
            .collect();
        if !texts.is_empty() {
            return ResponseShape::ItemsArray(texts);
        }
    }

    if let Some(output) = body.get("output").and_then(Value::as_array) {
        let texts: Vec<String> = output
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
        if !texts.is_empty() {
            return ResponseShape::OutputArray(texts);
        }
    }

    ResponseShape::Unrecognized
}

/// Extract plain text from a raw provider payload, falling back to the
/// serialized payload as a diagnostic string when the shape is unknown.
pub fn extract_text(raw: &Value) -> String {
    match classify(raw) {
        ResponseShape::TextField(text) => text,
        ResponseShape::Candidates(parts) => parts.join("").trim().to_string(),
        ResponseShape::ItemsArray(texts) => texts.join("\n").trim().to_string(),
        ResponseShape::OutputArray(texts) => texts.join("\n").trim().to_string(),
        ResponseShape::Unrecognized => raw.to_string(),
    }
}
