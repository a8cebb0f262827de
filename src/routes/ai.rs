use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::generation::image;
use crate::prompt::{self, ToolKind};
use crate::state::SharedState;

/// Pull a non-empty string `text` out of the request body. Anything else is
/// a 400 before any upstream call happens.
fn require_text(body: &Value) -> Result<&str, AppError> {
    body.get("text")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("text is required".to_string()))
}

async fn run_tool(state: &SharedState, tool: ToolKind, body: &Value) -> Result<String, AppError> {
    let text = require_text(body)?;
    let spec = prompt::build(tool, text)?;
    let out = state.generator.generate(&spec).await?;
    Ok(out)
}

pub async fn summary(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let summary = run_tool(&state, ToolKind::Summarize, &body).await?;
    Ok(Json(json!({ "summary": summary })))
}

pub async fn paragraph(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let paragraph = run_tool(&state, ToolKind::Paragraph, &body).await?;
    Ok(Json(json!({ "paragraph": paragraph })))
}

pub async fn chatbot(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let answer = run_tool(&state, ToolKind::Chat, &body).await?;
    Ok(Json(json!({ "answer": answer })))
}

pub async fn js_converter(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let code = run_tool(&state, ToolKind::CodeConvert, &body).await?;
    Ok(Json(json!({ "code": code })))
}

pub async fn scifi_image(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let text = require_text(&body)?;
    let spec = prompt::build(ToolKind::Image, text)?;
    let png = state.imager.generate_png(&spec.prompt).await?;
    Ok(Json(json!({ "image": image::to_data_uri(&png) })))
}

pub async fn health(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "model_initialized": state.generator.model_initialized(),
    }))
}
