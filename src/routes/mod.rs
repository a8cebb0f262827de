pub mod ai;
pub mod auth;

use axum::routing::{get, post};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/me", get(auth::me))
        // AI tools
        .route("/api/v1/ai/summary", post(ai::summary))
        .route("/api/v1/ai/paragraph", post(ai::paragraph))
        .route("/api/v1/ai/chatbot", post(ai::chatbot))
        .route("/api/v1/ai/js-converter", post(ai::js_converter))
        .route("/api/v1/ai/scifi-image", post(ai::scifi_image))
        .route("/api/v1/ai/health", get(ai::health))
}
