pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod generation;
pub mod models;
pub mod prompt;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::generation::{ImageGenerator, TextGenerator};
use crate::state::{AppState, SharedState};

pub fn build_app(
    pool: PgPool,
    config: Config,
    generator: Arc<dyn TextGenerator>,
    imager: Arc<dyn ImageGenerator>,
) -> Router {
    let cors = cors_layer(&config);
    let max_body_size = config.max_body_size;

    let state: SharedState = Arc::new(AppState {
        pool,
        config,
        generator,
        imager,
    });

    Router::new()
        .merge(routes::api_routes())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
