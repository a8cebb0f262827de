use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::generation::{ImageGenerator, TextGenerator};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub generator: Arc<dyn TextGenerator>,
    pub imager: Arc<dyn ImageGenerator>,
}
