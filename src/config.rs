use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_access_secret: String,
    pub jwt_refresh_secret: String,
    pub refresh_ttl_days: i64,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub image_api_key: String,
    pub image_base_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub max_body_size: usize,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_access_secret = env_required("JWT_ACCESS_SECRET")?;
        let jwt_refresh_secret = env_required("JWT_REFRESH_SECRET")?;
        let gemini_api_key = env_required("GEMINI_API_KEY")?;
        let image_api_key = env_required("IMAGE_API_KEY")?;

        let refresh_ttl_days: i64 = env_or("PROMPTBOX_REFRESH_TTL_DAYS", "7")
            .parse()
            .map_err(|e| format!("Invalid PROMPTBOX_REFRESH_TTL_DAYS: {e}"))?;

        let gemini_model = env_or("GEMINI_MODEL", "gemini-2.5-flash");
        let gemini_base_url = env_or(
            "GEMINI_BASE_URL",
            "https://generativelanguage.googleapis.com",
        );
        let image_base_url = env_or("IMAGE_BASE_URL", "https://clipdrop-api.co");

        let host: IpAddr = env_or("PROMPTBOX_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid PROMPTBOX_HOST: {e}"))?;

        let port: u16 = env_or("PROMPTBOX_PORT", "8080")
            .parse()
            .map_err(|e| format!("Invalid PROMPTBOX_PORT: {e}"))?;

        let allowed_origins: Vec<String> =
            env_or("PROMPTBOX_ALLOWED_ORIGINS", "http://localhost:3000")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();

        let max_body_size: usize = env_or("PROMPTBOX_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid PROMPTBOX_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("PROMPTBOX_LOG_LEVEL", "info");

        Ok(Config {
            database_url,
            jwt_access_secret,
            jwt_refresh_secret,
            refresh_ttl_days,
            gemini_api_key,
            gemini_model,
            gemini_base_url,
            image_api_key,
            image_base_url,
            host,
            port,
            allowed_origins,
            max_body_size,
            log_level,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
