use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use reqwest::{Client, StatusCode as RStatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use promptbox::config::Config;
use promptbox::generation::gemini::GeminiClient;
use promptbox::generation::image::DiffusionClient;

/// In-process stand-in for the generation providers. Counts calls so tests
/// can assert that validation failures never reach upstream.
pub struct StubUpstream {
    pub text_calls: AtomicUsize,
    pub image_calls: AtomicUsize,
    pub text_response: Mutex<Value>,
    pub text_status: AtomicU16,
    pub image_status: AtomicU16,
}

impl StubUpstream {
    fn new() -> Self {
        Self {
            text_calls: AtomicUsize::new(0),
            image_calls: AtomicUsize::new(0),
            text_response: Mutex::new(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "stub output" }] }
                }]
            })),
            text_status: AtomicU16::new(200),
            image_status: AtomicU16::new(200),
        }
    }

    pub fn set_text_response(&self, value: Value) {
        *self.text_response.lock().unwrap() = value;
    }

    pub fn set_text_status(&self, status: u16) {
        self.text_status.store(status, Ordering::SeqCst);
    }

    pub fn set_image_status(&self, status: u16) {
        self.image_status.store(status, Ordering::SeqCst);
    }

    pub fn text_call_count(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }

    pub fn image_call_count(&self) -> usize {
        self.image_calls.load(Ordering::SeqCst)
    }
}

async fn stub_model_probe() -> Json<Value> {
    Json(json!({ "name": "models/stub" }))
}

async fn stub_generate(State(stub): State<Arc<StubUpstream>>) -> impl IntoResponse {
    stub.text_calls.fetch_add(1, Ordering::SeqCst);
    let status = StatusCode::from_u16(stub.text_status.load(Ordering::SeqCst)).unwrap();
    let body = stub.text_response.lock().unwrap().clone();
    (status, Json(body))
}

async fn stub_text_to_image(State(stub): State<Arc<StubUpstream>>) -> impl IntoResponse {
    stub.image_calls.fetch_add(1, Ordering::SeqCst);
    let status = StatusCode::from_u16(stub.image_status.load(Ordering::SeqCst)).unwrap();
    if status.is_success() {
        (status, vec![0x89u8, 0x50, 0x4e, 0x47]).into_response()
    } else {
        (status, "upstream unavailable").into_response()
    }
}

async fn spawn_stub_upstream() -> (SocketAddr, Arc<StubUpstream>) {
    let stub = Arc::new(StubUpstream::new());

    let router = Router::new()
        .route(
            "/v1beta/models/{model}",
            get(stub_model_probe).post(stub_generate),
        )
        .route("/text-to-image", post(stub_text_to_image))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub upstream");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Stub upstream failed");
    });

    (addr, stub)
}

/// A running app instance with a dedicated test database and stub providers.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
    pub upstream: Arc<StubUpstream>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> (Value, RStatusCode) {
        self.post_json(
            "/api/v1/auth/register",
            &json!({ "username": username, "email": email, "password": password }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> (Value, RStatusCode) {
        self.post_json(
            "/api/v1/auth/login",
            &json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Register and log in a default user, returning the access token.
    pub async fn bootstrap(&self) -> String {
        let (body, status) = self.register("admin", "admin@test.com", "password123").await;
        assert_eq!(status, RStatusCode::CREATED, "bootstrap register failed: {body}");
        let (body, status) = self.login("admin@test.com", "password123").await;
        assert_eq!(status, RStatusCode::OK, "bootstrap login failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> (Value, RStatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, RStatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

/// Spawn the app on an ephemeral port with a fresh temporary database and
/// stub generation providers.
pub async fn spawn_app() -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    // Create a unique test database
    let db_name = format!(
        "promptbox_test_{}",
        Uuid::now_v7().to_string().replace('-', "")
    );

    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let (upstream_addr, upstream) = spawn_stub_upstream().await;
    let upstream_url = format!("http://{upstream_addr}");

    let config = Config {
        database_url: test_url,
        jwt_access_secret: "test-access-secret-long-enough!!".to_string(),
        jwt_refresh_secret: "test-refresh-secret-long-enough!".to_string(),
        refresh_ttl_days: 7,
        gemini_api_key: "test-gemini-key".to_string(),
        gemini_model: "gemini-2.5-flash".to_string(),
        gemini_base_url: upstream_url.clone(),
        image_api_key: "test-image-key".to_string(),
        image_base_url: upstream_url,
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to a random port
        allowed_origins: vec!["http://localhost:3000".to_string()],
        max_body_size: 1_048_576,
        log_level: "warn".to_string(),
    };

    let generator = Arc::new(GeminiClient::new(
        &config.gemini_base_url,
        &config.gemini_api_key,
        &config.gemini_model,
    ));
    generator
        .initialize()
        .await
        .expect("Stub model probe failed");

    let imager = Arc::new(DiffusionClient::new(
        &config.image_base_url,
        &config.image_api_key,
    ));

    let app = promptbox::build_app(pool.clone(), config, generator, imager);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        pool,
        client,
        db_name,
        upstream,
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
