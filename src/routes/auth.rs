use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::auth::extractor::AuthUser;
use crate::auth::jwt::{encode_token, Claims, ACCESS_TTL_SECS};
use crate::auth::password::{self, MIN_PASSWORD_LEN};
use crate::db;
use crate::error::{is_unique_violation, AppError};
use crate::models::User;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Login/refresh response. The refresh token travels only in the cookie.
#[derive(Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

const REFRESH_COOKIE: &str = "refresh_token";

fn refresh_cookie(token: &str, ttl_days: i64) -> CookieJar {
    let cookie = Cookie::build((REFRESH_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(ttl_days))
        .build();

    CookieJar::new().add(cookie)
}

fn clear_refresh_cookie() -> CookieJar {
    let cookie = Cookie::build((REFRESH_COOKIE, ""))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::ZERO)
        .build();
    CookieJar::new().add(cookie)
}

fn issue_tokens(state: &SharedState, user_id: uuid::Uuid) -> Result<(String, String), AppError> {
    let access = encode_token(&Claims::access(user_id), &state.config.jwt_access_secret)
        .map_err(AppError::Internal)?;
    let refresh = encode_token(
        &Claims::refresh(user_id, state.config.refresh_ttl_days),
        &state.config.jwt_refresh_secret,
    )
    .map_err(AppError::Internal)?;
    Ok((access, refresh))
}

pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let username = req.username.as_deref().unwrap_or_default().trim();
    let email = req.email.as_deref().unwrap_or_default().trim();
    let pw = req.password.as_deref().unwrap_or_default();

    if username.is_empty() || email.is_empty() || pw.is_empty() {
        return Err(AppError::BadRequest("All fields are required".to_string()));
    }

    if pw.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let pw_hash = password::hash(pw).map_err(AppError::Internal)?;

    let user = db::users::create(&state.pool, email, username, &pw_hash)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Email is already registered".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

    tracing::info!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully".to_string(),
        }),
    ))
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let email = req.email.as_deref().unwrap_or_default().trim();
    let pw = req.password.as_deref().unwrap_or_default();

    if email.is_empty() || pw.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    // Unknown email and wrong password produce the same response, so a
    // caller cannot probe which emails are registered.
    let user = db::users::find_by_email(&state.pool, email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = password::verify(pw, &user.password_hash).map_err(AppError::Internal)?;
    if !valid {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let (access, refresh) = issue_tokens(&state, user.id)?;

    let jar = refresh_cookie(&refresh, state.config.refresh_ttl_days);
    Ok((
        jar,
        Json(AuthResponse {
            access_token: access,
            expires_in: ACCESS_TTL_SECS,
        }),
    ))
}

pub async fn refresh(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let refresh_value = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| AppError::Unauthorized("Missing refresh token".to_string()))?;

    let claims = crate::auth::jwt::decode_token(&refresh_value, &state.config.jwt_refresh_secret)
        .map_err(|_| AppError::Unauthorized("Invalid or expired refresh token".to_string()))?;

    // The token must still reference a live account.
    let user = db::users::find_by_id(&state.pool, claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    let (access, new_refresh) = issue_tokens(&state, user.id)?;

    let jar = refresh_cookie(&new_refresh, state.config.refresh_ttl_days);
    Ok((
        jar,
        Json(AuthResponse {
            access_token: access,
            expires_in: ACCESS_TTL_SECS,
        }),
    ))
}

pub async fn logout() -> (CookieJar, Json<MessageResponse>) {
    // Stateless logout: clear the cookie; outstanding access tokens expire
    // on their own.
    (
        clear_refresh_cookie(),
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}

pub async fn me(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<User>, AppError> {
    let user = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    Ok(Json(user))
}
