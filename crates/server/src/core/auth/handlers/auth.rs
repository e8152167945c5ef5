//! Auth handlers

use crate::core::auth::middleware::token_from_headers;
use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::{Error, Result};
use crate::core::models::{Role, Session};
use crate::routing::{landing_for, Dashboard};
use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub role: Option<Role>,
    pub is_admin: bool,
    /// Dashboard the caller should land on
    pub redirect: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub redirect: String,
}

/// Sign in and build the client-side session. Shared by the JSON and form endpoints.
pub async fn sign_in_session(state: &AppState, email: &str, password: &str) -> Result<Session> {
    let (user, token) = state.auth.sign_in(email, password).await.map_err(|e| {
        warn!("Login failed for {}: {}", email, e);
        Error::LoginFail
    })?;

    let role = state.auth.current_role(&user.id).await?;

    Ok(Session {
        user_id: user.id,
        email: user.email,
        role,
        is_admin: user.is_admin,
        token: Some(token),
    })
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    info!("POST /auth/login - {}", req.email);

    let session = sign_in_session(&state, &req.email, &req.password).await?;
    let redirect = landing_for(&session).path().to_string();

    Ok(Json(LoginResponse {
        token: session.token.unwrap_or_default(),
        user_id: session.user_id,
        email: session.email,
        role: session.role,
        is_admin: session.is_admin,
        redirect,
    }))
}

/// POST /auth/logout
///
/// Always succeeds and points the caller home, whatever state the token was in.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Json<LogoutResponse> {
    info!("POST /auth/logout");

    if let Ok(Some(token)) = token_from_headers(&headers) {
        if let Err(e) = state.auth.sign_out(&token).await {
            warn!("Sign-out failed: {}", e);
        }
    }

    Json(LogoutResponse {
        redirect: Dashboard::Home.path().to_string(),
    })
}

/// GET /auth/me
pub async fn me(ctx: Ctx) -> Json<Session> {
    Json(ctx.to_session())
}
