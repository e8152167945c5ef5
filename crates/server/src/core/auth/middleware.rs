use crate::core::config::{AppState, SESSION_KEY};
use crate::core::ctx::Ctx;
use crate::core::error::{Error, Result};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use headers::{Cookie, HeaderMapExt};
use tracing::{debug, warn};

/// Bearer token from `Authorization`, falling back to the session cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Result<Option<String>> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let value = value.to_str().map_err(|_| Error::AuthFailTokenWrongFormat)?;
        // Format: "Bearer <token>"
        let token = value
            .strip_prefix("Bearer ")
            .ok_or(Error::AuthFailTokenWrongFormat)?;
        return Ok(Some(token.trim().to_string()));
    }

    Ok(headers
        .typed_get::<Cookie>()
        .and_then(|cookie| cookie.get(SESSION_KEY).map(str::to_string))
        .filter(|token| !token.is_empty()))
}

/// Validate `token` and re-check the caller's role against the profile store.
///
/// The role captured at sign-in is fixed for the session; a profile whose role
/// has since changed invalidates the session instead of silently upgrading it.
pub async fn resolve_ctx(state: &AppState, token: &str) -> Result<Ctx> {
    let session = state
        .auth
        .validate_session(token)
        .await
        .map_err(|_| Error::LoginFail)?;

    let current = state.auth.current_role(&session.user_id).await?;
    if current != session.role {
        warn!(
            "[Auth] Role for {} changed from {:?} to {:?}; dropping session",
            session.email, session.role, current
        );
        state.auth.sign_out(token).await?;
        return Err(Error::LoginFail);
    }

    Ok(Ctx::new(
        session.user_id,
        session.email,
        session.role,
        session.is_admin,
    ))
}

pub async fn mw_require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    debug!("MIDDLEWARE: require_auth");

    let token = token_from_headers(req.headers())?.ok_or(Error::AuthFailNoToken)?;
    let ctx = resolve_ctx(&state, &token).await?;

    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}

/// Must run inside `mw_require_auth`.
pub async fn mw_require_admin(req: Request, next: Next) -> Result<Response> {
    debug!("MIDDLEWARE: require_admin");

    let ctx = req
        .extensions()
        .get::<Ctx>()
        .ok_or(Error::AuthFailCtxNotInRequestExt)?;

    if !ctx.is_admin() {
        warn!("[Auth] Non-admin {} denied", ctx.email());
        return Err(Error::Forbidden);
    }

    Ok(next.run(req).await)
}
