//! Page handlers
//!
//! The session is resolved from the `user` cookie on every request and
//! re-verified against the store, so a stale or forged cookie never reaches a
//! dashboard.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::{info, warn};

use super::{layout, views};
use crate::admin::sort::{RegistrationSort, SortParams};
use crate::client::dashboard::update_welcome_message;
use crate::client::{AdminDashboardData, Notice, VolunteerDashboardData};
use crate::core::auth::handlers::auth::sign_in_session;
use crate::core::auth::middleware::{resolve_ctx, token_from_headers};
use crate::core::config::{AppState, SESSION_KEY};
use crate::core::models::{Role, Session};
use crate::profiles::NewProfile;
use crate::routing::{landing_for, Dashboard};

const LOGIN_PATH: &str = "/login";

/// Session for the cookie on this request, if it is still valid.
pub async fn current_session(state: &AppState, headers: &HeaderMap) -> Option<Session> {
    let token = token_from_headers(headers).ok().flatten()?;
    match resolve_ctx(state, &token).await {
        Ok(ctx) => {
            let mut session = ctx.to_session();
            session.token = Some(token);
            Some(session)
        }
        Err(e) => {
            info!("[Pages] Ignoring session cookie: {:?}", e);
            None
        }
    }
}

fn session_cookie(token: &str, days: i64) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        SESSION_KEY,
        token,
        days * 24 * 60 * 60
    )
}

fn expired_cookie() -> String {
    format!("{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0", SESSION_KEY)
}

fn with_cookie(mut response: Response, cookie: &str) -> Response {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => warn!("[Pages] Could not encode cookie: {}", e),
    }
    response
}

fn page(title: &str, session: Option<&Session>, body: &str) -> Html<String> {
    Html(layout(title, session, body))
}

fn forbidden(session: &Session) -> Response {
    (
        StatusCode::FORBIDDEN,
        page(
            "Forbidden",
            Some(session),
            &views::message("Forbidden", "This page is for organisers only."),
        ),
    )
        .into_response()
}

/// GET /
pub async fn home(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let session = current_session(&state, &headers).await;
    page("Home", session.as_ref(), &views::home())
}

/// GET /schedule
pub async fn schedule(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let session = current_session(&state, &headers).await;
    page("Schedule", session.as_ref(), &views::schedule())
}

/// GET /login
pub async fn login_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(session) = current_session(&state, &headers).await {
        return Redirect::to(landing_for(&session).path()).into_response();
    }
    page("Login", None, &views::login_form(None)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// POST /login
pub async fn login_submit(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    info!("POST /login - {}", form.email);

    match sign_in_session(&state, &form.email, &form.password).await {
        Ok(session) => {
            let token = session.token.clone().unwrap_or_default();
            let redirect = Redirect::to(landing_for(&session).path()).into_response();
            with_cookie(redirect, &session_cookie(&token, state.config.session_days))
        }
        Err(_) => (
            StatusCode::UNAUTHORIZED,
            page("Login", None, &views::login_form(Some("Invalid credentials"))),
        )
            .into_response(),
    }
}

/// POST /logout
///
/// Always lands on the home page, whatever state the cookie was in.
pub async fn logout_submit(State(state): State<AppState>, headers: HeaderMap) -> Response {
    info!("POST /logout");

    if let Ok(Some(token)) = token_from_headers(&headers) {
        if let Err(e) = state.auth.sign_out(&token).await {
            warn!("[Pages] Sign-out failed: {}", e);
        }
    }

    with_cookie(
        Redirect::to(Dashboard::Home.path()).into_response(),
        &expired_cookie(),
    )
}

/// GET /register
pub async fn register_page(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let session = current_session(&state, &headers).await;
    page("Register", session.as_ref(), &views::register_form(None))
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub tshirt: Option<String>,
    #[serde(default)]
    pub dietary: Option<String>,
    /// Comma separated slots, volunteers only
    #[serde(default)]
    pub availability: Option<String>,
}

fn parse_slots(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Account, profile and availability are written in one transaction: a
/// failure leaves nothing behind, so the same email can register again.
async fn create_account(state: &AppState, form: &RegisterForm) -> anyhow::Result<()> {
    let role = Role::parse(&form.role).unwrap_or(Role::Participant);
    let mut tx = state.db.pool().begin().await?;

    let user = state
        .auth
        .sign_up_with(&mut tx, &form.email, &form.password, false)
        .await?;

    let profile = NewProfile {
        name: Some(form.name.clone()),
        email: Some(user.email.clone()),
        phone: form.phone.clone(),
        experience: form.experience.clone(),
        skills: form.skills.clone(),
        tshirt: form.tshirt.clone(),
        dietary: form.dietary.clone(),
        role: Some(role),
    };
    state
        .profiles
        .create_profile_with(&mut tx, &user.id, &profile)
        .await?;

    if role.is_volunteer() {
        let slots = parse_slots(form.availability.as_deref());
        state
            .volunteers
            .set_availability_with(&mut tx, &user.id, &slots)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// POST /register
///
/// Creates the account and its profile, then signs the new user in.
pub async fn register_submit(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    info!("POST /register - {}", form.email);

    let failed = |message: &str| {
        (
            StatusCode::BAD_REQUEST,
            page("Register", None, &views::register_form(Some(message))),
        )
            .into_response()
    };

    if let Err(e) = create_account(&state, &form).await {
        warn!("[Pages] Registration failed for {}: {:#}", form.email, e);
        return failed("Registration failed. Is this email already registered?");
    }

    match sign_in_session(&state, &form.email, &form.password).await {
        Ok(session) => {
            let token = session.token.clone().unwrap_or_default();
            let redirect = Redirect::to(landing_for(&session).path()).into_response();
            with_cookie(redirect, &session_cookie(&token, state.config.session_days))
        }
        Err(_) => Redirect::to(LOGIN_PATH).into_response(),
    }
}

/// GET /participant/dashboard
pub async fn participant_dashboard(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(session) = current_session(&state, &headers).await else {
        return Redirect::to(LOGIN_PATH).into_response();
    };

    let overview = state.profiles.participant_overview(&session.user_id).await;
    page(
        "Participant Dashboard",
        Some(&session),
        &views::participant_dashboard(&overview),
    )
    .into_response()
}

/// GET /volunteer/dashboard
pub async fn volunteer_dashboard(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(session) = current_session(&state, &headers).await else {
        return Redirect::to(LOGIN_PATH).into_response();
    };

    let data = VolunteerDashboardData::load(&state, &session.user_id).await;
    page(
        "Volunteer Dashboard",
        Some(&session),
        &views::volunteer_dashboard(&data),
    )
    .into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminQuery {
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub notice: Option<String>,
}

fn notice_from_key(key: Option<&str>) -> Option<Notice> {
    match key? {
        "updated" => Some(Notice::WelcomeMessageUpdated),
        "failed" => Some(Notice::WelcomeMessageFailed),
        _ => None,
    }
}

fn notice_key(notice: Notice) -> &'static str {
    match notice {
        Notice::WelcomeMessageUpdated => "updated",
        Notice::WelcomeMessageFailed => "failed",
    }
}

/// GET /admin/dashboard
pub async fn admin_dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AdminQuery>,
) -> Response {
    let Some(session) = current_session(&state, &headers).await else {
        return Redirect::to(LOGIN_PATH).into_response();
    };
    if !session.is_admin {
        return forbidden(&session);
    }

    let sort = RegistrationSort::from_params(&SortParams {
        sort: query.sort.clone(),
        dir: query.dir.clone(),
    });
    let data = AdminDashboardData::load(&state).await;
    let notice = notice_from_key(query.notice.as_deref());

    page(
        "Admin Dashboard",
        Some(&session),
        &views::admin_dashboard(&data, sort, notice),
    )
    .into_response()
}

#[derive(Debug, Deserialize)]
pub struct WelcomeForm {
    pub message: String,
}

/// POST /admin/welcome-message
///
/// Redirects back to the dashboard, which shows the outcome once.
pub async fn admin_welcome_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<WelcomeForm>,
) -> Response {
    let Some(session) = current_session(&state, &headers).await else {
        return Redirect::to(LOGIN_PATH).into_response();
    };
    if !session.is_admin {
        return forbidden(&session);
    }

    let notice = update_welcome_message(&state, &form.message).await;
    Redirect::to(&format!("{}?notice={}", Dashboard::Admin.path(), notice_key(notice)))
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slots() {
        assert_eq!(
            parse_slots(Some(" Day 1 AM, ,Day 2 PM ")),
            vec!["Day 1 AM".to_string(), "Day 2 PM".to_string()]
        );
        assert!(parse_slots(None).is_empty());
    }

    #[test]
    fn test_notice_keys() {
        for notice in [Notice::WelcomeMessageUpdated, Notice::WelcomeMessageFailed] {
            assert_eq!(notice_from_key(Some(notice_key(notice))), Some(notice));
        }
        assert_eq!(notice_from_key(Some("bogus")), None);
        assert_eq!(notice_from_key(None), None);
    }

    #[test]
    fn test_cookies() {
        assert_eq!(
            session_cookie("abc", 1),
            "user=abc; HttpOnly; Path=/; SameSite=Lax; Max-Age=86400"
        );
        assert!(expired_cookie().starts_with("user=;"));
        assert!(expired_cookie().ends_with("Max-Age=0"));
    }
}
