//! Core Router
//!
//! Public pages and auth, the authenticated JSON API, and the admin API.

use crate::admin::handlers as admin_handlers;
use crate::core::auth::handlers as auth_handlers;
use crate::core::auth::middleware::{mw_require_admin, mw_require_auth};
use crate::core::AppState;
use crate::pages::handlers as pages;
use crate::profiles::handlers as profile_handlers;
use crate::volunteer::handlers as volunteer_handlers;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(pages::home))
        .route("/schedule", get(pages::schedule))
        .route("/register", get(pages::register_page).post(pages::register_submit))
        .route("/login", get(pages::login_page).post(pages::login_submit))
        .route("/logout", post(pages::logout_submit))
        .route("/participant/dashboard", get(pages::participant_dashboard))
        .route("/volunteer/dashboard", get(pages::volunteer_dashboard))
        .route("/admin/dashboard", get(pages::admin_dashboard))
        .route("/admin/welcome-message", post(pages::admin_welcome_submit))
        .route("/auth/login", post(auth_handlers::login))
        .route("/auth/logout", post(auth_handlers::logout))
        .route("/health", get(health_check));

    let authed = Router::new()
        .route("/auth/me", get(auth_handlers::me))
        .route("/api/participant/me", get(profile_handlers::get_my_overview))
        .route("/api/volunteer/{id}", get(volunteer_handlers::get_volunteer))
        .route(
            "/api/volunteer/{id}/tasks",
            get(volunteer_handlers::get_volunteer_tasks),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), mw_require_auth));

    // Layers run outermost-last: auth resolves the Ctx before the admin check.
    let admin = Router::new()
        .route(
            "/api/admin/registrations",
            get(admin_handlers::list_registrations),
        )
        .route(
            "/api/admin/teams",
            get(admin_handlers::list_teams).post(admin_handlers::create_team),
        )
        .route(
            "/api/admin/teams/{team_id}/members",
            post(admin_handlers::add_team_member),
        )
        .route(
            "/api/admin/welcome-message",
            get(admin_handlers::get_welcome_message).post(admin_handlers::set_welcome_message),
        )
        .route("/api/admin/tasks", post(admin_handlers::create_task))
        .route_layer(middleware::from_fn(mw_require_admin))
        .route_layer(middleware::from_fn_with_state(state, mw_require_auth));

    public.merge(authed).merge(admin)
}

async fn health_check() -> &'static str {
    "OK - Hackathon Server"
}
