use crate::admin::sort::{RegistrationSort, SortParams};
use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::{Error, Result};
use crate::core::models::{Registration, Task, Team, TeamSummary, WelcomeMessage};
use crate::volunteer::NewTask;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};

/// GET /api/admin/registrations
pub async fn list_registrations(
    State(state): State<AppState>,
    Query(params): Query<SortParams>,
) -> Result<Json<Vec<Registration>>> {
    info!("GET /api/admin/registrations");

    let mut registrations = state.admin.registrations().await?;
    if let Some(sort) = RegistrationSort::from_params(&params) {
        sort.apply(&mut registrations);
    }
    Ok(Json(registrations))
}

/// GET /api/admin/teams
pub async fn list_teams(State(state): State<AppState>) -> Result<Json<Vec<TeamSummary>>> {
    info!("GET /api/admin/teams");
    Ok(Json(state.admin.teams().await?))
}

/// GET /api/admin/welcome-message
pub async fn get_welcome_message(State(state): State<AppState>) -> Result<Json<WelcomeMessage>> {
    info!("GET /api/admin/welcome-message");
    Ok(Json(state.admin.welcome_message().await?))
}

/// POST /api/admin/welcome-message
pub async fn set_welcome_message(
    State(state): State<AppState>,
    ctx: Ctx,
    Json(body): Json<WelcomeMessage>,
) -> Result<Json<WelcomeMessage>> {
    info!("POST /api/admin/welcome-message - by {}", ctx.email());
    state.admin.set_welcome_message(&body.message).await?;
    Ok(Json(body))
}

#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
    pub max_members: Option<i64>,
}

/// POST /api/admin/teams
pub async fn create_team(
    State(state): State<AppState>,
    ctx: Ctx,
    Json(req): Json<CreateTeamRequest>,
) -> Result<Json<Team>> {
    info!("POST /api/admin/teams - {}", req.name);

    state
        .profiles
        .create_team(&req.name, Some(ctx.user_id()), req.max_members.unwrap_or(4))
        .await
        .map(Json)
        .map_err(|e| {
            warn!("Team creation failed: {}", e);
            Error::BadRequest(e.to_string())
        })
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: String,
}

/// POST /api/admin/teams/{team_id}/members
pub async fn add_team_member(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(req): Json<AddMemberRequest>,
) -> Result<Json<Team>> {
    info!("POST /api/admin/teams/{}/members - {}", team_id, req.user_id);

    state
        .profiles
        .add_member(&team_id, &req.user_id)
        .await
        .map_err(|e| {
            warn!("Adding member failed: {}", e);
            Error::BadRequest(e.to_string())
        })?;

    state
        .profiles
        .participant_overview(&req.user_id)
        .await
        .team
        .map(Json)
        .ok_or_else(|| Error::NotFound("Team".to_string()))
}

/// POST /api/admin/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<NewTask>,
) -> Result<Json<Task>> {
    info!("POST /api/admin/tasks - {}", req.name);

    state
        .volunteers
        .create_task(&req)
        .await
        .map(Json)
        .map_err(|e| {
            warn!("Task creation failed: {}", e);
            Error::BadRequest(e.to_string())
        })
}
