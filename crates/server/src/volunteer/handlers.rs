use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::{Error, Result};
use crate::core::models::{Task, VolunteerProfile};
use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

/// GET /api/volunteer/{id}
pub async fn get_volunteer(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(id): Path<String>,
) -> Result<Json<VolunteerProfile>> {
    info!("GET /api/volunteer/{}", id);

    if !ctx.can_read(&id) {
        return Err(Error::Forbidden);
    }

    state
        .volunteers
        .volunteer(&id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::NotFound("Volunteer".to_string()))
}

/// GET /api/volunteer/{id}/tasks
pub async fn get_volunteer_tasks(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(id): Path<String>,
) -> Result<Json<Vec<Task>>> {
    info!("GET /api/volunteer/{}/tasks", id);

    if !ctx.can_read(&id) {
        return Err(Error::Forbidden);
    }

    Ok(Json(state.volunteers.tasks(&id).await?))
}
