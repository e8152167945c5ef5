use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::profiles::ParticipantOverview;
use axum::{extract::State, Json};
use tracing::info;

/// GET /api/participant/me
pub async fn get_my_overview(State(state): State<AppState>, ctx: Ctx) -> Json<ParticipantOverview> {
    info!("GET /api/participant/me - {}", ctx.user_id());
    Json(state.profiles.participant_overview(ctx.user_id()).await)
}
