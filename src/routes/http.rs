//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; typed answers are only logged by length.

use axum::{
  extract::{Path, State},
  response::IntoResponse,
  Json,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::Result;
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_list_games(State(state): State<AppState>) -> Json<Vec<GameSummary>> {
  Json(list_games(&state).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_reload_games(State(state): State<AppState>) -> Json<Vec<GameSummary>> {
  Json(reload_games(&state).await)
}

#[instrument(level = "info", skip(state, body), fields(game_id = %body.game_id))]
pub async fn http_new_session(
  State(state): State<AppState>,
  Json(body): Json<NewSessionIn>,
) -> Result<Json<RoundView>> {
  Ok(Json(new_session(&state, &body.game_id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_round(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<RoundView>> {
  Ok(Json(get_round(&state, id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_start_round(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<RoundView>> {
  Ok(Json(start_round(&state, id).await?))
}

#[instrument(level = "info", skip(state, body), fields(answer_len = body.answer.len()))]
pub async fn http_submit_answer(
  State(state): State<AppState>,
  Path(id): Path<Uuid>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<AnswerOut>> {
  Ok(Json(submit_answer(&state, id, &body.answer).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_pass(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<RoundView>> {
  Ok(Json(pass_letter(&state, id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_leave(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<RoundView>> {
  Ok(Json(leave_session(&state, id).await?))
}
