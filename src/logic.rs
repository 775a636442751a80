//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Menu listing and catalog reload
//!   - Session lifecycle (create, start, leave)
//!   - Round actions (submit answer, pasapalabra) and the resulting views

use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::Result;
use crate::protocol::{AnswerOut, GameSummary, RoundView};
use crate::round::Cue;
use crate::state::AppState;

pub async fn list_games(state: &AppState) -> Vec<GameSummary> {
  state.menu().await
}

pub async fn reload_games(state: &AppState) -> Vec<GameSummary> {
  state.reload_catalog().await;
  state.menu().await
}

#[instrument(level = "info", skip(state), fields(%game_id))]
pub async fn new_session(state: &AppState, game_id: &str) -> Result<RoundView> {
  let session = state.create_session(game_id).await?;
  let id = session.id();
  Ok(session.inspect(|e| RoundView::of(id, e)).await)
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn start_round(state: &AppState, session_id: Uuid) -> Result<RoundView> {
  let session = state.get_session(session_id).await?;
  session.start().await?;
  Ok(session.inspect(|e| RoundView::of(session_id, e)).await)
}

#[instrument(level = "info", skip(state, answer), fields(%session_id, answer_len = answer.len()))]
pub async fn submit_answer(state: &AppState, session_id: Uuid, answer: &str) -> Result<AnswerOut> {
  let session = state.get_session(session_id).await?;
  let verdict = session.submit(answer).await?;
  let round = session.inspect(|e| RoundView::of(session_id, e)).await;

  let audio = &state.config.audio;
  let cue_url = match verdict.cue {
    Cue::Ok => audio.ok_cue.clone(),
    Cue::Error => audio.error_cue.clone(),
  };
  info!(target: "round", session = %session_id, letter = %verdict.letter, correct = verdict.correct, score = round.score, "Answer evaluated");

  Ok(AnswerOut { letter: verdict.letter, correct: verdict.correct, cue: verdict.cue, cue_url, round })
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn pass_letter(state: &AppState, session_id: Uuid) -> Result<RoundView> {
  let session = state.get_session(session_id).await?;
  session.pass().await?;
  Ok(session.inspect(|e| RoundView::of(session_id, e)).await)
}

pub async fn get_round(state: &AppState, session_id: Uuid) -> Result<RoundView> {
  let session = state.get_session(session_id).await?;
  Ok(session.inspect(|e| RoundView::of(session_id, e)).await)
}

/// Leave at any phase; the final view is returned for the end screen.
#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn leave_session(state: &AppState, session_id: Uuid) -> Result<RoundView> {
  let session = state.remove_session(session_id).await?;
  Ok(session.inspect(|e| RoundView::of(session_id, e)).await)
}
