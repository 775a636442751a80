//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{ClueType, GameSet};
use crate::round::{Cue, LetterStatus, Phase, RoundEngine};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    ListGames,
    ReloadGames,
    NewSession {
        #[serde(rename = "gameId")]
        game_id: String,
    },
    Start {
        #[serde(rename = "sessionId")]
        session_id: Uuid,
    },
    SubmitAnswer {
        #[serde(rename = "sessionId")]
        session_id: Uuid,
        answer: String,
    },
    Pass {
        #[serde(rename = "sessionId")]
        session_id: Uuid,
    },
    GetRound {
        #[serde(rename = "sessionId")]
        session_id: Uuid,
    },
    Leave {
        #[serde(rename = "sessionId")]
        session_id: Uuid,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Games {
        games: Vec<GameSummary>,
    },
    Round {
        round: RoundView,
    },
    AnswerResult {
        #[serde(flatten)]
        result: AnswerOut,
    },
    Left {
        round: RoundView,
    },
    Error {
        message: String,
    },
}

/// Menu entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub id: String,
    pub title: String,
    pub question_count: usize,
}

impl From<&GameSet> for GameSummary {
    fn from(g: &GameSet) -> Self {
        Self { id: g.id.clone(), title: g.title.clone(), question_count: g.questions.len() }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LetterState {
    pub letter: char,
    pub status: LetterStatus,
}

/// What a client needs to draw the intro, play or end screen.
/// Clue fields are only filled while the round is being played.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundView {
    pub session_id: Uuid,
    pub game_id: String,
    pub title: String,
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_letter: Option<char>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clue_type: Option<ClueType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    pub score: usize,
    pub total: usize,
    pub time_remaining: u32,
    /// Ring order.
    pub statuses: Vec<LetterState>,
    pub celebrate: bool,
}

impl RoundView {
    pub fn of(session_id: Uuid, e: &RoundEngine) -> Self {
        let playing = e.phase() == Phase::Playing;
        let q = e.current_question();
        Self {
            session_id,
            game_id: e.game().id.clone(),
            title: e.game().title.clone(),
            phase: e.phase(),
            current_letter: playing.then_some(q.letter),
            clue_type: playing.then_some(q.clue_type),
            definition: playing.then(|| q.definition.clone()),
            score: e.score(),
            total: e.total(),
            time_remaining: e.time_remaining(),
            statuses: e.statuses().map(|(letter, status)| LetterState { letter, status }).collect(),
            celebrate: e.celebrate(),
        }
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSessionIn {
    pub game_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
    pub answer: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOut {
    pub letter: char,
    pub correct: bool,
    pub cue: Cue,
    /// Sound file for `cue`; playback is fire-and-forget on the client.
    pub cue_url: String,
    pub round: RoundView,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
