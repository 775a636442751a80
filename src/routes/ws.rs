//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.
//! Sessions created over a socket are torn down when that socket closes.

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::logic::*;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
  info!(target: "rosco_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: AppState) {
  info!(target: "rosco_backend", "WebSocket connected");
  let mut conn = WsConnection::new(state);
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "rosco_backend", bytes = txt.len(), "WS message received");
            conn.handle(incoming).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "rosco_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  conn.close().await;
  info!(target: "rosco_backend", "WebSocket disconnected");
}

/// One socket's view of the service: remembers the sessions it created so
/// they go away with it.
pub struct WsConnection {
  state: AppState,
  owned: Vec<Uuid>,
}

impl WsConnection {
  pub fn new(state: AppState) -> Self {
    Self { state, owned: Vec::new() }
  }

  pub async fn handle(&mut self, msg: ClientWsMessage) -> ServerWsMessage {
    let creating = matches!(msg, ClientWsMessage::NewSession { .. });
    let leaving = match &msg {
      ClientWsMessage::Leave { session_id } => Some(*session_id),
      _ => None,
    };

    let reply = handle_client_ws(msg, &self.state).await;
    match &reply {
      ServerWsMessage::Round { round } if creating => self.owned.push(round.session_id),
      ServerWsMessage::Left { .. } => {
        if let Some(id) = leaving {
          self.owned.retain(|owned| *owned != id);
        }
      }
      _ => {}
    }
    reply
  }

  /// Tear down every session this socket still owns.
  pub async fn close(self) {
    if !self.owned.is_empty() {
      debug!(target: "round", sessions = self.owned.len(), "Discarding sessions of closed socket");
      self.state.discard_sessions(&self.owned).await;
    }
  }
}

#[instrument(level = "info", skip_all)]
pub async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  let reply: Result<ServerWsMessage, ApiError> = match msg {
    ClientWsMessage::Ping => Ok(ServerWsMessage::Pong),

    ClientWsMessage::ListGames => Ok(ServerWsMessage::Games { games: list_games(state).await }),

    ClientWsMessage::ReloadGames => Ok(ServerWsMessage::Games { games: reload_games(state).await }),

    ClientWsMessage::NewSession { game_id } =>
      new_session(state, &game_id).await.map(|round| ServerWsMessage::Round { round }),

    ClientWsMessage::Start { session_id } =>
      start_round(state, session_id).await.map(|round| ServerWsMessage::Round { round }),

    ClientWsMessage::SubmitAnswer { session_id, answer } =>
      submit_answer(state, session_id, &answer).await.map(|result| ServerWsMessage::AnswerResult { result }),

    ClientWsMessage::Pass { session_id } =>
      pass_letter(state, session_id).await.map(|round| ServerWsMessage::Round { round }),

    ClientWsMessage::GetRound { session_id } =>
      get_round(state, session_id).await.map(|round| ServerWsMessage::Round { round }),

    ClientWsMessage::Leave { session_id } =>
      leave_session(state, session_id).await.map(|round| ServerWsMessage::Left { round }),
  };

  reply.unwrap_or_else(|e| ServerWsMessage::Error { message: e.to_string() })
}
