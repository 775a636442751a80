//! Application state: the game catalog and the registry of live sessions.
//!
//! This module owns:
//!   - the catalog (remote sheets + local fixture, or the seed set)
//!   - the sessions map, keyed by session id
//!   - the loaded configuration
//!
//! Sessions never share state with each other; each one owns its engine and
//! its countdown. A session leaves the registry when its client leaves, when
//! the WebSocket that created it closes, or when it sits idle past
//! `[sessions] idle_timeout_secs`.

use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::domain::GameSet;
use crate::error::ApiError;
use crate::protocol::GameSummary;
use crate::round::RoundEngine;
use crate::session::Session;
use crate::sources::load_catalog;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub catalog: Arc<RwLock<Vec<GameSet>>>,
    pub sessions: Arc<RwLock<HashMap<Uuid, Arc<Session>>>>,
}

impl AppState {
    /// Build state from config: load the catalog from every configured source.
    #[instrument(level = "info", skip_all)]
    pub async fn new(config: AppConfig) -> Self {
        let games = load_catalog(&config.catalog).await;
        Self::with_catalog(config, games)
    }

    /// Build state around an already loaded catalog.
    pub fn with_catalog(config: AppConfig, games: Vec<GameSet>) -> Self {
        for g in &games {
            info!(target: "catalog", id = %g.id, title = %g.title, questions = g.questions.len(), "Game available");
        }
        Self {
            config: Arc::new(config),
            catalog: Arc::new(RwLock::new(games)),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Menu entries in catalog order.
    pub async fn menu(&self) -> Vec<GameSummary> {
        self.catalog.read().await.iter().map(GameSummary::from).collect()
    }

    /// Reload every source. Running sessions keep the set they started with.
    #[instrument(level = "info", skip(self))]
    pub async fn reload_catalog(&self) {
        let games = load_catalog(&self.config.catalog).await;
        info!(target: "catalog", games = games.len(), "Catalog reloaded");
        *self.catalog.write().await = games;
    }

    /// The first set with this id, if any.
    pub async fn find_game(&self, id: &str) -> Option<GameSet> {
        self.catalog.read().await.iter().find(|g| g.id == id).cloned()
    }

    /// New session in `Intro` for game `game_id`.
    #[instrument(level = "info", skip(self))]
    pub async fn create_session(&self, game_id: &str) -> Result<Arc<Session>, ApiError> {
        let game = self
            .find_game(game_id)
            .await
            .ok_or_else(|| ApiError::NotFound(format!("game {game_id}")))?;
        let engine = RoundEngine::new(game, self.config.round.duration_secs)?
            .with_celebrate_ratio(self.config.round.celebrate_ratio);

        let session = Arc::new(Session::new(engine));
        self.sessions.write().await.insert(session.id(), Arc::clone(&session));
        info!(target: "round", session = %session.id(), %game_id, "Session created");
        Ok(session)
    }

    /// Look a session up for a client request; counts as activity.
    pub async fn get_session(&self, id: Uuid) -> Result<Arc<Session>, ApiError> {
        let session = self
            .sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("session {id}")))?;
        session.touch();
        Ok(session)
    }

    /// Tear a session down: forget it and stop its countdown.
    #[instrument(level = "info", skip(self))]
    pub async fn remove_session(&self, id: Uuid) -> Result<Arc<Session>, ApiError> {
        let removed = self.sessions.write().await.remove(&id);
        match removed {
            Some(session) => {
                session.stop();
                info!(target: "round", session = %id, "Session left");
                Ok(session)
            }
            None => {
                warn!(target: "round", session = %id, "Leave for unknown session");
                Err(ApiError::NotFound(format!("session {id}")))
            }
        }
    }

    /// Drop sessions whose client went away (closed socket). Ids already gone
    /// are skipped.
    pub async fn discard_sessions(&self, ids: &[Uuid]) {
        let mut sessions = self.sessions.write().await;
        for id in ids {
            if let Some(session) = sessions.remove(id) {
                session.stop();
                info!(target: "round", session = %id, "Session discarded");
            }
        }
    }

    /// Remove every session idle for at least `max_idle`. Returns how many went.
    pub async fn reap_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, session| {
            if session.idle_for() < max_idle {
                return true;
            }
            session.stop();
            info!(target: "round", session = %id, idle = ?session.idle_for(), "Idle session reaped");
            false
        });
        before - sessions.len()
    }

    /// Background sweep of idle sessions, per `[sessions]` config.
    pub fn spawn_reaper(&self) -> JoinHandle<()> {
        let state = self.clone();
        let cfg = &self.config.sessions;
        let max_idle = Duration::from_secs(cfg.idle_timeout_secs);
        let every = Duration::from_secs(cfg.sweep_interval_secs.max(1));
        tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + every, every);
            loop {
                interval.tick().await;
                let reaped = state.reap_idle(max_idle).await;
                let live = state.sessions.read().await.len();
                debug!(target: "round", reaped, live, "Session sweep");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionsCfg;
    use crate::seeds::{seed_game_set, SEED_SET_ID};

    fn state(sessions: SessionsCfg) -> AppState {
        let config = AppConfig { sessions, ..AppConfig::default() };
        AppState::with_catalog(config, vec![seed_game_set()])
    }

    #[tokio::test(start_paused = true)]
    async fn reap_removes_only_idle_sessions() {
        let st = state(SessionsCfg::default());
        let idle = st.create_session(SEED_SET_ID).await.unwrap();
        let active = st.create_session(SEED_SET_ID).await.unwrap();
        idle.start().await.unwrap();

        tokio::time::advance(Duration::from_secs(50)).await;
        st.get_session(active.id()).await.unwrap();
        tokio::time::advance(Duration::from_secs(20)).await;

        assert_eq!(st.reap_idle(Duration::from_secs(60)).await, 1);
        assert!(st.get_session(idle.id()).await.is_err());
        assert!(!idle.is_ticking());
        assert!(st.get_session(active.id()).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn reaper_task_sweeps_abandoned_sessions() {
        let st = state(SessionsCfg { idle_timeout_secs: 30, sweep_interval_secs: 10 });
        let reaper = st.spawn_reaper();
        st.create_session(SEED_SET_ID).await.unwrap();

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(st.sessions.read().await.len(), 1);
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(st.sessions.read().await.is_empty());
        reaper.abort();
    }

    #[tokio::test]
    async fn discard_skips_unknown_ids() {
        let st = state(SessionsCfg::default());
        let kept = st.create_session(SEED_SET_ID).await.unwrap();
        let gone = st.create_session(SEED_SET_ID).await.unwrap();
        st.discard_sessions(&[gone.id(), Uuid::new_v4()]).await;
        let ids: Vec<Uuid> = st.sessions.read().await.keys().copied().collect();
        assert_eq!(ids, vec![kept.id()]);
    }
}
