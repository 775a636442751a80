//! One player's game session: a `RoundEngine` plus the countdown ticker that
//! drives it while the round is being played.
//!
//! The ticker only exists between `start()` and the round leaving `Playing`
//! (or the session being stopped/dropped), so a discarded session is never
//! mutated by a dangling timer.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::debug;
use uuid::Uuid;

use crate::error::RoundError;
use crate::round::{Phase, RoundEngine, Verdict};

const TICK: Duration = Duration::from_secs(1);

pub struct Session {
    id: Uuid,
    engine: Arc<Mutex<RoundEngine>>,
    ticker: StdMutex<Option<JoinHandle<()>>>,
    last_seen: StdMutex<Instant>,
}

impl Session {
    pub fn new(engine: RoundEngine) -> Self {
        Self {
            id: Uuid::new_v4(),
            engine: Arc::new(Mutex::new(engine)),
            ticker: StdMutex::new(None),
            last_seen: StdMutex::new(Instant::now()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Intro -> Playing, then start the countdown.
    pub async fn start(&self) -> Result<(), RoundError> {
        self.engine.lock().await.start()?;
        let handle = self.spawn_ticker();
        if let Some(old) = self.ticker_slot().replace(handle) {
            old.abort();
        }
        debug!(target: "round", session = %self.id, "Countdown started");
        Ok(())
    }

    fn spawn_ticker(&self) -> JoinHandle<()> {
        let engine = Arc::clone(&self.engine);
        let id = self.id;
        tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK, TICK);
            loop {
                interval.tick().await;
                if engine.lock().await.tick() != Phase::Playing {
                    debug!(target: "round", session = %id, "Countdown stopped");
                    break;
                }
            }
        })
    }

    /// Cancel the countdown, if any. Idempotent.
    pub fn stop(&self) {
        if let Some(handle) = self.ticker_slot().take() {
            handle.abort();
        }
    }

    /// Record client activity.
    pub fn touch(&self) {
        *self.last_seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Instant::now();
    }

    /// Time since the last client activity.
    pub fn idle_for(&self) -> Duration {
        self.last_seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).elapsed()
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker_slot().as_ref().is_some_and(|h| !h.is_finished())
    }

    pub async fn submit(&self, raw: &str) -> Result<Verdict, RoundError> {
        let mut engine = self.engine.lock().await;
        let verdict = engine.submit(raw)?;
        if engine.phase() != Phase::Playing {
            self.stop();
        }
        Ok(verdict)
    }

    pub async fn pass(&self) -> Result<(), RoundError> {
        let mut engine = self.engine.lock().await;
        engine.pass()?;
        if engine.phase() != Phase::Playing {
            self.stop();
        }
        Ok(())
    }

    /// Read the engine under its lock.
    pub async fn inspect<R>(&self, f: impl FnOnce(&RoundEngine) -> R) -> R {
        f(&*self.engine.lock().await)
    }

    fn ticker_slot(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.ticker.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}
