//! Rosco · alphabet-ring trivia backend
//!
//! - Question normalizer for Markdown lists and spreadsheet CSV exports
//! - Round engine (turns, pasapalabra, countdown, scoring)
//! - Axum HTTP + WebSocket API over per-player sessions
//! - Remote spreadsheet sources with local fixture / seed fallback

pub mod config;
pub mod domain;
pub mod error;
pub mod logic;
pub mod normalize;
pub mod protocol;
pub mod round;
pub mod routes;
pub mod seeds;
pub mod session;
pub mod sources;
pub mod state;
pub mod telemetry;
pub mod util;
