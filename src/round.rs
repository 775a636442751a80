//! Round engine: one Rosco session's turn/round state machine.
//!
//! `Intro -> Playing -> Finished`, one-way. While playing, the engine walks the
//! ring circularly, skipping letters that already have a verdict, and ends the
//! round when none are left or the clock runs out.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::domain::{GameSet, QuestionRecord};
use crate::error::RoundError;
use crate::util::fold_answer;

pub const DEFAULT_DURATION_SECS: u32 = 300;
pub const DEFAULT_CELEBRATE_RATIO: f64 = 0.8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Intro,
    Playing,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterStatus {
    Unanswered,
    Correct,
    Incorrect,
}

/// Sound the client should play after a submission. Playback is the client's
/// business; a failed playback never reaches the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    Ok,
    Error,
}

/// Outcome of one submitted answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub letter: char,
    pub correct: bool,
    pub cue: Cue,
}

#[derive(Clone, Debug)]
pub struct RoundEngine {
    game: GameSet,
    duration_secs: u32,
    celebrate_ratio: f64,
    phase: Phase,
    current_index: usize,
    /// Only verdicts are stored; a missing key means unanswered.
    statuses: HashMap<char, LetterStatus>,
    score: usize,
    time_remaining: u32,
}

impl RoundEngine {
    /// A fresh round in `Intro`. Empty sets are rejected up front.
    pub fn new(game: GameSet, duration_secs: u32) -> Result<Self, RoundError> {
        if game.is_empty() {
            return Err(RoundError::EmptyGameSet);
        }
        Ok(Self {
            game,
            duration_secs,
            celebrate_ratio: DEFAULT_CELEBRATE_RATIO,
            phase: Phase::Intro,
            current_index: 0,
            statuses: HashMap::new(),
            score: 0,
            time_remaining: duration_secs,
        })
    }

    pub fn with_celebrate_ratio(mut self, ratio: f64) -> Self {
        self.celebrate_ratio = ratio;
        self
    }

    pub fn start(&mut self) -> Result<(), RoundError> {
        if self.phase != Phase::Intro {
            return Err(RoundError::AlreadyStarted);
        }
        self.phase = Phase::Playing;
        self.time_remaining = self.duration_secs;
        self.current_index = 0;
        debug!(target: "round", game = %self.game.id, secs = self.duration_secs, "Round started");
        Ok(())
    }

    /// One elapsed second. Ignored outside `Playing`.
    pub fn tick(&mut self) -> Phase {
        if self.phase == Phase::Playing {
            if self.time_remaining <= 1 {
                self.time_remaining = 0;
                debug!(target: "round", game = %self.game.id, score = self.score, "Time is up");
                self.finish();
            } else {
                self.time_remaining -= 1;
            }
        }
        self.phase
    }

    /// Judge `raw` against the current letter, record the verdict and move on.
    pub fn submit(&mut self, raw: &str) -> Result<Verdict, RoundError> {
        if self.phase != Phase::Playing {
            return Err(RoundError::NotPlaying);
        }
        let typed = fold_answer(raw);
        let question = self.current_question();
        let letter = question.letter;
        let correct = question.accepted_answers().iter().any(|a| fold_answer(a) == typed);

        if correct {
            self.statuses.insert(letter, LetterStatus::Correct);
            self.score += 1;
        } else {
            self.statuses.insert(letter, LetterStatus::Incorrect);
        }
        debug!(target: "round", game = %self.game.id, %letter, correct, score = self.score, "Answer judged");
        self.advance();

        Ok(Verdict { letter, correct, cue: if correct { Cue::Ok } else { Cue::Error } })
    }

    /// Pasapalabra: leave the letter unanswered and move on.
    pub fn pass(&mut self) -> Result<(), RoundError> {
        if self.phase != Phase::Playing {
            return Err(RoundError::NotPlaying);
        }
        debug!(target: "round", game = %self.game.id, letter = %self.current_question().letter, "Pasapalabra");
        self.advance();
        Ok(())
    }

    /// Scan forward circularly from the next index for an unanswered letter,
    /// at most one full lap. No such letter ends the round.
    fn advance(&mut self) {
        let n = self.game.questions.len();
        let next = (1..=n)
            .map(|step| (self.current_index + step) % n)
            .find(|&i| !self.statuses.contains_key(&self.game.questions[i].letter));

        match next {
            Some(i) => self.current_index = i,
            None => self.finish(),
        }
    }

    fn finish(&mut self) {
        self.phase = Phase::Finished;
        debug!(target: "round", game = %self.game.id, score = self.score, total = self.total(), celebrate = self.celebrate(), "Round finished");
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn game(&self) -> &GameSet {
        &self.game
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> &QuestionRecord {
        &self.game.questions[self.current_index]
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn total(&self) -> usize {
        self.game.questions.len()
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn status(&self, letter: char) -> LetterStatus {
        self.statuses.get(&letter).copied().unwrap_or(LetterStatus::Unanswered)
    }

    /// Status of every letter of the set, in ring order.
    pub fn statuses(&self) -> impl Iterator<Item = (char, LetterStatus)> + '_ {
        self.game.questions.iter().map(|q| (q.letter, self.status(q.letter)))
    }

    /// Finished with at least `celebrate_ratio` of the ring right.
    pub fn celebrate(&self) -> bool {
        self.phase == Phase::Finished && self.score as f64 >= self.total() as f64 * self.celebrate_ratio
    }
}
