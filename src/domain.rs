//! Domain models: the Rosco alphabet, clue types, question records and game sets.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// The fixed Rosco ring, in play order.
pub const ALPHABET: &str = "ABCDEFGHIJKLMNÑOPQRSTUVWXYZ";

/// Position of `letter` in the ring. Letters outside the ring have no position
/// and sort before every known letter.
pub fn alphabet_position(letter: char) -> Option<usize> {
  ALPHABET.chars().position(|c| c == letter)
}

/// Does the answer have to start with the letter, or only contain it?
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClueType {
  #[default]
  #[serde(rename = "Empieza")]
  StartsWith,
  #[serde(rename = "Contiene")]
  Contains,
}

/// One clue of the ring.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
  pub letter: char,
  #[serde(rename = "type", default)]
  pub clue_type: ClueType,
  pub definition: String,
  pub answer: String,
  /// Alternative accepted answers. When non-empty it replaces `answer` for matching.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub answers: Vec<String>,
}

impl QuestionRecord {
  pub fn new(letter: char, clue_type: ClueType, definition: impl Into<String>, answer: impl Into<String>) -> Self {
    Self { letter, clue_type, definition: definition.into(), answer: answer.into(), answers: Vec::new() }
  }

  /// Every string the player may type to get this letter right.
  pub fn accepted_answers(&self) -> &[String] {
    if self.answers.is_empty() { std::slice::from_ref(&self.answer) } else { &self.answers }
  }
}

/// A playable ring: one record per letter, ordered by the alphabet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSet {
  pub id: String,
  pub title: String,
  pub questions: Vec<QuestionRecord>,
}

impl GameSet {
  /// Build a set from records in source order.
  /// A repeated letter replaces the earlier record (last write wins); the result is sorted.
  pub fn new(id: impl Into<String>, title: impl Into<String>, records: Vec<QuestionRecord>) -> Self {
    let id = id.into();
    let mut questions: Vec<QuestionRecord> = Vec::with_capacity(records.len());
    for rec in records {
      match questions.iter_mut().find(|q| q.letter == rec.letter) {
        Some(existing) => {
          warn!(target: "catalog", set = %id, letter = %rec.letter, "Duplicate letter; keeping the later record");
          *existing = rec;
        }
        None => questions.push(rec),
      }
    }
    sort_by_alphabet(&mut questions);
    Self { id, title: title.into(), questions }
  }

  pub fn is_empty(&self) -> bool {
    self.questions.is_empty()
  }
}

/// Stable sort by ring position; unknown letters go first, keeping their input order.
pub fn sort_by_alphabet(questions: &mut [QuestionRecord]) {
  questions.sort_by_key(|q| alphabet_position(q.letter));
}
