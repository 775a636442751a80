//! Question normalizer: loosely structured Markdown lists and spreadsheet CSV
//! exports in, uniform `GameSet`s out.
//!
//! Markdown clue lines look like
//!   `**[Contiene ]<LETTER>[:] <definition>** (<answer>).`
//! CSV sources carry a header row with Spanish or English column names.
//!
//! Lines or rows that don't fit are dropped, never fatal.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::domain::{alphabet_position, ClueType, GameSet, QuestionRecord};
use crate::util::fold_answer;

static CLUE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\*\*(?:Contiene\s+)?([A-ZÑ])[\s-]*\**[:\s]*(.+?)\**\s*\((.+?)\)[.\s]*$")
        .expect("clue line pattern")
});

// Looser form: letter marker bolded on its own, definition after the bold run.
static CLUE_LINE_LOOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\*\*(?:Contiene\s+)?([A-ZÑ]).*\*\*\s*(.+?)\s*\((.+?)\)")
        .expect("loose clue line pattern")
});

const LETTER_COLUMNS: &[&str] = &["letter", "letra"];
const DEFINITION_COLUMNS: &[&str] = &["definition", "definicion", "pregunta"];
const ANSWER_COLUMNS: &[&str] = &["answer", "respuesta"];

/// Raw text handed to the normalizer.
#[derive(Clone, Copy, Debug)]
pub enum RawSource<'a> {
    Markdown(&'a str),
    Csv(&'a str),
}

/// Normalize one source into a sorted game set.
pub fn normalize(id: &str, title: &str, source: RawSource<'_>) -> GameSet {
    let records = match source {
        RawSource::Markdown(text) => parse_markdown(text),
        RawSource::Csv(text) => parse_csv(text),
    };
    GameSet::new(id, title, records)
}

/// Parse every clue line of a Markdown document, in document order.
pub fn parse_markdown(content: &str) -> Vec<QuestionRecord> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_markdown_line)
        .collect()
}

/// Parse a single trimmed Markdown line.
pub fn parse_markdown_line(line: &str) -> Option<QuestionRecord> {
    let caps = CLUE_LINE
        .captures(line)
        .or_else(|| CLUE_LINE_LOOSE.captures(line))?;

    let letter = caps[1].to_uppercase().chars().next()?;
    // Case-insensitive matching also admits look-alikes such as U+212A.
    alphabet_position(letter)?;
    let definition = caps[2].trim().to_string();
    let answer = caps[3]
        .replace("**", "")
        .trim()
        .trim_end_matches('.')
        .trim()
        .to_string();

    let clue_type = if line.to_lowercase().contains("contiene") || letter == 'Ñ' {
        ClueType::Contains
    } else {
        ClueType::StartsWith
    };

    Some(QuestionRecord::new(letter, clue_type, definition, answer))
}

/// Parse a CSV export with a header row. Rows missing letter, definition or
/// answer, or whose letter can't be resolved, are dropped.
pub fn parse_csv(text: &str) -> Vec<QuestionRecord> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(h) => h.iter().map(fold_answer).collect(),
        Err(e) => {
            debug!(target: "catalog", error = %e, "CSV header unreadable");
            return Vec::new();
        }
    };
    let columns = |aliases: &[&str]| -> Vec<usize> {
        headers
            .iter()
            .enumerate()
            .filter(|(_, h)| aliases.contains(&h.as_str()))
            .map(|(i, _)| i)
            .collect()
    };
    let letter_cols = columns(LETTER_COLUMNS);
    let def_cols = columns(DEFINITION_COLUMNS);
    let ans_cols = columns(ANSWER_COLUMNS);

    let mut out = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(target: "catalog", row, error = %e, "Skipping unreadable CSV row");
                continue;
            }
        };
        let first = |cols: &[usize]| cols.iter().filter_map(|&i| record.get(i)).find(|v| !v.is_empty());

        let (Some(raw_letter), Some(definition), Some(answer)) =
            (first(&letter_cols[..]), first(&def_cols[..]), first(&ans_cols[..]))
        else {
            debug!(target: "catalog", row, "Skipping CSV row with missing fields");
            continue;
        };
        let Some((letter, mut clue_type)) = resolve_letter(raw_letter) else {
            debug!(target: "catalog", row, raw_letter, "Skipping CSV row with unusable letter");
            continue;
        };

        // The type hint may live in the definition instead of the letter column.
        let hint = format!("contiene {}", letter.to_lowercase());
        if definition.to_lowercase().starts_with(&hint) {
            clue_type = ClueType::Contains;
        }

        out.push(QuestionRecord::new(letter, clue_type, definition, answer));
    }
    out
}

/// Resolve the letter column: `"A"`, `"contiene z"`, `"Ñ"`, `"B."`.
fn resolve_letter(raw: &str) -> Option<(char, ClueType)> {
    let upper = raw.to_uppercase();
    let (cleaned, mut clue_type) = if upper.contains("CONTIENE") {
        (only_ring_letters(&upper.replacen("CONTIENE", "", 1)), ClueType::Contains)
    } else {
        (only_ring_letters(&upper), ClueType::StartsWith)
    };

    let mut chars = cleaned.chars();
    let letter = match (chars.next(), chars.next()) {
        (Some(c), None) => c,
        _ => return None,
    };
    if letter == 'Ñ' {
        clue_type = ClueType::Contains;
    }
    Some((letter, clue_type))
}

fn only_ring_letters(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_uppercase() || *c == 'Ñ').collect()
}
