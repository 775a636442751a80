//! Small utility helpers used across modules.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Fold a typed or accepted answer for comparison:
/// lower-case, decompose, drop combining marks (accents, tilde), trim.
/// Folding twice gives the same result as folding once.
pub fn fold_answer(s: &str) -> String {
  s.to_lowercase()
    .nfd()
    .filter(|c| !is_combining_mark(*c))
    .collect::<String>()
    .trim()
    .to_string()
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with whole CSV or HTML bodies.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) { cut -= 1; }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}
