//! Loading service configuration (round rules, audio cues, question sources,
//! converter inputs) from TOML.
//!
//! See `AppConfig` for the expected schema. Every section is optional.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{error, info};

use crate::round::{DEFAULT_CELEBRATE_RATIO, DEFAULT_DURATION_SECS};

#[derive(Clone, Debug, Deserialize, Default, PartialEq)]
pub struct AppConfig {
  #[serde(default)]
  pub round: RoundCfg,
  #[serde(default)]
  pub sessions: SessionsCfg,
  #[serde(default)]
  pub audio: AudioCfg,
  #[serde(default)]
  pub catalog: CatalogCfg,
  #[serde(default)]
  pub convert: ConvertCfg,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RoundCfg {
  pub duration_secs: u32,
  /// Share of correct letters at which the client may celebrate.
  pub celebrate_ratio: f64,
}

impl Default for RoundCfg {
  fn default() -> Self {
    Self { duration_secs: DEFAULT_DURATION_SECS, celebrate_ratio: DEFAULT_CELEBRATE_RATIO }
  }
}

/// Abandoned sessions: how long one may go without a request, and how often
/// the registry is swept.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionsCfg {
  pub idle_timeout_secs: u64,
  pub sweep_interval_secs: u64,
}

impl Default for SessionsCfg {
  fn default() -> Self {
    Self { idle_timeout_secs: 900, sweep_interval_secs: 60 }
  }
}

/// Sound files the client plays on a verdict.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioCfg {
  pub ok_cue: String,
  pub error_cue: String,
}

impl Default for AudioCfg {
  fn default() -> Self {
    Self { ok_cue: "/Rosco/ok.wav".into(), error_cue: "/Rosco/error.wav".into() }
  }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogCfg {
  /// Local JSON fixture written by `convert-questions`.
  pub fixture_path: PathBuf,
  pub fetch_timeout_secs: u64,
  /// Published spreadsheet tabs (CSV output endpoints).
  pub sheets: Vec<SheetSource>,
  pub discovery: Option<DiscoveryCfg>,
}

impl Default for CatalogCfg {
  fn default() -> Self {
    Self {
      fixture_path: PathBuf::from("data/questions.json"),
      fetch_timeout_secs: 10,
      sheets: Vec::new(),
      discovery: None,
    }
  }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct SheetSource {
  pub id: String,
  pub title: String,
  pub url: String,
}

/// Discover tabs from a published spreadsheet page instead of listing them.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct DiscoveryCfg {
  pub pubhtml_url: String,
  #[serde(default = "default_id_prefix")]
  pub id_prefix: String,
  #[serde(default)]
  pub title_prefix: String,
}

fn default_id_prefix() -> String {
  "sheet".into()
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConvertCfg {
  pub source_dir: PathBuf,
  pub output_path: PathBuf,
  pub files: Vec<MarkdownFile>,
}

impl Default for ConvertCfg {
  fn default() -> Self {
    Self {
      source_dir: PathBuf::from("data/sources"),
      output_path: PathBuf::from("data/questions.json"),
      files: vec![
        MarkdownFile::new("Preguntas Rosco 1.md", "rosco-1", "Rosco Clásico 1"),
        MarkdownFile::new("Preguntas Rosco 2.md", "rosco-2", "Rosco Clásico 2"),
        MarkdownFile::new("Preguntas Rosco Infancias 01.md", "rosco-kids", "Rosco Infancias"),
      ],
    }
  }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct MarkdownFile {
  pub filename: String,
  pub id: String,
  pub title: String,
}

impl MarkdownFile {
  fn new(filename: &str, id: &str, title: &str) -> Self {
    Self { filename: filename.into(), id: id.into(), title: title.into() }
  }
}

/// Load config from ROSCO_CONFIG_PATH, falling back to defaults.
pub fn load_config_from_env() -> AppConfig {
  match std::env::var("ROSCO_CONFIG_PATH") {
    Ok(path) => load_config(Path::new(&path)),
    Err(_) => {
      info!(target: "rosco_backend", "ROSCO_CONFIG_PATH not set; using default config");
      AppConfig::default()
    }
  }
}

/// Load config from a TOML file. On any parsing/IO error, returns defaults.
pub fn load_config(path: &Path) -> AppConfig {
  let shown = path.display();
  match std::fs::read_to_string(path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "rosco_backend", path = %shown, sheets = cfg.catalog.sheets.len(), "Loaded config (TOML)");
        cfg
      }
      Err(e) => {
        error!(target: "rosco_backend", path = %shown, error = %e, "Failed to parse TOML config; using defaults");
        AppConfig::default()
      }
    },
    Err(e) => {
      error!(target: "rosco_backend", path = %shown, error = %e, "Failed to read TOML config file; using defaults");
      AppConfig::default()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_toml_gives_defaults() {
    let cfg: AppConfig = toml::from_str("").unwrap();
    assert_eq!(cfg, AppConfig::default());
    assert_eq!(cfg.round.duration_secs, 300);
    assert_eq!(cfg.sessions.idle_timeout_secs, 900);
    assert_eq!(cfg.convert.files.len(), 3);
    assert_eq!(cfg.convert.files[2].id, "rosco-kids");
  }

  #[test]
  fn partial_sections_keep_other_defaults() {
    let cfg: AppConfig = toml::from_str(r#"
      [round]
      duration_secs = 120

      [sessions]
      idle_timeout_secs = 60

      [[catalog.sheets]]
      id = "rosco-infancias"
      title = "Rosco Infancias (Google Sheet)"
      url = "https://example.test/pub?gid=0&single=true&output=csv"

      [catalog.discovery]
      pubhtml_url = "https://example.test/d/e/KEY/pubhtml"
    "#).unwrap();
    assert_eq!(cfg.round.duration_secs, 120);
    assert_eq!(cfg.round.celebrate_ratio, 0.8);
    assert_eq!(cfg.sessions, SessionsCfg { idle_timeout_secs: 60, sweep_interval_secs: 60 });
    assert_eq!(cfg.catalog.sheets.len(), 1);
    assert_eq!(cfg.catalog.fixture_path, PathBuf::from("data/questions.json"));
    let d = cfg.catalog.discovery.unwrap();
    assert_eq!(d.id_prefix, "sheet");
    assert_eq!(d.title_prefix, "");
    assert_eq!(cfg.audio.ok_cue, "/Rosco/ok.wav");
  }

  #[test]
  fn missing_file_falls_back_to_defaults() {
    let cfg = load_config(Path::new("/definitely/not/here.toml"));
    assert_eq!(cfg, AppConfig::default());
  }
}
