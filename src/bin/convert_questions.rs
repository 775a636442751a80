//! Convert the Rosco Markdown question lists into the JSON fixture served by
//! the backend.
//!
//! Files, ids and titles come from the `[convert]` section of the TOML config
//! (or the built-in defaults); flags override the directories.

use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};

use rosco_backend::config::{load_config, AppConfig};
use rosco_backend::domain::GameSet;
use rosco_backend::normalize::{normalize, RawSource};
use rosco_backend::telemetry;

#[derive(Parser, Debug)]
#[command(name = "convert-questions", about = "Build the Rosco JSON fixture from Markdown question lists")]
struct Args {
  /// TOML config with a [convert] section
  #[arg(short, long, env = "ROSCO_CONFIG_PATH")]
  config: Option<PathBuf>,

  /// Directory holding the Markdown files
  #[arg(short, long)]
  source_dir: Option<PathBuf>,

  /// Where to write the JSON fixture
  #[arg(short, long)]
  output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();
  let args = Args::parse();

  let mut convert = args.config.as_deref().map(load_config).unwrap_or_else(AppConfig::default).convert;
  if let Some(dir) = args.source_dir { convert.source_dir = dir; }
  if let Some(out) = args.output { convert.output_path = out; }

  let mut results: Vec<GameSet> = Vec::new();
  for file in &convert.files {
    let path = convert.source_dir.join(&file.filename);
    info!(target: "rosco_backend", path = %path.display(), "Parsing");
    let content = match std::fs::read_to_string(&path) {
      Ok(c) => c,
      Err(e) => {
        warn!(target: "rosco_backend", path = %path.display(), error = %e, "File not readable; skipping");
        continue;
      }
    };
    let set = normalize(&file.id, &file.title, RawSource::Markdown(&content));
    info!(target: "rosco_backend", id = %set.id, questions = set.questions.len(), "Found questions");
    results.push(set);
  }

  if let Some(dir) = convert.output_path.parent().filter(|d| !d.as_os_str().is_empty()) {
    std::fs::create_dir_all(dir)?;
  }
  std::fs::write(&convert.output_path, serde_json::to_string_pretty(&results)?)?;
  info!(target: "rosco_backend", sets = results.len(), path = %convert.output_path.display(), "Fixture written");
  Ok(())
}
