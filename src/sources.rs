//! Question sources: published spreadsheet tabs over HTTP, the local JSON
//! fixture, and the built-in seed set.
//!
//! Every remote fetch is best-effort. Transport errors, non-2xx statuses and
//! sheets that yield zero questions all resolve to "unavailable" here and are
//! logged; the catalog then falls back to the fixture, and to the seeds if the
//! fixture is missing too.

use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::header::USER_AGENT;
use tracing::{debug, info, instrument, warn};

use crate::config::{CatalogCfg, DiscoveryCfg, SheetSource};
use crate::domain::GameSet;
use crate::error::SourceError;
use crate::normalize::{normalize, RawSource};
use crate::seeds::seed_game_set;
use crate::util::trunc_for_log;

static TAB_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"name:\s*"((?:[^"\\]|\\.)+)"[^}]*?gid:\s*"(\d+)""#).expect("tab entry pattern")
});

#[derive(Clone)]
pub struct SheetsClient {
  client: reqwest::Client,
}

impl SheetsClient {
  pub fn new(timeout: Duration) -> Result<Self, SourceError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self { client })
  }

  async fn get_text(&self, url: &str) -> Result<String, SourceError> {
    let res = self.client.get(url)
      .header(USER_AGENT, "rosco-backend/0.1")
      .send().await?;

    if !res.status().is_success() {
      return Err(SourceError::Status(res.status().as_u16()));
    }
    Ok(res.text().await?)
  }

  /// Fetch one published tab as CSV and normalize it.
  #[instrument(level = "info", skip(self, source), fields(id = %source.id))]
  pub async fn fetch_sheet(&self, source: &SheetSource) -> Result<GameSet, SourceError> {
    let start = std::time::Instant::now();
    let body = self.get_text(&source.url).await?;
    debug!(target: "catalog", elapsed = ?start.elapsed(), bytes = body.len(), head = %trunc_for_log(&body, 80), "Sheet CSV received");

    let set = normalize(&source.id, &source.title, RawSource::Csv(&body));
    if set.is_empty() {
      return Err(SourceError::Empty);
    }
    Ok(set)
  }

  /// Read the published HTML page and turn every tab into a CSV source.
  #[instrument(level = "info", skip(self, cfg), fields(url = %cfg.pubhtml_url))]
  pub async fn discover_sheets(&self, cfg: &DiscoveryCfg) -> Result<Vec<SheetSource>, SourceError> {
    let html = self.get_text(&cfg.pubhtml_url).await?;
    let tabs = discover_tabs(&html);
    if tabs.is_empty() {
      return Err(SourceError::NoTabs);
    }
    info!(target: "catalog", tabs = tabs.len(), "Discovered spreadsheet tabs");
    Ok(tabs
      .into_iter()
      .map(|(name, gid)| SheetSource {
        id: format!("{}-{}", cfg.id_prefix, gid),
        title: format!("{}{}", cfg.title_prefix, name),
        url: csv_endpoint(&cfg.pubhtml_url, &gid),
      })
      .collect())
  }
}

/// Extract `(tab name, gid)` pairs from a published spreadsheet page.
pub fn discover_tabs(html: &str) -> Vec<(String, String)> {
  let mut out: Vec<(String, String)> = Vec::new();
  for caps in TAB_ENTRY.captures_iter(html) {
    let raw = &caps[1];
    // Names are JS string literals; \uXXXX escapes are common.
    let name = serde_json::from_str::<String>(&format!("\"{raw}\"")).unwrap_or_else(|_| raw.to_string());
    let gid = caps[2].to_string();
    if !out.iter().any(|(_, g)| *g == gid) {
      out.push((name, gid));
    }
  }
  out
}

/// CSV output address of tab `gid`, next to the published page.
pub fn csv_endpoint(pubhtml_url: &str, gid: &str) -> String {
  let base = match pubhtml_url.find("/pubhtml") {
    Some(i) => &pubhtml_url[..i],
    None => pubhtml_url.trim_end_matches('/'),
  };
  format!("{base}/pub?gid={gid}&single=true&output=csv")
}

/// Read the JSON fixture. Sets are re-normalized (dedupe, ring order) and
/// empty ones are left out.
pub async fn load_fixture(path: &Path) -> Result<Vec<GameSet>, SourceError> {
  let text = tokio::fs::read_to_string(path).await?;
  let sets: Vec<GameSet> = serde_json::from_str(&text)?;
  Ok(sets
    .into_iter()
    .map(|s| GameSet::new(s.id, s.title, s.questions))
    .filter(|s| !s.is_empty())
    .collect())
}

/// Remote sets first, local sets appended as extra options; seeds when both are empty.
pub fn merge_catalog(remote: Vec<GameSet>, local: Vec<GameSet>) -> Vec<GameSet> {
  let mut out = remote;
  out.extend(local);
  if out.is_empty() {
    warn!(target: "catalog", "No question source available; serving built-in seed set");
    out.push(seed_game_set());
  }
  out
}

/// Build the menu: remote sheets (listed and discovered), then the fixture.
#[instrument(level = "info", skip(cfg), fields(sheets = cfg.sheets.len(), discovery = cfg.discovery.is_some()))]
pub async fn load_catalog(cfg: &CatalogCfg) -> Vec<GameSet> {
  let remote = fetch_remote(cfg).await;
  if !remote.is_empty() {
    info!(target: "catalog", remote = remote.len(), "Loaded remote games");
  }

  let local = match load_fixture(&cfg.fixture_path).await {
    Ok(sets) => {
      info!(target: "catalog", path = %cfg.fixture_path.display(), sets = sets.len(), "Loaded local fixture");
      sets
    }
    Err(e) => {
      warn!(target: "catalog", path = %cfg.fixture_path.display(), error = %e, "Local fixture unavailable");
      Vec::new()
    }
  };

  merge_catalog(remote, local)
}

async fn fetch_remote(cfg: &CatalogCfg) -> Vec<GameSet> {
  let mut sources = cfg.sheets.clone();
  if cfg.discovery.is_none() && sources.is_empty() {
    return Vec::new();
  }

  let client = match SheetsClient::new(Duration::from_secs(cfg.fetch_timeout_secs)) {
    Ok(c) => c,
    Err(e) => {
      warn!(target: "catalog", error = %e, "HTTP client unavailable; skipping remote sources");
      return Vec::new();
    }
  };

  if let Some(d) = &cfg.discovery {
    match client.discover_sheets(d).await {
      Ok(found) => sources.extend(found),
      Err(e) => warn!(target: "catalog", url = %d.pubhtml_url, error = %e, "Tab discovery failed"),
    }
  }

  // Fetch concurrently, collect in configured order.
  let handles: Vec<_> = sources
    .into_iter()
    .map(|source| {
      let client = client.clone();
      tokio::spawn(async move {
        let result = client.fetch_sheet(&source).await;
        (source, result)
      })
    })
    .collect();

  let mut games = Vec::new();
  for handle in handles {
    match handle.await {
      Ok((_, Ok(set))) => games.push(set),
      Ok((source, Err(e))) => {
        warn!(target: "catalog", id = %source.id, error = %e, "Sheet unavailable");
      }
      Err(e) => warn!(target: "catalog", error = %e, "Sheet fetch task failed"),
    }
  }
  games
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{ClueType, QuestionRecord};
  use crate::seeds::SEED_SET_ID;
  use axum::{http::StatusCode, routing::get, Router};
  use tokio::net::TcpListener;

  const GOOD_CSV: &str = "Letra,Definición,Respuesta\nA,Capital de Argentina,Buenos Aires\ncontiene z,Apellido de un cantante rosarino,Páez\n";

  /// Serve `router` on an ephemeral local port; returns its base URL.
  async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}")
  }

  /// A local address with nothing listening on it.
  async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
  }

  fn sheet(id: &str, url: String) -> SheetSource {
    SheetSource { id: id.into(), title: id.to_uppercase(), url }
  }

  fn fixture_path() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data/questions.json")
  }

  const PUBHTML: &str = r#"<script>
    items.push({name: "Rosco Infancias", pageUrl: "https:\/\/docs.example\/pubhtml\/sheet?gid=0", gid: "0",initialSheet: true});
    items.push({name: "Clásico", pageUrl: "https:\/\/docs.example\/pubhtml\/sheet?gid=1834", gid: "1834",initialSheet: false});
    items.push({name: "Rosco Infancias", pageUrl: "x", gid: "0"});
  </script>"#;

  #[test]
  fn discovers_tab_names_and_ids() {
    let tabs = discover_tabs(PUBHTML);
    assert_eq!(tabs, vec![
      ("Rosco Infancias".to_string(), "0".to_string()),
      ("Clásico".to_string(), "1834".to_string()),
    ]);
    assert!(discover_tabs("<html>nothing here</html>").is_empty());
  }

  #[test]
  fn csv_endpoint_replaces_pubhtml_suffix() {
    assert_eq!(
      csv_endpoint("https://docs.example/spreadsheets/d/e/KEY/pubhtml?widget=true", "1834"),
      "https://docs.example/spreadsheets/d/e/KEY/pub?gid=1834&single=true&output=csv"
    );
    assert_eq!(
      csv_endpoint("https://docs.example/d/e/KEY/", "0"),
      "https://docs.example/d/e/KEY/pub?gid=0&single=true&output=csv"
    );
  }

  #[test]
  fn merge_puts_remote_first_and_seeds_last_resort() {
    let remote = GameSet::new("r", "R", vec![QuestionRecord::new('A', ClueType::StartsWith, "a", "ave")]);
    let local = GameSet::new("l", "L", vec![QuestionRecord::new('B', ClueType::StartsWith, "b", "bote")]);
    let ids: Vec<_> = merge_catalog(vec![remote], vec![local.clone()]).into_iter().map(|s| s.id).collect();
    assert_eq!(ids, ["r", "l"]);
    let ids: Vec<_> = merge_catalog(vec![], vec![local]).into_iter().map(|s| s.id).collect();
    assert_eq!(ids, ["l"]);
    let ids: Vec<_> = merge_catalog(vec![], vec![]).into_iter().map(|s| s.id).collect();
    assert_eq!(ids, [SEED_SET_ID]);
  }

  #[tokio::test]
  async fn missing_fixture_is_an_error_and_catalog_falls_back() {
    let cfg = CatalogCfg { fixture_path: "does/not/exist.json".into(), ..CatalogCfg::default() };
    assert!(matches!(load_fixture(&cfg.fixture_path).await, Err(SourceError::Io(_))));
    let catalog = load_catalog(&cfg).await;
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].id, SEED_SET_ID);
  }

  #[tokio::test]
  async fn bundled_fixture_loads_sorted_sets() {
    let sets = load_fixture(&fixture_path()).await.unwrap();
    assert!(!sets.is_empty());
    assert!(sets.iter().all(|s| !s.questions.is_empty()));
  }

  #[tokio::test]
  async fn unavailable_sheets_fall_back_to_fixture() {
    let base = serve(Router::new()
      .route("/broken", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }))
      .route("/empty", get(|| async { "Letra,Definición,Respuesta\n" }))
      .route("/good", get(|| async { GOOD_CSV }))
      .route("/d/KEY/pubhtml", get(|| async { "<html><body>nothing published</body></html>" })))
      .await;
    let dead = closed_port().await;

    let client = SheetsClient::new(Duration::from_secs(5)).unwrap();
    let err = client.fetch_sheet(&sheet("broken", format!("{base}/broken"))).await.unwrap_err();
    assert!(matches!(err, SourceError::Status(500)), "{err}");
    let err = client.fetch_sheet(&sheet("empty", format!("{base}/empty"))).await.unwrap_err();
    assert!(matches!(err, SourceError::Empty), "{err}");
    let err = client.fetch_sheet(&sheet("dead", format!("{dead}/sheet"))).await.unwrap_err();
    assert!(matches!(err, SourceError::Http(_)), "{err}");

    let discovery = DiscoveryCfg {
      pubhtml_url: format!("{base}/d/KEY/pubhtml"),
      id_prefix: "sheet".into(),
      title_prefix: String::new(),
    };
    let err = client.discover_sheets(&discovery).await.unwrap_err();
    assert!(matches!(err, SourceError::NoTabs), "{err}");

    let cfg = CatalogCfg {
      fixture_path: fixture_path(),
      fetch_timeout_secs: 5,
      sheets: vec![
        sheet("broken", format!("{base}/broken")),
        sheet("empty", format!("{base}/empty")),
        sheet("good", format!("{base}/good")),
        sheet("dead", format!("{dead}/sheet")),
      ],
      discovery: Some(discovery),
    };
    let catalog = load_catalog(&cfg).await;

    let mut expected = vec!["good".to_string()];
    expected.extend(load_fixture(&cfg.fixture_path).await.unwrap().into_iter().map(|s| s.id));
    let ids: Vec<String> = catalog.iter().map(|s| s.id.clone()).collect();
    assert_eq!(ids, expected);

    let good = &catalog[0];
    assert_eq!(good.title, "GOOD");
    assert_eq!(good.questions.len(), 2);
    assert_eq!(good.questions[1].letter, 'Z');
    assert_eq!(good.questions[1].clue_type, ClueType::Contains);
  }

  #[tokio::test]
  async fn discovered_tabs_are_fetched_as_csv() {
    let page = r#"<script>items.push({name: "Cl\u00e1sico", gid: "7",initialSheet: true});</script>"#;
    let base = serve(Router::new()
      .route("/d/KEY/pubhtml", get(move || async move { page }))
      .route("/d/KEY/pub", get(|| async { GOOD_CSV })))
      .await;

    let cfg = CatalogCfg {
      fixture_path: "does/not/exist.json".into(),
      discovery: Some(DiscoveryCfg {
        pubhtml_url: format!("{base}/d/KEY/pubhtml"),
        id_prefix: "tab".into(),
        title_prefix: "Rosco ".into(),
      }),
      ..CatalogCfg::default()
    };
    let catalog = load_catalog(&cfg).await;
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].id, "tab-7");
    assert_eq!(catalog[0].title, "Rosco Clásico");
    assert_eq!(catalog[0].questions.len(), 2);
  }
}
