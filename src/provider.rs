//! Dataset provider: fetches the raw animal rows backing the record store.
//!
//! Sources, picked from the environment:
//!   DATASET_URL  : GET returning a JSON array of rows (timeout + retries)
//!   DATASET_PATH : local `.json` array or `.csv` with a header row
//! With neither set, the built-in seed rows are served.
//!
//! A failed load never yields a partial store: the caller gets an error and
//! the service starts with an empty dataset.

use std::path::{Path, PathBuf};

use reqwest::header::{ACCEPT, USER_AGENT};
use serde_json::{Map, Value};
use tracing::{error, info, instrument, warn};

use crate::config::ProviderConfig;
use crate::domain::RawAnimal;
use crate::error::ProviderError;
use crate::seeds::seed_animals;
use crate::store::RecordStore;

#[derive(Clone, Debug)]
pub enum DatasetSource {
  Remote(String),
  File(PathBuf),
  Seed,
}

impl DatasetSource {
  pub fn from_env() -> Self {
    if let Ok(url) = std::env::var("DATASET_URL") {
      return DatasetSource::Remote(url);
    }
    if let Ok(path) = std::env::var("DATASET_PATH") {
      return DatasetSource::File(PathBuf::from(path));
    }
    DatasetSource::Seed
  }
}

pub struct DatasetProvider {
  source: DatasetSource,
  cfg: ProviderConfig,
}

impl DatasetProvider {
  pub fn new(source: DatasetSource, cfg: ProviderConfig) -> Self {
    Self { source, cfg }
  }

  /// Fetch every raw row from the configured source.
  #[instrument(level = "info", skip(self), fields(source = ?self.source))]
  pub async fn fetch_all(&self) -> Result<Vec<RawAnimal>, ProviderError> {
    match &self.source {
      DatasetSource::Remote(url) => self.fetch_remote(url).await,
      DatasetSource::File(path) => read_file(path),
      DatasetSource::Seed => Ok(seed_animals()),
    }
  }

  /// Load the store; on failure log and return an empty one.
  pub async fn load_store(&self) -> RecordStore {
    match self.fetch_all().await {
      Ok(rows) => RecordStore::load(rows),
      Err(e) => {
        error!(target: "dataset", source = ?self.source, error = %e, "Dataset load failed; starting with an empty store");
        RecordStore::empty()
      }
    }
  }

  async fn fetch_remote(&self, url: &str) -> Result<Vec<RawAnimal>, ProviderError> {
    let client = reqwest::Client::builder().timeout(self.cfg.timeout()).build()?;
    let attempts = self.cfg.retries + 1;
    let mut attempt = 1;
    loop {
      match fetch_remote_once(&client, url).await {
        Ok(rows) => {
          info!(target: "dataset", %url, rows = rows.len(), attempt, "Fetched remote dataset");
          return Ok(rows);
        }
        Err(e) if attempt < attempts => {
          warn!(target: "dataset", %url, attempt, error = %e, "Remote dataset fetch failed; retrying");
          attempt += 1;
        }
        Err(e) => return Err(e),
      }
    }
  }
}

async fn fetch_remote_once(client: &reqwest::Client, url: &str) -> Result<Vec<RawAnimal>, ProviderError> {
  let res = client
    .get(url)
    .header(USER_AGENT, "biotrack-backend/0.1")
    .header(ACCEPT, "application/json")
    .send()
    .await?;
  if !res.status().is_success() {
    return Err(ProviderError::Status(res.status().as_u16()));
  }
  Ok(res.json::<Vec<RawAnimal>>().await?)
}

fn read_file(path: &Path) -> Result<Vec<RawAnimal>, ProviderError> {
  let ext = path
    .extension()
    .and_then(|e| e.to_str())
    .map(str::to_ascii_lowercase)
    .unwrap_or_default();
  match ext.as_str() {
    "json" => parse_json(&std::fs::read_to_string(path)?),
    "csv" => parse_csv(std::fs::File::open(path)?),
    _ => Err(ProviderError::UnsupportedFileType(path.display().to_string())),
  }
}

pub fn parse_json(text: &str) -> Result<Vec<RawAnimal>, ProviderError> {
  Ok(serde_json::from_str(text)?)
}

/// Each CSV row becomes a header -> cell object, then goes through the same
/// serde mapping as JSON rows. Cells stay as loaded, empty ones included.
pub fn parse_csv<R: std::io::Read>(reader: R) -> Result<Vec<RawAnimal>, ProviderError> {
  let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
  let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();

  let mut rows = Vec::new();
  for rec in rdr.records() {
    let rec = rec?;
    let obj: Map<String, Value> = headers
      .iter()
      .zip(rec.iter())
      .map(|(h, cell)| (h.clone(), Value::String(cell.to_string())))
      .collect();
    rows.push(serde_json::from_value::<RawAnimal>(Value::Object(obj))?);
  }
  Ok(rows)
}
