//! Loading service configuration (quiz tuning, stats, provider and classifier limits) from TOML.
//!
//! Every table and key is optional; anything missing keeps its default.
//!
//! ```toml
//! [quiz]
//! advance_delay_ms = 1500
//! session_ttl_secs = 1800
//! prompt_template = "Which animal is categorized as \"{status}\" — meaning {explanation}"
//! [quiz.explanations]
//! "Data Deficient" = "there is not enough data to assess the species."
//!
//! [stats]
//! habitat_top_n = 10
//!
//! [provider]
//! timeout_secs = 10
//! retries = 1
//!
//! [classifier]
//! timeout_secs = 30
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, error};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub quiz: QuizConfig,
  #[serde(default)]
  pub stats: StatsConfig,
  #[serde(default)]
  pub provider: ProviderConfig,
  #[serde(default)]
  pub classifier: ClassifierConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
  /// Pause between a resolved round and the next question.
  pub advance_delay_ms: u64,
  /// HTTP quiz sessions untouched for this long are dropped.
  pub session_ttl_secs: u64,
  /// `{status}` and `{explanation}` are substituted.
  pub prompt_template: String,
  /// Extra or replacement status explanations, checked before the built-in table.
  pub explanations: HashMap<String, String>,
}

impl Default for QuizConfig {
  fn default() -> Self {
    Self {
      advance_delay_ms: 1500,
      session_ttl_secs: 30 * 60,
      prompt_template: "Which animal is categorized as \"{status}\" — meaning {explanation}".into(),
      explanations: HashMap::new(),
    }
  }
}

impl QuizConfig {
  pub fn advance_delay(&self) -> Duration { Duration::from_millis(self.advance_delay_ms) }
  pub fn session_ttl(&self) -> Duration { Duration::from_secs(self.session_ttl_secs) }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
  pub habitat_top_n: usize,
}

impl Default for StatsConfig {
  fn default() -> Self { Self { habitat_top_n: 10 } }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
  pub timeout_secs: u64,
  /// Extra attempts after the first failed remote fetch.
  pub retries: u32,
}

impl Default for ProviderConfig {
  fn default() -> Self { Self { timeout_secs: 10, retries: 1 } }
}

impl ProviderConfig {
  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
  pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
  fn default() -> Self { Self { timeout_secs: 30 } }
}

impl ClassifierConfig {
  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}

/// Attempt to load `AppConfig` from BIOTRACK_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_app_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("BIOTRACK_CONFIG_PATH").ok()?;
  load_app_config(Path::new(&path))
}

pub fn load_app_config(path: &Path) -> Option<AppConfig> {
  let shown = path.display();
  match std::fs::read_to_string(path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "biotrack_backend", path = %shown, "Loaded service config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "biotrack_backend", path = %shown, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "biotrack_backend", path = %shown, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  #[test]
  fn partial_file_keeps_defaults() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "[quiz]\nadvance_delay_ms = 250\n[quiz.explanations]\n\"Data Deficient\" = \"not enough data.\"").unwrap();

    let cfg = load_app_config(f.path()).unwrap();
    assert_eq!(cfg.quiz.advance_delay(), Duration::from_millis(250));
    assert_eq!(cfg.quiz.prompt_template, QuizConfig::default().prompt_template);
    assert_eq!(cfg.quiz.explanations.get("Data Deficient").map(String::as_str), Some("not enough data."));
    assert_eq!(cfg.stats.habitat_top_n, 10);
    assert_eq!(cfg.provider.retries, 1);
    assert_eq!(cfg.quiz.session_ttl(), Duration::from_secs(1800));
    assert_eq!(cfg.classifier.timeout(), Duration::from_secs(30));
  }

  #[test]
  fn classifier_and_session_limits_are_tunable() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "[quiz]\nsession_ttl_secs = 60\n[classifier]\ntimeout_secs = 5").unwrap();

    let cfg = load_app_config(f.path()).unwrap();
    assert_eq!(cfg.quiz.session_ttl(), Duration::from_secs(60));
    assert_eq!(cfg.quiz.advance_delay_ms, 1500);
    assert_eq!(cfg.classifier.timeout(), Duration::from_secs(5));
  }

  #[test]
  fn broken_file_is_ignored() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "[quiz\nadvance_delay_ms = ").unwrap();
    assert!(load_app_config(f.path()).is_none());
    assert!(load_app_config(Path::new("/definitely/not/here.toml")).is_none());
  }
}
