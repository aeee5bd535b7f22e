//! Domain models: raw dataset rows, loaded animal records, and quiz questions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Placeholder shown for optional fields that are absent or blank.
pub const NOT_AVAILABLE: &str = "N/A";
/// Group key / status label used when a categorical field is missing.
pub const UNKNOWN: &str = "Unknown";
/// Keys added next to the raw columns when a record is sent out; source
/// columns with these names are dropped on load.
pub const RESERVED_KEYS: [&str; 3] = ["_id", "predatorList", "details"];

/// One dataset row exactly as the dataset provider delivered it.
/// Keys follow the source CSV header; camelCase names are accepted on input.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RawAnimal {
  #[serde(rename = "Animal", alias = "name", default)]
  pub name: String,
  #[serde(rename = "Scientific Name", alias = "scientificName", default, skip_serializing_if = "Option::is_none")]
  pub scientific_name: Option<String>,
  #[serde(rename = "Habitat", alias = "habitat", default, skip_serializing_if = "Option::is_none")]
  pub habitat: Option<String>,
  #[serde(rename = "Diet", alias = "diet", default, skip_serializing_if = "Option::is_none")]
  pub diet: Option<String>,
  #[serde(rename = "Description", alias = "description", default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(rename = "Conservation Status", alias = "conservationStatus", default, skip_serializing_if = "Option::is_none")]
  pub conservation_status: Option<String>,
  #[serde(rename = "Predators", alias = "predators", default, skip_serializing_if = "Option::is_none")]
  pub predators: Option<String>,

  /// Any other columns (height, lifespan, ...) carried through untouched.
  #[serde(flatten)]
  pub extra: BTreeMap<String, serde_json::Value>,
}

/// A loaded record: the raw row plus its load position and parsed predators.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimalRecord {
  pub id: usize,
  pub raw: RawAnimal,
  pub predators: Vec<String>,
}

impl AnimalRecord {
  pub fn new(id: usize, mut raw: RawAnimal) -> Self {
    raw.extra.retain(|k, _| !RESERVED_KEYS.contains(&k.as_str()));
    let predators = parse_predators(raw.predators.as_deref());
    Self { id, raw, predators }
  }

  pub fn name(&self) -> &str { &self.raw.name }

  pub fn scientific_name(&self) -> Option<&str> { present(&self.raw.scientific_name) }
  pub fn habitat(&self) -> Option<&str> { present(&self.raw.habitat) }
  pub fn diet(&self) -> Option<&str> { present(&self.raw.diet) }
  pub fn description(&self) -> Option<&str> { present(&self.raw.description) }
  pub fn conservation_status(&self) -> Option<&str> { present(&self.raw.conservation_status) }

  /// Status with the `Unknown` default applied.
  pub fn status_or_unknown(&self) -> &str {
    self.conservation_status().unwrap_or(UNKNOWN)
  }

  /// Stored description, or a sentence generated from diet/habitat/status.
  pub fn description_text(&self) -> String {
    if let Some(d) = self.description() {
      return d.to_string();
    }
    let diet = self
      .diet()
      .map(str::to_lowercase)
      .unwrap_or_else(|| "fascinating creature".into());
    let habitat = self
      .habitat()
      .map(str::to_lowercase)
      .unwrap_or_else(|| "varied habitats".into());
    format!(
      "The {} is a {} found mainly in {}. It is currently listed as {}.",
      self.name(),
      diet,
      habitat,
      self.status_or_unknown()
    )
  }
}

/// Split the raw predators field on runs of `,`/`;`, trimming each piece.
pub fn parse_predators(raw: Option<&str>) -> Vec<String> {
  match raw {
    Some(s) => s
      .split([',', ';'])
      .map(str::trim)
      .filter(|p| !p.is_empty())
      .map(str::to_string)
      .collect(),
    None => Vec::new(),
  }
}

/// Treat empty/whitespace-only values the same as absent ones.
fn present(v: &Option<String>) -> Option<&str> {
  v.as_deref().filter(|s| !s.trim().is_empty())
}

/// Ephemeral multiple-choice question over the dataset.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
  pub prompt_text: String,
  pub correct_answer: String,
  pub options: Vec<String>,
  pub attempts_used: u8,
}
