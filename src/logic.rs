//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Catalogue listing, search and predator cross-references
//!   - Status / habitat statistics
//!   - Image identification (classifier + closest dataset match)

use base64::Engine as _;
use tracing::{debug, info, instrument};

use crate::aggregate::{habitat_distribution, status_distribution};
use crate::bridge::identify;
use crate::catalog::{self, NameOrder};
use crate::error::{ClassifierError, StoreError};
use crate::protocol::{animal_out, AnimalOut, IdentifyOut, PredatorOut, StatsOut};
use crate::resolver::resolve;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub fn list_animals(state: &AppState, status: Option<&str>, order: NameOrder) -> Vec<AnimalOut> {
  catalog::list(&state.store, status, order)
    .into_iter()
    .map(animal_out)
    .collect()
}

pub fn get_animal(state: &AppState, id: usize) -> Result<AnimalOut, StoreError> {
  state.store.get_by_id(id).map(animal_out)
}

pub fn random_animal(state: &AppState, status: Option<&str>) -> Option<AnimalOut> {
  catalog::random_pick(&state.store, status, &mut rand::thread_rng()).map(animal_out)
}

#[instrument(level = "info", skip(state))]
pub fn search_animals(state: &AppState, name: &str) -> Vec<AnimalOut> {
  let hits = resolve(&state.store, name);
  debug!(target: "resolver", %name, hits = hits.len(), "Search served");
  hits.into_iter().map(animal_out).collect()
}

pub fn predators_of(state: &AppState, id: usize) -> Result<Vec<PredatorOut>, StoreError> {
  let rec = state.store.get_by_id(id)?;
  Ok(
    catalog::predator_links(&state.store, rec)
      .into_iter()
      .map(|(name, hit)| PredatorOut { name: name.to_string(), animal: hit.map(animal_out) })
      .collect(),
  )
}

pub fn stats(state: &AppState) -> StatsOut {
  let all = state.store.all();
  StatsOut {
    total: all.len(),
    status: status_distribution(all),
    habitat: habitat_distribution(all, state.config.stats.habitat_top_n),
  }
}

#[instrument(level = "info", skip(state, image_base64), fields(b64_len = image_base64.len(), %mime))]
pub async fn identify_image(
  state: &AppState,
  image_base64: &str,
  mime: &str,
) -> Result<IdentifyOut, ClassifierError> {
  let classifier = state.classifier.as_ref().ok_or(ClassifierError::Disabled)?;
  let bytes = decode_image(image_base64)?;
  let predictions = classifier.classify(bytes, mime).await?;

  let found = identify(&state.store, predictions);
  info!(target: "biotrack_backend", matched = ?found.closest_match.map(|r| r.id), "Image identified");
  Ok(IdentifyOut {
    closest_match: found.closest_match.map(animal_out),
    predictions: found.predictions,
  })
}

/// Accepts bare base64 or a `data:<mime>;base64,` URL.
fn decode_image(b64: &str) -> Result<Vec<u8>, ClassifierError> {
  let payload = match b64.split_once(";base64,") {
    Some((_, rest)) => rest,
    None => b64,
  };
  let bytes = base64::engine::general_purpose::STANDARD
    .decode(payload.trim())
    .map_err(|e| ClassifierError::Decode(e.to_string()))?;
  if bytes.is_empty() {
    return Err(ClassifierError::Decode("empty image".into()));
  }
  Ok(bytes)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::AppConfig;
  use crate::seeds::seed_animals;
  use crate::store::RecordStore;

  fn state() -> AppState {
    AppState::new(RecordStore::load(seed_animals()), AppConfig::default(), None)
  }

  #[test]
  fn stats_cover_whole_store() {
    let st = state();
    let s = stats(&st);
    assert_eq!(s.total, st.store.len());
    assert_eq!(s.status.iter().map(|g| g.count).sum::<usize>(), st.store.len());
    assert_eq!(s.habitat[0].key, "Forest");
    assert!(s.habitat.len() <= 10);
  }

  #[test]
  fn predators_resolve_through_search() {
    let st = state();
    let zebra = search_animals(&st, "zebra");
    let preds = predators_of(&st, zebra[0].id).unwrap();
    let names: Vec<Option<&str>> = preds
      .iter()
      .map(|p| p.animal.as_ref().map(|a| a.raw.name.as_str()))
      .collect();
    assert_eq!(names, vec![Some("Lion"), Some("Spotted Hyena"), Some("Nile Crocodile")]);
    assert!(matches!(predators_of(&st, 999), Err(StoreError::NotFound(999))));
  }

  #[test]
  fn image_payloads_decode() {
    assert_eq!(decode_image("aGk=").unwrap(), b"hi");
    assert_eq!(decode_image("data:image/png;base64,aGk=").unwrap(), b"hi");
    assert!(matches!(decode_image("***"), Err(ClassifierError::Decode(_))));
    assert!(matches!(decode_image(""), Err(ClassifierError::Decode(_))));
  }

  #[tokio::test]
  async fn identify_without_classifier_is_disabled() {
    let st = state();
    assert!(matches!(identify_image(&st, "aGk=", "image/png").await, Err(ClassifierError::Disabled)));
  }
}
