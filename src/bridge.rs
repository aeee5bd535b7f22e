//! Classifier-match bridge: open-vocabulary classifier labels to dataset records.
//! Most labels have no counterpart in the dataset; that is a normal outcome.

use tracing::debug;

use crate::classifier::Prediction;
use crate::domain::AnimalRecord;
use crate::resolver::resolve_first;
use crate::store::RecordStore;

pub fn match_closest<'a>(store: &'a RecordStore, label: &str) -> Option<&'a AnimalRecord> {
  let hit = resolve_first(store, label);
  debug!(target: "resolver", %label, matched = ?hit.map(|r| r.id), "Classifier label matched");
  hit
}

pub struct Identification<'a> {
  pub predictions: Vec<Prediction>,
  pub closest_match: Option<&'a AnimalRecord>,
}

/// Pair ranked predictions with the dataset record closest to the top label.
pub fn identify(store: &RecordStore, predictions: Vec<Prediction>) -> Identification<'_> {
  let closest_match = predictions
    .first()
    .and_then(|top| match_closest(store, &top.label));
  Identification { predictions, closest_match }
}
