//! In-memory record store. Populated once from the dataset provider and
//! read-only afterwards.

use std::collections::HashSet;

use tracing::{info, instrument};

use crate::domain::{AnimalRecord, RawAnimal};
use crate::error::StoreError;

#[derive(Clone, Debug, Default)]
pub struct RecordStore {
  records: Vec<AnimalRecord>,
}

impl RecordStore {
  /// Assign `id = position` to each raw row. No dedup, no validation.
  #[instrument(level = "info", skip_all, fields(rows = raw.len()))]
  pub fn load(raw: Vec<RawAnimal>) -> Self {
    let records: Vec<AnimalRecord> = raw
      .into_iter()
      .enumerate()
      .map(|(id, r)| AnimalRecord::new(id, r))
      .collect();
    info!(target: "dataset", records = records.len(), "Record store loaded");
    Self { records }
  }

  pub fn empty() -> Self { Self::default() }

  pub fn get_by_id(&self, id: usize) -> Result<&AnimalRecord, StoreError> {
    self.records.get(id).ok_or(StoreError::NotFound(id))
  }

  /// All records in load order.
  pub fn all(&self) -> &[AnimalRecord] { &self.records }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }

  /// Distinct non-empty names, first-seen order.
  pub fn distinct_names(&self) -> Vec<&str> {
    let mut seen = HashSet::new();
    self
      .records
      .iter()
      .map(AnimalRecord::name)
      .filter(|n| !n.is_empty() && seen.insert(*n))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn named(names: &[&str]) -> Vec<RawAnimal> {
    names
      .iter()
      .map(|n| RawAnimal { name: n.to_string(), ..Default::default() })
      .collect()
  }

  #[test]
  fn ids_follow_input_order() {
    let store = RecordStore::load(named(&["Lion", "Tiger", "Wolf"]));
    assert_eq!(store.len(), 3);
    for (i, rec) in store.all().iter().enumerate() {
      assert_eq!(rec.id, i);
    }
    assert_eq!(store.get_by_id(1).unwrap().name(), "Tiger");
  }

  #[test]
  fn out_of_range_id_is_not_found() {
    let store = RecordStore::load(named(&["Lion"]));
    assert!(matches!(store.get_by_id(1), Err(StoreError::NotFound(1))));
    assert!(matches!(RecordStore::empty().get_by_id(0), Err(StoreError::NotFound(0))));
  }

  #[test]
  fn duplicates_are_kept_but_counted_once_as_names() {
    let store = RecordStore::load(named(&["Lion", "Lion", "", "Wolf"]));
    assert_eq!(store.len(), 4);
    assert_eq!(store.distinct_names(), vec!["Lion", "Wolf"]);
  }
}
