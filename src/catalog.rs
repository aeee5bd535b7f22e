//! Catalogue views over the record store: status filter, name sort, random
//! pick and predator cross-references.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

use crate::domain::AnimalRecord;
use crate::resolver::resolve_first;
use crate::store::RecordStore;

/// Status filter value meaning "no filter".
pub const ALL_STATUSES: &str = "All";

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
pub enum NameOrder {
  #[default]
  #[serde(rename = "none")]
  None,
  #[serde(rename = "name-asc")]
  Asc,
  #[serde(rename = "name-desc")]
  Desc,
}

/// Exact status match; `None`, empty or `All` keep everything.
pub fn filter_by_status<'a>(records: &'a [AnimalRecord], status: Option<&str>) -> Vec<&'a AnimalRecord> {
  match status.map(str::trim) {
    None | Some("") | Some(ALL_STATUSES) => records.iter().collect(),
    Some(s) => records
      .iter()
      .filter(|r| r.raw.conservation_status.as_deref() == Some(s))
      .collect(),
  }
}

pub fn sort_by_name(records: &mut [&AnimalRecord], order: NameOrder) {
  match order {
    NameOrder::None => {}
    NameOrder::Asc => records.sort_by_key(|r| r.name().to_lowercase()),
    NameOrder::Desc => records.sort_by(|a, b| b.name().to_lowercase().cmp(&a.name().to_lowercase())),
  }
}

pub fn list<'a>(store: &'a RecordStore, status: Option<&str>, order: NameOrder) -> Vec<&'a AnimalRecord> {
  let mut out = filter_by_status(store.all(), status);
  sort_by_name(&mut out, order);
  out
}

pub fn random_pick<'a, R: Rng + ?Sized>(
  store: &'a RecordStore,
  status: Option<&str>,
  rng: &mut R,
) -> Option<&'a AnimalRecord> {
  filter_by_status(store.all(), status).choose(rng).copied()
}

/// Each predator name as written in the record, with the record it resolves to.
pub fn predator_links<'a>(store: &'a RecordStore, record: &'a AnimalRecord) -> Vec<(&'a str, Option<&'a AnimalRecord>)> {
  record
    .predators
    .iter()
    .map(|p| (p.as_str(), resolve_first(store, p)))
    .collect()
}

#[cfg(test)]
mod tests {
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  use super::*;
  use crate::seeds::seed_animals;

  fn names(recs: &[&AnimalRecord]) -> Vec<String> {
    recs.iter().map(|r| r.name().to_string()).collect()
  }

  #[test]
  fn filter_and_sort() {
    let store = RecordStore::load(seed_animals());
    let endangered = list(&store, Some("Endangered"), NameOrder::None);
    assert_eq!(names(&endangered), vec!["Tiger"]);

    let lc = list(&store, Some("Least Concern"), NameOrder::Desc);
    assert_eq!(names(&lc), vec!["Spotted Hyena", "Snowshoe Hare", "Red Deer", "Nile Crocodile", "Gray Wolf", "Bald Eagle"]);

    assert_eq!(list(&store, Some(ALL_STATUSES), NameOrder::Asc).len(), store.len());
    assert_eq!(names(&list(&store, None, NameOrder::Asc))[0], "Bald Eagle");
  }

  #[test]
  fn order_parses_from_query_values() {
    let o: NameOrder = serde_json::from_str("\"name-desc\"").unwrap();
    assert_eq!(o, NameOrder::Desc);
  }

  #[test]
  fn random_pick_respects_filter() {
    let store = RecordStore::load(seed_animals());
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..20 {
      let r = random_pick(&store, Some("Vulnerable"), &mut rng).unwrap();
      assert_eq!(r.name(), "Lion");
    }
    assert!(random_pick(&store, Some("Mythical"), &mut rng).is_none());
    assert!(random_pick(&RecordStore::empty(), None, &mut rng).is_none());
  }

  #[test]
  fn predators_link_to_records_when_resolvable() {
    let store = RecordStore::load(seed_animals());
    let deer = resolve_first(&store, "Red Deer").unwrap();
    let links: Vec<(&str, Option<&str>)> = predator_links(&store, deer)
      .into_iter()
      .map(|(p, r)| (p, r.map(AnimalRecord::name)))
      .collect();
    assert_eq!(links, vec![("Wolves", None), ("Lions", Some("Lion"))]);
  }
}
