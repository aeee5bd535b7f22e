//! Name resolution: free-text query to dataset records.
//!
//! Matching is case-insensitive substring containment ("Eagle" finds
//! "Bald Eagle"). A name equal to the trimmed query ranks first, then names
//! equal ignoring case, then partial matches. Each group keeps store order,
//! so duplicate names resolve to the first loaded.
//!
//! When nothing matches and the query ends in `s`, a single trailing letter is
//! stripped and the scan runs once more ("Lions" -> "Lion"). Irregular plurals
//! are not handled: "Wolves" -> "Wolve" still finds nothing.

use tracing::{debug, instrument};

use crate::domain::AnimalRecord;
use crate::store::RecordStore;

#[instrument(level = "debug", skip(store), fields(store_len = store.len()))]
pub fn resolve<'a>(store: &'a RecordStore, query: &str) -> Vec<&'a AnimalRecord> {
  let query = query.trim();
  if query.is_empty() {
    return Vec::new();
  }

  let hits = scan(store, query);
  if !hits.is_empty() {
    return hits;
  }

  match singular_of(query) {
    Some(singular) => {
      let hits = scan(store, singular);
      debug!(target: "resolver", %query, %singular, hits = hits.len(), "Singular fallback");
      hits
    }
    None => hits,
  }
}

/// First match, the record callers conventionally display.
pub fn resolve_first<'a>(store: &'a RecordStore, query: &str) -> Option<&'a AnimalRecord> {
  resolve(store, query).into_iter().next()
}

/// Ranks verbatim name equality, then case-insensitive equality, then containment.
fn scan<'a>(store: &'a RecordStore, query: &str) -> Vec<&'a AnimalRecord> {
  let needle = query.to_lowercase();
  let mut verbatim = Vec::new();
  let mut folded = Vec::new();
  let mut partial = Vec::new();
  for rec in store.all() {
    if rec.name() == query {
      verbatim.push(rec);
      continue;
    }
    let name = rec.name().to_lowercase();
    if name == needle {
      folded.push(rec);
    } else if name.contains(&needle) {
      partial.push(rec);
    }
  }
  verbatim.extend(folded);
  verbatim.extend(partial);
  verbatim
}

fn singular_of(query: &str) -> Option<&str> {
  query
    .strip_suffix(['s', 'S'])
    .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::RawAnimal;

  fn store(names: &[&str]) -> RecordStore {
    RecordStore::load(
      names
        .iter()
        .map(|n| RawAnimal { name: n.to_string(), ..Default::default() })
        .collect(),
    )
  }

  fn names<'a>(hits: &[&'a AnimalRecord]) -> Vec<&'a str> {
    hits.iter().map(|r| r.name()).collect()
  }

  #[test]
  fn exact_name_comes_first() {
    let s = store(&["Sea Lion", "Lion", "Mountain Lion"]);
    let hits = resolve(&s, "Lion");
    assert_eq!(names(&hits), vec!["Lion", "Sea Lion", "Mountain Lion"]);
  }

  #[test]
  fn every_exact_name_resolves_to_itself_first() {
    let s = store(&["Bald Eagle", "Eagle", "LION", "Lion", "Sea Lion", "Wolf"]);
    for rec in s.all() {
      assert_eq!(resolve_first(&s, rec.name()).unwrap().id, rec.id);
    }
  }

  #[test]
  fn case_variants_rank_verbatim_then_folded() {
    let s = store(&["LION", "Sea Lion", "Lion"]);
    assert_eq!(names(&resolve(&s, "Lion")), vec!["Lion", "LION", "Sea Lion"]);
    assert_eq!(names(&resolve(&s, "lion")), vec!["LION", "Lion", "Sea Lion"]);
    assert_eq!(names(&resolve(&s, "LIONS")), vec!["LION", "Lion", "Sea Lion"]);
  }

  #[test]
  fn partial_and_case_insensitive() {
    let s = store(&["Bald Eagle", "Tiger"]);
    assert_eq!(names(&resolve(&s, "eagle")), vec!["Bald Eagle"]);
    assert_eq!(names(&resolve(&s, "  TIGER ")), vec!["Tiger"]);
  }

  #[test]
  fn plural_falls_back_to_singular() {
    let s = store(&["Lion", "Tiger", "Wolf"]);
    assert_eq!(names(&resolve(&s, "Lions")), vec!["Lion"]);
    assert_eq!(names(&resolve(&s, "Tigers")), vec!["Tiger"]);
  }

  #[test]
  fn irregular_plural_stays_unresolved() {
    let s = store(&["Lion", "Tiger", "Wolf"]);
    assert!(resolve(&s, "Wolves").is_empty());
  }

  #[test]
  fn empty_and_unknown_queries_yield_nothing() {
    let s = store(&["Lion", "Tiger", "Wolf"]);
    assert!(resolve(&s, "").is_empty());
    assert!(resolve(&s, "   ").is_empty());
    assert!(resolve(&s, "s").is_empty());
    assert!(resolve(&s, "nonexistent-xyz").is_empty());
    assert!(resolve(&RecordStore::empty(), "Lion").is_empty());
  }

  #[test]
  fn duplicate_names_resolve_to_first_loaded() {
    let s = store(&["Wolf", "Lion", "Wolf"]);
    let hits = resolve(&s, "Wolf");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, 0);
  }

  #[test]
  fn resolution_is_idempotent() {
    let s = store(&["Lion", "Sea Lion", "Tiger"]);
    let a: Vec<usize> = resolve(&s, "lion").iter().map(|r| r.id).collect();
    let b: Vec<usize> = resolve(&s, "lion").iter().map(|r| r.id).collect();
    assert_eq!(a, b);
  }
}
