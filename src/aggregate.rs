//! Count distributions over a categorical field (status, habitat, ...).

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::{AnimalRecord, UNKNOWN};

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct GroupCount {
  pub key: String,
  pub count: usize,
}

/// Group by the selected field, keys in first-seen order.
/// Missing fields are counted under `Unknown`.
pub fn group_by<'a, I, F>(records: I, select: F) -> Vec<GroupCount>
where
  I: IntoIterator<Item = &'a AnimalRecord>,
  F: Fn(&'a AnimalRecord) -> Option<&'a str>,
{
  let mut slot: HashMap<&'a str, usize> = HashMap::new();
  let mut out: Vec<GroupCount> = Vec::new();
  for rec in records {
    let key = select(rec).unwrap_or(UNKNOWN);
    match slot.get(key) {
      Some(&i) => out[i].count += 1,
      None => {
        slot.insert(key, out.len());
        out.push(GroupCount { key: key.to_string(), count: 1 });
      }
    }
  }
  out
}

/// Largest groups first, ties keep first-seen order, at most `n` entries.
pub fn top_n(mut groups: Vec<GroupCount>, n: usize) -> Vec<GroupCount> {
  groups.sort_by(|a, b| b.count.cmp(&a.count));
  groups.truncate(n);
  groups
}

pub fn status_distribution(records: &[AnimalRecord]) -> Vec<GroupCount> {
  group_by(records, AnimalRecord::conservation_status)
}

pub fn habitat_distribution(records: &[AnimalRecord], n: usize) -> Vec<GroupCount> {
  top_n(group_by(records, AnimalRecord::habitat), n)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::RawAnimal;
  use crate::store::RecordStore;

  fn rec(name: &str, status: Option<&str>, habitat: Option<&str>) -> RawAnimal {
    RawAnimal {
      name: name.into(),
      conservation_status: status.map(str::to_string),
      habitat: habitat.map(str::to_string),
      ..Default::default()
    }
  }

  fn pairs(groups: &[GroupCount]) -> Vec<(&str, usize)> {
    groups.iter().map(|g| (g.key.as_str(), g.count)).collect()
  }

  #[test]
  fn status_groups_in_first_seen_order() {
    let store = RecordStore::load(vec![
      rec("Lion", Some("Vulnerable"), None),
      rec("Tiger", Some("Endangered"), None),
      rec("Wolf", Some("Least Concern"), None),
    ]);
    let groups = status_distribution(store.all());
    assert_eq!(
      pairs(&groups),
      vec![("Vulnerable", 1), ("Endangered", 1), ("Least Concern", 1)]
    );
    assert_eq!(groups, status_distribution(store.all()));
  }

  #[test]
  fn missing_and_blank_fields_count_as_unknown() {
    let store = RecordStore::load(vec![
      rec("A", None, None),
      rec("B", Some(""), None),
      rec("C", Some("Extinct"), None),
    ]);
    assert_eq!(pairs(&status_distribution(store.all())), vec![("Unknown", 2), ("Extinct", 1)]);
  }

  #[test]
  fn top_n_sorts_descending_and_is_stable() {
    let store = RecordStore::load(vec![
      rec("A", None, Some("Forest")),
      rec("B", None, Some("Desert")),
      rec("C", None, Some("Ocean")),
      rec("D", None, Some("Ocean")),
      rec("E", None, Some("Savanna")),
    ]);
    let groups = habitat_distribution(store.all(), 3);
    assert_eq!(pairs(&groups), vec![("Ocean", 2), ("Forest", 1), ("Desert", 1)]);
    assert!(groups.windows(2).all(|w| w[0].count >= w[1].count));
  }

  #[test]
  fn top_n_never_exceeds_distinct_keys() {
    let store = RecordStore::load(vec![rec("A", None, Some("Forest")), rec("B", None, Some("Forest"))]);
    assert_eq!(habitat_distribution(store.all(), 10).len(), 1);
  }

  #[test]
  fn empty_input_gives_empty_output() {
    assert!(status_distribution(&[]).is_empty());
    assert!(habitat_distribution(&[], 10).is_empty());
  }
}
