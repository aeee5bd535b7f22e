//! Per-user favorites. User names are plain keys, not credentials.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{info, instrument};

/// Animal names a user starred, in the order they were added.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FavoriteSet {
  names: Vec<String>,
}

impl FavoriteSet {
  pub fn contains(&self, name: &str) -> bool {
    self.names.iter().any(|n| n == name)
  }

  /// Add if absent, remove if present. Returns whether `name` is now a favorite.
  pub fn toggle(&mut self, name: &str) -> bool {
    if let Some(pos) = self.names.iter().position(|n| n == name) {
      self.names.remove(pos);
      false
    } else {
      self.names.push(name.to_string());
      true
    }
  }

  pub fn names(&self) -> &[String] { &self.names }
}

#[derive(Default)]
pub struct UserSessions {
  favorites: RwLock<HashMap<String, FavoriteSet>>,
}

impl UserSessions {
  pub async fn favorites(&self, user: &str) -> FavoriteSet {
    self.favorites.read().await.get(user).cloned().unwrap_or_default()
  }

  #[instrument(level = "debug", skip(self))]
  pub async fn toggle_favorite(&self, user: &str, name: &str) -> bool {
    let mut map = self.favorites.write().await;
    let now = map.entry(user.to_string()).or_default().toggle(name);
    info!(target: "biotrack_backend", %user, %name, favorite = now, "Favorite toggled");
    now
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn toggle_adds_then_removes() {
    let mut set = FavoriteSet::default();
    assert!(set.toggle("Lion"));
    assert!(set.toggle("Tiger"));
    assert!(set.contains("Lion"));
    assert!(!set.toggle("Lion"));
    assert_eq!(set.names(), ["Tiger".to_string()]);
  }

  #[tokio::test]
  async fn users_are_isolated() {
    let sessions = UserSessions::default();
    assert!(sessions.toggle_favorite("ana", "Lion").await);
    assert!(sessions.favorites("bo").await.names().is_empty());
    assert!(sessions.favorites("ana").await.contains("Lion"));
    assert!(!sessions.toggle_favorite("ana", "Lion").await);
    assert!(sessions.favorites("ana").await.names().is_empty());
  }
}
