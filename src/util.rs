//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Classifier-style label to display text: `african_lion` -> `African Lion`.
/// Word boundaries are any non-alphabetic character, as in Python's `str.title`.
pub fn title_case(label: &str) -> String {
  let mut out = String::with_capacity(label.len());
  let mut at_word_start = true;
  for ch in label.trim().chars() {
    let ch = if ch == '_' { ' ' } else { ch };
    if ch.is_alphabetic() {
      if at_word_start {
        out.extend(ch.to_uppercase());
      } else {
        out.extend(ch.to_lowercase());
      }
      at_word_start = false;
    } else {
      out.push(ch);
      at_word_start = true;
    }
  }
  out
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) { cut -= 1; }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn template_replaces_all_keys() {
    let out = fill_template("{a} and {b} and {a}", &[("a", "x"), ("b", "y")]);
    assert_eq!(out, "x and y and x");
  }

  #[test]
  fn labels_become_title_case() {
    assert_eq!(title_case("african_lion"), "African Lion");
    assert_eq!(title_case("GREAT_white_shark"), "Great White Shark");
    assert_eq!(title_case("black-footed_ferret"), "Black-Footed Ferret");
    assert_eq!(title_case(""), "");
  }

  #[test]
  fn truncation_respects_char_boundaries() {
    assert_eq!(trunc_for_log("short", 10), "short");
    let t = trunc_for_log("ééééé", 3);
    assert!(t.starts_with("é…"));
  }
}
