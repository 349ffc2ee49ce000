//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// Pairs are applied in order, so student text should be passed last.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Log-safe truncation for large strings (char-boundary aware).
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    let head: String = s.chars().take(max).collect();
    format!("{}… ({} bytes total)", head, s.len())
  }
}

/// "ideasAndContent" -> "ideas and content".
pub fn camel_to_words(key: &str) -> String {
  let mut out = String::with_capacity(key.len() + 8);
  for ch in key.chars() {
    if ch.is_ascii_uppercase() {
      out.push(' ');
      out.push(ch.to_ascii_lowercase());
    } else {
      out.push(ch);
    }
  }
  out
}

/// Character count of `s`; the unit every client-facing position uses.
pub fn char_len(s: &str) -> usize {
  s.chars().count()
}

/// Convert a byte offset (on a char boundary) into a char offset.
pub fn byte_to_char_offset(s: &str, byte_idx: usize) -> usize {
  s[..byte_idx].chars().count()
}

/// Convert a char offset into a byte offset; `None` when past the end.
pub fn char_to_byte_offset(s: &str, char_idx: usize) -> Option<usize> {
  if char_idx == char_len(s) {
    return Some(s.len());
  }
  s.char_indices().nth(char_idx).map(|(b, _)| b)
}

/// RFC 3339 timestamp for response envelopes.
pub fn now_rfc3339() -> String {
  chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_replaces_every_occurrence() {
    let out = fill_template("{a} and {a} then {b}", &[("a", "x"), ("b", "y")]);
    assert_eq!(out, "x and x then y");
  }

  #[test]
  fn fill_template_leaves_unknown_keys() {
    assert_eq!(fill_template("{missing}", &[("a", "x")]), "{missing}");
  }

  #[test]
  fn camel_case_keys_become_words() {
    assert_eq!(camel_to_words("ideasAndContent"), "ideas and content");
    assert_eq!(camel_to_words("spellingPunctuationGrammar"), "spelling punctuation grammar");
  }

  #[test]
  fn offsets_round_trip_on_multibyte_text() {
    let s = "café good";
    let byte = s.find("good").unwrap();
    assert_eq!(byte_to_char_offset(s, byte), 5);
    assert_eq!(char_to_byte_offset(s, 5), Some(byte));
    assert_eq!(char_to_byte_offset(s, 9), Some(s.len()));
    assert_eq!(char_to_byte_offset(s, 10), None);
  }

  #[test]
  fn truncation_respects_char_boundaries() {
    let out = trunc_for_log("ééééé", 2);
    assert!(out.starts_with("éé…"));
    assert_eq!(trunc_for_log("short", 10), "short");
  }
}
