//! Weak-word detection and vocabulary suggestions.
//!
//! All positions handed to clients are character offsets into the content,
//! never byte offsets.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{VocabularyCategory, VocabularyWord};
use crate::error::VocabularyError;
use crate::seeds;
use crate::util::{byte_to_char_offset, char_len, char_to_byte_offset};

pub const HIGHLIGHT_CONFIDENCE: f64 = 0.8;
pub const MAX_HIGHLIGHTS: usize = 10;
/// Shorter content is not scanned at all.
pub const MIN_HIGHLIGHT_CHARS: usize = 10;
pub const MIN_IMPROVEMENT_CHARS: usize = 50;
pub const MAX_SELECTION_SUGGESTIONS: usize = 6;
pub const MAX_IMPROVEMENT_SUGGESTIONS: usize = 6;

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").expect("static regex"));

/// Half-open character range `[start, end)`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
  pub start: usize,
  pub end: usize,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RealTimeHighlight {
  pub word: String,
  pub suggestions: Vec<String>,
  pub position: Span,
  pub confidence: f64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WordSuggestion {
  pub original: String,
  pub suggestions: Vec<String>,
  pub context: String,
  pub reason: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub position: Option<Span>,
}

struct WeakWord {
  word: String,
  synonyms: Vec<String>,
  /// `None` when the pattern failed to compile; the word is then never scanned.
  pattern: Option<Regex>,
}

impl WeakWord {
  fn new(word: String, synonyms: Vec<String>) -> Self {
    let pattern = match Regex::new(&format!(r"(?i)\b{}\b", regex::escape(&word))) {
      Ok(re) => Some(re),
      Err(e) => {
        warn!(target: "selective_writing", %word, error = %e, "Skipping weak word with invalid pattern");
        None
      }
    };
    Self { word, synonyms, pattern }
  }
}

pub struct VocabularyEngine {
  weak_words: Vec<WeakWord>,
  bank: Vec<VocabularyCategory>,
  transitions: Vec<(&'static str, Vec<&'static str>)>,
}

impl VocabularyEngine {
  pub fn new(dictionary: Vec<(String, Vec<String>)>, bank: Vec<VocabularyCategory>) -> Self {
    Self {
      weak_words: dictionary
        .into_iter()
        .map(|(w, s)| WeakWord::new(w.to_lowercase(), s))
        .collect(),
      bank,
      transitions: seeds::transition_words(),
    }
  }

  pub fn with_defaults() -> Self {
    Self::new(seeds::weak_word_dictionary(), seeds::vocabulary_bank())
  }

  /// Merge configured weak words: known words get their synonyms replaced,
  /// new ones are appended after the built-in scan order.
  pub fn extend(&mut self, extra: Vec<(String, Vec<String>)>) {
    for (word, synonyms) in extra {
      let word = word.to_lowercase();
      match self.weak_words.iter_mut().find(|w| w.word == word) {
        Some(existing) => existing.synonyms = synonyms,
        None => self.weak_words.push(WeakWord::new(word, synonyms)),
      }
    }
  }

  pub fn weak_word_count(&self) -> usize {
    self.weak_words.len()
  }

  pub fn suggestions_for_word(&self, word: &str) -> Vec<String> {
    let needle = word.trim().to_lowercase();
    self
      .weak_words
      .iter()
      .find(|w| w.word == needle)
      .map(|w| w.synonyms.clone())
      .unwrap_or_default()
  }

  /// Scan for weak words in dictionary order, one whole-word pass per word.
  pub fn highlights(&self, content: &str) -> Vec<RealTimeHighlight> {
    if char_len(content) < MIN_HIGHLIGHT_CHARS {
      return Vec::new();
    }
    let mut out = Vec::new();
    for weak in &self.weak_words {
      let Some(re) = &weak.pattern else { continue };
      for m in re.find_iter(content) {
        if out.len() == MAX_HIGHLIGHTS {
          return out;
        }
        let start = byte_to_char_offset(content, m.start());
        out.push(RealTimeHighlight {
          word: weak.word.clone(),
          suggestions: weak.synonyms.clone(),
          position: Span { start, end: start + char_len(m.as_str()) },
          confidence: HIGHLIGHT_CONFIDENCE,
        });
      }
    }
    out
  }

  pub fn selection_suggestions(&self, text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    TOKEN
      .find_iter(text)
      .flat_map(|m| self.suggestions_for_word(m.as_str()))
      .filter(|s| seen.insert(s.clone()))
      .take(MAX_SELECTION_SUGGESTIONS)
      .collect()
  }

  /// Only the first six dictionary words are considered; later entries
  /// (intensifiers and verbs) are left to the highlights.
  pub fn improvement_suggestions(&self, content: &str, text_type: &str) -> Vec<WordSuggestion> {
    if char_len(content.trim()) < MIN_IMPROVEMENT_CHARS {
      return Vec::new();
    }
    self
      .weak_words
      .iter()
      .take(MAX_IMPROVEMENT_SUGGESTIONS)
      .filter_map(|weak| {
        let m = weak.pattern.as_ref()?.find(content)?;
        let start = byte_to_char_offset(content, m.start());
        Some(WordSuggestion {
          original: weak.word.clone(),
          suggestions: weak.synonyms.clone(),
          context: format!("Found in your {text_type} writing"),
          reason: format!(
            "'{}' is a common word; a more precise alternative will strengthen your {} writing",
            weak.word, text_type
          ),
          position: Some(Span { start, end: start + char_len(m.as_str()) }),
        })
      })
      .collect()
  }

  pub fn categories(&self) -> &[VocabularyCategory] {
    &self.bank
  }

  /// Filter the bank by category (`all` or empty = any) and a case-insensitive
  /// substring over word, definition and category.
  pub fn search_words(&self, category: &str, term: &str) -> Vec<VocabularyWord> {
    let category = category.trim();
    let term = term.trim().to_lowercase();
    self
      .bank
      .iter()
      .filter(|c| category.is_empty() || category.eq_ignore_ascii_case("all") || c.category.eq_ignore_ascii_case(category))
      .flat_map(|c| c.words.iter())
      .filter(|w| {
        term.is_empty()
          || w.word.to_lowercase().contains(&term)
          || w.definition.to_lowercase().contains(&term)
          || w.category.to_lowercase().contains(&term)
      })
      .cloned()
      .collect()
  }

  pub fn transition_words(&self, relation: &str) -> &[&'static str] {
    self
      .transitions
      .iter()
      .find(|(k, _)| *k == relation)
      .map(|(_, v)| v.as_slice())
      .unwrap_or(&[])
  }

  /// Transition words that fit the sentence following `_previous`.
  pub fn suggest_transitions(&self, _previous: &str, current: &str) -> Vec<&'static str> {
    let cur = current.to_lowercase();
    let relation = if cur.contains("however") || cur.contains("but") {
      "contrast"
    } else if cur.contains("because") || cur.contains("therefore") {
      "cause_effect"
    } else if cur.contains("also") || cur.contains("and") {
      "addition"
    } else if cur.contains("first") || cur.contains("then") {
      "sequence"
    } else {
      return self.transition_words("addition").iter().take(3).copied().collect();
    };
    self.transition_words(relation).to_vec()
  }

  /// Percentage of words that come from the vocabulary bank.
  pub fn sophistication_score(&self, text: &str) -> f64 {
    let bank: HashSet<String> = self
      .bank
      .iter()
      .flat_map(|c| c.words.iter().map(|w| w.word.to_lowercase()))
      .collect();
    let tokens: Vec<String> = TOKEN.find_iter(text).map(|m| m.as_str().to_lowercase()).collect();
    if tokens.is_empty() {
      return 0.0;
    }
    let hits = tokens.iter().filter(|t| bank.contains(t.as_str())).count();
    hits as f64 / tokens.len() as f64 * 100.0
  }
}

/// Replace the word at `span` with `replacement`, keeping an initial capital.
///
/// Fails when the span no longer holds `original`, so a replacement computed
/// against an older revision of the content cannot corrupt a newer one.
pub fn apply_replacement(content: &str, span: Span, original: &str, replacement: &str) -> Result<String, VocabularyError> {
  let replacement = replacement.trim();
  if replacement.is_empty() {
    return Err(VocabularyError::EmptyReplacement);
  }
  let len = char_len(content);
  let out_of_range = VocabularyError::SpanOutOfRange { start: span.start, end: span.end, len };
  if span.start >= span.end || span.end > len {
    return Err(out_of_range);
  }
  let (Some(b0), Some(b1)) = (char_to_byte_offset(content, span.start), char_to_byte_offset(content, span.end)) else {
    return Err(out_of_range);
  };

  let found = &content[b0..b1];
  if found.to_lowercase() != original.trim().to_lowercase() {
    return Err(VocabularyError::StaleSpan { expected: original.to_string(), found: found.to_string() });
  }

  let starts_upper = found.chars().next().is_some_and(char::is_uppercase);
  let word = if starts_upper { capitalize(replacement) } else { replacement.to_string() };

  let mut out = String::with_capacity(content.len() + word.len());
  out.push_str(&content[..b0]);
  out.push_str(&word);
  out.push_str(&content[b1..]);
  Ok(out)
}

fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn engine() -> VocabularyEngine {
    VocabularyEngine::with_defaults()
  }

  #[test]
  fn highlights_weak_word_with_char_positions() {
    let h = engine().highlights("This is good.");
    assert_eq!(h.len(), 1);
    assert_eq!(h[0].word, "good");
    assert_eq!(h[0].position, Span { start: 8, end: 12 });
    assert_eq!(h[0].confidence, HIGHLIGHT_CONFIDENCE);
    assert_eq!(h[0].suggestions.len(), 5);
  }

  #[test]
  fn short_content_is_not_scanned() {
    assert!(engine().highlights("so good").is_empty());
  }

  #[test]
  fn whole_words_only_and_case_insensitive() {
    let h = engine().highlights("Goodness, that was GOOD and goods.");
    assert_eq!(h.len(), 1);
    assert_eq!(h[0].word, "good");
    assert_eq!(h[0].position, Span { start: 19, end: 23 });
  }

  #[test]
  fn positions_count_characters_not_bytes() {
    let h = engine().highlights("Café déjà vu was nice.");
    assert_eq!(h[0].word, "nice");
    assert_eq!(h[0].position, Span { start: 17, end: 21 });
  }

  #[test]
  fn highlights_are_capped_and_follow_dictionary_order() {
    let text = "bad good ".repeat(8);
    let h = engine().highlights(&text);
    assert_eq!(h.len(), MAX_HIGHLIGHTS);
    assert!(h[..8].iter().all(|x| x.word == "good"));
    assert!(h[8..].iter().all(|x| x.word == "bad"));
  }

  #[test]
  fn selection_suggestions_dedupe_and_cap() {
    let s = engine().selection_suggestions("a good, good and bad day");
    assert_eq!(s.len(), MAX_SELECTION_SUGGESTIONS);
    assert_eq!(s[0], "excellent");
    assert_eq!(s[5], "terrible");
  }

  #[test]
  fn improvement_suggestions_need_enough_text() {
    let e = engine();
    assert!(e.improvement_suggestions("It was good.", "narrative").is_empty());

    let text = "It was a really good day and we went to the big park with the nice dog.";
    let s = e.improvement_suggestions(text, "narrative");
    let words: Vec<_> = s.iter().map(|w| w.original.as_str()).collect();
    assert_eq!(words, vec!["good", "nice", "big"]);
    assert_eq!(s[0].context, "Found in your narrative writing");
  }

  #[test]
  fn improvement_suggestions_skip_intensifiers_and_verbs() {
    let text = "We went there and it was really very fun, then we got home at last tonight.";
    assert!(engine().improvement_suggestions(text, "recount").is_empty());
  }

  #[test]
  fn extend_overrides_and_appends() {
    let mut e = engine();
    e.extend(vec![
      ("good".into(), vec!["fine".into()]),
      ("thing".into(), vec!["object".into(), "item".into()]),
    ]);
    assert_eq!(e.suggestions_for_word("Good"), vec!["fine"]);
    assert_eq!(e.weak_word_count(), 11);
    let h = e.highlights("That thing is good.");
    assert_eq!(h[0].word, "good");
    assert_eq!(h[1].word, "thing");
  }

  #[test]
  fn search_filters_by_category_and_term() {
    let e = engine();
    assert_eq!(e.search_words("all", "").len(), e.categories().iter().map(|c| c.words.len()).sum::<usize>());
    let calm = e.search_words("all", "calm");
    assert_eq!(calm.len(), 1);
    assert_eq!(calm[0].word, "serene");
    assert!(e.search_words("Action Words", "serene").is_empty());
  }

  #[test]
  fn transitions_follow_sentence_cues() {
    let e = engine();
    assert_eq!(e.suggest_transitions("", "However, it rained.")[0], "however");
    assert_eq!(e.suggest_transitions("", "It rained.").len(), 3);
    assert!(e.transition_words("nope").is_empty());
  }

  #[test]
  fn sophistication_counts_bank_words() {
    let score = engine().sophistication_score("a serene lake");
    assert!((score - 100.0 / 3.0).abs() < 1e-9);
    assert_eq!(engine().sophistication_score(""), 0.0);
  }

  #[test]
  fn replacement_keeps_capital() {
    let out = apply_replacement("Good work. good luck.", Span { start: 0, end: 4 }, "good", "excellent").unwrap();
    assert_eq!(out, "Excellent work. good luck.");
    let out = apply_replacement("Good work. good luck.", Span { start: 11, end: 15 }, "good", "superb").unwrap();
    assert_eq!(out, "Good work. superb luck.");
  }

  #[test]
  fn replacement_rejects_bad_spans() {
    let err = apply_replacement("short", Span { start: 3, end: 9 }, "x", "y").unwrap_err();
    assert_eq!(err, VocabularyError::SpanOutOfRange { start: 3, end: 9, len: 5 });
    let err = apply_replacement("it was bad", Span { start: 7, end: 10 }, "good", "fine").unwrap_err();
    assert!(matches!(err, VocabularyError::StaleSpan { .. }));
    let err = apply_replacement("it was bad", Span { start: 7, end: 10 }, "bad", "  ").unwrap_err();
    assert_eq!(err, VocabularyError::EmptyReplacement);
  }
}
