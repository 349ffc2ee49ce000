//! Local, regex-only text statistics.
//!
//! These numbers are embedded in every feedback prompt and drive the offline
//! fallback feedback, so they must stay cheap and deterministic.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static SENTENCE_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").expect("static regex"));
static PARAGRAPH_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").expect("static regex"));
static CAPITALIZED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][a-z]+$").expect("static regex"));
static DIALOGUE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""[^"]*""#).expect("static regex"));

fn words_re(words: &str) -> Regex {
  Regex::new(&format!(r"(?i)\b({words})\b")).expect("static regex")
}

static QUOTE_MARK: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["']"#).expect("static regex"));
static DESCRIPTION: Lazy<Regex> =
  Lazy::new(|| words_re("beautiful|dark|bright|huge|tiny|mysterious|ancient|sparkling|glistening"));
static CHARACTERS: Lazy<Regex> = Lazy::new(|| words_re("he|she|they|character|person|boy|girl|man|woman"));
static CONFLICT: Lazy<Regex> =
  Lazy::new(|| words_re("problem|trouble|danger|scared|worried|conflict|challenge|difficult"));
static ORIENTATION: Lazy<Regex> = Lazy::new(|| words_re("once|long ago|one day|it was|there was"));
static COMPLICATION: Lazy<Regex> = Lazy::new(|| words_re("but|however|suddenly|then|problem|trouble"));
static RESOLUTION: Lazy<Regex> = Lazy::new(|| words_re("finally|at last|in the end|resolved|solved"));
static COMPLEX_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w{7,}\b").expect("static regex"));
static SUBORDINATOR: Lazy<Regex> = Lazy::new(|| words_re("because|although|while|since|if|when|after|before"));
static COORDINATOR: Lazy<Regex> = Lazy::new(|| words_re("and|but|or|so|yet"));

/// Small academic word list used for the vocabulary metrics.
const ACADEMIC_WORDS: &[&str] = &[
  "analyze", "concept", "constitute", "context", "create", "data", "define", "derive",
  "distribute", "economy", "environment", "establish", "estimate", "evident", "export",
  "factor", "finance", "formula", "function", "identify", "income", "indicate",
  "individual", "interpret", "involve", "issue", "labor", "legal", "legislate",
  "major", "method", "occur", "percent", "period", "policy", "principle", "proceed",
  "process", "require", "research", "respond", "role", "section", "significant",
  "similar", "source", "specific", "structure", "theory", "vary", "furthermore",
  "consequently", "nevertheless", "therefore", "moreover", "however", "although",
  "demonstrate", "illustrate", "emphasize", "examine", "investigate", "conclude",
];

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalysis {
  pub sentence_count: usize,
  pub word_count: usize,
  pub paragraph_count: usize,
  /// Words per sentence; 0 when there is no sentence.
  pub average_sentence_length: f64,
  pub potential_characters: Vec<String>,
  pub has_dialogue: bool,
  pub dialogue_count: usize,
  pub descriptive_words: Vec<String>,
  pub first_sentence: String,
  pub last_sentence: String,
}

pub fn analyze_content_structure(content: &str) -> ContentAnalysis {
  let sentences: Vec<&str> = SENTENCE_SPLIT
    .split(content)
    .filter(|s| !s.trim().is_empty())
    .collect();
  let words: Vec<&str> = content.split_whitespace().collect();
  let paragraph_count = PARAGRAPH_SPLIT
    .split(content)
    .filter(|p| !p.trim().is_empty())
    .count();

  // Capitalised words that do not follow sentence-ending punctuation.
  let potential_characters = unique_in_order(words.iter().enumerate().filter_map(|(i, w)| {
    let capitalized = CAPITALIZED.is_match(w);
    let not_sentence_start = i > 0 && !words[i - 1].contains(['.', '!', '?']);
    (capitalized && not_sentence_start).then_some(*w)
  }));

  let dialogue_count = DIALOGUE.find_iter(content).count();

  let descriptive_words = unique_in_order(
    words
      .iter()
      .copied()
      .filter(|w| w.ends_with("ly") || w.ends_with("ing") || w.ends_with("ed")),
  );

  let average_sentence_length = if sentences.is_empty() {
    0.0
  } else {
    words.len() as f64 / sentences.len() as f64
  };

  ContentAnalysis {
    sentence_count: sentences.len(),
    word_count: words.len(),
    paragraph_count,
    average_sentence_length,
    potential_characters,
    has_dialogue: dialogue_count > 0,
    dialogue_count,
    descriptive_words,
    first_sentence: sentences.first().map(|s| s.trim().to_string()).unwrap_or_default(),
    last_sentence: sentences.last().map(|s| s.trim().to_string()).unwrap_or_default(),
  }
}

fn unique_in_order<'a>(it: impl Iterator<Item = &'a str>) -> Vec<String> {
  let mut seen = HashSet::new();
  it.filter(|w| seen.insert(*w)).map(str::to_string).collect()
}

pub fn is_academic_word(word: &str) -> bool {
  ACADEMIC_WORDS.contains(&word)
}

/// Counts quoted into the vocabulary-sophistication prompt.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyMetrics {
  pub total_words: usize,
  pub unique_words: usize,
  /// Unique / total, as a percentage with one decimal.
  pub diversity_ratio: f64,
  pub long_words: usize,
  pub academic_words: usize,
}

pub fn vocabulary_metrics(content: &str) -> VocabularyMetrics {
  let words: Vec<&str> = content.split_whitespace().collect();
  let unique: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();
  let long_words = words.iter().filter(|w| w.chars().count() > 6).count();
  let academic_words = words
    .iter()
    .filter(|w| is_academic_word(&w.to_lowercase()))
    .count();
  let diversity_ratio = if words.is_empty() {
    0.0
  } else {
    (unique.len() as f64 / words.len() as f64 * 1000.0).round() / 10.0
  };

  VocabularyMetrics {
    total_words: words.len(),
    unique_words: unique.len(),
    diversity_ratio,
    long_words,
    academic_words,
  }
}

/// What the chat coach knows about the draft before answering.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WritingContext {
  /// `initial` (no text), `beginning`, `developing`, `expanding` or `refining`.
  pub writing_stage: &'static str,
  pub word_count: usize,
  pub has_dialogue: bool,
  pub has_description: bool,
  pub has_characters: bool,
  pub has_conflict: bool,
  pub structure_elements: Vec<&'static str>,
  pub vocabulary_level: &'static str,
  pub sentence_variety: &'static str,
  pub specific_issues: Vec<&'static str>,
  pub strengths: Vec<&'static str>,
}

/// Keyword heuristics over the draft. `word_count` is the editor's count
/// when it sends one.
pub fn writing_context(content: &str, text_type: &str, word_count: Option<usize>) -> WritingContext {
  let wc = word_count.unwrap_or_else(|| content.split_whitespace().count());
  let mut ctx = WritingContext {
    writing_stage: "initial",
    word_count: wc,
    has_dialogue: false,
    has_description: false,
    has_characters: false,
    has_conflict: false,
    structure_elements: Vec::new(),
    vocabulary_level: "basic",
    sentence_variety: "simple",
    specific_issues: Vec::new(),
    strengths: Vec::new(),
  };
  if content.trim().is_empty() {
    return ctx;
  }

  ctx.writing_stage = match wc {
    n if n < 30 => "beginning",
    n if n < 100 => "developing",
    n if n < 200 => "expanding",
    _ => "refining",
  };
  ctx.has_dialogue = QUOTE_MARK.is_match(content);
  ctx.has_description = DESCRIPTION.is_match(content);
  ctx.has_characters = CHARACTERS.is_match(content);
  ctx.has_conflict = CONFLICT.is_match(content);

  let narrative = text_type.trim().eq_ignore_ascii_case("narrative");
  if narrative {
    for (re, element) in [(&ORIENTATION, "orientation"), (&COMPLICATION, "complication"), (&RESOLUTION, "resolution")] {
      if re.is_match(content) {
        ctx.structure_elements.push(element);
      }
    }
  }

  let complex = COMPLEX_WORD.find_iter(content).count() as f64;
  ctx.vocabulary_level = if complex > wc as f64 * 0.1 {
    "advanced"
  } else if complex > wc as f64 * 0.05 {
    "intermediate"
  } else {
    "basic"
  };

  ctx.sentence_variety = match (SUBORDINATOR.is_match(content), COORDINATOR.is_match(content)) {
    (true, true) => "varied",
    (true, false) | (false, true) => "developing",
    _ => "simple",
  };

  if wc > 50 && !ctx.has_description {
    ctx.specific_issues.push("needs_more_description");
  }
  if narrative && wc > 100 && !ctx.has_dialogue {
    ctx.specific_issues.push("could_add_dialogue");
  }
  if narrative && wc > 80 && !ctx.has_conflict {
    ctx.specific_issues.push("needs_conflict_or_problem");
  }

  if ctx.has_dialogue {
    ctx.strengths.push("good_dialogue_use");
  }
  if ctx.has_description {
    ctx.strengths.push("descriptive_language");
  }
  if ctx.vocabulary_level != "basic" {
    ctx.strengths.push("good_vocabulary");
  }
  if ctx.sentence_variety != "simple" {
    ctx.strengths.push("sentence_variety");
  }
  ctx
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn counts_sentences_and_words() {
    let a = analyze_content_structure("Hello. World!");
    assert_eq!(a.sentence_count, 2);
    assert_eq!(a.word_count, 2);
    assert_eq!(a.paragraph_count, 1);
    assert_eq!(a.first_sentence, "Hello");
    assert_eq!(a.last_sentence, "World");
    assert!((a.average_sentence_length - 1.0).abs() < f64::EPSILON);
  }

  #[test]
  fn empty_content_has_no_sentences() {
    let a = analyze_content_structure("   ");
    assert_eq!(a.sentence_count, 0);
    assert_eq!(a.word_count, 0);
    assert_eq!(a.paragraph_count, 0);
    assert_eq!(a.average_sentence_length, 0.0);
    assert!(a.first_sentence.is_empty());
  }

  #[test]
  fn paragraphs_split_on_blank_lines() {
    let a = analyze_content_structure("First part.\n\nSecond part.\n  \nThird.");
    assert_eq!(a.paragraph_count, 3);
  }

  #[test]
  fn detects_characters_away_from_sentence_starts() {
    let a = analyze_content_structure("The dog met Sam at noon. Then Sam waved to Lily and Sam laughed.");
    assert_eq!(a.potential_characters, vec!["Sam".to_string(), "Lily".to_string()]);
  }

  #[test]
  fn counts_quoted_dialogue() {
    let a = analyze_content_structure(r#""Run!" she shouted. "Now," he said."#);
    assert!(a.has_dialogue);
    assert_eq!(a.dialogue_count, 2);
  }

  #[test]
  fn collects_unique_descriptive_words() {
    let a = analyze_content_structure("quickly running jumped quickly slow");
    assert_eq!(a.descriptive_words, vec!["quickly", "running", "jumped"]);
  }

  #[test]
  fn vocabulary_metrics_report_diversity() {
    let m = vocabulary_metrics("The cat and the dog demonstrate something");
    assert_eq!(m.total_words, 7);
    assert_eq!(m.unique_words, 6);
    assert_eq!(m.diversity_ratio, 85.7);
    assert_eq!(m.long_words, 2);
    assert_eq!(m.academic_words, 1);
  }

  #[test]
  fn writing_stage_follows_word_count() {
    let text = "We ran.";
    assert_eq!(writing_context("", "narrative", Some(50)).writing_stage, "initial");
    assert_eq!(writing_context(text, "narrative", Some(29)).writing_stage, "beginning");
    assert_eq!(writing_context(text, "narrative", Some(30)).writing_stage, "developing");
    assert_eq!(writing_context(text, "narrative", Some(100)).writing_stage, "expanding");
    assert_eq!(writing_context(text, "narrative", Some(199)).writing_stage, "expanding");
    assert_eq!(writing_context(text, "narrative", Some(200)).writing_stage, "refining");
    assert_eq!(writing_context(text, "narrative", None).word_count, 2);
  }

  #[test]
  fn narrative_context_finds_elements_and_strengths() {
    let text = "Once there was a mysterious castle. Suddenly she was scared because the door opened, and finally it was resolved.";
    let ctx = writing_context(text, "narrative", None);
    assert_eq!(ctx.structure_elements, vec!["orientation", "complication", "resolution"]);
    assert!(ctx.has_description && ctx.has_characters && ctx.has_conflict);
    assert!(!ctx.has_dialogue);
    assert_eq!(ctx.sentence_variety, "varied");
    assert!(ctx.strengths.contains(&"descriptive_language"));
    assert!(ctx.strengths.contains(&"sentence_variety"));

    let persuasive = writing_context(text, "persuasive", None);
    assert!(persuasive.structure_elements.is_empty());
  }

  #[test]
  fn long_plain_narrative_lists_issues() {
    let text = "the cat sat on a mat ".repeat(20);
    let ctx = writing_context(&text, "narrative", None);
    assert_eq!(ctx.word_count, 120);
    assert_eq!(ctx.vocabulary_level, "basic");
    assert_eq!(ctx.specific_issues, vec!["needs_more_description", "could_add_dialogue", "needs_conflict_or_problem"]);
    assert!(ctx.strengths.is_empty());
  }
}
