//! NSW band scoring and the locally computed feedback used when the model is
//! unavailable or its answer is unusable.

use serde::Serialize;
use serde_json::{json, Value};

use crate::analysis::ContentAnalysis;
use crate::domain::{Criterion, TextType};

pub const MAX_TOTAL_SCORE: f64 = 30.0;

#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct BandDescriptor {
  pub band: u8,
  pub min: f64,
  pub max: f64,
  pub description: &'static str,
  pub details: &'static str,
}

/// Highest band first.
pub const BAND_DESCRIPTORS: [BandDescriptor; 6] = [
  BandDescriptor {
    band: 6,
    min: 27.0,
    max: 30.0,
    description: "Exceptional - Sophisticated ideas, flawless execution",
    details: "Highly original and engaging ideas with sophisticated vocabulary and complex sentence structures. Flawless technical accuracy with perfect text type adherence.",
  },
  BandDescriptor {
    band: 5,
    min: 22.0,
    max: 26.0,
    description: "Proficient - Well-developed ideas, strong execution",
    details: "Original ideas with good development. Varied vocabulary and sentence structures with minor technical errors that don't impede meaning. Strong text type understanding.",
  },
  BandDescriptor {
    band: 4,
    min: 17.0,
    max: 21.0,
    description: "Sound - Adequate ideas, competent execution",
    details: "Adequate ideas with some development. Generally appropriate vocabulary with some technical errors present. Basic text type structure followed.",
  },
  BandDescriptor {
    band: 3,
    min: 12.0,
    max: 16.0,
    description: "Developing - Simple ideas, basic execution",
    details: "Simple ideas with limited development. Basic vocabulary usage with regular technical errors. Partial text type understanding.",
  },
  BandDescriptor {
    band: 2,
    min: 7.0,
    max: 11.0,
    description: "Elementary - Limited ideas, weak execution",
    details: "Very simple ideas with limited vocabulary range. Frequent technical errors with minimal text type awareness.",
  },
  BandDescriptor {
    band: 1,
    min: 0.0,
    max: 6.0,
    description: "Emerging - Minimal development",
    details: "Minimal idea development with very basic vocabulary. Extensive technical errors with little text type understanding.",
  },
];

/// Band for a 30-point total. Fractional totals between two bands' ranges
/// (e.g. 26.5) fall into the lower band.
pub fn band_for_total(total: f64) -> &'static BandDescriptor {
  BAND_DESCRIPTORS
    .iter()
    .find(|d| total >= d.min)
    .unwrap_or(&BAND_DESCRIPTORS[BAND_DESCRIPTORS.len() - 1])
}

/// Band for a single criterion from the percentage of its maximum.
pub fn criterion_band(score: f64, max_score: f64) -> u8 {
  if max_score <= 0.0 {
    return 1;
  }
  let pct = score / max_score * 100.0;
  match pct {
    p if p >= 90.0 => 6,
    p if p >= 75.0 => 5,
    p if p >= 60.0 => 4,
    p if p >= 45.0 => 3,
    p if p >= 25.0 => 2,
    _ => 1,
  }
}

pub fn readiness_level(total: f64) -> &'static str {
  match total {
    t if t >= 25.0 => "Exam Ready",
    t if t >= 20.0 => "Nearly Ready",
    t if t >= 15.0 => "Developing Well",
    t if t >= 10.0 => "Building Skills",
    _ => "Early Development",
  }
}

pub fn next_milestone(total: f64) -> &'static str {
  match total {
    t if t < 10.0 => "Reach 10 points - Building Skills",
    t if t < 15.0 => "Reach 15 points - Developing Well",
    t if t < 20.0 => "Reach 20 points - Nearly Ready",
    t if t < 25.0 => "Reach 25 points - Exam Ready",
    _ => "Maintain Excellence",
  }
}

pub fn student_level(score: f64) -> &'static str {
  if score >= 25.0 {
    "advanced"
  } else if score >= 18.0 {
    "intermediate"
  } else {
    "beginner"
  }
}

pub fn follow_up_reminder(focus_area: &str) -> &'static str {
  match focus_area.trim().to_lowercase().as_str() {
    "ideas" => "Remember to practice brainstorming techniques daily",
    "structure" => "Work on outlining before writing your next piece",
    "language" => "Keep a vocabulary journal and add 3 new words daily",
    "grammar" => "Proofread your work carefully and read it aloud",
    "vocabulary" => "Practice using sophisticated words in context",
    "texttype" => "Study examples of excellent text types in your reading",
    _ => "Keep practicing regularly and track your progress",
  }
}

/// Adds a `band` to every criterion object and the overall band fields.
///
/// `totalScore` is taken from the model when numeric, otherwise summed from
/// the criteria.
pub fn annotate_bands(feedback: &mut serde_json::Map<String, Value>) {
  let mut summed = 0.0;
  if let Some(Value::Object(criteria)) = feedback.get_mut("criteriaFeedback") {
    for (_, c) in criteria.iter_mut() {
      if let Value::Object(obj) = c {
        let score = obj.get("score").and_then(Value::as_f64).unwrap_or(0.0);
        let max = obj.get("maxScore").and_then(Value::as_f64).unwrap_or(0.0);
        summed += score;
        obj.insert("band".into(), json!(criterion_band(score, max)));
      }
    }
  }

  let total = feedback
    .get("totalScore")
    .and_then(Value::as_f64)
    .unwrap_or(summed);
  let band = band_for_total(total);
  feedback.insert("totalScore".into(), json!(total));
  feedback.insert("overallBand".into(), json!(band.band));
  feedback.insert("bandDescription".into(), json!(band.description));
  feedback.insert("bandDetails".into(), json!(band.details));
  feedback.insert("estimatedExamScore".into(), json!(format!("{}/30", format_score(total))));
}

fn format_score(score: f64) -> String {
  if score.fract() == 0.0 {
    format!("{}", score as i64)
  } else {
    format!("{:.1}", score)
  }
}

/// Neutral essay score used when the model call fails or returns garbage:
/// one point per ten words, clamped to 1..=30, split by criterion weight.
pub fn fallback_essay_score(analysis: &ContentAnalysis, text_type: &str, call_failed: bool) -> serde_json::Map<String, Value> {
  let total = (analysis.word_count as f64 / 10.0).clamp(1.0, MAX_TOTAL_SCORE);
  let retry = "Please try again to get detailed feedback.";

  let mut criteria = serde_json::Map::new();
  for c in Criterion::ALL {
    let score = total * c.weight();
    let (strength, improvement, suggestion, next) = if call_failed {
      fallback_criterion_text(c)
    } else {
      (retry, retry, retry, retry)
    };
    criteria.insert(
      c.key().into(),
      json!({
        "score": score,
        "maxScore": c.max_score(),
        "strengths": [strength],
        "improvements": [improvement],
        "suggestions": [suggestion],
        "nextSteps": [next],
      }),
    );
  }

  let overall = if call_failed {
    format!(
      "Your {}-word {} shows good effort! I can see you're developing your writing skills. Let's work on making it even stronger using NSW Selective exam criteria.",
      analysis.word_count, text_type
    )
  } else {
    "I'm having trouble analyzing your writing right now. Your work shows good effort - please try again in a moment.".to_string()
  };

  let mut out = serde_json::Map::new();
  out.insert("overallComment".into(), json!(overall));
  out.insert("totalScore".into(), json!(total));
  out.insert("criteriaFeedback".into(), Value::Object(criteria));
  if call_failed {
    out.insert("priorityFocus".into(), json!(["Develop ideas more fully", "Improve text structure and organization"]));
    out.insert("examStrategies".into(), json!(["Plan your writing before you start", "Leave time to check your work"]));
    out.insert("interactiveQuestions".into(), json!(["What is the main message you want to share?", "How can you make your writing more interesting?"]));
    out.insert("revisionSuggestions".into(), json!(["Add more details to each paragraph", "Check for spelling and grammar errors"]));
  } else {
    for key in ["priorityFocus", "examStrategies", "interactiveQuestions", "revisionSuggestions"] {
      out.insert(key.into(), json!([retry]));
    }
  }
  annotate_bands(&mut out);
  out
}

fn fallback_criterion_text(c: Criterion) -> (&'static str, &'static str, &'static str, &'static str) {
  match c {
    Criterion::IdeasAndContent => (
      "You've started writing, which is the first step!",
      "Try to develop your ideas more fully",
      "Add more details and examples to support your main ideas",
      "Expand each paragraph with more specific details",
    ),
    Criterion::TextStructureAndOrganization => (
      "You have a basic structure in place",
      "Work on creating clearer connections between ideas",
      "Use transition words to link your paragraphs",
      "Plan your writing with a clear beginning, middle, and end",
    ),
    Criterion::LanguageFeaturesAndVocabulary => (
      "You're using appropriate vocabulary for your age",
      "Try to include more varied and sophisticated words",
      "Replace simple words with more interesting alternatives",
      "Keep a vocabulary journal of new words you learn",
    ),
    Criterion::SpellingPunctuationGrammar => (
      "Your basic sentence structure is developing well",
      "Check your spelling and punctuation carefully",
      "Read your work aloud to catch errors",
      "Proofread your writing before submitting",
    ),
  }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackItem {
  #[serde(rename = "type")]
  pub kind: &'static str,
  pub area: String,
  pub text: String,
  pub suggestion_for_improvement: String,
}

/// Feedback built purely from [`ContentAnalysis`] when no model is configured.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalFeedback {
  pub overall_comment: String,
  pub feedback_items: Vec<FeedbackItem>,
  pub focus_for_next_time: Vec<String>,
  pub is_enhanced_fallback: bool,
  pub word_count: usize,
  pub analysis_data: ContentAnalysis,
}

pub fn local_feedback(analysis: &ContentAnalysis, text_type: &str) -> LocalFeedback {
  let wc = analysis.word_count;
  let mut items = Vec::new();
  let item = |kind, area: &str, text: String, suggestion: String| FeedbackItem {
    kind,
    area: area.to_string(),
    text,
    suggestion_for_improvement: suggestion,
  };

  if wc > 0 {
    items.push(item(
      "praise",
      "Writing Progress",
      format!("Great work writing {wc} words for your {text_type}! You're making excellent progress."),
      if wc < 100 {
        "Keep developing your ideas with more details.".into()
      } else {
        "Your word count shows good development!".into()
      },
    ));
  }

  if analysis.paragraph_count == 1 && wc > 50 {
    items.push(item(
      "suggestion",
      "Structure",
      "Your writing is currently in one paragraph.".into(),
      format!("For {text_type} writing, try breaking your ideas into 3-4 paragraphs: introduction, body paragraphs, and conclusion."),
    ));
  } else if analysis.paragraph_count > 1 {
    items.push(item(
      "praise",
      "Structure",
      format!("Excellent paragraph organization with {} paragraphs!", analysis.paragraph_count),
      "Make sure each paragraph focuses on one main idea.".into(),
    ));
  }

  if TextType::from_label(text_type) == Some(TextType::Narrative) {
    if analysis.has_dialogue {
      items.push(item(
        "praise",
        "Dialogue",
        "Great use of dialogue in your narrative!".into(),
        "Dialogue brings characters to life and makes stories more engaging.".into(),
      ));
    } else if wc > 100 {
      items.push(item(
        "suggestion",
        "Character Development",
        "Consider adding some dialogue to your narrative.".into(),
        "Dialogue helps readers connect with your characters. Try: 'I can't believe this!' she exclaimed.".into(),
      ));
    }
    if !analysis.potential_characters.is_empty() {
      let names: Vec<&str> = analysis.potential_characters.iter().take(3).map(String::as_str).collect();
      items.push(item(
        "praise",
        "Characters",
        format!("I can see you've introduced characters: {}", names.join(", ")),
        "Develop your characters by showing their emotions and motivations.".into(),
      ));
    }
  }

  if analysis.descriptive_words.len() > 3 {
    let words: Vec<&str> = analysis.descriptive_words.iter().take(3).map(String::as_str).collect();
    items.push(item(
      "praise",
      "Vocabulary",
      format!("Good use of descriptive language: {}", words.join(", ")),
      "Keep using varied and interesting vocabulary to make your writing more engaging.".into(),
    ));
  } else if wc > 50 {
    items.push(item(
      "suggestion",
      "Vocabulary",
      "Try using more descriptive words to make your writing more vivid.".into(),
      "Instead of 'good', try 'excellent' or 'outstanding'. Instead of 'big', try 'enormous' or 'massive'.".into(),
    ));
  }

  let mut focus = Vec::new();
  if wc < 150 {
    focus.push("Continue developing your ideas with more specific details and examples".to_string());
  }
  if analysis.average_sentence_length < 8.0 {
    focus.push("Try writing some longer, more complex sentences".to_string());
  }
  if analysis.descriptive_words.len() < 3 {
    focus.push("Use more descriptive and sophisticated vocabulary".to_string());
  }
  if focus.is_empty() {
    focus.push("Keep practicing your writing skills".to_string());
    focus.push("Focus on clear expression and good organization".to_string());
  }

  LocalFeedback {
    overall_comment: format!(
      "Your {wc}-word {text_type} shows {} development! You're building excellent writing skills for NSW Selective preparation.",
      if wc > 100 { "strong" } else { "good" }
    ),
    feedback_items: items,
    focus_for_next_time: focus,
    is_enhanced_fallback: true,
    word_count: wc,
    analysis_data: analysis.clone(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::analysis::analyze_content_structure;

  #[test]
  fn band_thresholds() {
    assert_eq!(band_for_total(30.0).band, 6);
    assert_eq!(band_for_total(27.0).band, 6);
    assert_eq!(band_for_total(26.5).band, 5);
    assert_eq!(band_for_total(22.0).band, 5);
    assert_eq!(band_for_total(17.0).band, 4);
    assert_eq!(band_for_total(12.0).band, 3);
    assert_eq!(band_for_total(7.0).band, 2);
    assert_eq!(band_for_total(6.9).band, 1);
    assert_eq!(band_for_total(-3.0).band, 1);
  }

  #[test]
  fn criterion_bands_follow_percentages() {
    assert_eq!(criterion_band(9.0, 9.0), 6);
    assert_eq!(criterion_band(6.0, 7.5), 5);
    assert_eq!(criterion_band(5.0, 7.5), 4);
    assert_eq!(criterion_band(3.0, 6.0), 3);
    assert_eq!(criterion_band(1.5, 6.0), 2);
    assert_eq!(criterion_band(0.5, 6.0), 1);
    assert_eq!(criterion_band(3.0, 0.0), 1);
  }

  #[test]
  fn readiness_milestones_and_levels() {
    assert_eq!(readiness_level(25.0), "Exam Ready");
    assert_eq!(readiness_level(19.9), "Developing Well");
    assert_eq!(readiness_level(3.0), "Early Development");
    assert_eq!(next_milestone(12.0), "Reach 15 points - Developing Well");
    assert_eq!(next_milestone(28.0), "Maintain Excellence");
    assert_eq!(student_level(18.0), "intermediate");
    assert_eq!(student_level(17.5), "beginner");
    assert_eq!(follow_up_reminder("Grammar"), "Proofread your work carefully and read it aloud");
    assert_eq!(follow_up_reminder("other"), "Keep practicing regularly and track your progress");
  }

  #[test]
  fn annotate_sums_criteria_when_total_missing() {
    let mut fb = json!({
      "criteriaFeedback": {
        "ideasAndContent": { "score": 9, "maxScore": 9 },
        "spellingPunctuationGrammar": { "score": 3, "maxScore": 6 }
      }
    })
    .as_object()
    .cloned()
    .unwrap();
    annotate_bands(&mut fb);
    assert_eq!(fb["totalScore"].as_f64().unwrap(), 12.0);
    assert_eq!(fb["overallBand"], 3);
    assert_eq!(fb["criteriaFeedback"]["ideasAndContent"]["band"], 6);
    assert_eq!(fb["criteriaFeedback"]["spellingPunctuationGrammar"]["band"], 3);
    assert_eq!(fb["estimatedExamScore"], "12/30");
  }

  #[test]
  fn fallback_score_scales_with_length() {
    let words = vec!["word"; 120].join(" ");
    let fb = fallback_essay_score(&analyze_content_structure(&words), "narrative", true);
    assert_eq!(fb["totalScore"].as_f64().unwrap(), 12.0);
    assert_eq!(fb["overallBand"], 3);
    let ideas = fb["criteriaFeedback"]["ideasAndContent"]["score"].as_f64().unwrap();
    assert!((ideas - 3.6).abs() < 1e-9);

    let tiny = fallback_essay_score(&analyze_content_structure("hi"), "narrative", false);
    assert_eq!(tiny["totalScore"].as_f64().unwrap(), 1.0);
    assert_eq!(tiny["estimatedExamScore"], "1/30");
  }

  #[test]
  fn local_feedback_for_narrative_mentions_characters() {
    let text = "The storm came. Later Mia ran outside quickly, laughing and shouting loudly. \"Wait!\" called Tom.";
    let fb = local_feedback(&analyze_content_structure(text), "narrative");
    assert!(fb.is_enhanced_fallback);
    assert!(fb.feedback_items.iter().any(|i| i.area == "Dialogue"));
    assert!(fb.feedback_items.iter().any(|i| i.area == "Characters" && i.text.contains("Mia")));
    assert!(fb.focus_for_next_time.iter().any(|f| f.contains("specific details")));
  }
}
