//! Progress reports built from a scored assessment plus the learner's
//! in-memory history.

use serde::Serialize;
use serde_json::Value;

use crate::domain::Criterion;
use crate::scoring::{self, MAX_TOTAL_SCORE};
use crate::util::camel_to_words;

/// One stored assessment result.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
  pub timestamp: String,
  pub total_score: f64,
  pub overall_band: u8,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CriteriaScores {
  pub ideas: f64,
  pub structure: f64,
  pub language: f64,
  pub grammar: f64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentAssessment {
  pub total_score: f64,
  pub overall_band: u8,
  pub criteria_scores: CriteriaScores,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressMetrics {
  pub overall_progress: f64,
  pub band_level: u8,
  /// Percent of each criterion's maximum.
  pub criteria_progress: CriteriaScores,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessIndicator {
  pub level: &'static str,
  pub percentage: f64,
  pub next_milestone: &'static str,
  pub strength_areas: Vec<String>,
  pub improvement_areas: Vec<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct StudyPlan {
  pub phase: &'static str,
  pub duration: &'static str,
  pub focus: &'static str,
  pub activities: [&'static str; 3],
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
  pub focus_areas: [&'static str; 3],
  pub practice_activities: [&'static str; 3],
  pub study_plan: StudyPlan,
  pub time_to_exam: &'static str,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalTrends {
  pub assessments: usize,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub first_score: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub best_score: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub change_since_first: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub change_since_last: Option<f64>,
  /// `improving`, `steady`, `declining`, or `insufficient_data`.
  pub trend: &'static str,
  pub message: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
  pub success: bool,
  pub user_id: String,
  pub timestamp: String,
  pub current_assessment: CurrentAssessment,
  pub progress_metrics: ProgressMetrics,
  pub readiness_indicator: ReadinessIndicator,
  pub recommendations: Recommendations,
  pub historical_trends: HistoricalTrends,
}

fn criterion_score(assessment: &Value, c: Criterion) -> f64 {
  assessment
    .pointer(&format!("/criteriaFeedback/{}/score", c.key()))
    .and_then(Value::as_f64)
    .unwrap_or(0.0)
}

fn total_score(assessment: &Value) -> f64 {
  assessment.get("totalScore").and_then(Value::as_f64).unwrap_or(0.0)
}

fn overall_band(assessment: &Value) -> u8 {
  assessment
    .get("overallBand")
    .and_then(Value::as_u64)
    .map(|b| b.clamp(1, 6) as u8)
    .unwrap_or(1)
}

/// Criteria whose score/maxScore ratio passes `keep`, as lowercase words.
fn criteria_where(assessment: &Value, keep: impl Fn(f64) -> bool) -> Vec<String> {
  let Some(criteria) = assessment.get("criteriaFeedback").and_then(Value::as_object) else {
    return Vec::new();
  };
  criteria
    .iter()
    .filter_map(|(key, v)| {
      let score = v.get("score").and_then(Value::as_f64).filter(|s| *s != 0.0)?;
      let max = v.get("maxScore").and_then(Value::as_f64).filter(|m| *m != 0.0)?;
      keep(score / max).then(|| camel_to_words(key))
    })
    .collect()
}

fn focus_areas(total: f64) -> [&'static str; 3] {
  if total < 15.0 {
    ["Basic writing structure", "Idea development", "Grammar fundamentals"]
  } else if total < 22.0 {
    ["Vocabulary sophistication", "Text organization", "Language features"]
  } else {
    ["Advanced techniques", "Exam strategies", "Time management"]
  }
}

fn practice_activities(band: u8) -> [&'static str; 3] {
  match band {
    2 => ["Structured paragraph writing", "Grammar review", "Word choice exercises"],
    3 => ["Text type practice", "Sentence variety exercises", "Vocabulary expansion"],
    4 => ["Advanced text structures", "Literary device practice", "Complex sentence construction"],
    5 => ["Sophisticated writing techniques", "Advanced vocabulary", "Exam simulation"],
    6 => ["Refinement exercises", "Creative challenges", "Peer review activities"],
    _ => ["Daily writing practice", "Basic grammar exercises", "Simple vocabulary building"],
  }
}

fn study_plan(total: f64) -> StudyPlan {
  if total < 15.0 {
    StudyPlan {
      phase: "Foundation Building",
      duration: "4-6 weeks",
      focus: "Basic skills development",
      activities: ["Daily 15-minute writing", "Grammar practice", "Reading comprehension"],
    }
  } else if total < 22.0 {
    StudyPlan {
      phase: "Skill Enhancement",
      duration: "3-4 weeks",
      focus: "Intermediate skill development",
      activities: ["Text type practice", "Vocabulary building", "Timed writing exercises"],
    }
  } else {
    StudyPlan {
      phase: "Exam Preparation",
      duration: "2-3 weeks",
      focus: "Exam readiness and refinement",
      activities: ["Mock exams", "Strategy practice", "Final review"],
    }
  }
}

/// Trends over `history`, which already includes the current snapshot last.
pub fn historical_trends(history: &[ProgressSnapshot]) -> HistoricalTrends {
  let (Some(first), Some(latest)) = (history.first(), history.last()) else {
    return HistoricalTrends {
      assessments: 0,
      first_score: None,
      best_score: None,
      change_since_first: None,
      change_since_last: None,
      trend: "insufficient_data",
      message: "Historical data will be available after multiple assessments".into(),
    };
  };
  if history.len() < 2 {
    return HistoricalTrends {
      assessments: 1,
      first_score: Some(first.total_score),
      best_score: Some(first.total_score),
      change_since_first: None,
      change_since_last: None,
      trend: "insufficient_data",
      message: "Historical data will be available after multiple assessments".into(),
    };
  }

  let previous = &history[history.len() - 2];
  let best = history.iter().map(|s| s.total_score).fold(f64::MIN, f64::max);
  let change_first = latest.total_score - first.total_score;
  let trend = match change_first {
    d if d > 0.5 => "improving",
    d if d < -0.5 => "declining",
    _ => "steady",
  };
  HistoricalTrends {
    assessments: history.len(),
    first_score: Some(first.total_score),
    best_score: Some(best),
    change_since_first: Some(change_first),
    change_since_last: Some(latest.total_score - previous.total_score),
    trend,
    message: format!(
      "{} assessments recorded; score moved from {} to {}",
      history.len(),
      first.total_score,
      latest.total_score
    ),
  }
}

pub fn snapshot(assessment: &Value, timestamp: String) -> ProgressSnapshot {
  ProgressSnapshot {
    timestamp,
    total_score: total_score(assessment),
    overall_band: overall_band(assessment),
  }
}

/// Build the full report. `history` must already contain this assessment.
pub fn build_report(user_id: &str, assessment: &Value, history: &[ProgressSnapshot], timestamp: String) -> ProgressReport {
  let total = total_score(assessment);
  let band = overall_band(assessment);
  let [ideas, structure, language, grammar] = Criterion::ALL.map(|c| criterion_score(assessment, c));
  let pct = |score: f64, c: Criterion| score / c.max_score() * 100.0;

  let mut strengths = criteria_where(assessment, |r| r > 0.7);
  if strengths.is_empty() {
    strengths.push("Keep working on all areas".into());
  }
  let mut improvements = criteria_where(assessment, |r| r < 0.6);
  if improvements.is_empty() {
    improvements.push("Continue developing all areas".into());
  }

  ProgressReport {
    success: true,
    user_id: user_id.to_string(),
    timestamp,
    current_assessment: CurrentAssessment {
      total_score: total,
      overall_band: band,
      criteria_scores: CriteriaScores { ideas, structure, language, grammar },
    },
    progress_metrics: ProgressMetrics {
      overall_progress: total / MAX_TOTAL_SCORE * 100.0,
      band_level: band,
      criteria_progress: CriteriaScores {
        ideas: pct(ideas, Criterion::IdeasAndContent),
        structure: pct(structure, Criterion::TextStructureAndOrganization),
        language: pct(language, Criterion::LanguageFeaturesAndVocabulary),
        grammar: pct(grammar, Criterion::SpellingPunctuationGrammar),
      },
    },
    readiness_indicator: ReadinessIndicator {
      level: scoring::readiness_level(total),
      percentage: (total / MAX_TOTAL_SCORE * 100.0).min(100.0),
      next_milestone: scoring::next_milestone(total),
      strength_areas: strengths,
      improvement_areas: improvements,
    },
    recommendations: Recommendations {
      focus_areas: focus_areas(total),
      practice_activities: practice_activities(band),
      study_plan: study_plan(total),
      time_to_exam: "Estimated preparation time based on current level",
    },
    historical_trends: historical_trends(history),
  }
}
