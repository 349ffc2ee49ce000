//! Lesson catalogue lookups, activity grading and checklist progress.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Activity, ActivityKind, Lesson, TextType};

/// Summary row for the lesson list.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LessonSummary {
  pub day: u32,
  pub slug: String,
  pub title: String,
  pub text_type: Option<TextType>,
  pub activity_count: usize,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemResult {
  pub index: usize,
  /// `None` for free-text items, which are not auto-graded.
  pub correct: Option<bool>,
  pub expected: Vec<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GradeReport {
  pub activity_id: String,
  pub items: Vec<ItemResult>,
  pub correct: usize,
  pub graded: usize,
  /// Percentage of graded items answered correctly, 0 when nothing is gradable.
  pub score: f64,
}

/// One learner answer per item; choice items take the chosen option text(s).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Answer {
  One(String),
  Many(Vec<String>),
}

impl Answer {
  fn values(&self) -> Vec<String> {
    match self {
      Self::One(s) => vec![normalize(s)],
      Self::Many(v) => v.iter().map(|s| normalize(s)).collect(),
    }
  }
}

fn normalize(s: &str) -> String {
  s.trim().to_lowercase()
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistProgress {
  pub completed: usize,
  pub total: usize,
  pub percentage: f64,
}

/// Ordered by day; configured lessons replace built-ins with the same day.
pub struct LessonCatalogue {
  lessons: BTreeMap<u32, Lesson>,
}

impl LessonCatalogue {
  pub fn new(builtin: Vec<Lesson>, extra: Vec<Lesson>) -> Self {
    let lessons = builtin.into_iter().chain(extra).map(|l| (l.day, l)).collect();
    Self { lessons }
  }

  pub fn len(&self) -> usize {
    self.lessons.len()
  }

  pub fn summaries(&self) -> Vec<LessonSummary> {
    self
      .lessons
      .values()
      .map(|l| LessonSummary {
        day: l.day,
        slug: l.slug.clone(),
        title: l.title.clone(),
        text_type: l.text_type,
        activity_count: l.activities.len(),
      })
      .collect()
  }

  pub fn get(&self, day: u32) -> Option<&Lesson> {
    self.lessons.get(&day)
  }

  pub fn activity(&self, day: u32, activity_id: &str) -> Option<&Activity> {
    self.get(day)?.activities.iter().find(|a| a.id == activity_id)
  }
}

/// Grade answers against the activity's key. Missing answers count as wrong.
pub fn grade_activity(activity: &Activity, answers: &[Answer]) -> GradeReport {
  let items: Vec<ItemResult> = activity
    .items
    .iter()
    .enumerate()
    .map(|(index, item)| {
      let gradable = activity.kind != ActivityKind::FreeText && !item.answer.is_empty();
      if !gradable {
        return ItemResult { index, correct: None, expected: Vec::new() };
      }
      let key: Vec<String> = item.answer.iter().map(|a| normalize(a)).collect();
      let given = answers.get(index).map(Answer::values).unwrap_or_default();
      let correct = match activity.kind {
        ActivityKind::SingleChoice => given.len() == 1 && key.contains(&given[0]),
        _ => {
          let mut g = given;
          let mut k = key;
          g.sort();
          g.dedup();
          k.sort();
          g == k
        }
      };
      ItemResult { index, correct: Some(correct), expected: item.answer.clone() }
    })
    .collect();

  let graded = items.iter().filter(|i| i.correct.is_some()).count();
  let correct = items.iter().filter(|i| i.correct == Some(true)).count();
  let score = if graded == 0 {
    0.0
  } else {
    (correct as f64 / graded as f64 * 1000.0).round() / 10.0
  };

  GradeReport { activity_id: activity.id.clone(), items, correct, graded, score }
}

/// Completion of a lesson's self-assessment list from the ticked indices.
pub fn checklist_progress(lesson: &Lesson, checked: &[usize]) -> ChecklistProgress {
  let total = lesson.checklist.len();
  let mut ticked: Vec<usize> = checked.iter().copied().filter(|&i| i < total).collect();
  ticked.sort_unstable();
  ticked.dedup();
  let completed = ticked.len();
  let percentage = if total == 0 {
    0.0
  } else {
    (completed as f64 / total as f64 * 1000.0).round() / 10.0
  };
  ChecklistProgress { completed, total, percentage }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds;

  fn catalogue() -> LessonCatalogue {
    LessonCatalogue::new(seeds::lesson_catalogue(), Vec::new())
  }

  fn one(s: &str) -> Answer {
    Answer::One(s.into())
  }

  #[test]
  fn sentence_types_are_graded_case_insensitively() {
    let cat = catalogue();
    let activity = cat.activity(2, "identify-sentence-type").unwrap();
    let answers = vec![one("simple"), one("Compound"), one("Simple"), one("compound-complex")];
    let report = grade_activity(activity, &answers);
    assert_eq!(report.graded, 5);
    assert_eq!(report.correct, 3);
    assert_eq!(report.score, 60.0);
    assert_eq!(report.items[2].correct, Some(false));
    assert_eq!(report.items[2].expected, vec!["Complex".to_string()]);
    // unanswered item
    assert_eq!(report.items[4].correct, Some(false));
  }

  #[test]
  fn peel_requires_exact_sets() {
    let cat = catalogue();
    let activity = cat.activity(3, "identify-peel").unwrap();
    let answers = vec![
      Answer::Many(vec!["Sentence 1".into()]),
      Answer::Many(vec!["Sentence 3".into(), "sentence 2".into()]),
      Answer::Many(vec!["Sentence 4".into(), "Sentence 5".into()]),
      Answer::Many(vec!["Sentence 5".into()]),
    ];
    let report = grade_activity(activity, &answers);
    assert_eq!(report.correct, 3);
    assert_eq!(report.items[2].correct, Some(false));
    assert_eq!(report.score, 75.0);
  }

  #[test]
  fn free_text_is_not_graded() {
    let cat = catalogue();
    let activity = cat.activity(4, "fix-punctuation").unwrap();
    let report = grade_activity(activity, &[]);
    assert_eq!(report.graded, 0);
    assert_eq!(report.score, 0.0);
    assert!(report.items.iter().all(|i| i.correct.is_none()));
  }

  #[test]
  fn checklist_ignores_out_of_range_and_duplicates() {
    let cat = catalogue();
    let lesson = cat.get(6).unwrap();
    let p = checklist_progress(lesson, &[0, 2, 2, 99]);
    assert_eq!(p.total, 4);
    assert_eq!(p.completed, 2);
    assert_eq!(p.percentage, 50.0);
  }

  #[test]
  fn configured_lessons_replace_and_extend() {
    let extra = vec![Lesson {
      day: 31,
      slug: "bonus".into(),
      title: "Bonus Lesson".into(),
      text_type: None,
      overview: String::new(),
      activities: Vec::new(),
      practice_prompts: Vec::new(),
      checklist: Vec::new(),
    }];
    let cat = LessonCatalogue::new(seeds::lesson_catalogue(), extra);
    assert_eq!(cat.len(), 31);
    assert_eq!(cat.summaries().last().unwrap().slug, "bonus");
    assert!(cat.get(0).is_none());
  }

  #[test]
  fn answers_deserialize_from_strings_or_lists() {
    let v: Vec<Answer> = serde_json::from_str(r#"["Simple", ["Sentence 2", "Sentence 3"]]"#).unwrap();
    assert_eq!(v[0], one("Simple"));
    assert!(matches!(v[1], Answer::Many(ref xs) if xs.len() == 2));
  }
}
