//! Domain models: text types, marking criteria, vocabulary reference data and lessons.

use serde::{Deserialize, Serialize};

/// Writing genres the exam and the lessons cover.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TextType {
  Narrative,
  Persuasive,
  Expository,
  Recount,
  Descriptive,
  Informative,
  Creative,
}

impl TextType {
  /// Lenient parse of the free-form `textType` field clients send.
  pub fn from_label(label: &str) -> Option<Self> {
    match label.trim().to_lowercase().as_str() {
      "narrative" | "story" => Some(Self::Narrative),
      "persuasive" | "argument" | "argumentative" | "discussion" => Some(Self::Persuasive),
      "expository" => Some(Self::Expository),
      "recount" => Some(Self::Recount),
      "descriptive" | "description" => Some(Self::Descriptive),
      "informative" | "report" => Some(Self::Informative),
      "creative" => Some(Self::Creative),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Narrative => "narrative",
      Self::Persuasive => "persuasive",
      Self::Expository => "expository",
      Self::Recount => "recount",
      Self::Descriptive => "descriptive",
      Self::Informative => "informative",
      Self::Creative => "creative",
    }
  }

  /// Conventions the text-type analysis prompt checks against.
  pub fn requirements(text_type: Option<Self>) -> &'static str {
    match text_type {
      Some(Self::Narrative) => "NARRATIVE REQUIREMENTS:
- Clear story structure (orientation, complication, resolution)
- Well-developed characters with clear motivations
- Engaging plot with conflict and resolution
- Descriptive language and imagery
- Dialogue that advances the story
- Consistent point of view and tense
- Engaging opening that hooks the reader
- Satisfying conclusion that resolves the conflict",
      Some(Self::Persuasive) => "PERSUASIVE REQUIREMENTS:
- Clear thesis/position statement
- Logical argument structure with supporting evidence
- Use of persuasive techniques (rhetorical questions, repetition, emotive language)
- Acknowledgment of counterarguments
- Strong conclusion that reinforces the position
- Appropriate tone for the intended audience
- Facts, statistics, or examples to support claims
- Call to action or clear recommendation",
      Some(Self::Expository) => "EXPOSITORY REQUIREMENTS:
- Clear topic introduction and thesis
- Logical organization of information
- Use of topic sentences and supporting details
- Objective, informative tone
- Clear explanations and definitions
- Use of examples and evidence
- Smooth transitions between ideas
- Conclusion that summarizes key points",
      Some(Self::Recount) => "RECOUNT REQUIREMENTS:
- Chronological sequence of events
- Clear orientation (who, what, when, where)
- Personal experience or factual events
- Past tense throughout
- First or third person perspective
- Descriptive details that bring events to life
- Clear sequence markers (first, then, next, finally)
- Reflection on the significance of events",
      Some(Self::Descriptive) => "DESCRIPTIVE REQUIREMENTS:
- Rich sensory details (sight, sound, smell, touch, taste)
- Vivid imagery and figurative language
- Clear focus on a person, place, object, or experience
- Organized spatial or logical structure
- Varied sentence structures for rhythm
- Precise vocabulary and word choice
- Creates a clear mental picture for the reader
- Engages the reader's senses and emotions",
      _ => "GENERAL TEXT TYPE REQUIREMENTS:
- Clear structure appropriate to the text type
- Consistent tone and style
- Appropriate language features
- Engaging content that meets the purpose
- Clear beginning, middle, and end",
    }
  }
}

/// The four NSW marking criteria and their share of the 30-point total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Criterion {
  IdeasAndContent,
  TextStructureAndOrganization,
  LanguageFeaturesAndVocabulary,
  SpellingPunctuationGrammar,
}

impl Criterion {
  pub const ALL: [Criterion; 4] = [
    Criterion::IdeasAndContent,
    Criterion::TextStructureAndOrganization,
    Criterion::LanguageFeaturesAndVocabulary,
    Criterion::SpellingPunctuationGrammar,
  ];

  /// Wire key used inside `criteriaFeedback`.
  pub fn key(&self) -> &'static str {
    match self {
      Self::IdeasAndContent => "ideasAndContent",
      Self::TextStructureAndOrganization => "textStructureAndOrganization",
      Self::LanguageFeaturesAndVocabulary => "languageFeaturesAndVocabulary",
      Self::SpellingPunctuationGrammar => "spellingPunctuationGrammar",
    }
  }

  pub fn max_score(&self) -> f64 {
    match self {
      Self::IdeasAndContent => 9.0,
      Self::TextStructureAndOrganization => 7.5,
      Self::LanguageFeaturesAndVocabulary => 7.5,
      Self::SpellingPunctuationGrammar => 6.0,
    }
  }

  /// Fraction of the total score carried by this criterion.
  pub fn weight(&self) -> f64 {
    self.max_score() / crate::scoring::MAX_TOTAL_SCORE
  }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  Basic,
  Intermediate,
  Advanced,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VocabularyWord {
  pub word: String,
  pub definition: String,
  pub example: String,
  pub difficulty: Difficulty,
  pub category: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub synonyms: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub usage_tip: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VocabularyCategory {
  pub category: String,
  pub description: String,
  pub words: Vec<VocabularyWord>,
}

/// How an activity is answered.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
  /// One option per item.
  SingleChoice,
  /// Any subset of options per item.
  MultiChoice,
  /// Open writing; not auto-graded.
  FreeText,
}

/// One question inside an activity. `answer` is empty for free-text items.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActivityItem {
  pub prompt: String,
  #[serde(default)]
  pub options: Vec<String>,
  #[serde(default, skip_serializing)]
  pub answer: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Activity {
  pub id: String,
  pub title: String,
  pub instructions: String,
  pub kind: ActivityKind,
  pub items: Vec<ActivityItem>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Lesson {
  pub day: u32,
  pub slug: String,
  pub title: String,
  #[serde(default)]
  pub text_type: Option<TextType>,
  #[serde(default)]
  pub overview: String,
  #[serde(default)]
  pub activities: Vec<Activity>,
  #[serde(default)]
  pub practice_prompts: Vec<String>,
  #[serde(default)]
  pub checklist: Vec<String>,
}

/// An autosaved piece of writing, kept in memory only.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
  pub content: String,
  #[serde(default)]
  pub text_type: Option<String>,
  pub version: u64,
  pub updated_at: String,
}
