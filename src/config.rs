//! Loading writing-coach configuration (prompts, extra weak words, extra lessons) from TOML.
//!
//! See `AppConfig` and `Prompts` for the expected schema. Every section and
//! every prompt field is optional; missing values keep the built-in defaults.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::Lesson;
use crate::error::ConfigError;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub vocabulary: VocabularyCfg,
  #[serde(default)]
  pub lessons: Vec<Lesson>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct VocabularyCfg {
  #[serde(default)]
  pub weak_words: Vec<WeakWordCfg>,
}

/// `[[vocabulary.weak_words]]` entry; overrides a built-in word of the same name.
#[derive(Clone, Debug, Deserialize)]
pub struct WeakWordCfg {
  pub word: String,
  pub synonyms: Vec<String>,
}

/// Prompt templates for the feedback operations. Placeholders are `{name}`;
/// the student's text is always substituted last.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub essay_score_system: String,
  pub essay_score_user_template: String,
  pub grammar_check_system: String,
  pub grammar_check_user_template: String,
  pub text_type_system: String,
  pub text_type_user_template: String,
  pub vocabulary_system: String,
  pub vocabulary_user_template: String,
  pub coaching_system: String,
  pub coaching_user_template: String,
  pub sentence_structure_system: String,
  pub vocabulary_enhancement_system: String,
  pub common_mistakes_system: String,
  pub synonyms_system: String,
  pub rephrase_system: String,
  pub generate_prompt_system: String,
  pub coach_tip_user_template: String,
  pub chat_system: String,
  pub chat_user_template: String,
  pub writing_structure_system: String,
  pub text_type_vocabulary_system: String,
  pub text_type_vocabulary_user_template: String,
}

const ESSAY_SCORE_USER: &str = r#"Analyze this {text_type} writing sample and provide detailed, specific feedback based on NSW Selective criteria.

CONTENT ANALYSIS:
- Word count: {word_count}
- Sentence count: {sentence_count}
- Paragraph count: {paragraph_count}
- Average sentence length: {average_sentence_length} words
- Has dialogue: {has_dialogue}
- Potential characters: {potential_characters}
- Descriptive words used: {descriptive_words}

NSW SELECTIVE CRITERIA TO ASSESS:
1. IDEAS AND CONTENT (30% - 9 points max): relevance, originality, development, depth, engagement.
2. TEXT STRUCTURE AND ORGANIZATION (25% - 7.5 points max): clear beginning, middle and end; logical flow; paragraphing; cohesion; structure appropriate for {text_type}.
3. LANGUAGE FEATURES AND VOCABULARY (25% - 7.5 points max): sophisticated and varied vocabulary, literary devices, sentence variety, tone, precision.
4. SPELLING, PUNCTUATION AND GRAMMAR (20% - 6 points max): spelling, varied punctuation, grammatical accuracy, consistent tense and point of view.

INSTRUCTIONS:
Score each criterion, total out of 30, quote the student's own words, give actionable suggestions, reflective questions and revision tasks. Be encouraging but honest.

Respond with a JSON object:
{
  "overallComment": string,
  "totalScore": number,
  "criteriaFeedback": {
    "ideasAndContent": {"score": number, "maxScore": 9, "strengths": [string], "improvements": [string], "suggestions": [string], "nextSteps": [string]},
    "textStructureAndOrganization": {"score": number, "maxScore": 7.5, "strengths": [string], "improvements": [string], "suggestions": [string], "nextSteps": [string]},
    "languageFeaturesAndVocabulary": {"score": number, "maxScore": 7.5, "strengths": [string], "improvements": [string], "suggestions": [string], "nextSteps": [string]},
    "spellingPunctuationGrammar": {"score": number, "maxScore": 6, "strengths": [string], "improvements": [string], "suggestions": [string], "nextSteps": [string]}
  },
  "priorityFocus": [string],
  "examStrategies": [string],
  "interactiveQuestions": [string],
  "revisionSuggestions": [string]
}

ASSISTANCE LEVEL: {assistance_level}
PREVIOUS FEEDBACK HISTORY: {feedback_history}

STUDENT'S WRITING:
"{content}""#;

const CHAT_SYSTEM: &str = r#"You are an expert NSW Selective School writing coach helping a student aged 10-12. You provide specific, actionable feedback that directly references their writing.

STUDENT'S CURRENT WRITING ANALYSIS:
- Text Type: {text_type}
- Writing Stage: {writing_stage}
- Word Count: {word_count}
- Has Dialogue: {has_dialogue}
- Has Description: {has_description}
- Has Characters: {has_characters}
- Has Conflict/Problem: {has_conflict}
- Vocabulary Level: {vocabulary_level}
- Sentence Variety: {sentence_variety}
- Structure Elements Present: {structure_elements}
- Strengths: {strengths}
- Areas for Improvement: {specific_issues}

COACHING GUIDELINES:
1. Reference specific parts of their writing when giving advice.
2. Acknowledge what they've done well first.
3. Give ONE specific suggestion they can use immediately.
4. Keep responses to 2-3 sentences, age-appropriate, occasional emojis.
5. Focus on NSW Selective criteria: Ideas & Content, Structure & Organization, Language & Vocabulary, Grammar & Mechanics.

Match the question: vocabulary -> word replacements from their text; structure -> next steps for their story elements; characters -> build on characters they introduced; plot -> developments from what they wrote; general -> their most immediate need."#;

const CHAT_USER: &str = r#"SPECIFIC CONTEXT FOR YOUR RESPONSE:
{stage_guidance}
- Consider addressing: {specific_issues}
- Acknowledge these strengths: {strengths}

Provide a specific, encouraging response that directly references their writing and gives them one clear action to take next.

STUDENT'S QUESTION: "{message}"

STUDENT'S CURRENT WRITING:
"{content}""#;

const WRITING_STRUCTURE_SYSTEM: &str = r#"You are an expert NSW Selective School writing teacher creating a guide for Year 5-6 students on {text_type} writing for selective school entrance exams. Include band descriptors, exam expectations and strategies for reaching Band 5-6. Return JSON:
{
  "title": "NSW Selective {text_type} Writing Guide",
  "nswContext": string,
  "bandRequirements": {"band6": string, "band5": string, "band4": string},
  "sections": [{"heading": string, "content": string}]
}"#;

const TEXT_TYPE_VOCABULARY_SYSTEM: &str = r#"You are an expert writing teacher providing vocabulary assistance for Year 5-6 students writing a {text_type} piece. Based on the content sample provided, suggest appropriate vocabulary. Return JSON:
{
  "textType": "{text_type}",
  "categories": [{"name": string, "words": [string], "examples": [string]}],
  "phrasesAndExpressions": [string],
  "transitionWords": [string]
}"#;

const GRAMMAR_CHECK_SYSTEM: &str = r#"You are an expert writing assistant that analyzes text for grammar, spelling, punctuation, and style issues. For each error found, provide the exact character positions (start and end), error type, message, and contextual suggestions.

Return JSON:
{
  "errors": [
    {"start": 15, "end": 19, "message": "Spelling error: 'yung' should be 'young'", "type": "spelling", "suggestions": ["young"], "context": "there was a yung adventurer"}
  ]
}

Check spelling, grammar (agreement, tense), punctuation (missing full stops, comma splices) and style (repetition, unclear phrasing). Be precise with character positions."#;

const TEXT_TYPE_USER: &str = r#"Analyze this {text_type} writing sample and explain how well it meets the requirements and conventions of this text type.

TEXT TYPE: {text_type}

CONTENT ANALYSIS:
- Word count: {word_count}
- Sentence count: {sentence_count}
- Paragraph count: {paragraph_count}
- Has dialogue: {has_dialogue}
- Potential characters: {potential_characters}

TEXT TYPE SPECIFIC ANALYSIS FOR {text_type_upper}:

{requirements}

Rate adherence to the conventions from 1 to 10, list present, partial and missing features, and give examples from the text.

Respond with a JSON object:
{
  "textType": "{text_type}",
  "adherenceScore": number,
  "textTypeFeatures": {"present": [string], "partial": [string], "missing": [string]},
  "structuralAnalysis": {"opening": string, "body": string, "conclusion": string},
  "languageFeatures": {"appropriate": [string], "needsWork": [string]},
  "specificSuggestions": [string],
  "textTypeExamples": [string],
  "nextSteps": [string]
}

STUDENT'S WRITING:
"{content}""#;

const VOCABULARY_USER: &str = r#"Analyze this writing sample for vocabulary complexity, variety and sophistication appropriate for NSW Selective standards.

BASIC VOCABULARY METRICS:
- Total words: {total_words}
- Unique words: {unique_words}
- Vocabulary diversity ratio: {diversity_ratio}%
- Words over 6 letters: {long_words}
- Potential academic words: {academic_words}

Rate overall sophistication from 1 to 10 and suggest specific word improvements.

Respond with a JSON object:
{
  "vocabularyScore": number,
  "sophisticationLevel": "emerging|developing|proficient|advanced",
  "vocabularyMetrics": {"totalWords": {total_words}, "uniqueWords": {unique_words}, "diversityRatio": {diversity_ratio}, "averageWordLength": number, "complexWords": number},
  "strengths": {"sophisticatedWords": [string], "varietyExamples": [string], "appropriateChoices": [string]},
  "improvements": {"basicWords": [string], "repetitiveWords": [string], "missedOpportunities": [string]},
  "suggestions": {"wordReplacements": [{"original": string, "suggestions": [string], "context": string}], "vocabularyTechniques": [string], "practiceActivities": [string]},
  "nextSteps": [string]
}

STUDENT'S WRITING:
"{content}""#;

const COACHING_USER: &str = r#"Provide personalized, actionable coaching tips for this student.

CONTEXT:
- Text Type: {text_type}
- Current Score: {current_score}/30
- Focus Area: {focus_area}
- Word Count: {word_count}
- Sentence Count: {sentence_count}

Tailor tips to the student's level, focus on the given area, include immediate actions with examples from their writing, practice exercises and encouragement.

Respond with a JSON object:
{
  "coachingLevel": "beginner|intermediate|advanced",
  "primaryFocus": "{focus_area}",
  "immediateActions": [{"action": string, "example": string, "improvement": string}],
  "strategicTips": [{"strategy": string, "application": string, "benefit": string}],
  "practiceExercises": [{"exercise": string, "duration": string, "outcome": string}],
  "examStrategies": [{"strategy": string, "timing": string, "impact": string}],
  "motivationalMessage": string,
  "nextSession": {"focus": string, "goal": string, "success_indicator": string}
}

STUDENT'S WRITING:
"{content}""#;

const SENTENCE_STRUCTURE_SYSTEM: &str = r#"You are an expert writing assistant. Analyze the provided text for sentence structure and variety. Identify repetitive sentence beginnings and short, choppy sentences that could be combined. Return JSON:
{
  "analysis": [
    {"type": "repetitive_beginning", "sentence": "The boy ran. The boy jumped.", "suggestion": "Vary sentence beginnings. Consider: 'The boy ran and jumped.'"},
    {"type": "choppy_sentences", "sentence": "He walked. He saw a dog. It barked.", "suggestion": "Combine short sentences."}
  ]
}"#;

const VOCABULARY_ENHANCEMENT_SYSTEM: &str = r#"You are an expert writing assistant. Suggest stronger synonyms or more precise word choices for overused or vague words in the provided text. Return JSON:
{
  "suggestions": [
    {"word": "good", "suggestion": "excellent, superb, commendable"}
  ]
}"#;

const COMMON_MISTAKES_SYSTEM: &str = r#"You are an expert writing teacher analyzing a Year 5-6 student's {text_type} writing piece. Identify common mistakes and provide constructive feedback. Return JSON:
{
  "overallAssessment": string,
  "mistakesIdentified": [
    {"category": "content|structure|vocabulary|sentences|punctuation|spelling", "issue": string, "example": string, "impact": string, "correction": string, "preventionTip": string}
  ],
  "patternAnalysis": string,
  "priorityFixes": [string],
  "positiveElements": [string]
}"#;

impl Default for Prompts {
  fn default() -> Self {
    Self {
      essay_score_system: "You are an expert NSW Selective School writing assessor who provides detailed, specific, and encouraging feedback. Always provide numerical scores that accurately reflect the quality of the writing. Respond ONLY with strict JSON.".into(),
      essay_score_user_template: ESSAY_SCORE_USER.into(),
      grammar_check_system: GRAMMAR_CHECK_SYSTEM.into(),
      grammar_check_user_template: "Please analyze this text for errors:\n\n{content}".into(),
      text_type_system: "You are an expert NSW Selective School writing assessor who specializes in how well student writing meets text type requirements and conventions. Respond ONLY with strict JSON.".into(),
      text_type_user_template: TEXT_TYPE_USER.into(),
      vocabulary_system: "You are an expert NSW Selective School writing assessor who specializes in vocabulary sophistication and helping students enhance their word choice. Respond ONLY with strict JSON.".into(),
      vocabulary_user_template: VOCABULARY_USER.into(),
      coaching_system: "You are an expert NSW Selective School writing coach who provides personalized, encouraging, and actionable guidance. Respond ONLY with strict JSON.".into(),
      coaching_user_template: COACHING_USER.into(),
      sentence_structure_system: SENTENCE_STRUCTURE_SYSTEM.into(),
      vocabulary_enhancement_system: VOCABULARY_ENHANCEMENT_SYSTEM.into(),
      common_mistakes_system: COMMON_MISTAKES_SYSTEM.into(),
      synonyms_system: "Provide 5 age-appropriate synonyms for the word \"{word}\" suitable for Year 5-6 students. Return only the synonyms as a comma-separated list.".into(),
      rephrase_system: "Rephrase this sentence in a way that's suitable for Year 5-6 students while maintaining its meaning: \"{sentence}\". Output ONLY the rephrased sentence.".into(),
      generate_prompt_system: "You are an expert writing teacher creating prompts for Year 5-6 students. Generate one engaging and age-appropriate {text_type} writing prompt. Output ONLY the prompt.".into(),
      chat_system: CHAT_SYSTEM.into(),
      chat_user_template: CHAT_USER.into(),
      writing_structure_system: WRITING_STRUCTURE_SYSTEM.into(),
      text_type_vocabulary_system: TEXT_TYPE_VOCABULARY_SYSTEM.into(),
      text_type_vocabulary_user_template: "Text type: {text_type}\n\nContent sample: {content}".into(),
      coach_tip_user_template: "You are a friendly NSW Year-6 writing coach. Return JSON with:\n{ \"tip\": string, \"exampleRewrite\"?: string }\nConstraints:\n- One specific, actionable tip for this paragraph (<= 2 sentences).\n- Optional 1-2 sentence example rewrite, age-appropriate.\n\nParagraph: ```{paragraph}```".into(),
    }
  }
}

/// Read and parse a config file.
pub fn load_app_config(path: &str) -> Result<AppConfig, ConfigError> {
  let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_string(), source })?;
  toml::from_str::<AppConfig>(&raw).map_err(|source| ConfigError::Parse { path: path.to_string(), source })
}

/// Attempt to load `AppConfig` from WRITING_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_app_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("WRITING_CONFIG_PATH").ok()?;
  match load_app_config(&path) {
    Ok(cfg) => {
      info!(
        target: "selective_writing",
        %path,
        weak_words = cfg.vocabulary.weak_words.len(),
        lessons = cfg.lessons.len(),
        "Loaded writing config (TOML)"
      );
      Some(cfg)
    }
    Err(e) => {
      error!(target: "selective_writing", error = %e, "Ignoring writing config");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_prompt_overrides_keep_other_defaults() {
    let cfg: AppConfig = toml::from_str(
      r#"
        [prompts]
        rephrase_system = "Rewrite: {sentence}"
      "#,
    )
    .unwrap();
    assert_eq!(cfg.prompts.rephrase_system, "Rewrite: {sentence}");
    assert_eq!(cfg.prompts.synonyms_system, Prompts::default().synonyms_system);
    assert!(cfg.lessons.is_empty());
  }

  #[test]
  fn parses_weak_words_and_lessons() {
    let cfg: AppConfig = toml::from_str(
      r#"
        [[vocabulary.weak_words]]
        word = "thing"
        synonyms = ["object", "item"]

        [[lessons]]
        day = 31
        slug = "bonus"
        title = "Bonus Practice"
        text_type = "narrative"
        checklist = ["I planned first"]
      "#,
    )
    .unwrap();
    assert_eq!(cfg.vocabulary.weak_words[0].synonyms, vec!["object", "item"]);
    assert_eq!(cfg.lessons[0].day, 31);
    assert_eq!(cfg.lessons[0].text_type, Some(crate::domain::TextType::Narrative));
    assert!(cfg.lessons[0].activities.is_empty());
  }

  #[test]
  fn missing_file_is_a_read_error() {
    let err = load_app_config("/definitely/not/here.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
  }

  #[test]
  fn student_text_is_the_last_placeholder() {
    let p = Prompts::default();
    for tpl in [
      &p.essay_score_user_template,
      &p.text_type_user_template,
      &p.vocabulary_user_template,
      &p.coaching_user_template,
      &p.chat_user_template,
    ] {
      assert!(tpl.trim_end().ends_with("\"{content}\""));
    }
  }
}
