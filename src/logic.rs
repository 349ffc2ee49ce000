//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! Every feedback operation answers with a JSON envelope carrying a boolean
//! `success`: model output merged with extras on success, an error message
//! plus neutral defaults on failure. Nothing is retried.

use std::future::Future;
use std::time::Instant;

use rand::seq::SliceRandom;
use serde_json::{json, Map, Value};
use tracing::{error, info, instrument, warn};

use crate::analysis::{analyze_content_structure, vocabulary_metrics, writing_context, WritingContext};
use crate::domain::TextType;
use crate::error::LlmError;
use crate::openai::{JsonObject, OpenAI};
use crate::progress;
use crate::protocol::{Endpoint, EndpointRequest};
use crate::scoring::{annotate_bands, fallback_essay_score, follow_up_reminder, local_feedback, student_level};
use crate::seeds::fallback_prompts;
use crate::state::AppState;
use crate::util::{char_len, now_rfc3339};

/// Longest text the grammar checker accepts, in characters.
pub const MAX_GRAMMAR_CHARS: usize = 2000;
const DEFAULT_TEXT_TYPE: &str = "narrative";
const DEFAULT_ASSISTANCE_LEVEL: &str = "medium";

/// An operation's JSON body; `rejected` marks malformed requests (HTTP 400).
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
  pub rejected: bool,
  pub body: Value,
}

impl Envelope {
  fn ok(body: Value) -> Self {
    Self { rejected: false, body }
  }

  fn rejected(error: &str, defaults: Value) -> Self {
    Self { rejected: true, body: failure(error, error, defaults) }
  }
}

/// `{success: true, ...fields}`.
pub fn success(mut fields: JsonObject) -> Value {
  fields.insert("success".into(), Value::Bool(true));
  Value::Object(fields)
}

/// `{success: false, error, message, ...defaults}`.
pub fn failure(error: &str, message: &str, defaults: Value) -> Value {
  let mut out = match defaults {
    Value::Object(m) => m,
    _ => Map::new(),
  };
  out.insert("success".into(), Value::Bool(false));
  out.insert("error".into(), json!(error));
  out.insert("message".into(), json!(message));
  Value::Object(out)
}

fn obj(v: Value) -> JsonObject {
  match v {
    Value::Object(m) => m,
    _ => Map::new(),
  }
}

/// Run one model call, or fail with `NotConfigured` when no key is set.
async fn with_client<'a, T, F, Fut>(state: &'a AppState, call: F) -> Result<T, LlmError>
where
  F: FnOnce(&'a OpenAI) -> Fut,
  Fut: Future<Output = Result<T, LlmError>>,
{
  match &state.openai {
    Some(oa) => call(oa).await,
    None => Err(LlmError::NotConfigured),
  }
}

fn log_failure(endpoint: &str, e: &LlmError) {
  if matches!(e, LlmError::NotConfigured) {
    warn!(target: "feedback", endpoint, "AI service not configured; answering with defaults");
  } else {
    error!(target: "feedback", endpoint, error = %e, parse_failure = e.is_parse_failure(), "Feedback operation failed");
  }
}

/// Route a request to its operation.
#[instrument(level = "info", skip(state, req), fields(endpoint = ?req.endpoint, content_len = req.content.len()))]
pub async fn dispatch(state: &AppState, req: EndpointRequest) -> Envelope {
  let text_type = req.text_type.as_deref().filter(|t| !t.trim().is_empty()).unwrap_or(DEFAULT_TEXT_TYPE);
  let Some(endpoint) = req.endpoint else {
    return Envelope::rejected("Missing endpoint", json!({}));
  };
  match endpoint {
    Endpoint::EssayScore => {
      let level = req.assistance_level.as_deref().filter(|l| !l.trim().is_empty()).unwrap_or(DEFAULT_ASSISTANCE_LEVEL);
      Envelope::ok(essay_score(state, &req.content, text_type, level, &req.feedback_history).await)
    }
    Endpoint::GrammarSpellingCheck => grammar_spelling_check(state, &req.content).await,
    Endpoint::TextTypeAnalysis => Envelope::ok(text_type_analysis(state, &req.content, text_type).await),
    Endpoint::VocabularySophistication => Envelope::ok(vocabulary_sophistication(state, &req.content).await),
    Endpoint::CoachingTips => {
      let focus = req.focus_area.as_deref().unwrap_or("general");
      Envelope::ok(coaching_tips(state, &req.content, text_type, req.current_score.unwrap_or(0.0), focus).await)
    }
    Endpoint::SentenceStructure => Envelope::ok(sentence_structure(state, &req.content).await),
    Endpoint::VocabularyEnhancement => Envelope::ok(vocabulary_enhancement(state, &req.content).await),
    Endpoint::CommonMistakes => Envelope::ok(common_mistakes(state, &req.content, text_type).await),
    Endpoint::Synonyms => {
      let word = req.word.as_deref().unwrap_or(&req.content);
      synonyms(state, word).await
    }
    Endpoint::Rephrase => {
      let sentence = req.sentence.as_deref().unwrap_or(&req.content);
      rephrase(state, sentence).await
    }
    Endpoint::GeneratePrompt => Envelope::ok(generate_prompt(state, text_type, req.topic.as_deref()).await),
    Endpoint::CoachTip => {
      let paragraph = req.paragraph.as_deref().unwrap_or(&req.content);
      coach_tip(state, paragraph).await
    }
    Endpoint::ProgressTracking => progress_tracking(state, req.user_id.as_deref(), req.assessment_data.as_ref()).await,
    Endpoint::CheckConnection => Envelope::ok(check_connection(state)),
    Endpoint::Chat => {
      let message = req.user_message.as_deref().unwrap_or_default();
      chat(state, message, &req.content, text_type, req.word_count).await
    }
    Endpoint::WritingStructure => Envelope::ok(writing_structure(state, text_type).await),
    Endpoint::TextTypeVocabulary => Envelope::ok(text_type_vocabulary(state, text_type, &req.content).await),
  }
}

/// Full NSW criteria assessment with bands. Every outcome echoes `assistanceLevel`;
/// the last five `feedback_history` entries go to the model with the essay.
#[instrument(level = "info", skip(state, content, feedback_history), fields(content_len = content.len(), %text_type, %assistance_level, history = feedback_history.len()))]
pub async fn essay_score(
  state: &AppState,
  content: &str,
  text_type: &str,
  assistance_level: &str,
  feedback_history: &[Value],
) -> Value {
  let analysis = analyze_content_structure(content);
  let Some(oa) = &state.openai else {
    info!(target: "feedback", word_count = analysis.word_count, "No AI service; serving enhanced local feedback");
    let mut out = obj(json!(local_feedback(&analysis, text_type)));
    out.insert("assistanceLevel".into(), json!(assistance_level));
    return success(out);
  };
  match oa
    .essay_feedback(&state.prompts, content, text_type, &analysis, assistance_level, feedback_history)
    .await
  {
    Ok(mut feedback) => {
      annotate_bands(&mut feedback);
      feedback.insert("assistanceLevel".into(), json!(assistance_level));
      info!(target: "feedback", total = ?feedback.get("totalScore"), band = ?feedback.get("overallBand"), "Essay scored");
      success(feedback)
    }
    Err(e) => {
      log_failure("essayScore", &e);
      let mut defaults = fallback_essay_score(&analysis, text_type, !e.is_parse_failure());
      defaults.insert("assistanceLevel".into(), json!(assistance_level));
      failure(&e.to_string(), "Unable to score the writing right now; showing an estimate.", Value::Object(defaults))
    }
  }
}

/// Keep only well-formed errors whose span lies inside `text` (char offsets).
pub fn filter_grammar_errors(errors: Vec<Value>, text: &str) -> Vec<Value> {
  let len = char_len(text) as u64;
  errors
    .into_iter()
    .filter(|e| {
      let (Some(start), Some(end)) = (e.get("start").and_then(Value::as_u64), e.get("end").and_then(Value::as_u64)) else {
        return false;
      };
      start < end
        && end <= len
        && e.get("message").is_some_and(Value::is_string)
        && e.get("type").is_some_and(Value::is_string)
        && e.get("suggestions").is_some_and(Value::is_array)
    })
    .collect()
}

#[instrument(level = "info", skip(state, text), fields(text_len = text.len()))]
pub async fn grammar_spelling_check(state: &AppState, text: &str) -> Envelope {
  if text.trim().is_empty() {
    return Envelope::rejected("Text is required", json!({"errors": []}));
  }
  if char_len(text) > MAX_GRAMMAR_CHARS {
    return Envelope::rejected("Text exceeds 2000 characters", json!({"errors": []}));
  }
  let result = with_client(state, |oa| oa.grammar_check(&state.prompts, text)).await;
  match result {
    Ok(raw) => {
      let total = raw.len();
      let errors = filter_grammar_errors(raw, text);
      info!(target: "feedback", total, kept = errors.len(), "Grammar errors validated");
      Envelope::ok(success(obj(json!({"errors": errors}))))
    }
    Err(e) => {
      log_failure("grammarSpellingCheck", &e);
      Envelope::ok(failure(&e.to_string(), "Unable to check grammar right now.", json!({"errors": []})))
    }
  }
}

#[instrument(level = "info", skip(state, content), fields(content_len = content.len(), %text_type))]
pub async fn text_type_analysis(state: &AppState, content: &str, text_type: &str) -> Value {
  let analysis = analyze_content_structure(content);
  let result = with_client(state, |oa| oa.text_type_analysis(&state.prompts, content, text_type, &analysis)).await;
  match result {
    Ok(mut out) => {
      out.insert("wordCount".into(), json!(analysis.word_count));
      out.insert("analysisTimestamp".into(), json!(now_rfc3339()));
      success(out)
    }
    Err(e) => {
      log_failure("textTypeAnalysis", &e);
      failure(
        &e.to_string(),
        "Please try again to get detailed text type analysis.",
        json!({"textType": text_type, "adherenceScore": 5}),
      )
    }
  }
}

#[instrument(level = "info", skip(state, content), fields(content_len = content.len()))]
pub async fn vocabulary_sophistication(state: &AppState, content: &str) -> Value {
  let metrics = vocabulary_metrics(content);
  let result = with_client(state, |oa| oa.vocabulary_sophistication(&state.prompts, content, &metrics)).await;
  match result {
    Ok(mut out) => {
      out.insert("analysisTimestamp".into(), json!(now_rfc3339()));
      success(out)
    }
    Err(e) => {
      log_failure("vocabularySophistication", &e);
      failure(
        &e.to_string(),
        "Please try again to get detailed vocabulary analysis.",
        json!({"vocabularyScore": 5, "vocabularyMetrics": metrics}),
      )
    }
  }
}

#[instrument(level = "info", skip(state, content), fields(content_len = content.len(), %text_type, %current_score, %focus_area))]
pub async fn coaching_tips(state: &AppState, content: &str, text_type: &str, current_score: f64, focus_area: &str) -> Value {
  let analysis = analyze_content_structure(content);
  let result = with_client(state, |oa| oa.coaching_tips(&state.prompts, content, text_type, current_score, focus_area, &analysis)).await;
  match result {
    Ok(mut out) => {
      out.insert("studentLevel".into(), json!(student_level(current_score)));
      out.insert("sessionTimestamp".into(), json!(now_rfc3339()));
      out.insert("followUpReminder".into(), json!(follow_up_reminder(focus_area)));
      success(out)
    }
    Err(e) => {
      log_failure("coachingTips", &e);
      failure(&e.to_string(), "Please try again to get personalized coaching guidance.", json!({}))
    }
  }
}

#[instrument(level = "info", skip(state, content), fields(content_len = content.len()))]
pub async fn sentence_structure(state: &AppState, content: &str) -> Value {
  let result = with_client(state, |oa| oa.sentence_structure(&state.prompts, content)).await;
  match result {
    Ok(out) => success(out),
    Err(e) => {
      log_failure("sentenceStructure", &e);
      failure(&e.to_string(), "Unable to analyze sentence structure right now.", json!({"analysis": []}))
    }
  }
}

/// `[{word, suggestion}]` from the local weak-word scan, one entry per word.
fn local_enhancements(state: &AppState, content: &str) -> Vec<Value> {
  let mut seen = Vec::<String>::new();
  state
    .vocabulary
    .highlights(content)
    .into_iter()
    .filter_map(|h| {
      let word = h.word.to_lowercase();
      if seen.contains(&word) {
        return None;
      }
      seen.push(word.clone());
      Some(json!({"word": word, "suggestion": h.suggestions.iter().take(3).cloned().collect::<Vec<_>>().join(", ")}))
    })
    .collect()
}

#[instrument(level = "info", skip(state, content), fields(content_len = content.len()))]
pub async fn vocabulary_enhancement(state: &AppState, content: &str) -> Value {
  let result = with_client(state, |oa| oa.vocabulary_enhancement(&state.prompts, content)).await;
  match result {
    Ok(out) => success(out),
    Err(e) => {
      log_failure("vocabularyEnhancement", &e);
      failure(
        &e.to_string(),
        "Showing suggestions from the built-in word list.",
        json!({"suggestions": local_enhancements(state, content)}),
      )
    }
  }
}

#[instrument(level = "info", skip(state, content), fields(content_len = content.len(), %text_type))]
pub async fn common_mistakes(state: &AppState, content: &str, text_type: &str) -> Value {
  let result = with_client(state, |oa| oa.common_mistakes(&state.prompts, content, text_type)).await;
  match result {
    Ok(out) => success(out),
    Err(e) => {
      log_failure("commonMistakes", &e);
      failure(
        &e.to_string(),
        "Unable to analyze the writing at this time.",
        json!({
          "overallAssessment": "Unable to analyze the writing at this time. Your work shows good effort.",
          "mistakesIdentified": [],
          "patternAnalysis": "Unable to analyze patterns at this time. Focus on careful proofreading.",
          "priorityFixes": ["Proofread carefully", "Check spelling and grammar", "Ensure clear expression"],
          "positiveElements": ["Good effort in completing the task", "Appropriate attempt at the text type"]
        }),
      )
    }
  }
}

#[instrument(level = "info", skip(state), fields(%word))]
pub async fn synonyms(state: &AppState, word: &str) -> Envelope {
  let word = word.trim();
  if word.is_empty() {
    return Envelope::rejected("Word is required", json!({"synonyms": []}));
  }
  let result = with_client(state, |oa| oa.synonyms(&state.prompts, word)).await;
  Envelope::ok(match result {
    Ok(list) => success(obj(json!({"word": word, "synonyms": list}))),
    Err(e) => {
      log_failure("synonyms", &e);
      let local = state.vocabulary.suggestions_for_word(word);
      failure(&e.to_string(), "Showing synonyms from the built-in word list.", json!({"word": word, "synonyms": local}))
    }
  })
}

#[instrument(level = "info", skip(state, sentence), fields(sentence_len = sentence.len()))]
pub async fn rephrase(state: &AppState, sentence: &str) -> Envelope {
  let sentence = sentence.trim();
  if sentence.is_empty() {
    return Envelope::rejected("Sentence is required", json!({}));
  }
  let result = with_client(state, |oa| oa.rephrase(&state.prompts, sentence)).await;
  Envelope::ok(match result {
    Ok(rephrased) => success(obj(json!({"original": sentence, "rephrased": rephrased}))),
    Err(e) => {
      log_failure("rephrase", &e);
      failure(&e.to_string(), "Rephrasing is temporarily unavailable.", json!({"original": sentence, "rephrased": sentence}))
    }
  })
}

/// A random built-in prompt for the text type, optionally focused on `topic`.
pub fn fallback_prompt(text_type: &str, topic: Option<&str>) -> String {
  let pool = fallback_prompts(TextType::from_label(text_type));
  let base = pool.choose(&mut rand::thread_rng()).copied().unwrap_or_default();
  match topic.map(str::trim).filter(|t| !t.is_empty()) {
    Some(t) => format!("{base} (Focus on: {t})"),
    None => base.to_string(),
  }
}

#[instrument(level = "info", skip(state), fields(%text_type, ?topic))]
pub async fn generate_prompt(state: &AppState, text_type: &str, topic: Option<&str>) -> Value {
  let kind = TextType::from_label(text_type).map_or(text_type, |t| t.as_str());
  let label = match topic.map(str::trim).filter(|t| !t.is_empty()) {
    Some(t) => format!("{kind} (topic: {t})"),
    None => kind.to_string(),
  };
  let result = with_client(state, |oa| oa.generate_prompt(&state.prompts, &label)).await;
  match result {
    Ok(prompt) => success(obj(json!({"prompt": prompt, "textType": text_type}))),
    Err(e) => {
      log_failure("generatePrompt", &e);
      failure(
        &e.to_string(),
        "Using a built-in writing prompt.",
        json!({"prompt": fallback_prompt(text_type, topic), "textType": text_type, "fallback": true}),
      )
    }
  }
}

#[instrument(level = "info", skip(state, paragraph), fields(paragraph_len = paragraph.len()))]
pub async fn coach_tip(state: &AppState, paragraph: &str) -> Envelope {
  if paragraph.trim().is_empty() {
    return Envelope::rejected("Paragraph is required", json!({}));
  }
  let started = Instant::now();
  let result = with_client(state, |oa| oa.coach_tip(&state.prompts, paragraph)).await;
  Envelope::ok(match result {
    Ok(mut out) => {
      out.insert("latencyMs".into(), json!(started.elapsed().as_millis() as u64));
      success(out)
    }
    Err(e) => {
      log_failure("coachTip", &e);
      failure(&e.to_string(), "Unable to generate a tip right now.", json!({}))
    }
  })
}

/// Records the assessment in the user's history and reports progress.
#[instrument(level = "info", skip(state, assessment), fields(?user_id))]
pub async fn progress_tracking(state: &AppState, user_id: Option<&str>, assessment: Option<&Value>) -> Envelope {
  let (Some(user_id), Some(assessment)) = (user_id.filter(|u| !u.trim().is_empty()), assessment.filter(|a| a.is_object())) else {
    return Envelope::rejected("userId and assessmentData are required", json!({}));
  };
  let timestamp = now_rfc3339();
  let history = state
    .record_progress(user_id, progress::snapshot(assessment, timestamp.clone()))
    .await;
  let report = progress::build_report(user_id, assessment, &history, timestamp);
  info!(target: "feedback", %user_id, assessments = history.len(), level = report.readiness_indicator.level, "Progress tracked");
  Envelope::ok(json!(report))
}

/// Words the offline coach offers replacements for, in the order checked.
const CHAT_WEAK_WORDS: [&str; 8] = ["said", "big", "small", "good", "bad", "nice", "went", "got"];

fn contains_word(content: &str, word: &str) -> bool {
  content.split(|c: char| !c.is_alphanumeric()).any(|t| t.eq_ignore_ascii_case(word))
}

/// Keyword-matched coaching reply used when the model is unavailable.
pub fn chat_fallback(state: &AppState, message: &str, context: &WritingContext, content: &str) -> String {
  let asked = message.to_lowercase();
  let about = |keys: &[&str]| keys.iter().any(|k| asked.contains(k));
  let has_content = !content.trim().is_empty();

  if about(&["introduction", "opening", "start"]) {
    if has_content {
      let opening: String = content.chars().take(30).collect();
      return format!(
        "I can see you've started with \"{opening}...\" That's a good beginning! Try adding more specific details about the setting or character to hook your reader. What happens next in your story? 😊"
      );
    }
    return "Great question about openings! Try starting with dialogue, action, or an interesting detail. For example: 'The door creaked open, revealing...' What's your story going to be about?".into();
  }

  if about(&["vocabulary", "word", "synonym"]) {
    let found = CHAT_WEAK_WORDS.iter().find(|w| contains_word(content, w));
    if let Some(word) = found {
      let options: Vec<String> = state.vocabulary.suggestions_for_word(word).into_iter().take(3).collect();
      if !options.is_empty() {
        return format!(
          "I noticed you used \"{word}\" in your writing. Try replacing it with: {}. Which one fits your story best?",
          options.join(", ")
        );
      }
    }
    return "For better vocabulary, try replacing simple words with more descriptive ones. Instead of 'big', try 'enormous' or 'massive'. What specific word would you like help with?".into();
  }

  if about(&["character", "people"]) {
    if has_content && context.has_characters {
      return "I can see you have characters in your story! To make them more interesting, show their personality through their actions and words. What does your main character want or fear?".into();
    }
    return "To create interesting characters, give them unique traits, goals, and problems. What kind of character is in your story? Tell me about them! 😊".into();
  }

  if about(&["conclusion", "ending"]) {
    if has_content && context.word_count > 100 {
      return "For your ending, think about how your character has changed from the beginning. Look back at how you started - can you connect your ending to that opening? What's the main message of your story?".into();
    }
    return "For a strong conclusion, show how your character has changed or learned something. What's the most important thing that happens in your story?".into();
  }

  if has_content {
    format!(
      "I can see you're working on your {} stage with {} words. That's great progress! What specific part would you like help with? 😊",
      context.writing_stage, context.word_count
    )
  } else {
    "I'm here to help with your writing! Start by telling me what you want to write about, or ask me about any part of writing you'd like help with. 😊".into()
  }
}

/// Writing-coach conversation about the student's current draft.
#[instrument(level = "info", skip(state, message, content), fields(message_len = message.len(), content_len = content.len(), %text_type))]
pub async fn chat(state: &AppState, message: &str, content: &str, text_type: &str, word_count: Option<usize>) -> Envelope {
  let message = message.trim();
  if message.is_empty() {
    return Envelope::rejected("User message is required", json!({}));
  }
  let context = writing_context(content, text_type, word_count);
  let result = with_client(state, |oa| oa.chat(&state.prompts, message, content, text_type, &context)).await;
  Envelope::ok(match result {
    Ok(response) => {
      info!(target: "feedback", stage = context.writing_stage, reply_len = response.len(), "Coach replied");
      success(obj(json!({"response": response, "context": context})))
    }
    Err(e) => {
      log_failure("chat", &e);
      let response = chat_fallback(state, message, &context, content);
      failure(&e.to_string(), "Using a built-in coaching reply.", json!({"response": response, "context": context}))
    }
  })
}

fn fallback_writing_structure(text_type: &str) -> Value {
  json!({
    "title": format!("NSW Selective {text_type} Writing Guide"),
    "nswContext": format!("This guide focuses on {text_type} writing requirements for NSW Selective School entrance exams, targeting Band 5-6 achievement levels."),
    "bandRequirements": {
      "band6": "Band 6 demonstrates exceptional sophistication with highly original ideas, flawless execution, and sophisticated language features.",
      "band5": "Band 5 shows proficient skills with well-developed ideas, strong structure, and varied vocabulary appropriate for selective school entry.",
      "band4": "Band 4 displays sound understanding with adequate ideas and competent execution of basic requirements."
    },
    "sections": [
      {
        "heading": "NSW Selective Structure Requirements",
        "content": format!("For NSW Selective {text_type} writing: Clear introduction that engages the reader → Well-developed body with sophisticated ideas → Strong conclusion that leaves lasting impact. Each paragraph should have one main idea with supporting details.")
      },
      {
        "heading": "Language Features for Band 5-6",
        "content": "Use sophisticated vocabulary appropriate for Year 5-6 level, vary sentence structures (simple, compound, complex), incorporate literary devices, and demonstrate precise word choice that enhances meaning."
      },
      {
        "heading": "Common NSW Selective Mistakes",
        "content": "Avoid: repetitive vocabulary, simple sentence structures only, lack of text type features, insufficient development of ideas, and poor time management in exam conditions."
      },
      {
        "heading": "NSW Exam Strategies",
        "content": "Plan for 5 minutes, write for 20 minutes, review for 5 minutes. Use sophisticated vocabulary, vary sentence beginnings, include text type features, and demonstrate original thinking appropriate for selective school entry."
      }
    ]
  })
}

/// Band requirements and section guide for one text type.
#[instrument(level = "info", skip(state), fields(%text_type))]
pub async fn writing_structure(state: &AppState, text_type: &str) -> Value {
  let result = with_client(state, |oa| oa.writing_structure(&state.prompts, text_type)).await;
  match result {
    Ok(out) => success(out),
    Err(e) => {
      log_failure("writingStructure", &e);
      failure(&e.to_string(), "Showing the built-in writing guide.", fallback_writing_structure(text_type))
    }
  }
}

/// Vocabulary categories, phrases and transitions suited to a text type.
#[instrument(level = "info", skip(state, content_sample), fields(%text_type, sample_len = content_sample.len()))]
pub async fn text_type_vocabulary(state: &AppState, text_type: &str, content_sample: &str) -> Value {
  let sample: String = content_sample.chars().take(500).collect();
  let result = with_client(state, |oa| oa.text_type_vocabulary(&state.prompts, text_type, &sample)).await;
  match result {
    Ok(out) => success(out),
    Err(e) => {
      log_failure("textTypeVocabulary", &e);
      failure(
        &e.to_string(),
        "Showing general vocabulary suggestions.",
        json!({
          "textType": text_type,
          "categories": [{
            "name": "General Words",
            "words": ["interesting", "important", "different", "special", "amazing"],
            "examples": ["This is an interesting topic.", "It's important to remember."]
          }],
          "phrasesAndExpressions": ["In my opinion", "For example", "In conclusion", "On the other hand"],
          "transitionWords": ["First", "Second", "Next", "Then", "Finally", "However", "Because", "Therefore"]
        }),
      )
    }
  }
}

pub fn check_connection(state: &AppState) -> Value {
  let connected = state.openai.is_some();
  let message = if connected {
    "AI service is configured"
  } else {
    "AI service is not configured; local feedback only"
  };
  success(obj(json!({"isConnected": connected, "message": message})))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::AppConfig;
  use crate::openai::test_support::{stub_with_content, UNREACHABLE};

  fn offline() -> AppState {
    AppState::from_parts(AppConfig::default(), None)
  }

  fn with_api(base: String) -> AppState {
    let oa = OpenAI::new("test-key".into(), base).unwrap();
    AppState::from_parts(AppConfig::default(), Some(oa))
  }

  fn req(endpoint: Endpoint, content: &str) -> EndpointRequest {
    EndpointRequest {
      endpoint: Some(endpoint),
      content: content.into(),
      user_message: Some("Can you help me?".into()),
      ..Default::default()
    }
  }

  const ALL: [Endpoint; 17] = [
    Endpoint::EssayScore,
    Endpoint::GrammarSpellingCheck,
    Endpoint::TextTypeAnalysis,
    Endpoint::VocabularySophistication,
    Endpoint::CoachingTips,
    Endpoint::SentenceStructure,
    Endpoint::VocabularyEnhancement,
    Endpoint::CommonMistakes,
    Endpoint::Synonyms,
    Endpoint::Rephrase,
    Endpoint::GeneratePrompt,
    Endpoint::CoachTip,
    Endpoint::ProgressTracking,
    Endpoint::CheckConnection,
    Endpoint::Chat,
    Endpoint::WritingStructure,
    Endpoint::TextTypeVocabulary,
  ];

  #[tokio::test]
  async fn every_operation_reports_success_when_api_is_unreachable() {
    let state = with_api(UNREACHABLE.to_string());
    for endpoint in ALL {
      let out = dispatch(&state, req(endpoint, "The good dog ran to the big park.")).await;
      assert!(out.body["success"].is_boolean(), "{endpoint:?} lacks success");
    }
  }

  #[tokio::test]
  async fn every_operation_reports_success_when_reply_is_not_json() {
    let state = with_api(stub_with_content("this is not json").await);
    for endpoint in ALL {
      let out = dispatch(&state, req(endpoint, "The good dog ran to the big park.")).await;
      assert!(out.body["success"].is_boolean(), "{endpoint:?} lacks success");
    }
  }

  #[tokio::test]
  async fn essay_score_offline_uses_enhanced_fallback() {
    let out = essay_score(&offline(), "Tom ran home. \"Wait!\" he said.", "narrative", "medium", &[]).await;
    assert_eq!(out["success"], true);
    assert_eq!(out["isEnhancedFallback"], true);
    assert_eq!(out["wordCount"], 6);
  }

  #[tokio::test]
  async fn essay_score_parse_failure_gives_banded_estimate() {
    let state = with_api(stub_with_content("nope").await);
    let content = "word ".repeat(120);
    let out = essay_score(&state, &content, "narrative", "high", &[]).await;
    assert_eq!(out["success"], false);
    assert_eq!(out["totalScore"], 12.0);
    assert_eq!(out["overallBand"], 3);
    assert_eq!(out["estimatedExamScore"], "12/30");
    assert_eq!(out["assistanceLevel"], "high");
  }

  #[tokio::test]
  async fn essay_score_success_adds_bands() {
    let state = with_api(
      stub_with_content(
        r#"{"overallComment":"Nice","criteriaFeedback":{"ideasAndContent":{"score":9,"maxScore":9},"spellingPunctuationGrammar":{"score":3,"maxScore":6}}}"#,
      )
      .await,
    );
    let out = essay_score(&state, "Some writing here.", "narrative", "low", &[json!({"overallComment": "Earlier"})]).await;
    assert_eq!(out["success"], true);
    assert_eq!(out["criteriaFeedback"]["ideasAndContent"]["band"], 6);
    assert_eq!(out["criteriaFeedback"]["spellingPunctuationGrammar"]["band"], 3);
    assert_eq!(out["totalScore"], 12.0);
    assert_eq!(out["overallBand"], 3);
    assert_eq!(out["assistanceLevel"], "low");
  }

  #[tokio::test]
  async fn essay_assistance_level_defaults_to_medium() {
    let out = dispatch(&offline(), req(Endpoint::EssayScore, "We went to the park.")).await;
    assert_eq!(out.body["assistanceLevel"], "medium");

    let mut r = req(Endpoint::EssayScore, "We went to the park.");
    r.assistance_level = Some("high".into());
    let out = dispatch(&offline(), r).await;
    assert_eq!(out.body["assistanceLevel"], "high");
  }

  #[tokio::test]
  async fn grammar_check_validates_input_length() {
    let state = offline();
    let empty = grammar_spelling_check(&state, "   ").await;
    assert!(empty.rejected);
    assert_eq!(empty.body["errors"], json!([]));

    let long = "a".repeat(MAX_GRAMMAR_CHARS + 1);
    assert!(grammar_spelling_check(&state, &long).await.rejected);

    let ok_len = "a".repeat(MAX_GRAMMAR_CHARS);
    let out = grammar_spelling_check(&state, &ok_len).await;
    assert!(!out.rejected);
    assert_eq!(out.body["success"], false);
  }

  #[tokio::test]
  async fn grammar_check_drops_malformed_and_out_of_range_errors() {
    let state = with_api(
      stub_with_content(
        r#"{"errors":[
          {"start":0,"end":4,"message":"Spelling","type":"spelling","suggestions":["They"]},
          {"start":2,"end":99,"message":"Too far","type":"grammar","suggestions":[]},
          {"start":1,"end":2,"message":"No suggestions","type":"grammar"}
        ]}"#,
      )
      .await,
    );
    let out = grammar_spelling_check(&state, "Thay went home.").await;
    assert_eq!(out.body["success"], true);
    assert_eq!(out.body["errors"].as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn text_type_failure_defaults() {
    let out = text_type_analysis(&offline(), "Once upon a time.", "recount").await;
    assert_eq!(out["success"], false);
    assert_eq!(out["textType"], "recount");
    assert_eq!(out["adherenceScore"], 5);
  }

  #[tokio::test]
  async fn coaching_tips_success_adds_level_and_reminder() {
    let state = with_api(stub_with_content(r#"{"coachingLevel":"intermediate","motivationalMessage":"Keep going"}"#).await);
    let out = coaching_tips(&state, "Some text.", "narrative", 19.0, "vocabulary").await;
    assert_eq!(out["success"], true);
    assert_eq!(out["studentLevel"], "intermediate");
    assert_eq!(out["followUpReminder"], "Practice using sophisticated words in context");
    assert!(out["sessionTimestamp"].is_string());
  }

  #[tokio::test]
  async fn synonyms_fall_back_to_dictionary() {
    let out = synonyms(&offline(), "Good").await;
    assert_eq!(out.body["success"], false);
    assert_eq!(out.body["synonyms"][0], "excellent");
    assert!(synonyms(&offline(), " ").await.rejected);
  }

  #[tokio::test]
  async fn rephrase_failure_returns_original() {
    let out = rephrase(&offline(), "It was good.").await;
    assert_eq!(out.body["rephrased"], "It was good.");
  }

  #[tokio::test]
  async fn generate_prompt_fallback_appends_topic() {
    let out = generate_prompt(&offline(), "persuasive", Some(" recycling ")).await;
    let prompt = out["prompt"].as_str().unwrap();
    assert!(prompt.ends_with("(Focus on: recycling)"));
    let base = prompt.trim_end_matches(" (Focus on: recycling)");
    assert!(fallback_prompts(Some(TextType::Persuasive)).contains(&base));
  }

  #[tokio::test]
  async fn coach_tip_adds_latency_and_requires_tip() {
    let state = with_api(stub_with_content(r#"{"tip":"Start with action."}"#).await);
    let out = coach_tip(&state, "We went to the beach.").await;
    assert_eq!(out.body["success"], true);
    assert!(out.body["latencyMs"].is_u64());

    let state = with_api(stub_with_content(r#"{"advice":"x"}"#).await);
    let out = coach_tip(&state, "We went to the beach.").await;
    assert_eq!(out.body["success"], false);
  }

  #[tokio::test]
  async fn vocabulary_enhancement_fallback_lists_weak_words_once() {
    let out = vocabulary_enhancement(&offline(), "A good day, a good dog and a big hat.").await;
    let s = out["suggestions"].as_array().unwrap();
    assert_eq!(s.len(), 2);
    assert_eq!(s[0]["word"], "good");
    assert_eq!(s[0]["suggestion"], "excellent, outstanding, remarkable");
  }

  #[tokio::test]
  async fn progress_requires_user_and_assessment() {
    let state = offline();
    assert!(progress_tracking(&state, None, Some(&json!({}))).await.rejected);
    assert!(progress_tracking(&state, Some("u"), None).await.rejected);

    let a = json!({"totalScore": 12.0, "overallBand": 3});
    progress_tracking(&state, Some("u"), Some(&a)).await;
    let b = json!({"totalScore": 18.0, "overallBand": 4});
    let out = progress_tracking(&state, Some("u"), Some(&b)).await;
    assert_eq!(out.body["success"], true);
    assert_eq!(out.body["historicalTrends"]["assessments"], 2);
    assert_eq!(out.body["historicalTrends"]["trend"], "improving");
  }

  #[tokio::test]
  async fn generate_prompt_labels_canonical_text_type() {
    let state = with_api(stub_with_content("Write about a storm.").await);
    let out = generate_prompt(&state, "Persuasive", None).await;
    assert_eq!(out["success"], true);
    assert_eq!(out["textType"], "Persuasive");
    assert_eq!(TextType::from_label("Persuasive").as_ref().map(TextType::as_str), Some("persuasive"));
  }

  #[tokio::test]
  async fn chat_requires_a_message() {
    let out = chat(&offline(), "  ", "Some text", "narrative", None).await;
    assert!(out.rejected);
    assert_eq!(out.body["error"], "User message is required");
  }

  #[tokio::test]
  async fn chat_success_carries_context() {
    let state = with_api(stub_with_content("Add a sound to your opening line!").await);
    let out = chat(&state, "How is my start?", "The wind howled.", "narrative", None).await;
    assert_eq!(out.body["success"], true);
    assert_eq!(out.body["response"], "Add a sound to your opening line!");
    assert_eq!(out.body["context"]["writingStage"], "beginning");
    assert_eq!(out.body["context"]["wordCount"], 3);
  }

  #[tokio::test]
  async fn chat_offline_uses_keyword_replies() {
    let state = offline();
    let out = chat(&state, "How should I start?", "", "narrative", None).await;
    assert_eq!(out.body["success"], false);
    assert!(out.body["response"].as_str().unwrap().starts_with("Great question about openings!"));
    assert_eq!(out.body["context"]["writingStage"], "initial");

    let out = chat(&state, "Help with my opening", "The old lighthouse keeper climbed slowly.", "narrative", None).await;
    assert!(out.body["response"]
      .as_str()
      .unwrap()
      .starts_with("I can see you've started with \"The old lighthouse keeper clim...\""));
  }

  #[test]
  fn chat_fallback_vocabulary_names_the_weak_word() {
    let state = offline();
    let content = "The dog was big and it said hello.";
    let ctx = writing_context(content, "narrative", None);
    let reply = chat_fallback(&state, "Any better words?", &ctx, content);
    assert_eq!(
      reply,
      "I noticed you used \"said\" in your writing. Try replacing it with: exclaimed, declared, announced. Which one fits your story best?"
    );

    let plain = "Nothing weak here at all.";
    let ctx = writing_context(plain, "narrative", None);
    assert!(chat_fallback(&state, "vocabulary help", &ctx, plain).starts_with("For better vocabulary"));
  }

  #[test]
  fn chat_fallback_characters_and_endings() {
    let state = offline();
    let content = "Tom looked at Sarah. \"Run!\" he shouted.";
    let ctx = writing_context(content, "narrative", None);
    assert!(chat_fallback(&state, "My characters feel flat", &ctx, content).starts_with("I can see you have characters"));
    assert!(chat_fallback(&state, "What about people?", &ctx, "").starts_with("To create interesting characters"));

    let long = "word ".repeat(120);
    let ctx = writing_context(&long, "narrative", None);
    assert!(chat_fallback(&state, "How do I write the ending?", &ctx, &long).starts_with("For your ending"));
    let ctx = writing_context(content, "narrative", None);
    assert!(chat_fallback(&state, "conclusion tips", &ctx, content).starts_with("For a strong conclusion"));
  }

  #[test]
  fn chat_fallback_default_reports_stage() {
    let state = offline();
    let ctx = writing_context("It was a sunny day.", "narrative", Some(45));
    assert_eq!(
      chat_fallback(&state, "Is this okay?", &ctx, "It was a sunny day."),
      "I can see you're working on your developing stage with 45 words. That's great progress! What specific part would you like help with? 😊"
    );
    let ctx = writing_context("", "narrative", None);
    assert!(chat_fallback(&state, "Hello", &ctx, "").starts_with("I'm here to help with your writing!"));
  }

  #[tokio::test]
  async fn writing_structure_failure_serves_guide() {
    let out = writing_structure(&offline(), "persuasive").await;
    assert_eq!(out["success"], false);
    assert_eq!(out["title"], "NSW Selective persuasive Writing Guide");
    assert_eq!(out["sections"].as_array().unwrap().len(), 4);
    assert!(out["bandRequirements"]["band6"].as_str().unwrap().starts_with("Band 6"));
  }

  #[tokio::test]
  async fn writing_structure_success_passes_model_guide() {
    let state = with_api(stub_with_content(r#"{"title":"Narrative Guide","sections":[{"heading":"Plan","content":"Think first."}]}"#).await);
    let out = writing_structure(&state, "narrative").await;
    assert_eq!(out["success"], true);
    assert_eq!(out["sections"][0]["heading"], "Plan");
  }

  #[tokio::test]
  async fn text_type_vocabulary_failure_serves_general_words() {
    let out = text_type_vocabulary(&offline(), "discursive", "Some sample.").await;
    assert_eq!(out["success"], false);
    assert_eq!(out["textType"], "discursive");
    assert_eq!(out["categories"][0]["name"], "General Words");
    assert_eq!(out["transitionWords"].as_array().unwrap().len(), 8);
    assert_eq!(out["phrasesAndExpressions"][0], "In my opinion");
  }

  #[tokio::test]
  async fn text_type_vocabulary_success_passes_lists() {
    let state = with_api(
      stub_with_content(
        r#"{"textType":"persuasive","categories":[{"name":"Strong verbs","words":["insist"],"examples":[]}],"phrasesAndExpressions":["Clearly"],"transitionWords":["Furthermore"]}"#,
      )
      .await,
    );
    let out = text_type_vocabulary(&state, "persuasive", "Homework should go.").await;
    assert_eq!(out["success"], true);
    assert_eq!(out["transitionWords"][0], "Furthermore");
  }

  #[tokio::test]
  async fn missing_endpoint_is_rejected() {
    let out = dispatch(&offline(), EndpointRequest::default()).await;
    assert!(out.rejected);
    assert_eq!(out.body["success"], false);
  }

  #[test]
  fn check_connection_reflects_configuration() {
    assert_eq!(check_connection(&offline())["isConnected"], false);
  }
}
