//! Minimal OpenAI client for our use-cases.
//!
//! We only call chat.completions and request either plain text or a strict JSON object.
//! Calls are instrumented and log model names, latencies, and response sizes.
//! Unparseable replies are previewed (truncated) at debug level.
//!
//! NOTE: We never log the API key or the student's writing.

use std::time::{Duration, Instant};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info, instrument};

use crate::analysis::{ContentAnalysis, VocabularyMetrics, WritingContext};
use crate::config::Prompts;
use crate::domain::TextType;
use crate::error::LlmError;
use crate::util::{fill_template, trunc_for_log};

pub type JsonObject = Map<String, Value>;

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub fast_model: String,
  pub strong_model: String,
}

/// One chat call's knobs.
struct CallSpec<'a> {
  model: &'a str,
  temperature: f32,
  max_tokens: u32,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY (or the frontend's
  /// VITE_OPENAI_API_KEY); otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY")
      .or_else(|_| std::env::var("VITE_OPENAI_API_KEY"))
      .ok()
      .filter(|k| !k.trim().is_empty())?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let mut client = Self::new(api_key, base_url)
      .map_err(|e| error!(target: "selective_writing", error = %e, "Failed to build HTTP client"))
      .ok()?;
    if let Ok(m) = std::env::var("OPENAI_FAST_MODEL") {
      client.fast_model = m;
    }
    if let Ok(m) = std::env::var("OPENAI_STRONG_MODEL") {
      client.strong_model = m;
    }
    Some(client)
  }

  pub fn new(api_key: String, base_url: String) -> Result<Self, LlmError> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()?;
    Ok(Self {
      client,
      api_key,
      base_url: base_url.trim_end_matches('/').to_string(),
      fast_model: "gpt-4o-mini".into(),
      strong_model: "gpt-4o".into(),
    })
  }

  #[instrument(
    level = "info",
    skip(self, system, user, call),
    fields(model = %call.model, json = json_mode, request_id = %uuid::Uuid::new_v4())
  )]
  async fn complete(&self, call: CallSpec<'_>, system: &str, user: &str, json_mode: bool) -> Result<String, LlmError> {
    let url = format!("{}/chat/completions", self.base_url);
    let mut messages = vec![ChatMessageReq { role: "system".into(), content: system.into() }];
    if !user.is_empty() {
      messages.push(ChatMessageReq { role: "user".into(), content: user.into() });
    }
    let req = ChatCompletionRequest {
      model: call.model.to_string(),
      messages,
      temperature: call.temperature,
      response_format: json_mode.then(|| ResponseFormat { r#type: "json_object".into() }),
      max_tokens: Some(call.max_tokens),
    };

    let started = Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, "selective-writing-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or(body);
      error!(status, elapsed = ?started.elapsed(), "OpenAI call failed");
      return Err(LlmError::Http { status, message });
    }

    let body: ChatCompletionResponse = res.json().await?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = body.choices.into_iter().next()
      .and_then(|c| c.message.content)
      .unwrap_or_default().trim().to_string();
    info!(elapsed = ?started.elapsed(), response_len = text.len(), "Model response received");
    Ok(text)
  }

  /// Plain-text chat completion.
  async fn chat_plain(&self, call: CallSpec<'_>, system: &str, user: &str) -> Result<String, LlmError> {
    let text = self.complete(call, system, user, false).await?;
    if text.is_empty() {
      return Err(LlmError::EmptyResponse);
    }
    Ok(text)
  }

  /// JSON-object chat completion; the reply must parse to a JSON object.
  async fn chat_json(&self, call: CallSpec<'_>, system: &str, user: &str) -> Result<JsonObject, LlmError> {
    let text = self.complete(call, system, user, true).await?;
    if text.is_empty() {
      return Err(LlmError::EmptyResponse);
    }
    let parsed = serde_json::from_str::<Value>(&text).map_err(|e| {
      debug!(reply_preview = %trunc_for_log(&text, 200), "Model reply is not JSON");
      LlmError::InvalidJson(e.to_string())
    })?;
    match parsed {
      Value::Object(map) => Ok(map),
      _ => Err(LlmError::InvalidShape("expected a JSON object".into())),
    }
  }

  fn strong(&self, temperature: f32, max_tokens: u32) -> CallSpec<'_> {
    CallSpec { model: &self.strong_model, temperature, max_tokens }
  }

  fn fast(&self, temperature: f32, max_tokens: u32) -> CallSpec<'_> {
    CallSpec { model: &self.fast_model, temperature, max_tokens }
  }

  // --- High-level helpers (domain-specialized) ---

  #[instrument(level = "info", skip(self, prompts, content, analysis), fields(content_len = content.len(), %text_type))]
  pub async fn essay_feedback(
    &self,
    prompts: &Prompts,
    content: &str,
    text_type: &str,
    analysis: &ContentAnalysis,
    assistance_level: &str,
    feedback_history: &[Value],
  ) -> Result<JsonObject, LlmError> {
    let avg = format!("{}", analysis.average_sentence_length.round());
    let (words, sentences, paragraphs) = counts(analysis);
    let characters = join_or(&analysis.potential_characters, "None identified");
    let descriptive = join_or(&analysis.descriptive_words.iter().take(5).cloned().collect::<Vec<_>>(), "Limited");
    let user = fill_template(
      &prompts.essay_score_user_template,
      &[
        ("text_type", text_type),
        ("word_count", &words),
        ("sentence_count", &sentences),
        ("paragraph_count", &paragraphs),
        ("average_sentence_length", &avg),
        ("has_dialogue", if analysis.has_dialogue { "true" } else { "false" }),
        ("potential_characters", &characters),
        ("descriptive_words", &descriptive),
        ("assistance_level", assistance_level),
        ("feedback_history", &recent_history(feedback_history)),
        ("content", content),
      ],
    );
    self.chat_json(self.strong(0.3, 2500), &prompts.essay_score_system, &user).await
  }

  /// Raw `errors` entries; the caller filters them against the text.
  #[instrument(level = "info", skip(self, prompts, text), fields(text_len = text.len()))]
  pub async fn grammar_check(&self, prompts: &Prompts, text: &str) -> Result<Vec<Value>, LlmError> {
    let user = fill_template(&prompts.grammar_check_user_template, &[("content", text)]);
    let mut obj = self.chat_json(self.strong(0.2, 1500), &prompts.grammar_check_system, &user).await?;
    take_array(&mut obj, "errors")
  }

  #[instrument(level = "info", skip(self, prompts, content, analysis), fields(content_len = content.len(), %text_type))]
  pub async fn text_type_analysis(&self, prompts: &Prompts, content: &str, text_type: &str, analysis: &ContentAnalysis) -> Result<JsonObject, LlmError> {
    let (words, sentences, paragraphs) = counts(analysis);
    let characters = join_or(&analysis.potential_characters, "None identified");
    let upper = text_type.to_uppercase();
    let requirements = TextType::requirements(TextType::from_label(text_type));
    let user = fill_template(
      &prompts.text_type_user_template,
      &[
        ("text_type_upper", &upper),
        ("text_type", text_type),
        ("word_count", &words),
        ("sentence_count", &sentences),
        ("paragraph_count", &paragraphs),
        ("has_dialogue", if analysis.has_dialogue { "true" } else { "false" }),
        ("potential_characters", &characters),
        ("requirements", requirements),
        ("content", content),
      ],
    );
    self.chat_json(self.strong(0.3, 2000), &prompts.text_type_system, &user).await
  }

  #[instrument(level = "info", skip(self, prompts, content, metrics), fields(content_len = content.len()))]
  pub async fn vocabulary_sophistication(&self, prompts: &Prompts, content: &str, metrics: &VocabularyMetrics) -> Result<JsonObject, LlmError> {
    let total = metrics.total_words.to_string();
    let unique = metrics.unique_words.to_string();
    let ratio = format!("{:.1}", metrics.diversity_ratio);
    let long = metrics.long_words.to_string();
    let academic = metrics.academic_words.to_string();
    let user = fill_template(
      &prompts.vocabulary_user_template,
      &[
        ("total_words", &total),
        ("unique_words", &unique),
        ("diversity_ratio", &ratio),
        ("long_words", &long),
        ("academic_words", &academic),
        ("content", content),
      ],
    );
    self.chat_json(self.strong(0.3, 2000), &prompts.vocabulary_system, &user).await
  }

  #[instrument(level = "info", skip(self, prompts, content, analysis), fields(content_len = content.len(), %text_type, %focus_area))]
  pub async fn coaching_tips(
    &self,
    prompts: &Prompts,
    content: &str,
    text_type: &str,
    current_score: f64,
    focus_area: &str,
    analysis: &ContentAnalysis,
  ) -> Result<JsonObject, LlmError> {
    let (words, sentences, _) = counts(analysis);
    let score = current_score.to_string();
    let user = fill_template(
      &prompts.coaching_user_template,
      &[
        ("text_type", text_type),
        ("current_score", &score),
        ("focus_area", focus_area),
        ("word_count", &words),
        ("sentence_count", &sentences),
        ("content", content),
      ],
    );
    self.chat_json(self.strong(0.4, 2000), &prompts.coaching_system, &user).await
  }

  #[instrument(level = "info", skip(self, prompts, content), fields(content_len = content.len()))]
  pub async fn sentence_structure(&self, prompts: &Prompts, content: &str) -> Result<JsonObject, LlmError> {
    let obj = self.chat_json(self.fast(0.2, 1000), &prompts.sentence_structure_system, content).await?;
    require_array(obj, "analysis")
  }

  #[instrument(level = "info", skip(self, prompts, content), fields(content_len = content.len()))]
  pub async fn vocabulary_enhancement(&self, prompts: &Prompts, content: &str) -> Result<JsonObject, LlmError> {
    let obj = self.chat_json(self.fast(0.2, 1000), &prompts.vocabulary_enhancement_system, content).await?;
    require_array(obj, "suggestions")
  }

  #[instrument(level = "info", skip(self, prompts, content), fields(content_len = content.len(), %text_type))]
  pub async fn common_mistakes(&self, prompts: &Prompts, content: &str, text_type: &str) -> Result<JsonObject, LlmError> {
    let system = fill_template(&prompts.common_mistakes_system, &[("text_type", text_type)]);
    let obj = self.chat_json(self.fast(0.7, 1000), &system, content).await?;
    if !obj.get("overallAssessment").is_some_and(|v| v.as_str().is_some_and(|s| !s.is_empty())) {
      return Err(LlmError::InvalidShape("overallAssessment".into()));
    }
    require_array(obj, "mistakesIdentified")
  }

  #[instrument(level = "info", skip(self, prompts), fields(%word))]
  pub async fn synonyms(&self, prompts: &Prompts, word: &str) -> Result<Vec<String>, LlmError> {
    let system = fill_template(&prompts.synonyms_system, &[("word", word)]);
    let text = self.chat_plain(self.fast(0.7, 50), &system, "").await?;
    let list: Vec<String> = text
      .split(',')
      .map(|s| s.trim().trim_end_matches('.').to_string())
      .filter(|s| !s.is_empty())
      .collect();
    if list.is_empty() {
      return Err(LlmError::EmptyResponse);
    }
    Ok(list)
  }

  #[instrument(level = "info", skip(self, prompts, sentence), fields(sentence_len = sentence.len()))]
  pub async fn rephrase(&self, prompts: &Prompts, sentence: &str) -> Result<String, LlmError> {
    let system = fill_template(&prompts.rephrase_system, &[("sentence", sentence)]);
    self.chat_plain(self.fast(0.7, 100), &system, "").await
  }

  #[instrument(level = "info", skip(self, prompts), fields(%text_type))]
  pub async fn generate_prompt(&self, prompts: &Prompts, text_type: &str) -> Result<String, LlmError> {
    let system = fill_template(&prompts.generate_prompt_system, &[("text_type", text_type)]);
    self.chat_plain(self.fast(0.7, 100), &system, "").await
  }

  #[instrument(level = "info", skip(self, prompts, paragraph), fields(paragraph_len = paragraph.len()))]
  pub async fn coach_tip(&self, prompts: &Prompts, paragraph: &str) -> Result<JsonObject, LlmError> {
    let user = fill_template(&prompts.coach_tip_user_template, &[("paragraph", paragraph)]);
    let obj = self
      .chat_json(self.fast(0.2, 300), "Respond ONLY with strict JSON.", &user)
      .await?;
    if !obj.get("tip").is_some_and(Value::is_string) {
      return Err(LlmError::InvalidShape("tip".into()));
    }
    Ok(obj)
  }

  /// Conversational coaching reply grounded in the student's current draft.
  #[instrument(level = "info", skip(self, prompts, message, content, context), fields(message_len = message.len(), content_len = content.len()))]
  pub async fn chat(
    &self,
    prompts: &Prompts,
    message: &str,
    content: &str,
    text_type: &str,
    context: &WritingContext,
  ) -> Result<String, LlmError> {
    let word_count = context.word_count.to_string();
    let elements = join_or(&context.structure_elements, "None yet");
    let issues = join_or(&context.specific_issues, "None identified");
    let strengths = join_or(&context.strengths, "Getting started");
    let system = fill_template(
      &prompts.chat_system,
      &[
        ("text_type", text_type),
        ("writing_stage", context.writing_stage),
        ("word_count", &word_count),
        ("has_dialogue", yes_no(context.has_dialogue)),
        ("has_description", yes_no(context.has_description)),
        ("has_characters", yes_no(context.has_characters)),
        ("has_conflict", yes_no(context.has_conflict)),
        ("vocabulary_level", context.vocabulary_level),
        ("sentence_variety", context.sentence_variety),
        ("structure_elements", &elements),
        ("strengths", &strengths),
        ("specific_issues", &issues),
      ],
    );
    let shown = if content.trim().is_empty() { "[No content written yet]" } else { content };
    let user = fill_template(
      &prompts.chat_user_template,
      &[
        ("stage_guidance", stage_guidance(context.writing_stage)),
        ("specific_issues", &issues),
        ("strengths", &strengths),
        ("message", message),
        ("content", shown),
      ],
    );
    self.chat_plain(self.fast(0.7, 250), &system, &user).await
  }

  #[instrument(level = "info", skip(self, prompts))]
  pub async fn writing_structure(&self, prompts: &Prompts, text_type: &str) -> Result<JsonObject, LlmError> {
    let system = fill_template(&prompts.writing_structure_system, &[("text_type", text_type)]);
    let user = format!("Create a writing structure guide for {text_type} writing.");
    let obj = self.chat_json(self.strong(0.7, 1000), &system, &user).await?;
    if !obj.get("title").is_some_and(Value::is_string) {
      return Err(LlmError::InvalidShape("title".into()));
    }
    require_array(obj, "sections")
  }

  #[instrument(level = "info", skip(self, prompts, content_sample), fields(sample_len = content_sample.len()))]
  pub async fn text_type_vocabulary(&self, prompts: &Prompts, text_type: &str, content_sample: &str) -> Result<JsonObject, LlmError> {
    let system = fill_template(&prompts.text_type_vocabulary_system, &[("text_type", text_type)]);
    let user = fill_template(
      &prompts.text_type_vocabulary_user_template,
      &[("text_type", text_type), ("content", content_sample)],
    );
    let obj = self.chat_json(self.strong(0.7, 1000), &system, &user).await?;
    if !obj.get("textType").is_some_and(Value::is_string) {
      return Err(LlmError::InvalidShape("textType".into()));
    }
    let obj = require_array(obj, "categories")?;
    let obj = require_array(obj, "phrasesAndExpressions")?;
    require_array(obj, "transitionWords")
  }
}

fn yes_no(flag: bool) -> &'static str {
  if flag { "Yes" } else { "No" }
}

fn stage_guidance(stage: &str) -> &'static str {
  match stage {
    "initial" => "- The student hasn't started writing yet. Help them begin with an engaging opening.",
    "beginning" => "- The student is just starting. Focus on building their opening and introducing key elements.",
    "developing" => "- The student is developing their ideas. Help them add details and build their story.",
    "expanding" => "- The student has a good foundation. Help them add complexity and improve their writing.",
    _ => "- The student has substantial content. Focus on refinement and polishing their work.",
  }
}

/// The five most recent feedback entries, compact JSON, for the essay prompt.
fn recent_history(history: &[Value]) -> String {
  if history.is_empty() {
    return "None".into();
  }
  let recent = &history[history.len().saturating_sub(5)..];
  serde_json::to_string(recent).unwrap_or_else(|_| "None".into())
}

fn counts(a: &ContentAnalysis) -> (String, String, String) {
  (a.word_count.to_string(), a.sentence_count.to_string(), a.paragraph_count.to_string())
}

fn join_or<S: AsRef<str>>(items: &[S], empty: &str) -> String {
  if items.is_empty() {
    empty.to_string()
  } else {
    items.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ")
  }
}

fn require_array(obj: JsonObject, key: &str) -> Result<JsonObject, LlmError> {
  if obj.get(key).is_some_and(Value::is_array) {
    Ok(obj)
  } else {
    Err(LlmError::InvalidShape(format!("{key} is not an array")))
  }
}

fn take_array(obj: &mut JsonObject, key: &str) -> Result<Vec<Value>, LlmError> {
  match obj.remove(key) {
    Some(Value::Array(items)) => Ok(items),
    _ => Err(LlmError::InvalidShape(format!("{key} is not an array"))),
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
pub(crate) mod test_support {
  //! A local stand-in for the chat-completions endpoint.

  use axum::{http::StatusCode, routing::post, Json, Router};
  use serde_json::{json, Value};

  /// Serve every completion with `content` as the assistant message.
  pub async fn stub_with_content(content: &'static str) -> String {
    let app = Router::new().route(
      "/chat/completions",
      post(move |Json(_req): Json<Value>| async move {
        Json(json!({
          "choices": [{"message": {"role": "assistant", "content": content}}],
          "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }))
      }),
    );
    serve(app).await
  }

  pub async fn stub_with_status(status: StatusCode, body: &'static str) -> String {
    let app = Router::new().route("/chat/completions", post(move || async move { (status, body) }));
    serve(app).await
  }

  async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
  }

  /// Nothing listens here, so every call is a transport failure.
  pub const UNREACHABLE: &str = "http://127.0.0.1:9";
}
