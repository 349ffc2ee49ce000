//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs payload sizes and basic result info.

use std::sync::Arc;
use axum::{
  body::Bytes,
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::analysis::{analyze_content_structure, vocabulary_metrics};
use crate::lessons::{checklist_progress, grade_activity};
use crate::logic::{dispatch, failure, progress_tracking, Envelope};
use crate::protocol::*;
use crate::state::AppState;
use crate::vocabulary::apply_replacement;

impl IntoResponse for Envelope {
  fn into_response(self) -> Response {
    let status = if self.rejected { StatusCode::BAD_REQUEST } else { StatusCode::OK };
    (status, Json(self.body)).into_response()
  }
}

fn error_response(status: StatusCode, error: &str) -> Response {
  (status, Json(failure(error, error, json!({})))).into_response()
}

/// Decode a raw JSON body so malformed requests still get an envelope,
/// whatever the content type.
fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, Response> {
  serde_json::from_slice(body).map_err(|e| {
    warn!(target: "selective_writing", error = %e, "Rejected malformed request body");
    error_response(StatusCode::BAD_REQUEST, &format!("Invalid request: {e}"))
  })
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, ai_configured: state.openai.is_some() })
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_nsw(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
  let req: EndpointRequest = match decode(&body) {
    Ok(r) => r,
    Err(resp) => return resp,
  };
  let endpoint = req.endpoint;
  let out = dispatch(&state, req).await;
  info!(target: "feedback", ?endpoint, success = ?out.body.get("success"), rejected = out.rejected, "HTTP feedback served");
  out.into_response()
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_progress(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
  let req: ProgressIn = match decode(&body) {
    Ok(r) => r,
    Err(resp) => return resp,
  };
  progress_tracking(&state, req.user_id.as_deref(), req.assessment_data.as_ref())
    .await
    .into_response()
}

#[instrument(level = "info", skip(state, body), fields(body_len = body.len()))]
pub async fn http_post_chat(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
  let mut req: EndpointRequest = match decode(&body) {
    Ok(r) => r,
    Err(resp) => return resp,
  };
  req.endpoint = Some(Endpoint::Chat);
  let out = dispatch(&state, req).await;
  info!(target: "feedback", success = ?out.body.get("success"), rejected = out.rejected, "HTTP chat served");
  out.into_response()
}

#[instrument(level = "info", skip(state, body), fields(content_len = body.content.len()))]
pub async fn http_post_structure(State(state): State<Arc<AppState>>, Json(body): Json<ContentIn>) -> impl IntoResponse {
  Json(StructureOut {
    analysis: analyze_content_structure(&body.content),
    vocabulary_metrics: vocabulary_metrics(&body.content),
    sophistication_score: state.vocabulary.sophistication_score(&body.content),
  })
}

#[instrument(level = "info", skip(state, body), fields(content_len = body.content.len()))]
pub async fn http_post_highlights(State(state): State<Arc<AppState>>, Json(body): Json<ContentIn>) -> impl IntoResponse {
  let highlights = state.vocabulary.highlights(&body.content);
  info!(target: "vocabulary", count = highlights.len(), "HTTP highlights computed");
  Json(HighlightsOut { highlights })
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len()))]
pub async fn http_post_selection(State(state): State<Arc<AppState>>, Json(body): Json<SelectionIn>) -> impl IntoResponse {
  Json(SelectionOut { suggestions: state.vocabulary.selection_suggestions(&body.text) })
}

#[instrument(level = "info", skip(state, body), fields(content_len = body.content.len()))]
pub async fn http_post_suggestions(State(state): State<Arc<AppState>>, Json(body): Json<ContentIn>) -> impl IntoResponse {
  let text_type = body.text_type.as_deref().unwrap_or("narrative");
  let suggestions = state.vocabulary.improvement_suggestions(&body.content, text_type);
  info!(target: "vocabulary", count = suggestions.len(), %text_type, "HTTP improvement suggestions computed");
  Json(SuggestionsOut { suggestions })
}

#[instrument(level = "info", skip(body), fields(content_len = body.content.len(), start = body.position.start, end = body.position.end))]
pub async fn http_post_replace(Json(body): Json<ReplaceIn>) -> Response {
  match apply_replacement(&body.content, body.position, &body.original, &body.replacement) {
    Ok(content) => Json(ReplaceOut { content }).into_response(),
    Err(e) => {
      warn!(target: "vocabulary", error = %e, "Replacement rejected");
      error_response(StatusCode::BAD_REQUEST, &e.to_string())
    }
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_words(State(state): State<Arc<AppState>>, Query(q): Query<WordsQuery>) -> impl IntoResponse {
  let words = state
    .vocabulary
    .search_words(q.category.as_deref().unwrap_or("all"), q.q.as_deref().unwrap_or(""));
  let categories = state.vocabulary.categories().iter().map(|c| c.category.clone()).collect();
  Json(WordsOut { categories, words })
}

#[instrument(level = "info", skip(state, body), fields(current_len = body.current.len()))]
pub async fn http_post_transitions(State(state): State<Arc<AppState>>, Json(body): Json<TransitionsIn>) -> impl IntoResponse {
  Json(TransitionsOut { suggestions: state.vocabulary.suggest_transitions(&body.previous, &body.current) })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_lessons(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.lessons.summaries())
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_lesson(State(state): State<Arc<AppState>>, Path(day): Path<u32>) -> Response {
  match state.lessons.get(day) {
    Some(lesson) => Json(lesson).into_response(),
    None => error_response(StatusCode::NOT_FOUND, "Lesson not found"),
  }
}

#[instrument(level = "info", skip(state, body), fields(answers = body.answers.len()))]
pub async fn http_post_grade(
  State(state): State<Arc<AppState>>,
  Path((day, activity_id)): Path<(u32, String)>,
  Json(body): Json<GradeIn>,
) -> Response {
  let Some(activity) = state.lessons.activity(day, &activity_id) else {
    return error_response(StatusCode::NOT_FOUND, "Activity not found");
  };
  let report = grade_activity(activity, &body.answers);
  info!(target: "lessons", day, %activity_id, correct = report.correct, graded = report.graded, "Activity graded");
  Json(report).into_response()
}

#[instrument(level = "info", skip(state, body), fields(checked = body.checked.len()))]
pub async fn http_post_checklist(
  State(state): State<Arc<AppState>>,
  Path(day): Path<u32>,
  Json(body): Json<ChecklistIn>,
) -> Response {
  match state.lessons.get(day) {
    Some(lesson) => Json(checklist_progress(lesson, &body.checked)).into_response(),
    None => error_response(StatusCode::NOT_FOUND, "Lesson not found"),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_draft(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> impl IntoResponse {
  Json(state.get_draft(&id).await)
}

#[instrument(level = "info", skip(state, body), fields(content_len = body.content.len()))]
pub async fn http_put_draft(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<DraftIn>,
) -> impl IntoResponse {
  let version = state.save_draft(&id, body.content, body.text_type, body.version).await;
  info!(target: "selective_writing", %id, version, "Draft saved");
  Json(DraftSaved { ok: true, version })
}
