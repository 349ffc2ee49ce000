//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Wire names are camelCase to match the editor frontend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::{ContentAnalysis, VocabularyMetrics};
use crate::domain::VocabularyWord;
use crate::lessons::Answer;
use crate::vocabulary::{RealTimeHighlight, Span, WordSuggestion};

/// Operations reachable through `POST /api/v1/nsw` and the WS `analyze` message.
/// `Chat` is also served at `POST /api/v1/chat`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Endpoint {
    EssayScore,
    GrammarSpellingCheck,
    TextTypeAnalysis,
    VocabularySophistication,
    CoachingTips,
    SentenceStructure,
    VocabularyEnhancement,
    CommonMistakes,
    Synonyms,
    Rephrase,
    GeneratePrompt,
    CoachTip,
    ProgressTracking,
    CheckConnection,
    Chat,
    WritingStructure,
    TextTypeVocabulary,
}

/// Body of a feedback request. Which fields matter depends on `endpoint`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EndpointRequest {
    pub endpoint: Option<Endpoint>,
    #[serde(default, alias = "text", alias = "currentContent")]
    pub content: String,
    #[serde(default)]
    pub text_type: Option<String>,
    #[serde(default)]
    pub current_score: Option<f64>,
    #[serde(default)]
    pub focus_area: Option<String>,
    #[serde(default)]
    pub word: Option<String>,
    #[serde(default)]
    pub sentence: Option<String>,
    #[serde(default)]
    pub paragraph: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub assessment_data: Option<Value>,
    #[serde(default)]
    pub user_message: Option<String>,
    #[serde(default)]
    pub word_count: Option<usize>,
    /// `low`, `medium` or `high`; essays default to `medium`.
    #[serde(default)]
    pub assistance_level: Option<String>,
    #[serde(default)]
    pub feedback_history: Vec<Value>,
}

fn enabled_by_default() -> bool {
    true
}

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    /// Editor content changed; analysis runs once the typing pauses.
    ContentUpdate {
        content: String,
        #[serde(default, rename = "textType")]
        text_type: Option<String>,
        #[serde(default = "enabled_by_default")]
        enabled: bool,
    },
    SelectedText {
        text: String,
    },
    /// Replace a highlighted word in the session's latest content.
    ApplySuggestion {
        position: Span,
        original: String,
        replacement: String,
    },
    Analyze(EndpointRequest),
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    VocabularyHighlights {
        highlights: Vec<RealTimeHighlight>,
    },
    WordSuggestions {
        suggestions: Vec<WordSuggestion>,
    },
    SelectionSuggestions {
        text: String,
        suggestions: Vec<String>,
    },
    ContentReplaced {
        content: String,
        highlights: Vec<RealTimeHighlight>,
    },
    AnalysisResult {
        endpoint: Option<Endpoint>,
        result: Value,
    },
    Error {
        message: String,
    },
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentIn {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub text_type: Option<String>,
}

#[derive(Serialize)]
pub struct HighlightsOut {
    pub highlights: Vec<RealTimeHighlight>,
}

#[derive(Serialize)]
pub struct SuggestionsOut {
    pub suggestions: Vec<WordSuggestion>,
}

#[derive(Deserialize)]
pub struct SelectionIn {
    pub text: String,
}
#[derive(Serialize)]
pub struct SelectionOut {
    pub suggestions: Vec<String>,
}

#[derive(Deserialize)]
pub struct ReplaceIn {
    pub content: String,
    pub position: Span,
    pub original: String,
    pub replacement: String,
}
#[derive(Serialize)]
pub struct ReplaceOut {
    pub content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureOut {
    pub analysis: ContentAnalysis,
    pub vocabulary_metrics: VocabularyMetrics,
    pub sophistication_score: f64,
}

#[derive(Deserialize)]
pub struct TransitionsIn {
    #[serde(default)]
    pub previous: String,
    #[serde(default)]
    pub current: String,
}
#[derive(Serialize)]
pub struct TransitionsOut {
    pub suggestions: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct WordsQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}
#[derive(Serialize)]
pub struct WordsOut {
    pub categories: Vec<String>,
    pub words: Vec<VocabularyWord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressIn {
    pub user_id: Option<String>,
    pub assessment_data: Option<Value>,
}

#[derive(Deserialize)]
pub struct GradeIn {
    #[serde(default)]
    pub answers: Vec<Answer>,
}

#[derive(Deserialize)]
pub struct ChecklistIn {
    #[serde(default)]
    pub checked: Vec<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftIn {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub text_type: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
}
#[derive(Serialize)]
pub struct DraftSaved {
    pub ok: bool,
    pub version: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthOut {
    pub ok: bool,
    pub ai_configured: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_names_are_camel_case() {
        let req: EndpointRequest =
            serde_json::from_str(r#"{"endpoint":"grammarSpellingCheck","text":"Hi there","textType":"narrative"}"#).unwrap();
        assert_eq!(req.endpoint, Some(Endpoint::GrammarSpellingCheck));
        assert_eq!(req.content, "Hi there");
        assert_eq!(req.text_type.as_deref(), Some("narrative"));
    }

    #[test]
    fn chat_body_reads_current_content() {
        let req: EndpointRequest = serde_json::from_str(
            r#"{"endpoint":"chat","userMessage":"Help me start","currentContent":"Once upon","wordCount":2}"#,
        )
        .unwrap();
        assert_eq!(req.endpoint, Some(Endpoint::Chat));
        assert_eq!(req.user_message.as_deref(), Some("Help me start"));
        assert_eq!(req.content, "Once upon");
        assert_eq!(req.word_count, Some(2));
        assert!(req.feedback_history.is_empty());
    }

    #[test]
    fn ws_messages_are_tagged_by_type() {
        let msg: ClientWsMessage =
            serde_json::from_str(r#"{"type":"content_update","content":"It was good."}"#).unwrap();
        assert!(matches!(msg, ClientWsMessage::ContentUpdate { enabled: true, text_type: None, .. }));

        let msg: ClientWsMessage =
            serde_json::from_str(r#"{"type":"analyze","endpoint":"coachTip","paragraph":"We ran."}"#).unwrap();
        assert!(matches!(msg, ClientWsMessage::Analyze(EndpointRequest { endpoint: Some(Endpoint::CoachTip), .. })));

        let out = serde_json::to_value(ServerWsMessage::SelectionSuggestions { text: "good".into(), suggestions: vec![] }).unwrap();
        assert_eq!(out["type"], "selection_suggestions");
    }
}
