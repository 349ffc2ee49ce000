//! Error types at the service seams.
//!
//! Feedback operations never bubble these to the client directly: they are
//! logged and folded into a `success: false` envelope by `logic`.

use thiserror::Error;

/// Failures while talking to the chat-completions API.
#[derive(Debug, Error)]
pub enum LlmError {
  /// No API key in the environment.
  #[error("AI service is not configured")]
  NotConfigured,

  /// Request never produced a response (DNS, connect, timeout, TLS).
  #[error("transport error: {0}")]
  Transport(String),

  /// Non-2xx status; `message` is the OpenAI error message when present.
  #[error("OpenAI HTTP {status}: {message}")]
  Http { status: u16, message: String },

  #[error("empty response from model")]
  EmptyResponse,

  /// Model answered but the text is not the JSON we asked for.
  #[error("JSON parse error: {0}")]
  InvalidJson(String),

  /// JSON parsed but a required field is missing or has the wrong type.
  #[error("invalid response format: {0}")]
  InvalidShape(String),
}

impl LlmError {
  /// True when the model answered but its payload was unusable.
  pub fn is_parse_failure(&self) -> bool {
    matches!(self, Self::EmptyResponse | Self::InvalidJson(_) | Self::InvalidShape(_))
  }
}

impl From<reqwest::Error> for LlmError {
  fn from(e: reqwest::Error) -> Self {
    Self::Transport(e.to_string())
  }
}

/// Failures of the local vocabulary engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VocabularyError {
  #[error("span {start}..{end} is outside the content ({len} characters)")]
  SpanOutOfRange { start: usize, end: usize, len: usize },

  #[error("replacement word must not be empty")]
  EmptyReplacement,

  /// The content changed since the span was computed.
  #[error("expected '{expected}' at the span but found '{found}'")]
  StaleSpan { expected: String, found: String },
}

/// Failures while loading the optional TOML configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file '{path}': {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config file '{path}': {source}")]
  Parse {
    path: String,
    #[source]
    source: toml::de::Error,
  },
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_failures_are_distinguished_from_call_failures() {
    assert!(LlmError::InvalidJson("x".into()).is_parse_failure());
    assert!(LlmError::InvalidShape("errors".into()).is_parse_failure());
    assert!(LlmError::EmptyResponse.is_parse_failure());
    assert!(!LlmError::Transport("refused".into()).is_parse_failure());
    assert!(!LlmError::Http { status: 500, message: "boom".into() }.is_parse_failure());
    assert!(!LlmError::NotConfigured.is_parse_failure());
  }

  #[test]
  fn display_messages_carry_details() {
    let e = LlmError::Http { status: 429, message: "Rate limit".into() };
    assert_eq!(e.to_string(), "OpenAI HTTP 429: Rate limit");

    let v = VocabularyError::SpanOutOfRange { start: 4, end: 20, len: 10 };
    assert!(v.to_string().contains("4..20"));
  }
}
