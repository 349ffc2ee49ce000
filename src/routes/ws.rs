//! WebSocket upgrade + session loop. Each session tracks the editor content and
//! runs debounced vocabulary analysis; debounced results and direct replies
//! share one outbound channel.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use crate::debounce::{Debouncer, HIGHLIGHT_DELAY, SUGGESTION_DELAY};
use crate::logic::dispatch;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;
use crate::vocabulary::apply_replacement;

const OUTBOUND_CAPACITY: usize = 32;

/// Per-connection editor state.
struct Session {
  content: String,
  text_type: String,
  highlights: Debouncer,
  suggestions: Debouncer,
  tx: mpsc::Sender<ServerWsMessage>,
}

impl Session {
  fn new(tx: mpsc::Sender<ServerWsMessage>) -> Self {
    Self {
      content: String::new(),
      text_type: "narrative".into(),
      highlights: Debouncer::new(HIGHLIGHT_DELAY),
      suggestions: Debouncer::new(SUGGESTION_DELAY),
      tx,
    }
  }

  /// Restart both analysis timers against the latest content.
  fn schedule_analysis(&mut self, state: &AppState) {
    let (vocab, tx, content) = (state.vocabulary.clone(), self.tx.clone(), self.content.clone());
    self.highlights.schedule(async move {
      let highlights = vocab.highlights(&content);
      debug!(target: "vocabulary", count = highlights.len(), "Debounced highlights ready");
      let _ = tx.send(ServerWsMessage::VocabularyHighlights { highlights }).await;
    });

    let (vocab, tx, content, text_type) =
      (state.vocabulary.clone(), self.tx.clone(), self.content.clone(), self.text_type.clone());
    self.suggestions.schedule(async move {
      let suggestions = vocab.improvement_suggestions(&content, &text_type);
      debug!(target: "vocabulary", count = suggestions.len(), "Debounced suggestions ready");
      let _ = tx.send(ServerWsMessage::WordSuggestions { suggestions }).await;
    });
  }
}

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "selective_writing", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "selective_writing", "WebSocket connected");
  let (tx, mut rx) = mpsc::channel(OUTBOUND_CAPACITY);
  let mut session = Session::new(tx);

  loop {
    let outgoing = tokio::select! {
      incoming = socket.recv() => match incoming {
        Some(Ok(Message::Text(txt))) => match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(msg) => handle_client_ws(msg, &mut session, &state).await,
          Err(e) => Some(ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }),
        },
        Some(Ok(Message::Ping(payload))) => {
          let _ = socket.send(Message::Pong(payload)).await;
          None
        }
        Some(Ok(Message::Close(_))) | None => break,
        Some(Ok(_)) => None,
        Some(Err(e)) => {
          warn!(target: "selective_writing", error = %e, "WS receive error");
          break;
        }
      },
      Some(msg) = rx.recv() => Some(msg),
    };

    let Some(reply) = outgoing else { continue };
    let out = serde_json::to_string(&reply).unwrap_or_else(|e| {
      serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
    });
    if let Err(e) = socket.send(Message::Text(out)).await {
      error!(target: "selective_writing", error = %e, "WS send error");
      break;
    }
  }
  info!(target: "selective_writing", "WebSocket disconnected");
}

/// Handle one client message; debounced work replies later through the channel.
#[instrument(level = "info", skip(msg, session, state))]
async fn handle_client_ws(msg: ClientWsMessage, session: &mut Session, state: &AppState) -> Option<ServerWsMessage> {
  match msg {
    ClientWsMessage::Ping => Some(ServerWsMessage::Pong),

    ClientWsMessage::ContentUpdate { content, text_type, enabled } => {
      debug!(target: "vocabulary", content_len = content.len(), enabled, "WS content_update");
      session.content = content;
      if let Some(t) = text_type.filter(|t| !t.trim().is_empty()) {
        session.text_type = t;
      }
      if enabled {
        session.schedule_analysis(state);
        None
      } else {
        session.highlights.cancel();
        session.suggestions.cancel();
        Some(ServerWsMessage::VocabularyHighlights { highlights: Vec::new() })
      }
    }

    ClientWsMessage::SelectedText { text } => {
      let suggestions = state.vocabulary.selection_suggestions(&text);
      info!(target: "vocabulary", text_len = text.len(), count = suggestions.len(), "WS selection suggestions served");
      Some(ServerWsMessage::SelectionSuggestions { text, suggestions })
    }

    ClientWsMessage::ApplySuggestion { position, original, replacement } => {
      match apply_replacement(&session.content, position, &original, &replacement) {
        Ok(content) => {
          session.content = content;
          let highlights = state.vocabulary.highlights(&session.content);
          session.schedule_analysis(state);
          info!(target: "vocabulary", start = position.start, end = position.end, "WS suggestion applied");
          Some(ServerWsMessage::ContentReplaced { content: session.content.clone(), highlights })
        }
        Err(e) => {
          warn!(target: "vocabulary", error = %e, "WS replacement rejected");
          Some(ServerWsMessage::Error { message: e.to_string() })
        }
      }
    }

    ClientWsMessage::Analyze(mut req) => {
      if req.content.is_empty() {
        req.content = session.content.clone();
      }
      if req.text_type.is_none() {
        req.text_type = Some(session.text_type.clone());
      }
      let endpoint = req.endpoint;
      let out = dispatch(state, req).await;
      Some(ServerWsMessage::AnalysisResult { endpoint, result: out.body })
    }
  }
}
