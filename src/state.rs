//! Application state: in-memory stores, prompts, OpenAI client, vocabulary and lessons.
//!
//! This module owns:
//!   - the drafts store (by draft id)
//!   - per-user progress history
//!   - the prompts struct (from TOML or defaults)
//!   - the vocabulary engine and lesson catalogue (built-ins + config)
//!   - optional OpenAI client
//!
//! Nothing here is persisted; a restart clears drafts and history.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::config::{load_app_config_from_env, AppConfig, Prompts};
use crate::domain::Draft;
use crate::lessons::LessonCatalogue;
use crate::openai::OpenAI;
use crate::progress::ProgressSnapshot;
use crate::seeds::lesson_catalogue;
use crate::util::now_rfc3339;
use crate::vocabulary::VocabularyEngine;

/// Snapshots kept per user; older ones are dropped first.
const MAX_HISTORY: usize = 50;

#[derive(Clone)]
pub struct AppState {
    pub drafts: Arc<RwLock<HashMap<String, Draft>>>,
    pub progress: Arc<RwLock<HashMap<String, Vec<ProgressSnapshot>>>>,
    pub vocabulary: Arc<VocabularyEngine>,
    pub lessons: Arc<LessonCatalogue>,
    pub openai: Option<OpenAI>,
    pub prompts: Prompts,
}

impl AppState {
    /// Build state from env: load config, merge vocabulary and lessons, init OpenAI.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_app_config_from_env().unwrap_or_default();

        let openai = OpenAI::from_env();
        if let Some(oa) = &openai {
            info!(target: "selective_writing", base_url = %oa.base_url, fast_model = %oa.fast_model, strong_model = %oa.strong_model, "OpenAI enabled.");
        } else {
            info!(target: "selective_writing", "OpenAI disabled (no OPENAI_API_KEY). Using local feedback only.");
        }

        Self::from_parts(cfg, openai)
    }

    /// Assemble state from an explicit config and client.
    pub fn from_parts(cfg: AppConfig, openai: Option<OpenAI>) -> Self {
        let mut vocabulary = VocabularyEngine::with_defaults();
        vocabulary.extend(
            cfg.vocabulary
                .weak_words
                .into_iter()
                .map(|w| (w.word, w.synonyms))
                .collect(),
        );
        let lessons = LessonCatalogue::new(lesson_catalogue(), cfg.lessons);

        info!(
            target: "selective_writing",
            weak_words = vocabulary.weak_word_count(),
            lessons = lessons.len(),
            "Startup content inventory"
        );

        Self {
            drafts: Arc::new(RwLock::new(HashMap::new())),
            progress: Arc::new(RwLock::new(HashMap::new())),
            vocabulary: Arc::new(vocabulary),
            lessons: Arc::new(lessons),
            openai,
            prompts: cfg.prompts,
        }
    }

    /// Store a draft. Without an explicit version the stored one is bumped.
    #[instrument(level = "debug", skip(self, content), fields(%id, content_len = content.len()))]
    pub async fn save_draft(&self, id: &str, content: String, text_type: Option<String>, version: Option<u64>) -> u64 {
        let mut drafts = self.drafts.write().await;
        let version = version.unwrap_or_else(|| drafts.get(id).map_or(1, |d| d.version + 1));
        drafts.insert(
            id.to_string(),
            Draft { content, text_type, version, updated_at: now_rfc3339() },
        );
        version
    }

    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_draft(&self, id: &str) -> Option<Draft> {
        self.drafts.read().await.get(id).cloned()
    }

    /// Append a snapshot and return the user's full history, oldest first.
    #[instrument(level = "debug", skip(self, snapshot), fields(%user_id))]
    pub async fn record_progress(&self, user_id: &str, snapshot: ProgressSnapshot) -> Vec<ProgressSnapshot> {
        let mut all = self.progress.write().await;
        let history = all.entry(user_id.to_string()).or_default();
        history.push(snapshot);
        if history.len() > MAX_HISTORY {
            let excess = history.len() - MAX_HISTORY;
            history.drain(..excess);
        }
        history.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeakWordCfg;

    fn state() -> AppState {
        AppState::from_parts(AppConfig::default(), None)
    }

    #[tokio::test]
    async fn drafts_bump_versions_when_not_given() {
        let s = state();
        assert_eq!(s.save_draft("d1", "one".into(), None, None).await, 1);
        assert_eq!(s.save_draft("d1", "two".into(), Some("narrative".into()), None).await, 2);
        assert_eq!(s.save_draft("d1", "three".into(), None, Some(7)).await, 7);
        let d = s.get_draft("d1").await.unwrap();
        assert_eq!(d.content, "three");
        assert!(s.get_draft("missing").await.is_none());
    }

    #[tokio::test]
    async fn progress_history_is_per_user_and_capped() {
        let s = state();
        for i in 0..(MAX_HISTORY + 5) {
            let snap = ProgressSnapshot { timestamp: i.to_string(), total_score: i as f64, overall_band: 1 };
            s.record_progress("a", snap).await;
        }
        let snap = ProgressSnapshot { timestamp: "x".into(), total_score: 3.0, overall_band: 1 };
        let b = s.record_progress("b", snap).await;
        assert_eq!(b.len(), 1);

        let a = s.progress.read().await.get("a").cloned().unwrap();
        assert_eq!(a.len(), MAX_HISTORY);
        assert_eq!(a[0].timestamp, "5");
    }

    #[test]
    fn config_weak_words_reach_the_engine() {
        let mut cfg = AppConfig::default();
        cfg.vocabulary.weak_words.push(WeakWordCfg { word: "stuff".into(), synonyms: vec!["material".into()] });
        let s = AppState::from_parts(cfg, None);
        assert_eq!(s.vocabulary.suggestions_for_word("stuff"), vec!["material"]);
        assert_eq!(s.lessons.len(), 30);
    }
}
