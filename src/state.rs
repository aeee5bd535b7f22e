//! Application state: the loaded record store, config, classifier client,
//! user favorites and HTTP quiz sessions.
//!
//! The store is read-only once built. Quiz sessions are the only mutable
//! quiz state; each resolved round schedules a delayed advance whose abort
//! handle lives next to the session, so deleting or replacing the session
//! cancels it. Sessions idle for longer than `[quiz] session_ttl_secs` are
//! swept on each new session and by a periodic background task.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::classifier::Classifier;
use crate::config::{load_app_config_from_env, AppConfig};
use crate::error::QuizError;
use crate::provider::{DatasetProvider, DatasetSource};
use crate::quiz::{QuizSession, SubmitOutcome};
use crate::session::UserSessions;
use crate::store::RecordStore;

pub struct QuizEntry {
    pub session: QuizSession,
    pending_advance: Option<AbortHandle>,
    touched: Instant,
}

impl QuizEntry {
    fn new(session: QuizSession) -> Self {
        Self { session, pending_advance: None, touched: Instant::now() }
    }

    fn touch(&mut self) {
        self.touched = Instant::now();
    }

    fn cancel_pending(&mut self) {
        if let Some(h) = self.pending_advance.take() {
            h.abort();
        }
    }
}

pub struct AppState {
    pub store: Arc<RecordStore>,
    pub config: AppConfig,
    pub classifier: Option<Classifier>,
    pub users: UserSessions,
    pub quizzes: RwLock<HashMap<String, QuizEntry>>,
}

impl AppState {
    /// Build state from env: load config, fetch the dataset, init the classifier client.
    #[instrument(level = "info", skip_all)]
    pub async fn from_env() -> Self {
        let config = load_app_config_from_env().unwrap_or_default();

        let source = DatasetSource::from_env();
        info!(target: "dataset", ?source, "Loading dataset");
        let store = DatasetProvider::new(source, config.provider.clone())
            .load_store()
            .await;

        let classifier = Classifier::from_env(&config.classifier);
        if let Some(c) = &classifier {
            info!(target: "biotrack_backend", url = %c.url, timeout_secs = c.timeout.as_secs(), "Image classifier enabled.");
        } else {
            info!(target: "biotrack_backend", "Image classifier disabled (no CLASSIFIER_URL).");
        }

        Self::new(store, config, classifier)
    }

    pub fn new(store: RecordStore, config: AppConfig, classifier: Option<Classifier>) -> Self {
        if store.is_empty() {
            warn!(target: "dataset", "Record store is empty; quiz and stats will be degenerate");
        }
        Self {
            store: Arc::new(store),
            config,
            classifier,
            users: UserSessions::default(),
            quizzes: RwLock::new(HashMap::new()),
        }
    }

    /// Open a quiz session and pose its first question.
    #[instrument(level = "info", skip(self))]
    pub async fn create_quiz(&self) -> Result<(String, QuizSession), QuizError> {
        self.sweep_idle_quizzes().await;
        let mut session = QuizSession::new();
        session.next_round(&self.store, &self.config.quiz, &mut rand::thread_rng())?;

        let id = Uuid::new_v4().to_string();
        let snapshot = session.clone();
        self.quizzes
            .write()
            .await
            .insert(id.clone(), QuizEntry::new(session));
        info!(target: "quiz", %id, "Quiz session created");
        Ok((id, snapshot))
    }

    pub async fn get_quiz(&self, id: &str) -> Option<QuizSession> {
        let mut quizzes = self.quizzes.write().await;
        let entry = quizzes.get_mut(id)?;
        entry.touch();
        Some(entry.session.clone())
    }

    /// Submit a choice. `None` when the session does not exist.
    #[instrument(level = "info", skip(self, choice), fields(choice_len = choice.len()))]
    pub async fn answer_quiz(
        self: &Arc<Self>,
        id: &str,
        choice: &str,
    ) -> Option<Result<SubmitOutcome, QuizError>> {
        let mut quizzes = self.quizzes.write().await;
        let entry = quizzes.get_mut(id)?;
        entry.touch();
        let outcome = match entry.session.submit(choice) {
            Ok(o) => o,
            Err(e) => return Some(Err(e)),
        };

        if outcome.advance {
            entry.cancel_pending();
            let state = Arc::clone(self);
            let quiz_id = id.to_string();
            let round = outcome.round;
            let delay = self.config.quiz.advance_delay();
            let task = tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                state.advance_quiz(&quiz_id, round).await;
            });
            entry.pending_advance = Some(task.abort_handle());
        }
        Some(Ok(outcome))
    }

    /// Delayed advance target. A no-op for deleted sessions or stale rounds.
    async fn advance_quiz(&self, id: &str, round: u64) {
        let mut quizzes = self.quizzes.write().await;
        let Some(entry) = quizzes.get_mut(id) else {
            debug!(target: "quiz", %id, "Advance fired for a closed session");
            return;
        };
        entry.pending_advance = None;
        match entry
            .session
            .advance_round(round, &self.store, &self.config.quiz, &mut rand::thread_rng())
        {
            Some(Ok(_)) => debug!(target: "quiz", %id, round = entry.session.round(), "Quiz advanced"),
            Some(Err(e)) => warn!(target: "quiz", %id, error = %e, "Quiz could not advance"),
            None => {}
        }
    }

    /// Close a session and cancel its pending advance. Returns false if unknown.
    pub async fn delete_quiz(&self, id: &str) -> bool {
        match self.quizzes.write().await.remove(id) {
            Some(mut entry) => {
                entry.cancel_pending();
                info!(target: "quiz", %id, score = entry.session.score(), "Quiz session closed");
                true
            }
            None => false,
        }
    }

    /// Drop sessions idle past the configured TTL. Returns how many were removed.
    pub async fn sweep_idle_quizzes(&self) -> usize {
        self.sweep_idle_quizzes_at(Instant::now()).await
    }

    async fn sweep_idle_quizzes_at(&self, now: Instant) -> usize {
        let ttl = self.config.quiz.session_ttl();
        let mut quizzes = self.quizzes.write().await;
        let before = quizzes.len();
        quizzes.retain(|id, entry| {
            let idle = now.saturating_duration_since(entry.touched) >= ttl;
            if idle {
                entry.cancel_pending();
                debug!(target: "quiz", %id, "Idle quiz session expired");
            }
            !idle
        });
        let removed = before - quizzes.len();
        if removed > 0 {
            info!(target: "quiz", removed, live = quizzes.len(), "Swept idle quiz sessions");
        }
        removed
    }

    /// Periodically sweep idle quiz sessions for the lifetime of the process.
    pub fn spawn_quiz_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let state = Arc::clone(self);
        let period = (state.config.quiz.session_ttl() / 2).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tick.tick().await;
                state.sweep_idle_quizzes().await;
            }
        })
    }
}
