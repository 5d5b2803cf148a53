//! Application state: the validated question bank, the rendering cache, the
//! HTTP session store, prompts and the optional OpenAI client.
//!
//! Sessions are only reachable through `with_session`, which holds the store
//! lock for the duration of a synchronous closure. Nothing awaits while the
//! lock is held. Sessions idle for longer than `session_ttl` are swept on the
//! next create or access.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::bank::QuestionBank;
use crate::config::{
    explanation_timeout_from_env, load_agent_config_from_env, session_ttl_from_env, Prompts, DEFAULT_SESSION_TTL,
};
use crate::error::SessionError;
use crate::openai::OpenAI;
use crate::render::Renderer;
use crate::seeds::seed_compounds;
use crate::session::{QuizConfig, QuizSession};

/// A stored HTTP session and the last time a request touched it.
pub struct StoredSession {
    pub session: QuizSession,
    pub touched: Instant,
}

impl StoredSession {
    fn new(session: QuizSession) -> Self {
        Self { session, touched: Instant::now() }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.touched.elapsed() > ttl
    }
}

pub struct AppState {
    pub bank: QuestionBank,
    pub renderer: Renderer,
    pub sessions: Arc<RwLock<HashMap<String, StoredSession>>>,
    pub session_ttl: Duration,
    pub openai: Option<OpenAI>,
    pub prompts: Prompts,
    pub explanation_timeout: Duration,
}

impl AppState {
    /// Build state from env: load config, merge and validate the bank, init OpenAI.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        // Load TOML config if provided (prompts + optional extra compounds).
        let cfg = load_agent_config_from_env().unwrap_or_default();
        let bank = QuestionBank::merged(seed_compounds(), cfg.compounds).into_validated();

        // Inventory summary by category/difficulty.
        let mut inventory: HashMap<(String, String), usize> = HashMap::new();
        for c in bank.all() {
            *inventory.entry((c.category.to_string(), c.difficulty.to_string())).or_default() += 1;
        }
        let mut rows: Vec<_> = inventory.into_iter().collect();
        rows.sort();
        for ((category, difficulty), count) in rows {
            info!(target: "quiz", %category, %difficulty, count, "Startup compound inventory");
        }

        let explanation_timeout = explanation_timeout_from_env();
        let openai = OpenAI::from_env(explanation_timeout);
        if let Some(oa) = &openai {
            info!(target: "nomenquiz", base_url = %oa.base_url, model = %oa.model, timeout = ?explanation_timeout, "OpenAI enabled.");
        } else {
            info!(target: "nomenquiz", "OpenAI disabled (no OPENAI_API_KEY). Wrong answers get the fallback message.");
        }

        Self::with_parts(bank, openai, cfg.prompts, explanation_timeout).with_session_ttl(session_ttl_from_env())
    }

    pub fn with_parts(
        bank: QuestionBank,
        openai: Option<OpenAI>,
        prompts: Prompts,
        explanation_timeout: Duration,
    ) -> Self {
        if bank.is_empty() {
            warn!(target: "quiz", "Question bank is empty; every quiz request will be rejected");
        }
        Self {
            bank,
            renderer: Renderer::new(),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            session_ttl: DEFAULT_SESSION_TTL,
            openai,
            prompts,
            explanation_timeout,
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Drop every session idle for longer than the TTL.
    fn sweep_expired(&self, sessions: &mut HashMap<String, StoredSession>) {
        let before = sessions.len();
        sessions.retain(|_, stored| !stored.is_expired(self.session_ttl));
        let swept = before - sessions.len();
        if swept > 0 {
            info!(target: "quiz", swept, live = sessions.len(), "Expired sessions discarded");
        }
    }

    /// Configure a fresh session and store it. Nothing is stored when the
    /// configuration is rejected.
    #[instrument(level = "info", skip(self))]
    pub async fn create_session(&self, config: QuizConfig) -> Result<String, SessionError> {
        let mut session = QuizSession::new();
        session.configure(&self.bank, config)?;
        let id = Uuid::new_v4().to_string();
        let live = {
            let mut sessions = self.sessions.write().await;
            self.sweep_expired(&mut sessions);
            sessions.insert(id.clone(), StoredSession::new(session));
            sessions.len()
        };
        info!(target: "quiz", session = %id, live, "Session created");
        Ok(id)
    }

    /// Run `f` against the session with id `id` and mark it as touched.
    /// An expired session is reported as unknown.
    pub async fn with_session<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut QuizSession) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let mut sessions = self.sessions.write().await;
        self.sweep_expired(&mut sessions);
        let stored = sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::UnknownSession(id.to_string()))?;
        stored.touched = Instant::now();
        f(&mut stored.session)
    }

    #[instrument(level = "info", skip(self))]
    pub async fn remove_session(&self, id: &str) -> Result<(), SessionError> {
        match self.sessions.write().await.remove(id) {
            Some(_) => {
                info!(target: "quiz", session = %id, "Session discarded");
                Ok(())
            }
            None => Err(SessionError::UnknownSession(id.to_string())),
        }
    }
}
