pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

use crate::dto::session_dto::StartSessionRequest;
use crate::error::Result;
use crate::services::history_service::HistoryService;
use crate::services::session_service::QuizSession;
use crate::store::postgres::{PgQuestionStore, PgResultStore};
use sqlx::PgPool;
use std::sync::Arc;
use validator::Validate;

/// Entry point for the surrounding application: wires the Postgres stores
/// and hands out per-learner quiz sessions. Each session owns its state
/// exclusively; the app itself holds no session state.
#[derive(Clone)]
pub struct QuizApp {
    pub pool: PgPool,
    questions: Arc<PgQuestionStore>,
    results: Arc<PgResultStore>,
}

impl QuizApp {
    pub fn new(pool: PgPool) -> Self {
        let questions = Arc::new(PgQuestionStore::new(pool.clone()));
        let results = Arc::new(PgResultStore::new(pool.clone()));
        Self {
            pool,
            questions,
            results,
        }
    }

    /// Validate the request and start a session, loading its first quiz.
    pub async fn start_session(&self, request: StartSessionRequest) -> Result<QuizSession> {
        request.validate()?;
        let policy = crate::config::get_config().score_policy;
        QuizSession::start(
            self.questions.clone(),
            self.results.clone(),
            request.user_id,
            request.quiz_ids,
            policy,
        )
        .await
    }

    pub fn history(&self) -> HistoryService {
        HistoryService::new(self.results.clone())
    }
}
