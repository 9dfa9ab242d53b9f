use crate::error::Result;
use crate::models::quiz_result::SkillLevel;
use crate::services::scoring_service::ScoringService;
use crate::store::ResultStore;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct QuizHistoryEntry {
    pub quiz_id: i32,
    pub score: i32,
    pub max_score: i32,
    pub percentage: Decimal,
    pub passed: bool,
    pub skill_level: SkillLevel,
    pub taken_at: DateTime<Utc>,
}

/// Past results for a learner. Skill labels are re-derived from the stored
/// score and maximum through the scoring bands, so a historical row and a
/// freshly evaluated quiz can never show different labels for the same ratio.
#[derive(Clone)]
pub struct HistoryService {
    results: Arc<dyn ResultStore>,
}

impl HistoryService {
    pub fn new(results: Arc<dyn ResultStore>) -> Self {
        Self { results }
    }

    pub async fn results_for_user(&self, user_id: Uuid) -> Result<Vec<QuizHistoryEntry>> {
        let records = self.results.list_results(user_id).await?;
        let entries = records
            .into_iter()
            .filter_map(|r| match ScoringService::skill_level(r.score, r.max_score) {
                Ok(skill_level) => Some(QuizHistoryEntry {
                    quiz_id: r.quiz_id,
                    score: r.score,
                    max_score: r.max_score,
                    percentage: r.percentage,
                    passed: r.passed,
                    skill_level,
                    taken_at: r.created_at,
                }),
                Err(e) => {
                    tracing::warn!(record_id = %r.id, error = %e, "Skipping malformed quiz result");
                    None
                }
            })
            .collect();
        Ok(entries)
    }
}
