use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillLevel::Beginner => "beginner",
            SkillLevel::Intermediate => "intermediate",
            SkillLevel::Advanced => "advanced",
        }
    }
}

impl std::fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single finished quiz, derived by the scoring service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResult {
    pub score: i32,
    pub max_score: i32,
    pub percentage: Decimal,
    pub passed: bool,
    pub skill_level: SkillLevel,
}

/// Payload handed to the result store when a quiz finishes.
#[derive(Debug, Clone, Serialize)]
pub struct NewQuizResult {
    pub user_id: Uuid,
    pub quiz_id: i32,
    pub score: i32,
    pub max_score: i32,
    pub percentage: Decimal,
    pub passed: bool,
    pub skill_level: SkillLevel,
    pub breakdown: Option<JsonValue>,
}

/// A persisted quiz result, as read back for history display.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizResultRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quiz_id: i32,
    pub score: i32,
    pub max_score: i32,
    pub percentage: Decimal,
    pub passed: bool,
    pub skill_level: String,
    pub breakdown: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
}
