use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One answer option of a question. `points` above zero marks a correct
/// option; zero or NULL marks an incorrect one.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Answer {
    pub id: i32,
    pub question_id: i32,
    pub text: String,
    pub points: Option<i32>,
    pub explanation: Option<String>,
}

impl Answer {
    pub fn is_correct(&self) -> bool {
        self.points.is_some_and(|p| p > 0)
    }

    /// Points awarded when this answer is part of a submission.
    pub fn earned_points(&self) -> i32 {
        self.points.filter(|p| *p > 0).unwrap_or(0)
    }
}
