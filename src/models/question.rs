use crate::models::answer::Answer;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A question row as the store returns it, before answers are attached.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuestionRow {
    pub id: i32,
    pub quiz_id: i32,
    pub text: String,
}

/// A fully loaded question: row data plus its answer options and the derived
/// `multiple_correct` flag (true iff more than one answer carries positive
/// points). The flag is never stored; the loader computes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i32,
    pub quiz_id: i32,
    pub text: String,
    pub answers: Vec<Answer>,
    pub multiple_correct: bool,
}

impl Question {
    pub fn from_row(row: QuestionRow, answers: Vec<Answer>) -> Self {
        let multiple_correct = answers.iter().filter(|a| a.is_correct()).count() > 1;
        Self {
            id: row.id,
            quiz_id: row.quiz_id,
            text: row.text,
            answers,
            multiple_correct,
        }
    }

    pub fn answer(&self, answer_id: i32) -> Option<&Answer> {
        self.answers.iter().find(|a| a.id == answer_id)
    }

    /// Maximum points attainable on this question.
    pub fn max_points(&self) -> i32 {
        self.answers.iter().map(|a| a.earned_points()).sum()
    }
}
