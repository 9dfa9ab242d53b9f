pub mod postgres;

use crate::error::Result;
use crate::models::answer::Answer;
use crate::models::question::QuestionRow;
use crate::models::quiz_result::{NewQuizResult, QuizResultRecord};
use async_trait::async_trait;
use uuid::Uuid;

/// Read side of the quiz content store. An empty vec means the quiz or
/// question simply has no rows; only connectivity/query failures are errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn fetch_questions(&self, quiz_id: i32) -> Result<Vec<QuestionRow>>;
    async fn fetch_answers(&self, question_id: i32) -> Result<Vec<Answer>>;
}

/// Write/read side of finalized quiz results.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn save_quiz_result(&self, result: NewQuizResult) -> Result<()>;
    async fn list_results(&self, user_id: Uuid) -> Result<Vec<QuizResultRecord>>;
}
