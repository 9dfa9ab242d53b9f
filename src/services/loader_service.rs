use crate::error::Result;
use crate::models::question::Question;
use crate::store::QuestionStore;
use std::sync::Arc;

/// Loads the full question list for a quiz: question rows, their answers, and
/// the derived `multiple_correct` flag. An empty list means the quiz has no
/// content and is not an error; store failures propagate untouched.
#[derive(Clone)]
pub struct LoaderService {
    store: Arc<dyn QuestionStore>,
}

impl LoaderService {
    pub fn new(store: Arc<dyn QuestionStore>) -> Self {
        Self { store }
    }

    pub async fn load_quiz(&self, quiz_id: i32) -> Result<Vec<Question>> {
        let rows = self.store.fetch_questions(quiz_id).await?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in rows {
            let answers = self.store.fetch_answers(row.id).await?;
            questions.push(Question::from_row(row, answers));
        }

        tracing::info!(quiz_id, count = questions.len(), "Loaded quiz questions");
        Ok(questions)
    }
}
