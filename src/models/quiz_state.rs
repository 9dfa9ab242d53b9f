use crate::error::{Error, Result};
use crate::models::question::Question;
use serde::Serialize;

/// Progression state of one quiz session: which quiz of the ordered list is
/// active, which question within it, the running score, and the questions
/// loaded for the active quiz. All transitions are plain `&mut self` methods,
/// so a caller never observes a half-applied update.
#[derive(Debug, Clone, Serialize)]
pub struct QuizState {
    quiz_ids: Vec<i32>,
    current_quiz_index: usize,
    current_question_index: usize,
    score: i32,
    questions: Vec<Question>,
    completed: bool,
}

impl QuizState {
    pub fn new(quiz_ids: Vec<i32>) -> Self {
        Self {
            quiz_ids,
            current_quiz_index: 0,
            current_question_index: 0,
            score: 0,
            questions: Vec::new(),
            completed: false,
        }
    }

    pub fn quiz_ids(&self) -> &[i32] {
        &self.quiz_ids
    }

    pub fn current_quiz_index(&self) -> usize {
        self.current_quiz_index
    }

    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn current_quiz_id(&self) -> Option<i32> {
        self.quiz_ids.get(self.current_quiz_index).copied()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_question_index)
    }

    pub fn has_more_quizzes(&self) -> bool {
        self.current_quiz_index + 1 < self.quiz_ids.len()
    }

    /// Replace the loaded question list for the active quiz and rewind to its
    /// first question.
    pub fn set_questions(&mut self, questions: Vec<Question>) {
        self.questions = questions;
        self.current_question_index = 0;
    }

    /// Move to the next question of the active quiz. Returns `false` when the
    /// quiz is exhausted; advancing to the next quiz is the controller's call.
    pub fn advance_question(&mut self) -> bool {
        if self.current_question_index + 1 < self.questions.len() {
            self.current_question_index += 1;
            true
        } else {
            false
        }
    }

    /// Move to the next quiz of the session, rewinding the question index.
    /// The score is left untouched; score policy belongs to the controller.
    pub fn advance_quiz(&mut self) {
        self.current_quiz_index += 1;
        self.current_question_index = 0;
        self.questions.clear();
    }

    pub fn add_score(&mut self, points: i32) -> Result<()> {
        if points < 0 {
            return Err(Error::InvalidArgument(format!(
                "Score increment must be non-negative, got {}",
                points
            )));
        }
        self.score += points;
        Ok(())
    }

    /// Zero the running score. Used by the per-quiz score policy when a new
    /// quiz starts.
    pub fn reset_score(&mut self) {
        self.score = 0;
    }

    pub fn mark_completed(&mut self) {
        self.completed = true;
    }

    /// Back to initial values for a fresh attempt on the same quiz list.
    pub fn reset(&mut self) {
        self.current_quiz_index = 0;
        self.current_question_index = 0;
        self.score = 0;
        self.questions.clear();
        self.completed = false;
    }
}
