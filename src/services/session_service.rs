use crate::config::ScorePolicy;
use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::models::quiz_result::{NewQuizResult, QuizResult};
use crate::models::quiz_state::QuizState;
use crate::services::loader_service::LoaderService;
use crate::services::scoring_service::ScoringService;
use crate::store::{QuestionStore, ResultStore};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Phase of the session state machine. `Completed` is the transient phase a
/// quiz passes through between its last feedback and either the next quiz's
/// `Loading` or the terminal `SessionCompleted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Loading,
    Active,
    Feedback,
    Completed,
    SessionCompleted,
}

/// Per-answer verdict revealed after a submission.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerFeedback {
    pub answer_id: i32,
    pub selected: bool,
    pub correct: bool,
    pub points: i32,
    pub explanation: Option<String>,
}

/// Read-only view of the session for the UI layer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub quiz_index: usize,
    pub quiz_count: usize,
    pub question_index: usize,
    pub question_count: usize,
    pub score: i32,
    pub selected: Vec<i32>,
    pub is_loading: bool,
    pub is_saving: bool,
    pub current_question: Option<Question>,
    pub feedback: Vec<AnswerFeedback>,
    pub last_result: Option<QuizResult>,
    pub last_persist_error: Option<String>,
}

/// One learner's pass through an ordered list of quizzes. Each session owns
/// its state exclusively; there is no process-wide session registry. Commands
/// are rejected with `InvalidState` outside their phase rather than queued or
/// silently ignored, so the state can never be corrupted by an out-of-order
/// UI event.
pub struct QuizSession {
    loader: LoaderService,
    results: Arc<dyn ResultStore>,
    user_id: Uuid,
    policy: ScorePolicy,
    state: QuizState,
    phase: Phase,
    selected: Vec<i32>,
    feedback: Vec<AnswerFeedback>,
    // Per-question earned/max pairs for the active quiz, persisted as the
    // result breakdown.
    quiz_breakdown: Vec<serde_json::Value>,
    // Score at the start of the active quiz; the persisted per-quiz score is
    // relative to this under the cumulative policy.
    quiz_score_start: i32,
    is_loading: bool,
    is_saving: bool,
    last_result: Option<QuizResult>,
    last_persist_error: Option<String>,
}

impl QuizSession {
    /// Build a session and load the first quiz. Quizzes without content are
    /// skipped; a session whose quizzes are all empty completes immediately
    /// without ever entering `Active`.
    pub async fn start(
        questions: Arc<dyn QuestionStore>,
        results: Arc<dyn ResultStore>,
        user_id: Uuid,
        quiz_ids: Vec<i32>,
        policy: ScorePolicy,
    ) -> Result<Self> {
        if quiz_ids.is_empty() {
            return Err(Error::InvalidArgument(
                "A session needs at least one quiz".to_string(),
            ));
        }
        let mut session = Self {
            loader: LoaderService::new(questions),
            results,
            user_id,
            policy,
            state: QuizState::new(quiz_ids),
            phase: Phase::Loading,
            selected: Vec::new(),
            feedback: Vec::new(),
            quiz_breakdown: Vec::new(),
            quiz_score_start: 0,
            is_loading: false,
            is_saving: false,
            last_result: None,
            last_persist_error: None,
        };
        session.load_current_quiz().await?;
        Ok(session)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            quiz_index: self.state.current_quiz_index(),
            quiz_count: self.state.quiz_ids().len(),
            question_index: self.state.current_question_index(),
            question_count: self.state.questions().len(),
            score: self.state.score(),
            selected: self.selected.clone(),
            is_loading: self.is_loading,
            is_saving: self.is_saving,
            current_question: self.state.current_question().cloned(),
            feedback: self.feedback.clone(),
            last_result: self.last_result.clone(),
            last_persist_error: self.last_persist_error.clone(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Toggle an answer of the current question. Single-answer questions keep
    /// at most one selection: picking a different answer replaces the old one.
    pub fn select_answer(&mut self, answer_id: i32) -> Result<()> {
        self.ensure_phase(Phase::Active, "select_answer")?;
        let question = self
            .state
            .current_question()
            .ok_or_else(|| Error::Internal("Active phase without a current question".to_string()))?;
        if question.answer(answer_id).is_none() {
            return Err(Error::InvalidArgument(format!(
                "Answer {} does not belong to question {}",
                answer_id, question.id
            )));
        }

        if let Some(pos) = self.selected.iter().position(|id| *id == answer_id) {
            self.selected.remove(pos);
        } else if question.multiple_correct {
            self.selected.push(answer_id);
        } else {
            self.selected.clear();
            self.selected.push(answer_id);
        }
        Ok(())
    }

    /// Grade the current selection, add the earned points, and move to
    /// `Feedback`, revealing per-answer correctness and explanations.
    pub fn submit_answer(&mut self) -> Result<()> {
        self.ensure_phase(Phase::Active, "submit_answer")?;
        if self.selected.is_empty() {
            return Err(Error::InvalidState(
                "Cannot submit without a selected answer".to_string(),
            ));
        }
        let question = self
            .state
            .current_question()
            .ok_or_else(|| Error::Internal("Active phase without a current question".to_string()))?
            .clone();

        let earned: i32 = question
            .answers
            .iter()
            .filter(|a| self.selected.contains(&a.id))
            .map(|a| a.earned_points())
            .sum();

        self.state.add_score(earned)?;
        self.quiz_breakdown.push(json!({
            "question_id": question.id,
            "points_earned": earned,
            "max_points": question.max_points(),
            "selected": self.selected.clone(),
        }));

        self.feedback = question
            .answers
            .iter()
            .map(|a| AnswerFeedback {
                answer_id: a.id,
                selected: self.selected.contains(&a.id),
                correct: a.is_correct(),
                points: a.earned_points(),
                explanation: a.explanation.clone(),
            })
            .collect();
        self.phase = Phase::Feedback;
        Ok(())
    }

    /// Leave `Feedback`: clear the selection, then advance to the next
    /// question, the next quiz (persisting the finished quiz's result), or
    /// the terminal state.
    pub async fn next_question(&mut self) -> Result<()> {
        self.ensure_phase(Phase::Feedback, "next_question")?;
        self.selected.clear();
        self.feedback.clear();

        if self.state.advance_question() {
            self.phase = Phase::Active;
            return Ok(());
        }

        self.phase = Phase::Completed;
        self.finish_quiz().await?;

        if self.state.has_more_quizzes() {
            self.state.advance_quiz();
            if self.policy == ScorePolicy::PerQuiz {
                self.state.reset_score();
            }
            self.quiz_score_start = self.state.score();
            self.phase = Phase::Loading;
            self.load_current_quiz().await?;
        } else {
            self.state.mark_completed();
            self.phase = Phase::SessionCompleted;
        }
        Ok(())
    }

    /// Retry the quiz fetch after a data-access failure left the session in
    /// `Loading`.
    pub async fn retry_load(&mut self) -> Result<()> {
        self.ensure_phase(Phase::Loading, "retry_load")?;
        self.load_current_quiz().await
    }

    /// Fresh attempt on the same quiz list.
    pub async fn reset(&mut self) -> Result<()> {
        self.state.reset();
        self.selected.clear();
        self.feedback.clear();
        self.quiz_breakdown.clear();
        self.quiz_score_start = 0;
        self.last_result = None;
        self.last_persist_error = None;
        self.phase = Phase::Loading;
        self.load_current_quiz().await
    }

    /// Evaluate and persist the finished quiz. Persistence is fire-and-forget:
    /// a store failure is logged and surfaced in the snapshot, but never
    /// blocks progression.
    async fn finish_quiz(&mut self) -> Result<()> {
        let quiz_id = self
            .state
            .current_quiz_id()
            .ok_or_else(|| Error::Internal("Finished a quiz with no active quiz id".to_string()))?;
        let quiz_score = self.state.score() - self.quiz_score_start;
        let quiz_max: i32 = self.state.questions().iter().map(|q| q.max_points()).sum();
        let breakdown = std::mem::take(&mut self.quiz_breakdown);

        if quiz_max <= 0 {
            tracing::warn!(quiz_id, "Quiz has no scorable answers, skipping result");
            return Ok(());
        }

        let result = ScoringService::evaluate(quiz_score, quiz_max)?;
        self.last_result = Some(result.clone());

        self.is_saving = true;
        let saved = self
            .results
            .save_quiz_result(NewQuizResult {
                user_id: self.user_id,
                quiz_id,
                score: result.score,
                max_score: result.max_score,
                percentage: result.percentage,
                passed: result.passed,
                skill_level: result.skill_level,
                breakdown: Some(serde_json::Value::Array(breakdown)),
            })
            .await;
        self.is_saving = false;

        match saved {
            Ok(()) => {
                self.last_persist_error = None;
                tracing::info!(
                    quiz_id,
                    score = result.score,
                    max_score = result.max_score,
                    passed = result.passed,
                    "Persisted quiz result"
                );
            }
            Err(e) => {
                tracing::warn!(quiz_id, error = %e, "Failed to persist quiz result");
                self.last_persist_error = Some(e.to_string());
            }
        }
        Ok(())
    }

    /// Load the active quiz's questions, skipping forward over quizzes with
    /// no content. A load that completes for a quiz that is no longer active
    /// is discarded.
    async fn load_current_quiz(&mut self) -> Result<()> {
        loop {
            let quiz_id = match self.state.current_quiz_id() {
                Some(id) => id,
                None => {
                    self.state.mark_completed();
                    self.phase = Phase::SessionCompleted;
                    return Ok(());
                }
            };

            self.is_loading = true;
            let loaded = self.loader.load_quiz(quiz_id).await;
            self.is_loading = false;
            let questions = loaded?;

            if self.state.current_quiz_id() != Some(quiz_id) {
                tracing::info!(quiz_id, "Discarding stale quiz load");
                return Ok(());
            }

            if questions.is_empty() {
                tracing::warn!(quiz_id, "Quiz has no questions, skipping");
                if self.state.has_more_quizzes() {
                    self.state.advance_quiz();
                    continue;
                }
                self.state.mark_completed();
                self.phase = Phase::SessionCompleted;
                return Ok(());
            }

            self.state.set_questions(questions);
            self.phase = Phase::Active;
            return Ok(());
        }
    }

    fn ensure_phase(&self, expected: Phase, command: &str) -> Result<()> {
        if self.is_loading || self.is_saving {
            return Err(Error::InvalidState(format!(
                "Cannot {} while a fetch or save is in flight",
                command
            )));
        }
        if self.phase != expected {
            return Err(Error::InvalidState(format!(
                "Cannot {} in phase {:?}",
                command, self.phase
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::answer::Answer;
    use crate::models::question::QuestionRow;
    use crate::store::{MockQuestionStore, MockResultStore};

    fn answer(id: i32, question_id: i32, points: Option<i32>) -> Answer {
        Answer {
            id,
            question_id,
            text: format!("option {}", id),
            points,
            explanation: None,
        }
    }

    fn single_question_store() -> MockQuestionStore {
        let mut store = MockQuestionStore::new();
        store.expect_fetch_questions().returning(|quiz_id| {
            Ok(vec![QuestionRow {
                id: 1,
                quiz_id,
                text: "pick one".to_string(),
            }])
        });
        store.expect_fetch_answers().returning(|question_id| {
            Ok(vec![
                answer(10, question_id, Some(5)),
                answer(11, question_id, None),
            ])
        });
        store
    }

    fn multi_question_store() -> MockQuestionStore {
        let mut store = MockQuestionStore::new();
        store.expect_fetch_questions().returning(|quiz_id| {
            Ok(vec![QuestionRow {
                id: 1,
                quiz_id,
                text: "pick all that apply".to_string(),
            }])
        });
        store.expect_fetch_answers().returning(|question_id| {
            Ok(vec![
                answer(10, question_id, Some(3)),
                answer(11, question_id, Some(3)),
                answer(12, question_id, None),
            ])
        });
        store
    }

    fn quiet_results() -> MockResultStore {
        let mut results = MockResultStore::new();
        results.expect_save_quiz_result().returning(|_| Ok(()));
        results
    }

    async fn session_with(
        questions: MockQuestionStore,
        results: MockResultStore,
        quiz_ids: Vec<i32>,
    ) -> QuizSession {
        QuizSession::start(
            Arc::new(questions),
            Arc::new(results),
            Uuid::new_v4(),
            quiz_ids,
            ScorePolicy::Cumulative,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn single_answer_question_keeps_at_most_one_selection() {
        let mut session = session_with(single_question_store(), quiet_results(), vec![1]).await;

        session.select_answer(10).unwrap();
        session.select_answer(11).unwrap();
        assert_eq!(session.snapshot().selected, vec![11]);

        // Toggling the current selection off empties the set.
        session.select_answer(11).unwrap();
        assert!(session.snapshot().selected.is_empty());
    }

    #[tokio::test]
    async fn multiple_answer_question_toggles_membership() {
        let mut session = session_with(multi_question_store(), quiet_results(), vec![1]).await;

        session.select_answer(10).unwrap();
        session.select_answer(11).unwrap();
        assert_eq!(session.snapshot().selected, vec![10, 11]);

        session.select_answer(10).unwrap();
        assert_eq!(session.snapshot().selected, vec![11]);
    }

    #[tokio::test]
    async fn unknown_answer_id_is_rejected() {
        let mut session = session_with(single_question_store(), quiet_results(), vec![1]).await;
        assert!(matches!(
            session.select_answer(999),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn submit_without_selection_is_rejected() {
        let mut session = session_with(single_question_store(), quiet_results(), vec![1]).await;
        assert!(matches!(
            session.submit_answer(),
            Err(Error::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn commands_outside_their_phase_are_rejected() {
        let mut session = session_with(single_question_store(), quiet_results(), vec![1]).await;

        // Active phase: next_question needs Feedback first.
        assert!(matches!(
            session.next_question().await,
            Err(Error::InvalidState(_))
        ));

        session.select_answer(10).unwrap();
        session.submit_answer().unwrap();
        assert_eq!(session.phase(), Phase::Feedback);

        // Feedback phase: selecting and double-submitting are both rejected.
        assert!(matches!(
            session.select_answer(10),
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(
            session.submit_answer(),
            Err(Error::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn feedback_reveals_correctness_and_explanations() {
        let mut store = MockQuestionStore::new();
        store.expect_fetch_questions().returning(|quiz_id| {
            Ok(vec![QuestionRow {
                id: 1,
                quiz_id,
                text: "explain this".to_string(),
            }])
        });
        store.expect_fetch_answers().returning(|question_id| {
            Ok(vec![
                Answer {
                    id: 10,
                    question_id,
                    text: "right".to_string(),
                    points: Some(5),
                    explanation: Some("because".to_string()),
                },
                answer(11, question_id, None),
            ])
        });
        let mut session = session_with(store, quiet_results(), vec![1]).await;

        session.select_answer(11).unwrap();
        session.submit_answer().unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.feedback.len(), 2);
        let right = snapshot.feedback.iter().find(|f| f.answer_id == 10).unwrap();
        assert!(right.correct && !right.selected);
        assert_eq!(right.explanation.as_deref(), Some("because"));
        let wrong = snapshot.feedback.iter().find(|f| f.answer_id == 11).unwrap();
        assert!(!wrong.correct && wrong.selected);
    }

    #[tokio::test]
    async fn selection_is_cleared_on_advance() {
        let mut store = MockQuestionStore::new();
        store.expect_fetch_questions().returning(|quiz_id| {
            Ok(vec![
                QuestionRow {
                    id: 1,
                    quiz_id,
                    text: "first".to_string(),
                },
                QuestionRow {
                    id: 2,
                    quiz_id,
                    text: "second".to_string(),
                },
            ])
        });
        store.expect_fetch_answers().returning(|question_id| {
            Ok(vec![
                answer(question_id * 10, question_id, Some(5)),
                answer(question_id * 10 + 1, question_id, None),
            ])
        });
        let mut session = session_with(store, quiet_results(), vec![1]).await;

        session.select_answer(10).unwrap();
        session.submit_answer().unwrap();
        session.next_question().await.unwrap();

        let snapshot = session.snapshot();
        assert!(snapshot.selected.is_empty());
        assert!(snapshot.feedback.is_empty());
        assert_eq!(snapshot.phase, Phase::Active);
        assert_eq!(snapshot.question_index, 1);
    }

    #[tokio::test]
    async fn persist_failure_does_not_block_progression() {
        let mut results = MockResultStore::new();
        results
            .expect_save_quiz_result()
            .returning(|_| Err(Error::Database(sqlx::Error::PoolTimedOut)));
        let mut session = session_with(single_question_store(), results, vec![1]).await;

        session.select_answer(10).unwrap();
        session.submit_answer().unwrap();
        session.next_question().await.unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, Phase::SessionCompleted);
        assert!(snapshot.last_persist_error.is_some());
        assert!(snapshot.last_result.is_some());
    }

    #[tokio::test]
    async fn quiz_without_scorable_answers_skips_persistence() {
        let mut store = MockQuestionStore::new();
        store.expect_fetch_questions().returning(|quiz_id| {
            Ok(vec![QuestionRow {
                id: 1,
                quiz_id,
                text: "unscored survey question".to_string(),
            }])
        });
        store
            .expect_fetch_answers()
            .returning(|question_id| Ok(vec![answer(10, question_id, None)]));
        let mut results = MockResultStore::new();
        results.expect_save_quiz_result().never();

        let mut session = session_with(store, results, vec![1]).await;
        session.select_answer(10).unwrap();
        session.submit_answer().unwrap();
        session.next_question().await.unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, Phase::SessionCompleted);
        assert!(snapshot.last_result.is_none());
    }

    #[tokio::test]
    async fn reset_starts_a_fresh_attempt() {
        let mut session = session_with(single_question_store(), quiet_results(), vec![1]).await;

        session.select_answer(10).unwrap();
        session.submit_answer().unwrap();
        session.next_question().await.unwrap();
        assert_eq!(session.phase(), Phase::SessionCompleted);

        session.reset().await.unwrap();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, Phase::Active);
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.quiz_index, 0);
        assert!(snapshot.last_result.is_none());
    }
}
