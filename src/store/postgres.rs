use crate::error::Result;
use crate::models::answer::Answer;
use crate::models::question::QuestionRow;
use crate::models::quiz_result::{NewQuizResult, QuizResultRecord};
use crate::store::{QuestionStore, ResultStore};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgQuestionStore {
    pool: PgPool,
}

impl PgQuestionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuestionStore for PgQuestionStore {
    async fn fetch_questions(&self, quiz_id: i32) -> Result<Vec<QuestionRow>> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            r#"SELECT id, quiz_id, text FROM questions WHERE quiz_id = $1 ORDER BY id"#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn fetch_answers(&self, question_id: i32) -> Result<Vec<Answer>> {
        let rows = sqlx::query_as::<_, Answer>(
            r#"SELECT id, question_id, text, points, explanation
               FROM answers WHERE question_id = $1 ORDER BY id"#,
        )
        .bind(question_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[derive(Clone)]
pub struct PgResultStore {
    pool: PgPool,
}

impl PgResultStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResultStore for PgResultStore {
    async fn save_quiz_result(&self, result: NewQuizResult) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO quiz_results (
                id, user_id, quiz_id, score, max_score, percentage, passed, skill_level, breakdown
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(result.user_id)
        .bind(result.quiz_id)
        .bind(result.score)
        .bind(result.max_score)
        .bind(result.percentage)
        .bind(result.passed)
        .bind(result.skill_level.as_str())
        .bind(result.breakdown)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_results(&self, user_id: Uuid) -> Result<Vec<QuizResultRecord>> {
        let rows = sqlx::query_as::<_, QuizResultRecord>(
            r#"
            SELECT id, user_id, quiz_id, score, max_score, percentage, passed,
                   skill_level, breakdown, created_at
            FROM quiz_results
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
