// src/store/postgres.rs

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{
    FromRow, PgPool, Postgres, QueryBuilder,
    postgres::PgPoolOptions,
    types::Json,
};
use uuid::Uuid;

use super::{QuizStore, ensure_title, quiz_not_found, result_not_found};
use crate::{
    error::AppError,
    models::{
        question::{AnswerLetter, Question, QuestionDraft},
        quiz::{NewQuiz, Quiz, QuizSummary},
        result::{AnswerRecord, QuizResult, ResultDraft},
        user::Identity,
    },
};

const CONNECT_RETRIES: u32 = 5;

/// Postgres error code for a foreign key violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct QuizRow {
    id: Uuid,
    title: String,
    description: String,
    creator_id: Uuid,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<QuizRow> for Quiz {
    fn from(row: QuizRow) -> Self {
        Quiz {
            id: row.id,
            title: row.title,
            description: row.description,
            creator_id: row.creator_id,
            created_at: row.created_at,
        }
    }
}

/// Quiz row joined with `users` and `questions`; both joins may come back empty.
#[derive(FromRow)]
struct QuizSummaryRow {
    #[sqlx(flatten)]
    quiz: QuizRow,
    creator_name: Option<String>,
    question_count: Option<i64>,
}

#[derive(FromRow)]
struct QuestionRow {
    id: Uuid,
    quiz_id: Uuid,
    question_text: String,
    options: Json<Vec<String>>,
    correct_answer: String,
    order_index: i32,
}

impl TryFrom<QuestionRow> for Question {
    type Error = AppError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let correct_answer = row.correct_answer.parse::<AnswerLetter>().map_err(|e| {
            AppError::InternalServerError(format!("question {}: {}", row.id, e))
        })?;

        Ok(Question {
            id: row.id,
            quiz_id: row.quiz_id,
            question_text: row.question_text,
            options: row.options.0,
            correct_answer,
            order_index: row.order_index,
        })
    }
}

#[derive(FromRow)]
struct ResultRow {
    id: Uuid,
    quiz_id: Uuid,
    user_id: Uuid,
    score: i32,
    total_questions: i32,
    answers: Json<Vec<AnswerRecord>>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ResultRow> for QuizResult {
    fn from(row: ResultRow) -> Self {
        QuizResult {
            id: row.id,
            quiz_id: row.quiz_id,
            user_id: row.user_id,
            score: row.score,
            total_questions: row.total_questions,
            answers: row.answers.0,
            created_at: row.created_at,
        }
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == FOREIGN_KEY_VIOLATION)
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects with a short retry loop so the service can start before the database.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let mut retry_count = 0;
        let pool = loop {
            match PgPoolOptions::new()
                .max_connections(max_connections)
                .acquire_timeout(Duration::from_secs(3))
                .connect(database_url)
                .await
            {
                Ok(pool) => break pool,
                Err(e) => {
                    retry_count += 1;
                    if retry_count > CONNECT_RETRIES {
                        return Err(e);
                    }
                    tracing::warn!(
                        "Database not ready, retrying in 2s... (Attempt {})",
                        retry_count
                    );
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        };

        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    async fn quiz_exists(&self, id: Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM quizzes WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

#[async_trait]
impl QuizStore for PgStore {
    async fn upsert_user(&self, identity: &Identity) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                email = COALESCE(EXCLUDED.email, users.email),
                name = COALESCE(EXCLUDED.name, users.name)
            "#,
        )
        .bind(identity.id)
        .bind(identity.email.as_deref())
        .bind(identity.attribution_name())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to upsert user: {:?}", e);
            AppError::from(e)
        })?;

        Ok(())
    }

    async fn create_quiz(&self, draft: NewQuiz) -> Result<Quiz, AppError> {
        ensure_title(&draft.title)?;

        let row = sqlx::query_as::<_, QuizRow>(
            r#"
            INSERT INTO quizzes (id, title, description, creator_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, creator_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(draft.title.trim())
        .bind(&draft.description)
        .bind(draft.creator_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create quiz: {:?}", e);
            AppError::Persistence(e.to_string())
        })?;

        Ok(row.into())
    }

    async fn create_questions(&self, quiz_id: Uuid, questions: &[QuestionDraft]) -> Result<(), AppError> {
        if questions.is_empty() {
            return Ok(());
        }

        // A single multi-row INSERT is all-or-nothing.
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO questions (id, quiz_id, question_text, options, correct_answer, order_index) ",
        );

        builder.push_values(questions.iter().enumerate(), |mut row, (index, q)| {
            row.push_bind(Uuid::new_v4())
                .push_bind(quiz_id)
                .push_bind(q.question_text.clone())
                .push_bind(Json(q.options.clone()))
                .push_bind(q.correct_answer.as_str())
                .push_bind(index as i32);
        });

        builder.build().execute(&self.pool).await.map_err(|e| {
            tracing::error!("Failed to create questions for quiz {}: {:?}", quiz_id, e);
            if is_foreign_key_violation(&e) {
                quiz_not_found()
            } else {
                AppError::Persistence(e.to_string())
            }
        })?;

        Ok(())
    }

    async fn list_quizzes(&self, limit: Option<i64>) -> Result<Vec<QuizSummary>, AppError> {
        let rows = sqlx::query_as::<_, QuizSummaryRow>(
            r#"
            SELECT
                q.id, q.title, q.description, q.creator_id, q.created_at,
                u.name AS creator_name,
                COUNT(qs.id) AS question_count
            FROM quizzes q
            LEFT JOIN users u ON u.id = q.creator_id
            LEFT JOIN questions qs ON qs.quiz_id = q.id
            GROUP BY q.id, u.name
            ORDER BY q.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list quizzes: {:?}", e);
            AppError::Persistence(e.to_string())
        })?;

        Ok(rows
            .into_iter()
            .map(|row| QuizSummary::from_parts(row.quiz.into(), row.creator_name, row.question_count))
            .collect())
    }

    async fn get_quiz(&self, id: Uuid) -> Result<Quiz, AppError> {
        let row = sqlx::query_as::<_, QuizRow>(
            "SELECT id, title, description, creator_id, created_at FROM quizzes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(quiz_not_found)?;

        Ok(row.into())
    }

    async fn get_questions(&self, quiz_id: Uuid) -> Result<Vec<Question>, AppError> {
        if !self.quiz_exists(quiz_id).await? {
            return Err(quiz_not_found());
        }

        let rows = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT id, quiz_id, question_text, options, correct_answer, order_index
            FROM questions
            WHERE quiz_id = $1
            ORDER BY order_index ASC
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch questions: {:?}", e);
            AppError::Persistence(e.to_string())
        })?;

        rows.into_iter().map(Question::try_from).collect()
    }

    async fn create_result(&self, draft: ResultDraft) -> Result<QuizResult, AppError> {
        let row = sqlx::query_as::<_, ResultRow>(
            r#"
            INSERT INTO results (id, quiz_id, user_id, score, total_questions, answers)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, quiz_id, user_id, score, total_questions, answers, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(draft.quiz_id)
        .bind(draft.user_id)
        .bind(draft.score)
        .bind(draft.total_questions)
        .bind(Json(&draft.answers))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create result: {:?}", e);
            if is_foreign_key_violation(&e) {
                quiz_not_found()
            } else {
                AppError::Persistence(e.to_string())
            }
        })?;

        Ok(row.into())
    }

    async fn get_latest_result(&self, quiz_id: Uuid, user_id: Uuid) -> Result<QuizResult, AppError> {
        let row = sqlx::query_as::<_, ResultRow>(
            r#"
            SELECT id, quiz_id, user_id, score, total_questions, answers, created_at
            FROM results
            WHERE quiz_id = $1 AND user_id = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(quiz_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(result_not_found)?;

        Ok(row.into())
    }
}
