// src/store/mod.rs

//! Typed access to the record store (users, quizzes, questions, results).

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        question::{Question, QuestionDraft},
        quiz::{NewQuiz, Quiz, QuizSummary},
        result::{QuizResult, ResultDraft},
        user::Identity,
    },
    quiz::search::search_quizzes,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait QuizStore: Send + Sync {
    /// Inserts the user row, or refreshes its email and name.
    async fn upsert_user(&self, identity: &Identity) -> Result<(), AppError>;

    /// Fails with `Validation` when the title is blank after trimming.
    async fn create_quiz(&self, draft: NewQuiz) -> Result<Quiz, AppError>;

    /// Writes every question or none. `order_index` is the input position.
    async fn create_questions(&self, quiz_id: Uuid, questions: &[QuestionDraft]) -> Result<(), AppError>;

    /// Newest first.
    async fn list_quizzes(&self, limit: Option<i64>) -> Result<Vec<QuizSummary>, AppError>;

    /// Filters the full quiz list in process; the store does no text search.
    async fn search_quizzes(&self, query: &str) -> Result<Vec<QuizSummary>, AppError> {
        let all = self.list_quizzes(None).await?;
        Ok(search_quizzes(all, query))
    }

    async fn get_quiz(&self, id: Uuid) -> Result<Quiz, AppError>;

    /// Ordered by `order_index`. `NotFound` when the quiz does not exist.
    async fn get_questions(&self, quiz_id: Uuid) -> Result<Vec<Question>, AppError>;

    /// `NotFound` when the referenced quiz does not exist.
    async fn create_result(&self, draft: ResultDraft) -> Result<QuizResult, AppError>;

    /// Most recent result by `created_at`.
    async fn get_latest_result(&self, quiz_id: Uuid, user_id: Uuid) -> Result<QuizResult, AppError>;
}

pub(crate) fn ensure_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("Quiz title must not be empty".to_string()));
    }
    Ok(())
}

pub(crate) fn quiz_not_found() -> AppError {
    AppError::NotFound("Quiz not found".to_string())
}

pub(crate) fn result_not_found() -> AppError {
    AppError::NotFound("No result found for this quiz".to_string())
}
