// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::question::{PublicQuestion, QuestionDraft};

/// Display name used when a quiz's creator has no name on record.
pub const ANONYMOUS_CREATOR: &str = "Anonymous";

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub creator_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A quiz row joined with its creator's name and its question count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub creator_id: Uuid,
    pub creator_name: String,
    pub question_count: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl QuizSummary {
    /// Builds a summary from the optional joined columns.
    pub fn from_parts(quiz: Quiz, creator_name: Option<String>, question_count: Option<i64>) -> Self {
        let creator_name = creator_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| ANONYMOUS_CREATOR.to_string());

        Self {
            id: quiz.id,
            title: quiz.title,
            description: quiz.description,
            creator_id: quiz.creator_id,
            creator_name,
            question_count: question_count.unwrap_or(0),
            created_at: quiz.created_at,
        }
    }
}

/// Gateway input for `create_quiz`.
#[derive(Debug, Clone)]
pub struct NewQuiz {
    pub title: String,
    pub description: String,
    pub creator_id: Uuid,
}

/// DTO for creating a quiz together with its questions.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(nested)]
    pub questions: Vec<QuestionDraft>,
}

/// Query parameters for listing quizzes.
#[derive(Debug, Deserialize)]
pub struct QuizListParams {
    /// Newest-first page size; everything when absent.
    pub limit: Option<i64>,

    /// Case-insensitive search over title and description.
    pub q: Option<String>,
}

/// Response for a single quiz as seen by a quiz taker.
#[derive(Debug, Serialize)]
pub struct QuizDetail {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<PublicQuestion>,
}
