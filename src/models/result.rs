// src/models/result.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One graded question inside a result, snapshotted at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: Uuid,
    pub question_text: String,

    /// Selected letter, or an empty string when the question was left unanswered.
    pub user_answer: String,

    pub correct_answer: String,
    pub is_correct: bool,
}

/// Represents the 'results' table in the database.
/// Stores one completed attempt; immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub user_id: Uuid,
    pub score: i32,
    pub total_questions: i32,
    pub answers: Vec<AnswerRecord>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Gateway input for `create_result`. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDraft {
    pub quiz_id: Uuid,
    pub user_id: Uuid,
    pub score: i32,
    pub total_questions: i32,
    pub answers: Vec<AnswerRecord>,
}

impl ResultDraft {
    pub fn into_result(self, id: Uuid, created_at: chrono::DateTime<chrono::Utc>) -> QuizResult {
        QuizResult {
            id,
            quiz_id: self.quiz_id,
            user_id: self.user_id,
            score: self.score,
            total_questions: self.total_questions,
            answers: self.answers,
            created_at,
        }
    }
}
