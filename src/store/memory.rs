// src/store/memory.rs

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{QuizStore, ensure_title, quiz_not_found, result_not_found};
use crate::{
    error::AppError,
    models::{
        question::{Question, QuestionDraft},
        quiz::{NewQuiz, Quiz, QuizSummary},
        result::{QuizResult, ResultDraft},
        user::Identity,
    },
};

#[derive(Default)]
struct Tables {
    /// user id -> display name
    users: HashMap<Uuid, Option<String>>,
    /// Insertion order, oldest first.
    quizzes: Vec<Quiz>,
    questions: Vec<Question>,
    results: Vec<QuizResult>,
}

/// Process-local record store used when no database is configured and by tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn upsert_user(&self, identity: &Identity) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let name = identity.attribution_name();
        let entry = tables.users.entry(identity.id).or_insert(None);
        if name.is_some() {
            *entry = name;
        }
        Ok(())
    }

    async fn create_quiz(&self, draft: NewQuiz) -> Result<Quiz, AppError> {
        ensure_title(&draft.title)?;

        let quiz = Quiz {
            id: Uuid::new_v4(),
            title: draft.title.trim().to_string(),
            description: draft.description,
            creator_id: draft.creator_id,
            created_at: chrono::Utc::now(),
        };
        self.tables.write().await.quizzes.push(quiz.clone());
        Ok(quiz)
    }

    async fn create_questions(&self, quiz_id: Uuid, questions: &[QuestionDraft]) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;

        if !tables.quizzes.iter().any(|q| q.id == quiz_id) {
            return Err(quiz_not_found());
        }
        if !questions.is_empty() && tables.questions.iter().any(|q| q.quiz_id == quiz_id) {
            return Err(AppError::Persistence(format!(
                "quiz {} already has questions",
                quiz_id
            )));
        }

        let rows = questions.iter().enumerate().map(|(index, q)| Question {
            id: Uuid::new_v4(),
            quiz_id,
            question_text: q.question_text.clone(),
            options: q.options.clone(),
            correct_answer: q.correct_answer,
            order_index: index as i32,
        });
        tables.questions.extend(rows);
        Ok(())
    }

    async fn list_quizzes(&self, limit: Option<i64>) -> Result<Vec<QuizSummary>, AppError> {
        let tables = self.tables.read().await;
        let take = limit.map_or(usize::MAX, |l| l.max(0) as usize);

        Ok(tables
            .quizzes
            .iter()
            .rev()
            .take(take)
            .map(|quiz| {
                let creator_name = tables.users.get(&quiz.creator_id).cloned().flatten();
                let count = tables.questions.iter().filter(|q| q.quiz_id == quiz.id).count() as i64;
                QuizSummary::from_parts(quiz.clone(), creator_name, Some(count))
            })
            .collect())
    }

    async fn get_quiz(&self, id: Uuid) -> Result<Quiz, AppError> {
        self.tables
            .read()
            .await
            .quizzes
            .iter()
            .find(|q| q.id == id)
            .cloned()
            .ok_or_else(quiz_not_found)
    }

    async fn get_questions(&self, quiz_id: Uuid) -> Result<Vec<Question>, AppError> {
        let tables = self.tables.read().await;
        if !tables.quizzes.iter().any(|q| q.id == quiz_id) {
            return Err(quiz_not_found());
        }

        let mut questions: Vec<Question> = tables
            .questions
            .iter()
            .filter(|q| q.quiz_id == quiz_id)
            .cloned()
            .collect();
        questions.sort_by_key(|q| q.order_index);
        Ok(questions)
    }

    async fn create_result(&self, draft: ResultDraft) -> Result<QuizResult, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.quizzes.iter().any(|q| q.id == draft.quiz_id) {
            return Err(quiz_not_found());
        }

        let result = draft.into_result(Uuid::new_v4(), chrono::Utc::now());
        tables.results.push(result.clone());
        Ok(result)
    }

    async fn get_latest_result(&self, quiz_id: Uuid, user_id: Uuid) -> Result<QuizResult, AppError> {
        // `max_by_key` keeps the last of equal keys, i.e. the latest insert.
        self.tables
            .read()
            .await
            .results
            .iter()
            .filter(|r| r.quiz_id == quiz_id && r.user_id == user_id)
            .max_by_key(|r| r.created_at)
            .cloned()
            .ok_or_else(result_not_found)
    }
}
