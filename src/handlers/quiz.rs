// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        question::PublicQuestion,
        quiz::{CreateQuizRequest, NewQuiz, QuizDetail, QuizListParams},
        user::Identity,
    },
    quiz::authoring::{normalize_draft, validate_draft},
    state::SharedStore,
};

/// Creates a quiz and its questions.
///
/// * Validates the draft (first failure wins) before anything is written.
/// * Writes the quiz, then its questions. If the questions fail after the quiz
///   row exists, the caller gets a `PartialPersistence` error with the quiz id.
pub async fn create_quiz(
    State(store): State<SharedStore>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_draft(&payload.title, &payload.questions)?;
    payload.validate()?;

    let draft = normalize_draft(payload);

    store.upsert_user(&identity).await?;

    let quiz = store
        .create_quiz(NewQuiz {
            title: draft.title,
            description: draft.description.unwrap_or_default(),
            creator_id: identity.id,
        })
        .await?;

    if let Err(e) = store.create_questions(quiz.id, &draft.questions).await {
        return Err(AppError::PartialPersistence {
            quiz_id: quiz.id,
            message: e.to_string(),
        });
    }

    tracing::info!(
        quiz_id = %quiz.id,
        creator_id = %identity.id,
        questions = draft.questions.len(),
        "Quiz created"
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": quiz.id,
            "quiz": quiz,
            "question_count": draft.questions.len(),
        })),
    ))
}

/// Lists quizzes newest-first.
/// With `q`, the fetched list is filtered by title/description and then cut to `limit`.
pub async fn list_quizzes(
    State(store): State<SharedStore>,
    Query(params): Query<QuizListParams>,
) -> Result<impl IntoResponse, AppError> {
    if params.limit.is_some_and(|l| l < 0) {
        return Err(AppError::Validation("limit must not be negative".to_string()));
    }

    let quizzes = match params.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        Some(query) => {
            let mut found = store.search_quizzes(query).await?;
            if let Some(limit) = params.limit {
                found.truncate(limit as usize);
            }
            found
        }
        None => store.list_quizzes(params.limit).await?,
    };

    Ok(Json(quizzes))
}

/// Retrieves a quiz with its questions, without the answer key.
pub async fn get_quiz(
    State(store): State<SharedStore>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = store.get_quiz(id).await?;
    let questions = store.get_questions(id).await?;

    Ok(Json(QuizDetail {
        quiz,
        questions: questions.iter().map(PublicQuestion::from).collect(),
    }))
}
