// src/handlers/result.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{quiz::Quiz, result::QuizResult, user::Identity},
    quiz::presentation::ResultSummary,
    state::SharedStore,
};

/// A persisted result with the derived presentation.
#[derive(Debug, Serialize)]
pub struct ResultResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Quiz>,
    pub result: QuizResult,
    pub summary: ResultSummary,
}

/// Returns the caller's most recent result for a quiz.
pub async fn get_latest_result(
    State(store): State<SharedStore>,
    Extension(identity): Extension<Identity>,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<ResultResponse>, AppError> {
    let quiz = store.get_quiz(quiz_id).await?;
    let result = store.get_latest_result(quiz_id, identity.id).await?;
    let summary = ResultSummary::from_result(&result)?;

    Ok(Json(ResultResponse {
        quiz: Some(quiz),
        result,
        summary,
    }))
}
