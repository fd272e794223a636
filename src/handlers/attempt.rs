// src/handlers/attempt.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    handlers::result::ResultResponse,
    models::{question::AnswerLetter, user::Identity},
    quiz::{
        attempt::{Attempt, AttemptView},
        grading::grade,
        presentation::ResultSummary,
        registry::AttemptRegistry,
    },
    state::SharedStore,
};

#[derive(Debug, Deserialize)]
pub struct SelectAnswerRequest {
    pub answer: AnswerLetter,
}

#[derive(Debug, Deserialize)]
pub struct PositionRequest {
    pub index: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmitAttemptRequest {
    /// Must be true to submit with unanswered questions.
    #[serde(default)]
    pub confirm: bool,
}

/// Starts taking a quiz. Anyone may start an attempt; submitting needs sign-in.
///
/// The attempt is registered as `Loading`, then hydrated from the store.
/// A missing quiz or one without questions fails the attempt and discards it.
pub async fn start_attempt(
    State(store): State<SharedStore>,
    State(attempts): State<AttemptRegistry>,
    Extension(identity): Extension<Option<Identity>>,
    Path(quiz_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let owner = identity.as_ref().map(|i| i.id);
    let attempt = Attempt::new(Uuid::new_v4(), quiz_id).owned_by(owner);
    let id = attempt.id();
    attempts.insert(attempt).await;

    let questions = match store.get_questions(quiz_id).await {
        Ok(questions) => questions,
        Err(e) => {
            attempts.update(id, |a| a.fail(e.to_string())).await?;
            attempts.remove(id).await;
            return Err(e);
        }
    };

    let view = attempts
        .update(id, |a| {
            a.hydrate(questions)?;
            Ok(a.view())
        })
        .await?;

    if view.status.is_terminal() {
        attempts.remove(id).await;
        return Err(AppError::NotFound("Quiz has no questions".to_string()));
    }

    tracing::info!(
        attempt_id = %id,
        %quiz_id,
        user_id = ?owner,
        "Attempt started"
    );

    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_attempt(
    State(attempts): State<AttemptRegistry>,
    Path(id): Path<Uuid>,
) -> Result<Json<AttemptView>, AppError> {
    Ok(Json(attempts.get(id).await?.view()))
}

pub async fn select_answer(
    State(attempts): State<AttemptRegistry>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectAnswerRequest>,
) -> Result<Json<AttemptView>, AppError> {
    let view = attempts
        .update(id, |a| {
            a.select_answer(req.answer)?;
            Ok(a.view())
        })
        .await?;
    Ok(Json(view))
}

pub async fn go_next(
    State(attempts): State<AttemptRegistry>,
    Path(id): Path<Uuid>,
) -> Result<Json<AttemptView>, AppError> {
    let view = attempts
        .update(id, |a| {
            a.go_next()?;
            Ok(a.view())
        })
        .await?;
    Ok(Json(view))
}

pub async fn go_previous(
    State(attempts): State<AttemptRegistry>,
    Path(id): Path<Uuid>,
) -> Result<Json<AttemptView>, AppError> {
    let view = attempts
        .update(id, |a| {
            a.go_previous()?;
            Ok(a.view())
        })
        .await?;
    Ok(Json(view))
}

pub async fn set_position(
    State(attempts): State<AttemptRegistry>,
    Path(id): Path<Uuid>,
    Json(req): Json<PositionRequest>,
) -> Result<Json<AttemptView>, AppError> {
    let view = attempts
        .update(id, |a| {
            a.go_to(req.index)?;
            Ok(a.view())
        })
        .await?;
    Ok(Json(view))
}

/// Grades and persists an attempt.
///
/// * Only the user who started the attempt may submit it; anonymous attempts
///   are credited to the submitter.
/// * Moves the attempt to `Submitting`; unanswered questions need `confirm`.
/// * Grades outside the registry lock and writes the result.
/// * On success the attempt is completed and dropped; on failure it returns
///   to `InProgress` with its answers so the user can retry.
pub async fn submit_attempt(
    State(store): State<SharedStore>,
    State(attempts): State<AttemptRegistry>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (quiz_id, questions, selected) = attempts
        .update(id, |a| {
            a.ensure_owner(identity.id)?;
            a.begin_submit(req.confirm)?;
            Ok((a.quiz_id(), a.questions().to_vec(), a.selected_answers().clone()))
        })
        .await?;

    let draft = grade(&questions, &selected).into_draft(quiz_id, identity.id);

    let persisted = match store.upsert_user(&identity).await {
        Ok(()) => store.create_result(draft).await,
        Err(e) => Err(e),
    };

    let result = match persisted {
        Ok(result) => result,
        Err(e) => {
            if let Err(rollback) = attempts.update(id, |a| a.submission_failed()).await {
                tracing::warn!(attempt_id = %id, "Could not roll back attempt: {}", rollback);
            }
            return Err(e);
        }
    };

    attempts.update(id, |a| a.complete()).await?;
    attempts.remove(id).await;

    let summary = ResultSummary::from_result(&result)?;

    tracing::info!(
        attempt_id = %id,
        result_id = %result.id,
        %quiz_id,
        user_id = %identity.id,
        score = result.score,
        total = result.total_questions,
        band = %summary.band,
        "Attempt submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(ResultResponse {
            quiz: None,
            result,
            summary,
        }),
    ))
}

/// Discards an attempt the user navigated away from.
pub async fn discard_attempt(
    State(attempts): State<AttemptRegistry>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    attempts.discard(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
