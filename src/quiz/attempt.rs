// src/quiz/attempt.rs

use std::{collections::HashMap, fmt};

use serde::Serialize;
use uuid::Uuid;

use crate::models::question::{AnswerLetter, PublicQuestion, Question};

/// Lifecycle of an attempt.
///
/// `Loading -> InProgress -> Submitting -> Completed`, with `Loading -> Failed`
/// and `Submitting -> InProgress` when persisting the result fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Loading,
    InProgress,
    Submitting,
    Completed,
    Failed,
}

impl AttemptStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, AttemptStatus::Completed | AttemptStatus::Failed)
    }
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttemptStatus::Loading => "loading",
            AttemptStatus::InProgress => "in progress",
            AttemptStatus::Submitting => "submitting",
            AttemptStatus::Completed => "completed",
            AttemptStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    /// The operation is not allowed in the attempt's current status.
    InvalidState {
        operation: &'static str,
        status: AttemptStatus,
    },
    /// Some questions are unanswered and the caller did not confirm.
    ConfirmationRequired { answered: usize, total: usize },
    /// The attempt was started by another signed-in user.
    NotOwner,
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::InvalidState { operation, status } => {
                write!(f, "cannot {} while the attempt is {}", operation, status)
            }
            AttemptError::ConfirmationRequired { answered, total } => write!(
                f,
                "only {} of {} questions answered, confirmation required",
                answered, total
            ),
            AttemptError::NotOwner => f.write_str("attempt belongs to another user"),
        }
    }
}

impl std::error::Error for AttemptError {}

/// One in-memory taking session of a quiz.
#[derive(Debug, Clone)]
pub struct Attempt {
    id: Uuid,
    quiz_id: Uuid,
    /// Set when a signed-in user started the attempt.
    owner: Option<Uuid>,
    questions: Vec<Question>,
    current_index: usize,
    selected_answers: HashMap<Uuid, AnswerLetter>,
    status: AttemptStatus,
    failure: Option<String>,
}

impl Attempt {
    pub fn new(id: Uuid, quiz_id: Uuid) -> Self {
        Self {
            id,
            quiz_id,
            owner: None,
            questions: Vec::new(),
            current_index: 0,
            selected_answers: HashMap::new(),
            status: AttemptStatus::Loading,
            failure: None,
        }
    }

    pub fn owned_by(mut self, owner: Option<Uuid>) -> Self {
        self.owner = owner;
        self
    }

    pub fn owner(&self) -> Option<Uuid> {
        self.owner
    }

    /// Anonymous attempts may be claimed by whoever signs in to submit them.
    pub fn ensure_owner(&self, user_id: Uuid) -> Result<(), AttemptError> {
        match self.owner {
            Some(owner) if owner != user_id => Err(AttemptError::NotOwner),
            _ => Ok(()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn quiz_id(&self) -> Uuid {
        self.quiz_id
    }

    pub fn status(&self) -> AttemptStatus {
        self.status
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn selected_answers(&self) -> &HashMap<Uuid, AnswerLetter> {
        &self.selected_answers
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn selected_for_current(&self) -> Option<AnswerLetter> {
        self.current_question()
            .and_then(|q| self.selected_answers.get(&q.id).copied())
    }

    fn expect_status(&self, expected: AttemptStatus, operation: &'static str) -> Result<(), AttemptError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(AttemptError::InvalidState {
                operation,
                status: self.status,
            })
        }
    }

    /// Loads the ordered questions. A quiz without questions cannot be taken.
    pub fn hydrate(&mut self, mut questions: Vec<Question>) -> Result<(), AttemptError> {
        self.expect_status(AttemptStatus::Loading, "load questions")?;

        if questions.is_empty() {
            self.status = AttemptStatus::Failed;
            self.failure = Some("quiz has no questions".to_string());
            return Ok(());
        }

        questions.sort_by_key(|q| q.order_index);
        self.questions = questions;
        self.current_index = 0;
        self.status = AttemptStatus::InProgress;
        Ok(())
    }

    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), AttemptError> {
        self.expect_status(AttemptStatus::Loading, "fail loading")?;
        self.status = AttemptStatus::Failed;
        self.failure = Some(reason.into());
        Ok(())
    }

    /// Records `letter` for the current question, replacing any earlier choice.
    pub fn select_answer(&mut self, letter: AnswerLetter) -> Result<(), AttemptError> {
        self.expect_status(AttemptStatus::InProgress, "select an answer")?;
        // InProgress always has at least one question.
        if let Some(question_id) = self.current_question().map(|q| q.id) {
            self.selected_answers.insert(question_id, letter);
        }
        Ok(())
    }

    pub fn go_next(&mut self) -> Result<(), AttemptError> {
        self.expect_status(AttemptStatus::InProgress, "move to the next question")?;
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
        }
        Ok(())
    }

    pub fn go_previous(&mut self) -> Result<(), AttemptError> {
        self.expect_status(AttemptStatus::InProgress, "move to the previous question")?;
        self.current_index = self.current_index.saturating_sub(1);
        Ok(())
    }

    /// Jumps to `index`, clamped to the last question.
    pub fn go_to(&mut self, index: usize) -> Result<(), AttemptError> {
        self.expect_status(AttemptStatus::InProgress, "jump to a question")?;
        self.current_index = index.min(self.questions.len().saturating_sub(1));
        Ok(())
    }

    /// `(current_index + 1) / total_questions`, or `0.0` before questions load.
    pub fn progress_fraction(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        (self.current_index + 1) as f64 / self.questions.len() as f64
    }

    pub fn answered_count(&self) -> usize {
        self.selected_answers.len()
    }

    pub fn requires_confirmation(&self) -> bool {
        self.answered_count() < self.total_questions()
    }

    /// Moves to `Submitting`. Unanswered questions need `confirmed = true`.
    pub fn begin_submit(&mut self, confirmed: bool) -> Result<(), AttemptError> {
        self.expect_status(AttemptStatus::InProgress, "submit")?;

        if self.requires_confirmation() && !confirmed {
            return Err(AttemptError::ConfirmationRequired {
                answered: self.answered_count(),
                total: self.total_questions(),
            });
        }

        self.status = AttemptStatus::Submitting;
        Ok(())
    }

    /// Returns to `InProgress` with every selection intact so the user can retry.
    pub fn submission_failed(&mut self) -> Result<(), AttemptError> {
        self.expect_status(AttemptStatus::Submitting, "roll back a submission")?;
        self.status = AttemptStatus::InProgress;
        Ok(())
    }

    pub fn complete(&mut self) -> Result<(), AttemptError> {
        self.expect_status(AttemptStatus::Submitting, "complete")?;
        self.status = AttemptStatus::Completed;
        Ok(())
    }

    pub fn view(&self) -> AttemptView {
        AttemptView {
            id: self.id,
            quiz_id: self.quiz_id,
            status: self.status,
            current_index: self.current_index,
            total_questions: self.total_questions(),
            answered_count: self.answered_count(),
            progress: self.progress_fraction(),
            requires_confirmation: self.requires_confirmation(),
            current_question: self.current_question().map(PublicQuestion::from),
            selected_answer: self.selected_for_current(),
            failure: self.failure.clone(),
        }
    }
}

/// Snapshot of an attempt for the quiz-taking screen. Never exposes the answer key.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptView {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub status: AttemptStatus,
    pub current_index: usize,
    pub total_questions: usize,
    pub answered_count: usize,
    pub progress: f64,
    pub requires_confirmation: bool,
    pub current_question: Option<PublicQuestion>,
    pub selected_answer: Option<AnswerLetter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}
