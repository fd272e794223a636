// src/quiz/presentation.rs

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::{error::AppError, models::result::QuizResult};

const NOT_ANSWERED: &str = "Not answered";

/// Qualitative band for a score percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Band {
    #[serde(rename = "excellent")]
    Excellent,
    #[serde(rename = "good")]
    Good,
    #[serde(rename = "keep practicing")]
    KeepPracticing,
    #[serde(rename = "nice try")]
    NiceTry,
}

impl Band {
    /// Lower bounds are inclusive, first match wins.
    pub fn for_percentage(percentage: u32) -> Self {
        match percentage {
            p if p >= 80 => Band::Excellent,
            p if p >= 60 => Band::Good,
            p if p >= 40 => Band::KeepPracticing,
            _ => Band::NiceTry,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Band::Excellent => "excellent",
            Band::Good => "good",
            Band::KeepPracticing => "keep practicing",
            Band::NiceTry => "nice try",
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            Band::Excellent => "Excellent Work!",
            Band::Good => "Good Job!",
            Band::KeepPracticing => "Keep Practicing!",
            Band::NiceTry => "Nice Try!",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the answer review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewItem {
    /// 1-based position in the quiz.
    pub number: usize,
    pub question_id: Uuid,
    pub question_text: String,
    /// `None` when the question was left unanswered.
    pub user_answer: Option<String>,
    /// The selected letter, or "Not answered".
    pub user_answer_label: String,
    /// Only shown for incorrect answers.
    pub correct_answer: Option<String>,
    pub is_correct: bool,
}

/// Everything the result page shows, derived from a persisted result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSummary {
    pub percentage: u32,
    pub band: Band,
    pub headline: &'static str,
    pub score_label: String,
    pub review: Vec<ReviewItem>,
}

/// `round(100 * score / total)`, halves rounded up.
pub fn percentage(score: i32, total_questions: i32) -> Result<u32, AppError> {
    if total_questions <= 0 {
        return Err(AppError::InternalServerError(format!(
            "result has total_questions = {}",
            total_questions
        )));
    }
    if score < 0 || score > total_questions {
        return Err(AppError::InternalServerError(format!(
            "result score {} is outside 0..={}",
            score, total_questions
        )));
    }

    let score = u64::from(score.unsigned_abs());
    let total = u64::from(total_questions.unsigned_abs());
    // At most 100 by the range check above.
    Ok(((200 * score + total) / (2 * total)) as u32)
}

impl ResultSummary {
    pub fn from_result(result: &QuizResult) -> Result<Self, AppError> {
        let percentage = percentage(result.score, result.total_questions)?;
        let band = Band::for_percentage(percentage);

        let review = result
            .answers
            .iter()
            .enumerate()
            .map(|(index, answer)| {
                let user_answer = Some(answer.user_answer.clone()).filter(|a| !a.is_empty());
                ReviewItem {
                    number: index + 1,
                    question_id: answer.question_id,
                    question_text: answer.question_text.clone(),
                    user_answer_label: user_answer
                        .clone()
                        .unwrap_or_else(|| NOT_ANSWERED.to_string()),
                    user_answer,
                    correct_answer: (!answer.is_correct).then(|| answer.correct_answer.clone()),
                    is_correct: answer.is_correct,
                }
            })
            .collect();

        Ok(Self {
            percentage,
            band,
            headline: band.headline(),
            score_label: format!("{}/{}", result.score, result.total_questions),
            review,
        })
    }
}
