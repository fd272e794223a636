// src/models/question.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Number of options every question carries.
pub const OPTION_COUNT: usize = 4;

/// One of the four answer letters. Letter `A` refers to `options[0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerLetter {
    A,
    B,
    C,
    D,
}

impl AnswerLetter {
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerLetter::A => "A",
            AnswerLetter::B => "B",
            AnswerLetter::C => "C",
            AnswerLetter::D => "D",
        }
    }
}

impl fmt::Display for AnswerLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidLetter(pub String);

impl fmt::Display for InvalidLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not one of A, B, C, D", self.0)
    }
}

impl std::error::Error for InvalidLetter {}

/// Exact, case-sensitive parse.
impl FromStr for AnswerLetter {
    type Err = InvalidLetter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(AnswerLetter::A),
            "B" => Ok(AnswerLetter::B),
            "C" => Ok(AnswerLetter::C),
            "D" => Ok(AnswerLetter::D),
            other => Err(InvalidLetter(other.to_string())),
        }
    }
}

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub question_text: String,

    /// Exactly four options, stored as a JSON array.
    pub options: Vec<String>,

    pub correct_answer: AnswerLetter,

    /// 0-based presentation order, unique within a quiz.
    pub order_index: i32,
}

/// DTO for sending a question to a quiz taker (excludes the answer key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: Uuid,
    pub question_text: String,
    pub options: Vec<String>,
    pub order_index: i32,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            question_text: q.question_text.clone(),
            options: q.options.clone(),
            order_index: q.order_index,
        }
    }
}

/// DTO for one question inside a quiz creation request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuestionDraft {
    #[validate(length(max = 1000, message = "Question text must be at most 1000 characters"))]
    pub question_text: String,
    #[validate(custom(function = validate_option_lengths))]
    pub options: Vec<String>,
    pub correct_answer: AnswerLetter,
}

fn validate_option_lengths(options: &[String]) -> Result<(), validator::ValidationError> {
    for opt in options {
        if opt.chars().count() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_parse_exactly() {
        assert_eq!("C".parse::<AnswerLetter>(), Ok(AnswerLetter::C));
        assert!("c".parse::<AnswerLetter>().is_err());
        assert!("".parse::<AnswerLetter>().is_err());
        assert!("AB".parse::<AnswerLetter>().is_err());
    }

    fn draft_with_option(option: String) -> QuestionDraft {
        QuestionDraft {
            question_text: "Pick one".into(),
            options: vec![option, "b".into(), "c".into(), "d".into()],
            correct_answer: AnswerLetter::B,
        }
    }

    #[test]
    fn option_length_counts_characters() {
        // 500 chars, 1500 bytes.
        assert!(draft_with_option("語".repeat(500)).validate().is_ok());
        assert!(draft_with_option("語".repeat(501)).validate().is_err());
    }

    #[test]
    fn letters_serialize_as_plain_strings() {
        assert_eq!(serde_json::to_string(&AnswerLetter::B).unwrap(), "\"B\"");
        assert!(serde_json::from_str::<AnswerLetter>("\"d\"").is_err());
    }
}
