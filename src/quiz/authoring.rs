// src/quiz/authoring.rs

use crate::{
    error::AppError,
    models::{
        question::{OPTION_COUNT, QuestionDraft},
        quiz::CreateQuizRequest,
    },
};

/// Validates a draft quiz. Rules run in order and the first failure is returned;
/// question numbers in messages are 1-based.
pub fn validate_draft(title: &str, questions: &[QuestionDraft]) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("Please enter a quiz title".to_string()));
    }

    if questions.is_empty() {
        return Err(AppError::Validation(
            "Please add at least one question".to_string(),
        ));
    }

    for (i, q) in questions.iter().enumerate() {
        let number = i + 1;

        if q.question_text.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "Please enter text for question {}",
                number
            )));
        }

        if q.options.len() != OPTION_COUNT {
            return Err(AppError::Validation(format!(
                "Question {} must have exactly {} options",
                number, OPTION_COUNT
            )));
        }

        if q.options.iter().any(|opt| opt.trim().is_empty()) {
            return Err(AppError::Validation(format!(
                "Please fill all options for question {}",
                number
            )));
        }
    }

    Ok(())
}

/// Trims every free-text field of a validated draft.
pub fn normalize_draft(req: CreateQuizRequest) -> CreateQuizRequest {
    CreateQuizRequest {
        title: req.title.trim().to_string(),
        description: req.description.map(|d| d.trim().to_string()),
        questions: req
            .questions
            .into_iter()
            .map(|q| QuestionDraft {
                question_text: q.question_text.trim().to_string(),
                options: q.options.iter().map(|opt| opt.trim().to_string()).collect(),
                correct_answer: q.correct_answer,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::AnswerLetter;

    fn draft(text: &str, options: [&str; 4]) -> QuestionDraft {
        QuestionDraft {
            question_text: text.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer: AnswerLetter::A,
        }
    }

    fn message(result: Result<(), AppError>) -> String {
        match result {
            Err(AppError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn accepts_complete_draft() {
        let questions = vec![draft("Capital of France?", ["Paris", "Rome", "Oslo", "Bern"])];
        assert!(validate_draft("Geography", &questions).is_ok());
    }

    #[test]
    fn rejects_whitespace_title() {
        let questions = vec![draft("Q", ["a", "b", "c", "d"])];
        assert_eq!(message(validate_draft("   ", &questions)), "Please enter a quiz title");
    }

    #[test]
    fn rejects_empty_question_list() {
        assert_eq!(
            message(validate_draft("Title", &[])),
            "Please add at least one question"
        );
    }

    #[test]
    fn reports_blank_third_option_with_question_number() {
        let questions = vec![
            draft("First", ["a", "b", "c", "d"]),
            draft("Second", ["a", "b", "", "d"]),
        ];
        assert_eq!(
            message(validate_draft("Title", &questions)),
            "Please fill all options for question 2"
        );
    }

    #[test]
    fn blank_text_is_reported_before_blank_options() {
        let questions = vec![draft("  ", ["", "", "", ""])];
        assert_eq!(
            message(validate_draft("Title", &questions)),
            "Please enter text for question 1"
        );
    }

    #[test]
    fn title_failure_wins_over_question_failures() {
        let questions = vec![draft("", ["", "", "", ""])];
        assert_eq!(message(validate_draft("", &questions)), "Please enter a quiz title");
    }

    #[test]
    fn rejects_wrong_option_count() {
        let questions = vec![QuestionDraft {
            question_text: "Q".into(),
            options: vec!["a".into(), "b".into(), "c".into()],
            correct_answer: AnswerLetter::B,
        }];
        assert_eq!(
            message(validate_draft("Title", &questions)),
            "Question 1 must have exactly 4 options"
        );
    }

    #[test]
    fn normalize_trims_all_text() {
        let req = CreateQuizRequest {
            title: "  Rivers ".into(),
            description: Some(" long ones ".into()),
            questions: vec![draft(" Longest? ", [" Nile", "Amazon ", " Yangtze ", "Volga"])],
        };
        let normalized = normalize_draft(req);

        assert_eq!(normalized.title, "Rivers");
        assert_eq!(normalized.description.as_deref(), Some("long ones"));
        assert_eq!(normalized.questions[0].question_text, "Longest?");
        assert_eq!(
            normalized.questions[0].options,
            vec!["Nile", "Amazon", "Yangtze", "Volga"]
        );
    }
}
