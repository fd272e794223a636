// src/quiz/grading.rs

use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{
    question::{AnswerLetter, Question},
    result::{AnswerRecord, ResultDraft},
};

/// Score of one graded attempt, before it gets a quiz/user attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grade {
    pub score: i32,
    pub total_questions: i32,
    pub answers: Vec<AnswerRecord>,
}

impl Grade {
    pub fn into_draft(self, quiz_id: Uuid, user_id: Uuid) -> ResultDraft {
        ResultDraft {
            quiz_id,
            user_id,
            score: self.score,
            total_questions: self.total_questions,
            answers: self.answers,
        }
    }
}

/// Grades selected answers against the answer key.
///
/// Answers keep the order of `questions`. An unanswered question is recorded
/// with an empty `user_answer` and is always incorrect.
pub fn grade(questions: &[Question], selected: &HashMap<Uuid, AnswerLetter>) -> Grade {
    let answers: Vec<AnswerRecord> = questions
        .iter()
        .map(|q| {
            let user_answer = selected.get(&q.id).map(|l| l.as_str()).unwrap_or("");
            let correct_answer = q.correct_answer.as_str();

            AnswerRecord {
                question_id: q.id,
                question_text: q.question_text.clone(),
                user_answer: user_answer.to_string(),
                correct_answer: correct_answer.to_string(),
                is_correct: user_answer == correct_answer,
            }
        })
        .collect();

    let score = answers.iter().filter(|a| a.is_correct).count() as i32;

    Grade {
        score,
        total_questions: answers.len() as i32,
        answers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(order_index: i32, correct: AnswerLetter) -> Question {
        Question {
            id: Uuid::new_v4(),
            quiz_id: Uuid::nil(),
            question_text: format!("Question {}", order_index + 1),
            options: vec!["w".into(), "x".into(), "y".into(), "z".into()],
            correct_answer: correct,
            order_index,
        }
    }

    #[test]
    fn empty_selection_scores_zero() {
        let questions = vec![question(0, AnswerLetter::A), question(1, AnswerLetter::B)];
        let grade = grade(&questions, &HashMap::new());

        assert_eq!(grade.score, 0);
        assert_eq!(grade.total_questions, 2);
        assert!(grade.answers.iter().all(|a| a.user_answer.is_empty() && !a.is_correct));
    }

    #[test]
    fn score_counts_matching_letters() {
        let questions = vec![
            question(0, AnswerLetter::A),
            question(1, AnswerLetter::B),
            question(2, AnswerLetter::C),
            question(3, AnswerLetter::D),
        ];
        let mut selected = HashMap::new();
        selected.insert(questions[0].id, AnswerLetter::A);
        selected.insert(questions[1].id, AnswerLetter::C); // Wrong
        selected.insert(questions[3].id, AnswerLetter::D);

        let grade = grade(&questions, &selected);
        assert_eq!(grade.score, 2);
        assert_eq!(
            grade.answers.iter().map(|a| a.is_correct).collect::<Vec<_>>(),
            vec![true, false, false, true]
        );
    }

    #[test]
    fn answers_follow_question_order() {
        let questions = vec![question(0, AnswerLetter::B), question(1, AnswerLetter::D)];
        let grade = grade(&questions, &HashMap::new());

        let ids: Vec<Uuid> = grade.answers.iter().map(|a| a.question_id).collect();
        assert_eq!(ids, vec![questions[0].id, questions[1].id]);
        assert_eq!(grade.answers[1].correct_answer, "D");
    }

    #[test]
    fn partial_attempt_leaves_blank_answer() {
        let questions = vec![question(0, AnswerLetter::B), question(1, AnswerLetter::D)];
        let mut selected = HashMap::new();
        selected.insert(questions[0].id, AnswerLetter::B);

        let grade = grade(&questions, &selected);
        assert_eq!(grade.score, 1);
        assert_eq!(grade.total_questions, 2);
        assert!(!grade.answers[1].is_correct);
        assert_eq!(grade.answers[1].user_answer, "");
    }

    #[test]
    fn selections_for_unknown_questions_are_ignored() {
        let questions = vec![question(0, AnswerLetter::A)];
        let mut selected = HashMap::new();
        selected.insert(Uuid::new_v4(), AnswerLetter::A);

        assert_eq!(grade(&questions, &selected).score, 0);
    }

    #[test]
    fn grading_is_deterministic() {
        let questions = vec![question(0, AnswerLetter::C), question(1, AnswerLetter::A)];
        let mut selected = HashMap::new();
        selected.insert(questions[0].id, AnswerLetter::C);

        assert_eq!(grade(&questions, &selected), grade(&questions, &selected));
    }

    #[test]
    fn draft_carries_attribution() {
        let questions = vec![question(0, AnswerLetter::A)];
        let quiz_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        let draft = grade(&questions, &HashMap::new()).into_draft(quiz_id, user_id);
        assert_eq!(draft.quiz_id, quiz_id);
        assert_eq!(draft.user_id, user_id);
        assert_eq!(draft.answers.len() as i32, draft.total_questions);
    }
}
