// tests/postgres_store_tests.rs

use std::collections::HashMap;

use mindmint::{
    error::AppError,
    models::{
        question::{AnswerLetter, QuestionDraft},
        quiz::NewQuiz,
        result::{AnswerRecord, ResultDraft},
        user::Identity,
    },
    quiz::grading::grade,
    store::{PgStore, QuizStore},
};
use uuid::Uuid;

/// Connects to the database named by DATABASE_URL and applies migrations.
/// Returns `None` when no database is configured so the suite can run without one.
async fn connect_store() -> Option<PgStore> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres store tests");
        return None;
    };

    let store = PgStore::connect(&database_url, 2)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");
    store.migrate().await.expect("Failed to migrate database");
    Some(store)
}

fn identity(name: &str) -> Identity {
    Identity {
        id: Uuid::new_v4(),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        display_name: Some(name.to_string()),
    }
}

fn draft(text: &str, correct: AnswerLetter) -> QuestionDraft {
    QuestionDraft {
        question_text: text.to_string(),
        options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        correct_answer: correct,
    }
}

#[tokio::test]
async fn quiz_to_latest_result_round_trip() {
    let Some(store) = connect_store().await else {
        return;
    };

    let author = identity("Grace");
    store.upsert_user(&author).await.unwrap();

    let title = format!("Round trip {}", Uuid::new_v4());
    let quiz = store
        .create_quiz(NewQuiz {
            title: format!("  {}  ", title),
            description: "Postgres gateway".into(),
            creator_id: author.id,
        })
        .await
        .unwrap();
    assert_eq!(quiz.title, title);

    store
        .create_questions(
            quiz.id,
            &[
                draft("First", AnswerLetter::A),
                draft("Second", AnswerLetter::C),
                draft("Third", AnswerLetter::D),
            ],
        )
        .await
        .unwrap();

    // Unbounded listing includes the quiz with its joined columns.
    let all = store.list_quizzes(None).await.unwrap();
    let summary = all.iter().find(|s| s.id == quiz.id).expect("quiz not listed");
    assert_eq!(summary.creator_name, "Grace");
    assert_eq!(summary.question_count, 3);
    assert_eq!(summary.created_at, quiz.created_at);
    assert!(store.list_quizzes(Some(1)).await.unwrap().len() <= 1);

    let found = store.search_quizzes(&title.to_uppercase()).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, quiz.id);

    let questions = store.get_questions(quiz.id).await.unwrap();
    let texts: Vec<&str> = questions.iter().map(|q| q.question_text.as_str()).collect();
    assert_eq!(texts, vec!["First", "Second", "Third"]);
    let order: Vec<i32> = questions.iter().map(|q| q.order_index).collect();
    assert_eq!(order, vec![0, 1, 2]);
    assert_eq!(questions[1].correct_answer, AnswerLetter::C);
    assert_eq!(questions[2].options, vec!["a", "b", "c", "d"]);

    let taker = identity("Linus");
    store.upsert_user(&taker).await.unwrap();

    let selected = HashMap::from([
        (questions[0].id, AnswerLetter::A),
        (questions[1].id, AnswerLetter::B),
    ]);
    let first = store
        .create_result(grade(&questions, &selected).into_draft(quiz.id, taker.id))
        .await
        .unwrap();
    assert_eq!(first.score, 1);
    assert_eq!(first.total_questions, 3);
    assert_eq!(first.answers[2].user_answer, "");

    let latest = store.get_latest_result(quiz.id, taker.id).await.unwrap();
    assert_eq!(latest, first);

    let all_right = HashMap::from([
        (questions[0].id, AnswerLetter::A),
        (questions[1].id, AnswerLetter::C),
        (questions[2].id, AnswerLetter::D),
    ]);
    let second = store
        .create_result(grade(&questions, &all_right).into_draft(quiz.id, taker.id))
        .await
        .unwrap();
    assert_eq!(store.get_latest_result(quiz.id, taker.id).await.unwrap(), second);

    // The author never took the quiz.
    assert!(matches!(
        store.get_latest_result(quiz.id, author.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn missing_quiz_references_are_not_found() {
    let Some(store) = connect_store().await else {
        return;
    };

    let user = identity("Ada");
    store.upsert_user(&user).await.unwrap();
    let missing = Uuid::new_v4();

    assert!(matches!(store.get_quiz(missing).await, Err(AppError::NotFound(_))));
    assert!(matches!(store.get_questions(missing).await, Err(AppError::NotFound(_))));
    assert!(matches!(
        store
            .create_questions(missing, &[draft("Orphan", AnswerLetter::B)])
            .await,
        Err(AppError::NotFound(_))
    ));

    let orphan = ResultDraft {
        quiz_id: missing,
        user_id: user.id,
        score: 0,
        total_questions: 1,
        answers: vec![AnswerRecord {
            question_id: Uuid::new_v4(),
            question_text: "Orphan".into(),
            user_answer: String::new(),
            correct_answer: "B".into(),
            is_correct: false,
        }],
    };
    assert!(matches!(store.create_result(orphan).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn blank_title_is_rejected_before_insert() {
    let Some(store) = connect_store().await else {
        return;
    };

    let user = identity("Edsger");
    store.upsert_user(&user).await.unwrap();

    let err = store
        .create_quiz(NewQuiz {
            title: "   ".into(),
            description: String::new(),
            creator_id: user.id,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}
