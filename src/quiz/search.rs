// src/quiz/search.rs

use crate::models::quiz::QuizSummary;

/// Filters an already-fetched list by a case-insensitive substring of the
/// title or description. A blank query keeps everything.
pub fn search_quizzes(quizzes: Vec<QuizSummary>, query: &str) -> Vec<QuizSummary> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return quizzes;
    }

    quizzes
        .into_iter()
        .filter(|quiz| {
            quiz.title.to_lowercase().contains(&needle)
                || quiz.description.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn summary(title: &str, description: &str) -> QuizSummary {
        QuizSummary {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            creator_id: Uuid::new_v4(),
            creator_name: "Anonymous".into(),
            question_count: 1,
            created_at: chrono::Utc::now(),
        }
    }

    fn titles(list: &[QuizSummary]) -> Vec<&str> {
        list.iter().map(|q| q.title.as_str()).collect()
    }

    #[test]
    fn matches_title_or_description_ignoring_case() {
        let list = vec![
            summary("World History", ""),
            summary("Chemistry", "Periodic table and HISTORY of elements"),
            summary("Algebra", "linear equations"),
        ];
        let found = search_quizzes(list, "history");
        assert_eq!(titles(&found), vec!["World History", "Chemistry"]);
    }

    #[test]
    fn blank_query_keeps_order() {
        let list = vec![summary("B", ""), summary("A", "")];
        assert_eq!(titles(&search_quizzes(list, "   ")), vec!["B", "A"]);
    }

    #[test]
    fn no_match_is_empty() {
        let list = vec![summary("Rivers", "of Europe")];
        assert!(search_quizzes(list, "mountains").is_empty());
    }
}
