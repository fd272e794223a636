// src/quiz/registry.rs

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::RwLock;
use uuid::Uuid;

use super::attempt::{Attempt, AttemptError, AttemptStatus};
use crate::error::AppError;

struct Entry {
    attempt: Attempt,
    touched_at: Instant,
}

/// Live attempts of this process, keyed by attempt id.
///
/// Each mutation runs entirely under the write lock, so callers see it applied
/// in full or not at all. The lock is never held across a store call.
/// Attempts idle for longer than `ttl` are evicted, except while submitting.
#[derive(Clone)]
pub struct AttemptRegistry {
    attempts: Arc<RwLock<HashMap<Uuid, Entry>>>,
    ttl: Duration,
}

fn attempt_not_found() -> AppError {
    AppError::NotFound("Attempt not found".to_string())
}

impl AttemptRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            attempts: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Registers a new attempt, evicting stale ones first.
    pub async fn insert(&self, attempt: Attempt) {
        let now = Instant::now();
        let mut attempts = self.attempts.write().await;
        evict_stale(&mut attempts, now, self.ttl);
        attempts.insert(
            attempt.id(),
            Entry {
                attempt,
                touched_at: now,
            },
        );
    }

    pub async fn get(&self, id: Uuid) -> Result<Attempt, AppError> {
        let mut attempts = self.attempts.write().await;
        let entry = attempts.get_mut(&id).ok_or_else(attempt_not_found)?;
        entry.touched_at = Instant::now();
        Ok(entry.attempt.clone())
    }

    /// Applies `f` to the attempt and returns its output.
    /// The attempt is left untouched when `f` fails.
    pub async fn update<T, F>(&self, id: Uuid, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Attempt) -> Result<T, AttemptError>,
    {
        let mut attempts = self.attempts.write().await;
        let entry = attempts.get_mut(&id).ok_or_else(attempt_not_found)?;

        let mut draft = entry.attempt.clone();
        let out = f(&mut draft)?;
        entry.attempt = draft;
        entry.touched_at = Instant::now();
        Ok(out)
    }

    pub async fn remove(&self, id: Uuid) -> Option<Attempt> {
        self.attempts.write().await.remove(&id).map(|e| e.attempt)
    }

    /// Drops an attempt the user navigated away from.
    /// An attempt whose result is being written cannot be discarded.
    pub async fn discard(&self, id: Uuid) -> Result<(), AppError> {
        let mut attempts = self.attempts.write().await;
        match attempts.get(&id).map(|e| e.attempt.status()) {
            None => Err(attempt_not_found()),
            Some(AttemptStatus::Submitting) => Err(AppError::Conflict(
                "cannot discard an attempt while it is being submitted".to_string(),
            )),
            Some(_) => {
                attempts.remove(&id);
                Ok(())
            }
        }
    }

    /// Evicts attempts idle for longer than the ttl. Returns how many were dropped.
    pub async fn prune_stale(&self) -> usize {
        let mut attempts = self.attempts.write().await;
        evict_stale(&mut attempts, Instant::now(), self.ttl)
    }

    pub async fn len(&self) -> usize {
        self.attempts.read().await.len()
    }

    /// Runs `prune_stale` every `period` until the runtime shuts down.
    pub fn spawn_sweeper(&self, period: Duration) -> tokio::task::JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = registry.prune_stale().await;
                if evicted > 0 {
                    let live = registry.len().await;
                    tracing::info!(evicted, live, "Evicted idle attempts");
                }
            }
        })
    }
}

fn evict_stale(attempts: &mut HashMap<Uuid, Entry>, now: Instant, ttl: Duration) -> usize {
    let before = attempts.len();
    attempts.retain(|_, e| {
        e.attempt.status() == AttemptStatus::Submitting || now.duration_since(e.touched_at) <= ttl
    });
    before - attempts.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{AnswerLetter, Question};

    fn one_question(quiz_id: Uuid) -> Vec<Question> {
        vec![Question {
            id: Uuid::new_v4(),
            quiz_id,
            question_text: "Q".into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer: AnswerLetter::A,
            order_index: 0,
        }]
    }

    #[tokio::test]
    async fn update_applies_or_leaves_untouched() {
        let registry = AttemptRegistry::new(Duration::from_secs(60));
        let attempt = Attempt::new(Uuid::new_v4(), Uuid::new_v4());
        let id = attempt.id();
        registry.insert(attempt).await;

        // Loading attempts cannot move forward; nothing changes.
        assert!(registry.update(id, |a| a.go_next()).await.is_err());
        assert_eq!(registry.get(id).await.unwrap().status(), AttemptStatus::Loading);

        registry.update(id, |a| a.fail("gone")).await.unwrap();
        assert_eq!(registry.get(id).await.unwrap().status(), AttemptStatus::Failed);
    }

    #[tokio::test]
    async fn unknown_attempt_is_not_found() {
        let registry = AttemptRegistry::new(Duration::from_secs(60));
        assert!(matches!(
            registry.get(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            registry.update(Uuid::new_v4(), |a| a.go_next()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn remove_drops_attempt() {
        let registry = AttemptRegistry::new(Duration::from_secs(60));
        let attempt = Attempt::new(Uuid::new_v4(), Uuid::new_v4());
        let id = attempt.id();
        registry.insert(attempt).await;
        assert_eq!(registry.len().await, 1);

        assert!(registry.remove(id).await.is_some());
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn submitting_attempt_cannot_be_discarded() {
        let registry = AttemptRegistry::new(Duration::from_secs(60));
        let mut attempt = Attempt::new(Uuid::new_v4(), Uuid::new_v4());
        attempt.hydrate(one_question(attempt.quiz_id())).unwrap();
        let id = attempt.id();
        registry.insert(attempt).await;

        registry.update(id, |a| a.begin_submit(true)).await.unwrap();
        assert!(matches!(registry.discard(id).await, Err(AppError::Conflict(_))));

        registry.update(id, |a| a.submission_failed()).await.unwrap();
        registry.discard(id).await.unwrap();
        assert!(matches!(registry.discard(id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn idle_attempts_are_evicted_on_insert() {
        let registry = AttemptRegistry::new(Duration::from_millis(20));
        let abandoned = Attempt::new(Uuid::new_v4(), Uuid::new_v4());
        let abandoned_id = abandoned.id();
        registry.insert(abandoned).await;

        tokio::time::sleep(Duration::from_millis(50)).await;

        let fresh = Attempt::new(Uuid::new_v4(), Uuid::new_v4());
        let fresh_id = fresh.id();
        registry.insert(fresh).await;

        assert!(matches!(registry.get(abandoned_id).await, Err(AppError::NotFound(_))));
        assert!(registry.get(fresh_id).await.is_ok());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn pruning_spares_attempts_being_submitted() {
        let registry = AttemptRegistry::new(Duration::from_millis(40));
        let idle = Attempt::new(Uuid::new_v4(), Uuid::new_v4());
        let idle_id = idle.id();
        let mut busy = Attempt::new(Uuid::new_v4(), Uuid::new_v4());
        busy.hydrate(one_question(busy.quiz_id())).unwrap();
        let busy_id = busy.id();
        registry.insert(idle).await;
        registry.insert(busy).await;
        registry.update(busy_id, |a| a.begin_submit(true)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(registry.prune_stale().await, 1);
        assert!(registry.get(idle_id).await.is_err());
        assert_eq!(
            registry.get(busy_id).await.unwrap().status(),
            AttemptStatus::Submitting
        );
    }
}
