// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{config::Config, quiz::registry::AttemptRegistry, store::QuizStore};

pub type SharedStore = Arc<dyn QuizStore>;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub attempts: AttemptRegistry,
    pub config: Config,
}

impl AppState {
    pub fn new(store: SharedStore, config: Config) -> Self {
        Self {
            store,
            attempts: AttemptRegistry::new(config.attempt_ttl),
            config,
        }
    }
}

impl FromRef<AppState> for SharedStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for AttemptRegistry {
    fn from_ref(state: &AppState) -> Self {
        state.attempts.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
