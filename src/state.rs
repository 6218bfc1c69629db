//! Shared application state: entity store, local cache, AI client, prompts,
//! and the per-session locks that serialize chat exchanges.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, RwLock};
use tracing::{info, instrument};

use crate::ai::OpenAI;
use crate::cache::LocalCache;
use crate::config::{load_agent_config_from_env, Prompts};
use crate::store::EntityStore;

pub struct AppState {
    pub store: EntityStore,
    pub cache: LocalCache,
    pub openai: Option<OpenAI>,
    pub prompts: Prompts,
    session_locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl AppState {
    /// Build state from env: load prompt overrides, init cache and AI client.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let prompts = load_agent_config_from_env().map(|c| c.prompts).unwrap_or_default();
        let cache = LocalCache::from_env();

        let openai = OpenAI::from_env();
        if let Some(oa) = &openai {
            info!(target: "sciencespark_backend", base_url = %oa.base_url, fast_model = %oa.fast_model, strong_model = %oa.strong_model, "AI provider enabled.");
        } else {
            info!(target: "sciencespark_backend", "AI provider disabled (no OPENAI_API_KEY). Chat, quiz and resource generation will degrade.");
        }

        Self {
            store: EntityStore::new(),
            cache,
            openai,
            prompts,
            session_locks: RwLock::new(HashMap::new()),
        }
    }

    /// The lock serializing exchanges for one session. Locks are created on
    /// first use and kept for the life of the process (sessions are few and
    /// never deleted).
    pub async fn session_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        {
            let locks = self.session_locks.read().await;
            if let Some(lock) = locks.get(session_id) {
                return lock.clone();
            }
        }
        let mut locks = self.session_locks.write().await;
        locks.entry(session_id.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        let dir = std::env::temp_dir().join(format!("sciencespark-test-{}", uuid::Uuid::new_v4()));
        Self {
            store: EntityStore::new(),
            cache: LocalCache::new(dir, chrono::Duration::hours(1)),
            openai: None,
            prompts: Prompts::default(),
            session_locks: RwLock::new(HashMap::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn session_lock_is_shared_per_session() {
        let state = AppState::for_tests();
        let a = state.session_lock("s1").await;
        let b = state.session_lock("s1").await;
        let c = state.session_lock("s2").await;
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
