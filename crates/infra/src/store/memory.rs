//! In-memory token store
//!
//! Used by tests and by deployments that do not want cross-process token
//! persistence. The `failing` variant simulates a broken store so callers'
//! best-effort handling can be exercised.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use prospectarc_core::ports::TokenStore;
use prospectarc_domain::{ProspectError, Result};

/// HashMap-backed [`TokenStore`]
#[derive(Default)]
pub struct MemoryTokenStore {
    values: Mutex<HashMap<String, String>>,
    fail: bool,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Variant whose every operation fails with a `Store` error
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Seed a value directly, bypassing the async interface
    pub fn preload(&self, key: &str, value: &str) {
        self.values.lock().insert(key.to_string(), value.to_string());
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail {
            return Err(ProspectError::Store("memory store configured to fail".into()));
        }
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail {
            return Err(ProspectError::Store("memory store configured to fail".into()));
        }
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
