// src/store/memory.rs
use async_trait::async_trait;

use super::SignalStore;
use crate::error::PersistenceError;
use crate::signal::Signal;

/// In-memory store for tests and dry runs.
///
/// Inserts whose title contains `fail_on` are rejected and leave nothing behind.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub signals: Vec<Signal>,
    pub fail_on: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(title_fragment: &str) -> Self {
        Self {
            signals: Vec::new(),
            fail_on: Some(title_fragment.to_string()),
        }
    }
}

#[async_trait]
impl SignalStore for MemoryStore {
    async fn insert(&mut self, signal: &Signal) -> Result<(), PersistenceError> {
        if let Some(frag) = &self.fail_on {
            if signal.title.contains(frag.as_str()) {
                return Err(PersistenceError::Rejected(format!(
                    "constraint violation for {:?}",
                    signal.title
                )));
            }
        }
        self.signals.push(signal.clone());
        Ok(())
    }
}
