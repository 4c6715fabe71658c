//! Setter test double shared by unit and integration tests.

use anyhow::Result;
use std::sync::{Arc, Mutex};

use super::{AppearanceMode, AppearanceSetter};

/// Records every mode it is asked to apply. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingSetter {
    applied: Arc<Mutex<Vec<AppearanceMode>>>,
}

impl RecordingSetter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn applied(&self) -> Vec<AppearanceMode> {
        self.applied
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn count(&self) -> usize {
        self.applied().len()
    }
}

impl AppearanceSetter for RecordingSetter {
    fn apply(&mut self, mode: AppearanceMode) -> Result<()> {
        self.applied
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(mode);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
