use serde::{Deserialize, Serialize};

/// Counters for one rebuild of the notes index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    /// `.html` files looked at.
    pub scanned: usize,
    pub published: usize,
    /// Drafts and notes with a non-published status.
    pub excluded: usize,
    pub failed: usize,
    pub errors: Vec<String>,
    pub time_ms: u64,
}

impl BuildStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: String) {
        self.failed += 1;
        self.errors.push(error);
    }
}
