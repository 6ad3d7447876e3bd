use serde::{Deserialize, Serialize};

pub const PUBLISHED_STATUS: &str = "published";

/// One published note as it appears in `notes.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    pub slug: String,
    pub date: String,
    pub title: String,
    pub title_ru: String,
    pub description: String,
    pub description_ru: String,
    pub tags: Vec<String>,
    pub status: String,
    pub draft: bool,
    pub url: String,
}

impl Note {
    /// Drafts and anything not explicitly published stay out of the index.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !self.draft && self.status == PUBLISHED_STATUS
    }
}

/// The aggregated artifact consumed by the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotesIndex {
    pub updated: String,
    pub count: usize,
    pub notes: Vec<Note>,
}

impl NotesIndex {
    #[must_use]
    pub fn new(updated: String, notes: Vec<Note>) -> Self {
        Self {
            updated,
            count: notes.len(),
            notes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitRecord {
    pub hash: String,
    pub date: String,
    pub message: String,
}
