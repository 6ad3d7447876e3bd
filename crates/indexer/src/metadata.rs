//! Note metadata extraction.
//!
//! A note may carry a metadata block in its first HTML comment:
//!
//! ```text
//! <!--
//! title: Borrow checker notes
//! date: 2024-03-05
//! tags: rust, lifetimes
//! -->
//! ```
//!
//! ## Grammar
//!
//! - Only the first `<!--` … `-->` pair is considered.
//! - Every line of the block is read on its own. An entry is
//!   `<key>: <value>` where `key` is one or more word characters
//!   (alphanumerics or `_`) directly followed by `:`, optionally preceded by
//!   whitespace. The value is trimmed and must not be empty.
//! - Anything else is ignored, as are unknown keys.
//! - When a key repeats, the last entry wins.

use crate::error::{IndexerError, Result};
use crate::note::{Note, PUBLISHED_STATUS};
use crate::vcs::VersionControl;
use chrono::Local;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const NOTE_EXTENSION: &str = ".html";
const NOTES_URL_PREFIX: &str = "/notes/";

static COMMENT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(?s)<!--(.*?)-->").expect("comment block pattern is valid")
});

/// Recognized metadata keys. `None` means the key was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteMetadata {
    pub date: Option<String>,
    pub title: Option<String>,
    pub title_ru: Option<String>,
    pub description: Option<String>,
    pub description_ru: Option<String>,
    pub tags: Option<String>,
    pub status: Option<String>,
    pub draft: Option<String>,
}

impl NoteMetadata {
    /// Parses the first comment block of `content`, if there is one.
    #[must_use]
    pub fn parse(content: &str) -> Option<Self> {
        let block = COMMENT_BLOCK.captures(content)?.get(1)?.as_str();
        let mut meta = Self::default();
        for (key, value) in block.lines().filter_map(parse_entry) {
            meta.set(key, value);
        }
        Some(meta)
    }

    fn set(&mut self, key: &str, value: &str) {
        let slot = match key {
            "date" => &mut self.date,
            "title" => &mut self.title,
            "title_ru" => &mut self.title_ru,
            "description" => &mut self.description,
            "description_ru" => &mut self.description_ru,
            "tags" => &mut self.tags,
            "status" => &mut self.status,
            "draft" => &mut self.draft,
            _ => return,
        };
        *slot = Some(value.to_string());
    }

    /// Comma separated tags, trimmed, empties dropped, order kept.
    #[must_use]
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    }

    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.draft
            .as_deref()
            .is_some_and(|value| value.trim().to_lowercase() == "true")
    }
}

fn parse_entry(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.trim_start().split_once(':')?;
    if key.is_empty() || !key.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Turns note files into [`Note`] records.
pub struct NoteExtractor {
    vcs: Arc<dyn VersionControl>,
    fallback_dates: Mutex<HashMap<PathBuf, String>>,
}

impl NoteExtractor {
    pub fn new(vcs: Arc<dyn VersionControl>) -> Self {
        Self {
            vcs,
            fallback_dates: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn vcs(&self) -> &Arc<dyn VersionControl> {
        &self.vcs
    }

    /// Reads and parses one note file.
    pub async fn extract(&self, path: &Path) -> Result<Note> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                IndexerError::InvalidPath(format!("no usable file name: {}", path.display()))
            })?
            .to_string();

        let bytes = tokio::fs::read(path).await?;
        let content = String::from_utf8(bytes)?;
        let meta = NoteMetadata::parse(&content).unwrap_or_default();

        let slug = file_name
            .strip_suffix(NOTE_EXTENSION)
            .unwrap_or(&file_name)
            .to_string();

        let date = match meta.date.clone() {
            Some(date) => date,
            None => self.resolve_date(path).await,
        };

        let title = meta.title.clone().unwrap_or_else(|| slug.clone());
        let title_ru = meta.title_ru.clone().unwrap_or_else(|| title.clone());

        Ok(Note {
            date,
            title,
            title_ru,
            description: meta.description.clone().unwrap_or_default(),
            description_ru: meta.description_ru.clone().unwrap_or_default(),
            tags: meta.tag_list(),
            status: meta
                .status
                .clone()
                .unwrap_or_else(|| PUBLISHED_STATUS.to_string()),
            draft: meta.is_draft(),
            url: format!("{NOTES_URL_PREFIX}{file_name}"),
            slug,
        })
    }

    /// Drops remembered fallback dates for files outside `present`.
    pub fn forget_missing(&self, present: &[PathBuf]) {
        let mut cache = self
            .fallback_dates
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        cache.retain(|path, _| present.contains(path));
    }

    async fn resolve_date(&self, path: &Path) -> String {
        if let Some(date) = self.vcs.last_commit_date(path).await {
            return date;
        }

        // Remembered per file so reruns do not reorder undated notes at midnight.
        let mut cache = self
            .fallback_dates
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        cache
            .entry(path.to_path_buf())
            .or_insert_with(|| {
                debug!("No commit date for {}; using today", path.display());
                today()
            })
            .clone()
    }
}

pub(crate) fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}
