use crate::config::IndexerConfig;
use crate::error::{IndexerError, Result};
use crate::metadata::{NoteExtractor, NOTE_EXTENSION};
use crate::note::{Note, NotesIndex};
use crate::stats::BuildStats;
use crate::vcs::VersionControl;
use chrono::Local;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex as TokioMutex;

/// Builds `notes.json` from every note in the notes directory.
///
/// Each rebuild recomputes the whole index. Rebuilds are serialized, so a
/// monitor tick and an explicit rebuild request never interleave their writes.
pub struct NotesAggregator {
    notes_dir: PathBuf,
    output_path: PathBuf,
    extractor: NoteExtractor,
    write_lock: TokioMutex<()>,
}

impl NotesAggregator {
    pub fn new(
        notes_dir: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        vcs: Arc<dyn VersionControl>,
    ) -> Self {
        Self {
            notes_dir: notes_dir.into(),
            output_path: output_path.into(),
            extractor: NoteExtractor::new(vcs),
            write_lock: TokioMutex::new(()),
        }
    }

    pub fn from_config(config: &IndexerConfig, vcs: Arc<dyn VersionControl>) -> Self {
        Self::new(&config.notes_dir, &config.output_path, vcs)
    }

    #[must_use]
    pub fn notes_dir(&self) -> &Path {
        &self.notes_dir
    }

    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    #[must_use]
    pub fn vcs(&self) -> &Arc<dyn VersionControl> {
        self.extractor.vcs()
    }

    /// Rebuild and persist the index.
    ///
    /// Returns `Ok(None)` without touching the output when the notes
    /// directory does not exist.
    pub async fn rebuild(&self) -> Result<Option<BuildStats>> {
        let _guard = self.write_lock.lock().await;
        let start = Instant::now();

        let Some((notes, mut stats)) = self.collect_notes().await? else {
            log::debug!(
                "Notes directory {} is missing; skipping rebuild",
                self.notes_dir.display()
            );
            return Ok(None);
        };

        let index = NotesIndex::new(timestamp_now(), notes);
        write_index(&self.output_path, &index).await?;

        #[allow(clippy::cast_possible_truncation)]
        {
            stats.time_ms = start.elapsed().as_millis() as u64;
        }
        log::info!(
            "Generated {} with {} notes ({} excluded, {} failed) in {}ms",
            self.output_path.display(),
            index.count,
            stats.excluded,
            stats.failed,
            stats.time_ms
        );
        Ok(Some(stats))
    }

    /// Extract, filter and order the published notes without writing anything.
    pub async fn collect_notes(&self) -> Result<Option<(Vec<Note>, BuildStats)>> {
        let Some(files) = self.list_note_files().await? else {
            return Ok(None);
        };

        let mut stats = BuildStats::new();
        let mut notes = Vec::with_capacity(files.len());
        for path in &files {
            stats.scanned += 1;
            match self.extractor.extract(path).await {
                Ok(note) if note.is_visible() => notes.push(note),
                Ok(note) => {
                    log::debug!("Skipping unpublished note {}", note.slug);
                    stats.excluded += 1;
                }
                Err(e) => {
                    log::warn!("Error parsing {}: {e}", path.display());
                    stats.add_error(format!("{}: {e}", path.display()));
                }
            }
        }

        // Stable: notes sharing a date keep filename order.
        notes.sort_by(|a, b| b.date.cmp(&a.date));
        stats.published = notes.len();
        self.extractor.forget_missing(&files);

        Ok(Some((notes, stats)))
    }

    /// Top-level `.html` entries, sorted by file name.
    async fn list_note_files(&self) -> Result<Option<Vec<PathBuf>>> {
        match tokio::fs::metadata(&self.notes_dir).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(IndexerError::InvalidPath(format!(
                    "not a directory: {}",
                    self.notes_dir.display()
                )))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.notes_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if name
                .to_str()
                .is_some_and(|name| name.ends_with(NOTE_EXTENSION))
            {
                names.push(name);
            }
        }
        names.sort();

        Ok(Some(
            names
                .into_iter()
                .map(|name| self.notes_dir.join(name))
                .collect(),
        ))
    }
}

/// Overwrites `path` with the pretty-printed index.
pub async fn write_index(path: &Path, index: &NotesIndex) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let bytes = serde_json::to_vec_pretty(index)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

pub async fn read_index(path: &Path) -> Result<Option<NotesIndex>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = tokio::fs::read(path).await?;
    Ok(Some(serde_json::from_slice(&bytes)?))
}

fn timestamp_now() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_is_iso_8601() {
        let stamp = timestamp_now();
        assert!(chrono::NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%dT%H:%M:%S%.f").is_ok());
    }
}
