//! # Notes Indexer
//!
//! Builds the `notes.json` index for a directory of annotated HTML notes and
//! keeps it fresh.
//!
//! ## Pipeline
//!
//! ```text
//! notes/*.html
//!     │
//!     ├──> NoteExtractor (metadata comment + git date)
//!     │      └─> Note
//!     │
//!     ├──> NotesAggregator (filter drafts, sort by date)
//!     │      └─> notes.json
//!     │
//!     └──> ChangeMonitor (mtime polling)
//!            └─> rebuild on change
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use notes_indexer::{GitGateway, NotesAggregator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> notes_indexer::Result<()> {
//!     let vcs = Arc::new(GitGateway::new("."));
//!     let aggregator = NotesAggregator::new("./notes", "./notes.json", vcs);
//!     if let Some(stats) = aggregator.rebuild().await? {
//!         println!("Indexed {} notes", stats.published);
//!     }
//!     Ok(())
//! }
//! ```

mod aggregator;
mod config;
mod error;
mod metadata;
mod monitor;
mod note;
mod stats;
mod vcs;

pub use aggregator::{read_index, write_index, NotesAggregator};
pub use config::{
    IndexerConfig, DEFAULT_GIT_TIMEOUT, DEFAULT_NOTES_DIR, DEFAULT_OUTPUT_PATH,
    DEFAULT_POLL_INTERVAL, DEFAULT_REPO_DIR,
};
pub use error::{IndexerError, Result};
pub use metadata::{NoteExtractor, NoteMetadata, NOTE_EXTENSION};
pub use monitor::{ChangeMonitor, MonitorHandle, TickOutcome};
pub use note::{CommitRecord, Note, NotesIndex, PUBLISHED_STATUS};
pub use stats::BuildStats;
pub use vcs::{parse_commit_line, parse_commit_log, GitGateway, VersionControl};
