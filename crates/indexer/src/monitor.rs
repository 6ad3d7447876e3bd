//! Polling change detection for the notes directory.
//!
//! Every tick computes the newest modification time among the `.html` files
//! under the notes directory (recursively) and rebuilds the index when it is
//! newer than anything seen so far. Detection latency is bounded by the poll
//! interval.

use crate::aggregator::NotesAggregator;
use crate::error::{IndexerError, Result};
use crate::metadata::NOTE_EXTENSION;
use crate::stats::BuildStats;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use walkdir::WalkDir;

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The notes directory does not exist.
    Missing,
    /// Nothing newer than the last rebuild.
    Fresh,
    /// The index was rebuilt.
    Rebuilt(Option<BuildStats>),
}

pub struct ChangeMonitor {
    aggregator: Arc<NotesAggregator>,
    interval: Duration,
    /// `None` until a rebuild has succeeded against an observed mtime.
    last_known_max_mtime: Option<SystemTime>,
}

impl ChangeMonitor {
    pub fn new(aggregator: Arc<NotesAggregator>, interval: Duration) -> Self {
        Self {
            aggregator,
            interval,
            last_known_max_mtime: None,
        }
    }

    #[must_use]
    pub fn last_known_max_mtime(&self) -> Option<SystemTime> {
        self.last_known_max_mtime
    }

    pub async fn tick(&mut self) -> Result<TickOutcome> {
        let root = self.aggregator.notes_dir().to_path_buf();
        let Some(observed) = scan_max_mtime(root).await? else {
            return Ok(TickOutcome::Missing);
        };

        if observed <= self.last_known_max_mtime {
            return Ok(TickOutcome::Fresh);
        }

        // Only advance after a successful rebuild so failures retry next tick.
        let stats = self.aggregator.rebuild().await?;
        self.last_known_max_mtime = observed;
        Ok(TickOutcome::Rebuilt(stats))
    }

    /// Run the polling loop on the tokio runtime until shut down.
    #[must_use]
    pub fn start(mut self) -> MonitorHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            info!(
                "Watching {} every {}ms",
                self.aggregator.notes_dir().display(),
                self.interval.as_millis()
            );
            let mut ticker = time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(err) = self.tick().await {
                            error!("Watch error: {err}");
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("Change monitor stopped");
        });

        MonitorHandle { shutdown_tx, task }
    }
}

pub struct MonitorHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Signal the loop to stop and wait for it. An in-flight tick completes first.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown_tx.send(true);
        self.task
            .await
            .map_err(|e| IndexerError::Other(format!("change monitor task failed: {e}")))
    }
}

/// `Ok(None)` when the directory is missing; `Ok(Some(None))` when it holds
/// no readable `.html` files.
async fn scan_max_mtime(root: PathBuf) -> Result<Option<Option<SystemTime>>> {
    tokio::task::spawn_blocking(move || {
        if !root.is_dir() {
            return None;
        }
        Some(max_note_mtime(&root))
    })
    .await
    .map_err(|e| IndexerError::Other(format!("failed to scan notes directory: {e}")))
}

fn max_note_mtime(root: &Path) -> Option<SystemTime> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| !entry.file_type().is_dir())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(NOTE_EXTENSION))
        })
        .filter_map(|entry| std::fs::metadata(entry.path()).ok()?.modified().ok())
        .max()
}
