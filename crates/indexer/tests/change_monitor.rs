//! Tests for mtime-based change detection

use async_trait::async_trait;
use notes_indexer::{
    read_index, ChangeMonitor, CommitRecord, NotesAggregator, TickOutcome, VersionControl,
};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

struct NoVcs;

#[async_trait]
impl VersionControl for NoVcs {
    async fn last_commit_date(&self, _path: &Path) -> Option<String> {
        None
    }

    async fn recent_commits(&self, _limit: usize) -> Vec<CommitRecord> {
        Vec::new()
    }
}

fn aggregator_in(temp: &TempDir) -> Arc<NotesAggregator> {
    Arc::new(NotesAggregator::new(
        temp.path().join("notes"),
        temp.path().join("out").join("notes.json"),
        Arc::new(NoVcs),
    ))
}

fn write_note(path: &Path, date: &str, mtime: SystemTime) {
    std::fs::write(path, format!("<!-- date: {date} -->")).unwrap();
    set_mtime(path, mtime);
}

fn set_mtime(path: &Path, mtime: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(mtime)
        .unwrap();
}

fn base_time() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
}

#[tokio::test]
async fn test_missing_directory_skips_tick() {
    let temp = TempDir::new().unwrap();
    let aggregator = aggregator_in(&temp);
    let mut monitor = ChangeMonitor::new(aggregator.clone(), Duration::from_secs(5));

    assert_eq!(monitor.tick().await.unwrap(), TickOutcome::Missing);
    assert_eq!(monitor.last_known_max_mtime(), None);
    assert!(!aggregator.output_path().exists());
}

#[tokio::test]
async fn test_empty_directory_does_not_rebuild() {
    let temp = TempDir::new().unwrap();
    let aggregator = aggregator_in(&temp);
    std::fs::create_dir(aggregator.notes_dir()).unwrap();
    std::fs::write(aggregator.notes_dir().join("notes.txt"), "ignored").unwrap();
    let mut monitor = ChangeMonitor::new(aggregator.clone(), Duration::from_secs(5));

    assert_eq!(monitor.tick().await.unwrap(), TickOutcome::Fresh);
    assert!(!aggregator.output_path().exists());
}

#[tokio::test]
async fn test_rebuilds_only_when_mtime_advances() {
    let temp = TempDir::new().unwrap();
    let aggregator = aggregator_in(&temp);
    let dir = aggregator.notes_dir().to_path_buf();
    std::fs::create_dir(&dir).unwrap();
    let note = dir.join("first.html");
    write_note(&note, "2024-01-01", base_time());

    let mut monitor = ChangeMonitor::new(aggregator.clone(), Duration::from_secs(5));

    let outcome = monitor.tick().await.unwrap();
    assert!(matches!(outcome, TickOutcome::Rebuilt(Some(_))));
    assert_eq!(monitor.last_known_max_mtime(), Some(base_time()));

    assert_eq!(monitor.tick().await.unwrap(), TickOutcome::Fresh);

    // An older file appearing does not count as newer content.
    write_note(
        &dir.join("older.html"),
        "2023-01-01",
        base_time() - Duration::from_secs(60),
    );
    assert_eq!(monitor.tick().await.unwrap(), TickOutcome::Fresh);

    let later = base_time() + Duration::from_secs(30);
    write_note(&note, "2024-02-02", later);
    let outcome = monitor.tick().await.unwrap();
    assert!(matches!(outcome, TickOutcome::Rebuilt(Some(_))));
    assert_eq!(monitor.last_known_max_mtime(), Some(later));

    let index = read_index(aggregator.output_path()).await.unwrap().unwrap();
    let dates: Vec<&str> = index.notes.iter().map(|n| n.date.as_str()).collect();
    assert_eq!(dates, vec!["2024-02-02", "2023-01-01"]);
}

#[tokio::test]
async fn test_nested_notes_trigger_rebuild() {
    let temp = TempDir::new().unwrap();
    let aggregator = aggregator_in(&temp);
    let nested = aggregator.notes_dir().join("drafts").join("2024");
    std::fs::create_dir_all(&nested).unwrap();
    write_note(&aggregator.notes_dir().join("top.html"), "2024-01-01", base_time());

    let mut monitor = ChangeMonitor::new(aggregator.clone(), Duration::from_secs(5));
    monitor.tick().await.unwrap();

    let later = base_time() + Duration::from_secs(10);
    write_note(&nested.join("deep.html"), "2024-03-03", later);
    let outcome = monitor.tick().await.unwrap();
    assert!(matches!(outcome, TickOutcome::Rebuilt(_)));
    assert_eq!(monitor.last_known_max_mtime(), Some(later));
}

#[tokio::test]
async fn test_failed_rebuild_is_retried_next_tick() {
    let temp = TempDir::new().unwrap();
    let notes_dir = temp.path().join("notes");
    std::fs::create_dir(&notes_dir).unwrap();
    write_note(&notes_dir.join("a.html"), "2024-01-01", base_time());

    // The output's parent is a regular file, so the write fails.
    let blocker = temp.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let aggregator = Arc::new(NotesAggregator::new(
        &notes_dir,
        blocker.join("notes.json"),
        Arc::new(NoVcs),
    ));
    let mut monitor = ChangeMonitor::new(aggregator.clone(), Duration::from_secs(5));

    assert!(monitor.tick().await.is_err());
    assert_eq!(monitor.last_known_max_mtime(), None);

    std::fs::remove_file(&blocker).unwrap();
    let outcome = monitor.tick().await.unwrap();
    assert!(matches!(outcome, TickOutcome::Rebuilt(Some(_))));
    assert!(aggregator.output_path().exists());
}

#[tokio::test]
async fn test_background_loop_converges_and_shuts_down() {
    let temp = TempDir::new().unwrap();
    let aggregator = aggregator_in(&temp);
    std::fs::create_dir(aggregator.notes_dir()).unwrap();
    write_note(
        &aggregator.notes_dir().join("note.html"),
        "2024-01-01",
        base_time(),
    );

    let handle = ChangeMonitor::new(aggregator.clone(), Duration::from_millis(20)).start();

    let mut built = false;
    for _ in 0..100 {
        if aggregator.output_path().exists() {
            built = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    handle.shutdown().await.unwrap();

    assert!(built, "monitor never produced notes.json");
    let index = read_index(aggregator.output_path()).await.unwrap().unwrap();
    assert_eq!(index.count, 1);
}
