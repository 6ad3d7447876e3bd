use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_NOTES_DIR: &str = "./notes";
pub const DEFAULT_OUTPUT_PATH: &str = "./notes.json";
pub const DEFAULT_REPO_DIR: &str = ".";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where notes live, where the index goes, and how often to look.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerConfig {
    pub notes_dir: PathBuf,
    pub output_path: PathBuf,
    /// Working directory for version-control queries.
    pub repo_dir: PathBuf,
    pub poll_interval: Duration,
    pub git_timeout: Duration,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            notes_dir: PathBuf::from(DEFAULT_NOTES_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            repo_dir: PathBuf::from(DEFAULT_REPO_DIR),
            poll_interval: DEFAULT_POLL_INTERVAL,
            git_timeout: DEFAULT_GIT_TIMEOUT,
        }
    }
}
