//! Version-control queries used for note dates and the commit feed.
//!
//! Every failure here degrades to `None` or an empty list. Callers decide the
//! fallback; nothing in this module is fatal.

use crate::config::DEFAULT_GIT_TIMEOUT;
use crate::note::CommitRecord;
use async_trait::async_trait;
use log::{debug, warn};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

const COMMIT_FIELD_SEPARATOR: char = '|';
const SHORT_HASH_LEN: usize = 7;

#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Day of the last commit touching `path`, as `YYYY-MM-DD`.
    async fn last_commit_date(&self, path: &Path) -> Option<String>;

    /// Most recent commits, newest first.
    async fn recent_commits(&self, limit: usize) -> Vec<CommitRecord>;
}

/// `git` command-line adapter.
#[derive(Debug, Clone)]
pub struct GitGateway {
    program: String,
    repo_dir: PathBuf,
    timeout: Duration,
}

impl GitGateway {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: "git".to_string(),
            repo_dir: repo_dir.into(),
            timeout: DEFAULT_GIT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Runs `git <args>` in the repository and returns stdout on a zero exit.
    async fn run<I, S>(&self, args: I) -> Option<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let child = tokio::process::Command::new(&self.program)
            .args(args)
            .current_dir(&self.repo_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();
        let child = match child {
            Ok(child) => child,
            Err(err) => {
                debug!("Failed to spawn {}: {err}", self.program);
                return None;
            }
        };

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                debug!("{} did not complete: {err}", self.program);
                return None;
            }
            Err(_) => {
                warn!(
                    "{} timed out after {}ms",
                    self.program,
                    self.timeout.as_millis()
                );
                return None;
            }
        };

        if !output.status.success() {
            debug!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl VersionControl for GitGateway {
    async fn last_commit_date(&self, path: &Path) -> Option<String> {
        // git runs inside repo_dir, so a relative path would resolve against it.
        let path = match std::path::absolute(path) {
            Ok(path) => path,
            Err(err) => {
                debug!("Cannot resolve {}: {err}", path.display());
                return None;
            }
        };
        let stdout = self
            .run([
                OsStr::new("log"),
                OsStr::new("-1"),
                OsStr::new("--format=%ci"),
                OsStr::new("--"),
                path.as_os_str(),
            ])
            .await?;
        first_token(&stdout).map(str::to_string)
    }

    async fn recent_commits(&self, limit: usize) -> Vec<CommitRecord> {
        let max_count = format!("--max-count={limit}");
        let format = format!("--format=%H{COMMIT_FIELD_SEPARATOR}%ci{COMMIT_FIELD_SEPARATOR}%s");
        match self
            .run(["log", max_count.as_str(), format.as_str()])
            .await
        {
            Some(stdout) => parse_commit_log(&stdout),
            None => {
                warn!(
                    "Could not read commit log in {}",
                    self.repo_dir.display()
                );
                Vec::new()
            }
        }
    }
}

/// Parses `hash|date|subject` lines, skipping anything malformed.
#[must_use]
pub fn parse_commit_log(stdout: &str) -> Vec<CommitRecord> {
    stdout.lines().filter_map(parse_commit_line).collect()
}

#[must_use]
pub fn parse_commit_line(line: &str) -> Option<CommitRecord> {
    let mut fields = line.splitn(3, COMMIT_FIELD_SEPARATOR);
    let hash = fields.next()?;
    let date = fields.next()?;
    let message = fields.next()?;

    Some(CommitRecord {
        hash: hash.chars().take(SHORT_HASH_LEN).collect(),
        date: first_token(date).unwrap_or_default().to_string(),
        message: message.to_string(),
    })
}

fn first_token(text: &str) -> Option<&str> {
    text.split_whitespace().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_commit_line() {
        let record = parse_commit_line("abcdef1234567|2024-05-01 10:00:00 +0000|Fix bug");
        assert_eq!(
            record,
            Some(CommitRecord {
                hash: "abcdef1".to_string(),
                date: "2024-05-01".to_string(),
                message: "Fix bug".to_string(),
            })
        );
    }

    #[test]
    fn keeps_separators_inside_subject() {
        let record = parse_commit_line("0123456789|2024-01-02 00:00:00 +0300|a | b | c").unwrap();
        assert_eq!(record.message, "a | b | c");
        assert_eq!(record.hash, "0123456");
    }

    #[test]
    fn skips_lines_without_two_separators() {
        let log = "deadbeefcafe|2024-02-02 12:00:00 +0000|First\n\
                   garbage line\n\
                   onlyone|separator\n\
                   \n\
                   feedface0000|2024-02-01 09:00:00 +0000|Second\n";
        let commits = parse_commit_log(log);
        let hashes: Vec<&str> = commits.iter().map(|c| c.hash.as_str()).collect();
        assert_eq!(hashes, vec!["deadbee", "feedfac"]);
    }

    #[test]
    fn short_hash_is_left_as_is() {
        let record = parse_commit_line("abc|2024-05-01|msg").unwrap();
        assert_eq!(record.hash, "abc");
        assert_eq!(record.date, "2024-05-01");
    }

    #[test]
    fn default_timeout_matches_config() {
        let gateway = GitGateway::new(".");
        assert_eq!(gateway.timeout, DEFAULT_GIT_TIMEOUT);
        assert_eq!(
            crate::config::IndexerConfig::default().git_timeout,
            gateway.timeout
        );
    }

    #[tokio::test]
    async fn missing_binary_degrades_to_sentinels() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = GitGateway::new(dir.path()).with_program("notes-indexer-missing-vcs");

        assert_eq!(gateway.last_commit_date(Path::new("a.html")).await, None);
        assert!(gateway.recent_commits(10).await.is_empty());
    }
}
