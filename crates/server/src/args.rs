use clap::Parser;
use notes_indexer::{IndexerConfig, DEFAULT_NOTES_DIR, DEFAULT_OUTPUT_PATH, DEFAULT_REPO_DIR};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "notes-server", version, about = "Keep notes.json fresh and serve the notes API")]
pub struct Args {
    /// Directory holding the `.html` notes
    #[arg(long, env = "NOTES_DIR", default_value = DEFAULT_NOTES_DIR)]
    pub notes_dir: PathBuf,

    /// Path of the generated index
    #[arg(long, env = "NOTES_JSON", default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// Repository queried for commit dates and history
    #[arg(long, env = "NOTES_REPO_DIR", default_value = DEFAULT_REPO_DIR)]
    pub repo_dir: PathBuf,

    /// Address the API listens on
    #[arg(long, env = "NOTES_BIND", default_value = "127.0.0.1:8081")]
    pub bind: SocketAddr,

    /// Seconds between change checks
    #[arg(
        long,
        env = "NOTES_POLL_INTERVAL_SECS",
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_interval_secs: u64,

    /// Upper bound for a single git invocation
    #[arg(
        long,
        env = "NOTES_GIT_TIMEOUT_SECS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub git_timeout_secs: u64,

    /// Build notes.json once and exit
    #[arg(long)]
    pub once: bool,
}

impl Args {
    #[must_use]
    pub fn indexer_config(&self) -> IndexerConfig {
        IndexerConfig {
            notes_dir: self.notes_dir.clone(),
            output_path: self.output.clone(),
            repo_dir: self.repo_dir.clone(),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            git_timeout: Duration::from_secs(self.git_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_indexer_defaults() {
        let args = Args::try_parse_from(["notes-server"]).unwrap();
        assert_eq!(args.bind, "127.0.0.1:8081".parse::<SocketAddr>().unwrap());
        assert!(!args.once);
        assert_eq!(args.indexer_config(), IndexerConfig::default());
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "notes-server",
            "--notes-dir",
            "/srv/notes",
            "--output",
            "/srv/site/notes.json",
            "--poll-interval-secs",
            "2",
            "--once",
        ])
        .unwrap();
        let config = args.indexer_config();
        assert_eq!(config.notes_dir, PathBuf::from("/srv/notes"));
        assert_eq!(config.output_path, PathBuf::from("/srv/site/notes.json"));
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert!(args.once);
    }

    #[test]
    fn rejects_zero_interval() {
        assert!(Args::try_parse_from(["notes-server", "--poll-interval-secs", "0"]).is_err());
    }
}
