//! Shared state for command execution
//!
//! [`CliContext`] carries the global flags and the loaded configuration;
//! [`OpenReview`] wires the GitHub gateway, the sync engine and a session for
//! one pull request.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::debug;

use revsync_core::config::Config;
use revsync_core::domain::{ReviewId, ReviewThread};
use revsync_core::ports::CursorPosition;
use revsync_github::{GithubClient, GithubReviewGateway};
use revsync_sync::{ReviewSession, SyncEngine};

use crate::output::{get_formatter, OutputFormat, OutputFormatter};
use crate::overlay::CliOverlay;

/// Global flags plus the loaded configuration
#[derive(Debug)]
pub struct CliContext {
    pub format: OutputFormat,
    pub quiet: bool,
    config_path: PathBuf,
    config: Config,
    /// Why the config file could not be used, when it exists but is broken
    load_error: Option<String>,
    /// `owner/name` given with `--repo`
    repo: Option<String>,
}

impl CliContext {
    /// Loads the configuration from `config_path` or the default location.
    ///
    /// A missing file yields defaults silently; a broken one yields defaults
    /// and is reported through [`load_error`](Self::load_error).
    pub fn new(
        format: OutputFormat,
        quiet: bool,
        config_path: Option<&str>,
        repo: Option<String>,
    ) -> Self {
        let config_path = config_path
            .map(PathBuf::from)
            .unwrap_or_else(Config::default_path);

        let (config, load_error) = match Config::load(&config_path) {
            Ok(config) => (config, None),
            Err(e) if config_path.exists() => (Config::default(), Some(e.to_string())),
            Err(_) => (Config::default(), None),
        };

        Self {
            format,
            quiet,
            config_path,
            config,
            load_error,
            repo,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(self.format, self.quiet)
    }

    /// Repository to talk to: `--repo` first, then `github.owner`/`github.repo`
    pub fn repository(&self) -> Result<(String, String)> {
        if let Some(repo) = &self.repo {
            return parse_repository(repo);
        }
        match (&self.config.github.owner, &self.config.github.repo) {
            (Some(owner), Some(repo)) => Ok((owner.clone(), repo.clone())),
            _ => bail!(
                "No repository configured. Pass --repo owner/name or set github.owner and github.repo in {}",
                self.config_path.display()
            ),
        }
    }

    /// Builds the engine and an empty session for `review_id`.
    ///
    /// `cursor` becomes the host cursor used by thread lookups.
    pub fn open(&self, review_id: ReviewId, cursor: Option<CursorPosition>) -> Result<OpenReview> {
        let (owner, repo) = self.repository()?;
        let github = &self.config.github;

        let token = self.config.github_token().with_context(|| {
            format!(
                "No GitHub token found. Set the {} environment variable",
                github.token_env
            )
        })?;

        let client =
            GithubClient::from_config(github, token).context("Failed to build GitHub client")?;
        let gateway = GithubReviewGateway::new(client, owner, repo).with_page_size(github.page_size);
        debug!(repository = %gateway.repository(), review = %review_id, "Opening review");

        let engine = SyncEngine::new(
            Arc::new(gateway),
            Arc::new(CliOverlay::new(cursor)),
            &self.config,
        );

        Ok(OpenReview {
            engine,
            session: ReviewSession::new(review_id),
        })
    }
}

/// Engine and session for one pull request
pub struct OpenReview {
    pub engine: SyncEngine,
    pub session: ReviewSession,
}

impl OpenReview {
    /// Fetches every thread of the review
    pub async fn fetch(&self) -> Result<usize> {
        self.engine
            .fetch(&self.session)
            .await
            .with_context(|| format!("Failed to fetch threads of {}", self.session.review_id()))
    }

    /// Thread under the command-line cursor
    pub fn target(&self, file: &str, line: u32) -> Result<ReviewThread> {
        self.engine
            .thread_at_cursor(&self.session)
            .with_context(|| format!("No thread at {file}:{line}"))
    }
}

/// Splits `owner/name`
pub fn parse_repository(value: &str) -> Result<(String, String)> {
    match value.trim().split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => bail!("Invalid repository '{value}', expected owner/name"),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn parse_repository_accepts_owner_name() {
        let (owner, repo) = parse_repository("octo/widgets").unwrap();
        assert_eq!(owner, "octo");
        assert_eq!(repo, "widgets");
    }

    #[test]
    fn parse_repository_rejects_malformed() {
        assert!(parse_repository("widgets").is_err());
        assert!(parse_repository("/widgets").is_err());
        assert!(parse_repository("octo/").is_err());
        assert!(parse_repository("a/b/c").is_err());
    }

    #[test]
    fn context_reads_config_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"github:\n  owner: octo\n  repo: widgets\n")
            .unwrap();
        tmp.flush().unwrap();

        let ctx = CliContext::new(
            OutputFormat::Human,
            false,
            tmp.path().to_str(),
            None,
        );
        assert!(ctx.load_error().is_none());
        assert_eq!(
            ctx.repository().unwrap(),
            ("octo".to_string(), "widgets".to_string())
        );
    }

    #[test]
    fn repo_flag_overrides_config() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"github:\n  owner: octo\n  repo: widgets\n")
            .unwrap();
        tmp.flush().unwrap();

        let ctx = CliContext::new(
            OutputFormat::Json,
            false,
            tmp.path().to_str(),
            Some("acme/gears".into()),
        );
        assert_eq!(ctx.repository().unwrap().0, "acme");
        assert!(ctx.is_json());
    }

    #[test]
    fn broken_config_falls_back_with_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"github: [not, a, map").unwrap();
        tmp.flush().unwrap();

        let ctx = CliContext::new(OutputFormat::Human, false, tmp.path().to_str(), None);
        assert!(ctx.load_error().is_some());
        assert_eq!(ctx.config().github.page_size, 100);
        assert!(ctx.repository().is_err());
    }

    #[test]
    fn missing_config_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        let ctx = CliContext::new(OutputFormat::Human, true, path.to_str(), None);
        assert!(ctx.load_error().is_none());
        assert_eq!(ctx.config_path(), path.as_path());
    }
}
