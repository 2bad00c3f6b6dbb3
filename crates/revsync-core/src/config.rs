//! Configuration module for revsync.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for revsync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub github: GithubConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// Remote review service (GitHub) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// API root; GraphQL requests go to `{api_url}/graphql`.
    pub api_url: String,
    /// Environment variable holding the access token.
    pub token_env: String,
    /// Repository owner. May be overridden on the command line.
    pub owner: Option<String>,
    /// Repository name. May be overridden on the command line.
    pub repo: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries on 429 and 5xx responses.
    pub max_retries: u32,
    /// Page size for thread and comment listings (GitHub caps it at 100).
    pub page_size: u32,
}

/// Thread synchronization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Delay between an optimistic insert and its reconciliation fetch.
    pub reconcile_delay_ms: u64,
    /// Author shown on optimistic comments when the current user is unknown.
    pub fallback_author: String,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/revsync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("revsync")
            .join("config.yaml")
    }

    /// Reads the access token from the configured environment variable.
    pub fn github_token(&self) -> Option<String> {
        std::env::var(&self.github.token_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
            owner: None,
            repo: None,
            timeout_secs: 30,
            max_retries: 3,
            page_size: 100,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            reconcile_delay_ms: 1000,
            fallback_author: "you".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"github.page_size"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Upper bound GitHub accepts for `first:` arguments.
const MAX_PAGE_SIZE: u32 = 100;

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- github ---
        if !(self.github.api_url.starts_with("http://")
            || self.github.api_url.starts_with("https://"))
        {
            errors.push(ValidationError {
                field: "github.api_url".into(),
                message: format!("must be an http(s) URL, got '{}'", self.github.api_url),
            });
        }
        if self.github.token_env.trim().is_empty() {
            errors.push(ValidationError {
                field: "github.token_env".into(),
                message: "must name an environment variable".into(),
            });
        }
        if self.github.timeout_secs == 0 {
            errors.push(ValidationError {
                field: "github.timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.github.page_size == 0 || self.github.page_size > MAX_PAGE_SIZE {
            errors.push(ValidationError {
                field: "github.page_size".into(),
                message: format!("must be in range 1..={MAX_PAGE_SIZE}"),
            });
        }
        if self.github.owner.as_deref().is_some_and(|o| o.trim().is_empty()) {
            errors.push(ValidationError {
                field: "github.owner".into(),
                message: "must not be blank when set".into(),
            });
        }
        if self.github.repo.as_deref().is_some_and(|r| r.trim().is_empty()) {
            errors.push(ValidationError {
                field: "github.repo".into(),
                message: "must not be blank when set".into(),
            });
        }

        // --- sync ---
        if self.sync.fallback_author.trim().is_empty() {
            errors.push(ValidationError {
                field: "sync.fallback_author".into(),
                message: "must not be empty".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use revsync_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .github_repository("octo", "widgets")
///     .sync_reconcile_delay_ms(500)
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder pre-populated with default values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn github_api_url(mut self, url: impl Into<String>) -> Self {
        self.config.github.api_url = url.into();
        self
    }

    pub fn github_token_env(mut self, var: impl Into<String>) -> Self {
        self.config.github.token_env = var.into();
        self
    }

    pub fn github_repository(mut self, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        self.config.github.owner = Some(owner.into());
        self.config.github.repo = Some(repo.into());
        self
    }

    pub fn github_timeout_secs(mut self, secs: u64) -> Self {
        self.config.github.timeout_secs = secs;
        self
    }

    pub fn github_max_retries(mut self, n: u32) -> Self {
        self.config.github.max_retries = n;
        self
    }

    pub fn github_page_size(mut self, n: u32) -> Self {
        self.config.github.page_size = n;
        self
    }

    pub fn sync_reconcile_delay_ms(mut self, ms: u64) -> Self {
        self.config.sync.reconcile_delay_ms = ms;
        self
    }

    pub fn sync_fallback_author(mut self, author: impl Into<String>) -> Self {
        self.config.sync.fallback_author = author.into();
        self
    }

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    /// Consume the builder and return the [`Config`] without validation.
    pub fn build(self) -> Config {
        self.config
    }

    /// Consume the builder, validate, and return the [`Config`] or errors.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let errors = self.config.validate();
        if errors.is_empty() {
            Ok(self.config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    // -- Defaults --

    #[test]
    fn default_config_has_sensible_values() {
        let cfg = Config::default();
        assert_eq!(cfg.github.api_url, "https://api.github.com");
        assert_eq!(cfg.github.token_env, "GITHUB_TOKEN");
        assert!(cfg.github.owner.is_none());
        assert!(cfg.github.repo.is_none());
        assert_eq!(cfg.github.timeout_secs, 30);
        assert_eq!(cfg.github.max_retries, 3);
        assert_eq!(cfg.github.page_size, 100);
        assert_eq!(cfg.sync.reconcile_delay_ms, 1000);
        assert_eq!(cfg.sync.fallback_author, "you");
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn default_config_passes_validation() {
        let errors = Config::default().validate();
        assert!(errors.is_empty(), "unexpected validation errors: {errors:?}");
    }

    // -- Loading --

    #[test]
    fn load_from_yaml_file() {
        let yaml = r#"
github:
  api_url: https://github.example.com/api
  token_env: GHE_TOKEN
  owner: octo
  repo: widgets
  timeout_secs: 10
  max_retries: 1
  page_size: 50
sync:
  reconcile_delay_ms: 250
  fallback_author: me
logging:
  level: debug
"#;
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(yaml.as_bytes()).unwrap();
        tmp.flush().unwrap();

        let cfg = Config::load(tmp.path()).expect("load config");
        assert_eq!(cfg.github.api_url, "https://github.example.com/api");
        assert_eq!(cfg.github.token_env, "GHE_TOKEN");
        assert_eq!(cfg.github.owner.as_deref(), Some("octo"));
        assert_eq!(cfg.github.repo.as_deref(), Some("widgets"));
        assert_eq!(cfg.github.timeout_secs, 10);
        assert_eq!(cfg.github.max_retries, 1);
        assert_eq!(cfg.github.page_size, 50);
        assert_eq!(cfg.sync.reconcile_delay_ms, 250);
        assert_eq!(cfg.sync.fallback_author, "me");
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(b"github:\n  owner: octo\n").unwrap();
        tmp.flush().unwrap();

        let cfg = Config::load(tmp.path()).expect("load config");
        assert_eq!(cfg.github.owner.as_deref(), Some("octo"));
        assert_eq!(cfg.github.page_size, 100);
        assert_eq!(cfg.sync.reconcile_delay_ms, 1000);
    }

    #[test]
    fn load_or_default_returns_default_on_missing_file() {
        let cfg = Config::load_or_default(Path::new("/nonexistent/config.yaml"));
        assert_eq!(cfg.sync.reconcile_delay_ms, 1000);
    }

    #[test]
    fn load_returns_error_on_invalid_yaml() {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(b"not: [valid: yaml: {{{").unwrap();
        tmp.flush().unwrap();

        assert!(Config::load(tmp.path()).is_err());
    }

    // -- Validation --

    #[test]
    fn validate_catches_bad_api_url() {
        let mut cfg = Config::default();
        cfg.github.api_url = "ftp://example.com".into();
        assert!(cfg.validate().iter().any(|e| e.field == "github.api_url"));
    }

    #[test]
    fn validate_catches_page_size_out_of_range() {
        let mut cfg = Config::default();
        cfg.github.page_size = 0;
        assert!(cfg.validate().iter().any(|e| e.field == "github.page_size"));
        cfg.github.page_size = 101;
        assert!(cfg.validate().iter().any(|e| e.field == "github.page_size"));
    }

    #[test]
    fn validate_catches_zero_timeout() {
        let mut cfg = Config::default();
        cfg.github.timeout_secs = 0;
        assert!(cfg.validate().iter().any(|e| e.field == "github.timeout_secs"));
    }

    #[test]
    fn validate_catches_blank_repository_parts() {
        let mut cfg = Config::default();
        cfg.github.owner = Some(" ".into());
        cfg.github.repo = Some(String::new());
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "github.owner"));
        assert!(errors.iter().any(|e| e.field == "github.repo"));
    }

    #[test]
    fn validate_catches_empty_fallback_author() {
        let mut cfg = Config::default();
        cfg.sync.fallback_author = "  ".into();
        assert!(cfg.validate().iter().any(|e| e.field == "sync.fallback_author"));
    }

    #[test]
    fn validate_catches_invalid_log_level() {
        let mut cfg = Config::default();
        cfg.logging.level = "verbose".into();
        assert!(cfg.validate().iter().any(|e| e.field == "logging.level"));
    }

    #[test]
    fn validate_accepts_all_valid_log_levels() {
        for level in VALID_LOG_LEVELS {
            let mut cfg = Config::default();
            cfg.logging.level = (*level).to_string();
            assert!(cfg.validate().is_empty(), "level {level} rejected");
        }
    }

    // -- Builder --

    #[test]
    fn builder_overrides_fields() {
        let cfg = ConfigBuilder::new()
            .github_api_url("http://localhost:9999")
            .github_token_env("TEST_TOKEN")
            .github_repository("octo", "widgets")
            .github_timeout_secs(5)
            .github_max_retries(0)
            .github_page_size(20)
            .sync_reconcile_delay_ms(10)
            .sync_fallback_author("tester")
            .logging_level("trace")
            .build();

        assert_eq!(cfg.github.api_url, "http://localhost:9999");
        assert_eq!(cfg.github.token_env, "TEST_TOKEN");
        assert_eq!(cfg.github.owner.as_deref(), Some("octo"));
        assert_eq!(cfg.github.repo.as_deref(), Some("widgets"));
        assert_eq!(cfg.github.timeout_secs, 5);
        assert_eq!(cfg.github.max_retries, 0);
        assert_eq!(cfg.github.page_size, 20);
        assert_eq!(cfg.sync.reconcile_delay_ms, 10);
        assert_eq!(cfg.sync.fallback_author, "tester");
        assert_eq!(cfg.logging.level, "trace");
    }

    #[test]
    fn builder_build_validated_fails_for_invalid_config() {
        let result = ConfigBuilder::new().github_page_size(500).build_validated();
        let errors = result.unwrap_err();
        assert!(errors.iter().any(|e| e.field == "github.page_size"));
    }

    #[test]
    fn default_path_ends_with_config_yaml() {
        let path = Config::default_path();
        assert!(path.ends_with("revsync/config.yaml"));
    }

    #[test]
    fn validation_error_display() {
        let err = ValidationError {
            field: "github.page_size".into(),
            message: "must be in range 1..=100".into(),
        };
        assert_eq!(err.to_string(), "github.page_size: must be in range 1..=100");
    }
}
