//! Config command - View and manage revsync configuration
//!
//! Provides the `revsync config` CLI command which:
//! 1. Shows the effective configuration (YAML or JSON)
//! 2. Sets individual configuration values via dot-notation keys
//! 3. Validates the configuration file and reports errors

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::info;

use revsync_core::config::Config;

use crate::context::CliContext;

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "sync.reconcile_delay_ms")
        key: String,
        /// New value
        value: String,
    },
    /// Validate configuration file
    Validate,
}

impl ConfigCommand {
    /// Execute the config command
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(ctx),
            ConfigCommand::Set { key, value } => self.execute_set(ctx, key, value),
            ConfigCommand::Validate => self.execute_validate(ctx),
        }
    }

    fn execute_show(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config_path = ctx.config_path();
        let config = ctx.config();

        info!(config_path = %config_path.display(), "Showing configuration");

        if ctx.is_json() {
            let json = serde_json::to_value(config)
                .context("Failed to serialize configuration to JSON")?;
            formatter.print_json(&json);
        } else {
            formatter.success(&format!("Configuration ({})", config_path.display()));
            formatter.info("");

            let yaml = serde_yaml::to_string(config)
                .context("Failed to serialize configuration to YAML")?;

            for line in yaml.lines() {
                formatter.info(line);
            }
        }

        Ok(())
    }

    fn execute_set(&self, ctx: &CliContext, key: &str, value: &str) -> Result<()> {
        let formatter = ctx.formatter();
        let config_path = ctx.config_path();
        let mut config = ctx.config().clone();

        info!(key = %key, value = %value, "Setting configuration value");

        if let Err(e) = apply_config_value(&mut config, key, value) {
            if ctx.is_json() {
                formatter.print_json(&serde_json::json!({
                    "success": false,
                    "key": key,
                    "value": value,
                    "error": e.to_string(),
                }));
            } else {
                formatter.error(&format!("Failed to set '{}': {}", key, e));
                formatter.info("");
                formatter.info("Supported keys:");
                for (key, help) in SUPPORTED_KEYS {
                    formatter.info(&format!("  {key:<28} - {help}"));
                }
            }
            return Ok(());
        }

        let errors = config.validate();
        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            if ctx.is_json() {
                formatter.print_json(&serde_json::json!({
                    "success": false,
                    "key": key,
                    "value": value,
                    "errors": messages,
                }));
            } else {
                formatter.error(&format!(
                    "Invalid value for '{}': {}",
                    key,
                    messages.join("; ")
                ));
            }
            return Ok(());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create configuration directory")?;
        }
        let yaml = serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
        std::fs::write(config_path, yaml).context("Failed to write configuration file")?;

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "key": key,
                "value": value,
                "config_path": config_path.display().to_string(),
            }));
        } else {
            formatter.success(&format!("Set {} = {}", key, value));
            formatter.info(&format!("Saved to {}", config_path.display()));
        }

        Ok(())
    }

    fn execute_validate(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config_path = ctx.config_path();

        // Load explicitly; the context already fell back to defaults
        let config = match Config::load(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                let message = if config_path.exists() {
                    format!("Failed to parse configuration: {e}")
                } else {
                    "Configuration file not found. Using defaults.".to_string()
                };

                if ctx.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "valid": false,
                        "config_path": config_path.display().to_string(),
                        "errors": [message],
                    }));
                } else if config_path.exists() {
                    formatter.error(&message);
                    formatter.info(&format!("File: {}", config_path.display()));
                } else {
                    formatter.info(&format!(
                        "Configuration file not found at {}",
                        config_path.display()
                    ));
                    formatter.info(
                        "Using default configuration. Run 'revsync config set <key> <value>' to create one.",
                    );
                }
                return Ok(());
            }
        };

        info!(config_path = %config_path.display(), "Validating configuration");

        let errors = config.validate();

        if ctx.is_json() {
            let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            formatter.print_json(&serde_json::json!({
                "valid": errors.is_empty(),
                "config_path": config_path.display().to_string(),
                "errors": error_strings,
            }));
        } else if errors.is_empty() {
            formatter.success("Configuration is valid");
            formatter.info(&format!("File: {}", config_path.display()));
        } else {
            formatter.error(&format!(
                "Configuration has {} error{}:",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            ));
            formatter.info(&format!("File: {}", config_path.display()));
            formatter.info("");
            for error in &errors {
                formatter.info(&format!("  {} - {}", error.field, error.message));
            }
        }

        Ok(())
    }
}

const SUPPORTED_KEYS: &[(&str, &str)] = &[
    ("github.api_url", "API root (GitHub Enterprise: https://host/api)"),
    ("github.token_env", "Environment variable holding the token"),
    ("github.owner", "Default repository owner"),
    ("github.repo", "Default repository name"),
    ("github.timeout_secs", "Request timeout in seconds"),
    ("github.max_retries", "Retries on 429/5xx"),
    ("github.page_size", "Listing page size (1-100)"),
    ("sync.reconcile_delay_ms", "Delay before refreshing a new thread"),
    ("sync.fallback_author", "Author shown when the user is unknown"),
    ("logging.level", "trace|debug|info|warn|error"),
];

/// Apply a dot-notation key/value pair to a Config struct
fn apply_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        // --- github ---
        "github.api_url" => config.github.api_url = value.to_string(),
        "github.token_env" => config.github.token_env = value.to_string(),
        "github.owner" => config.github.owner = optional(value),
        "github.repo" => config.github.repo = optional(value),
        "github.timeout_secs" => {
            config.github.timeout_secs = value
                .parse::<u64>()
                .context("Expected a positive integer for github.timeout_secs")?;
        }
        "github.max_retries" => {
            config.github.max_retries = value
                .parse::<u32>()
                .context("Expected a positive integer for github.max_retries")?;
        }
        "github.page_size" => {
            config.github.page_size = value
                .parse::<u32>()
                .context("Expected a positive integer for github.page_size")?;
        }

        // --- sync ---
        "sync.reconcile_delay_ms" => {
            config.sync.reconcile_delay_ms = value
                .parse::<u64>()
                .context("Expected a positive integer for sync.reconcile_delay_ms")?;
        }
        "sync.fallback_author" => config.sync.fallback_author = value.to_string(),

        // --- logging ---
        "logging.level" => config.logging.level = value.to_string(),

        _ => anyhow::bail!("Unknown configuration key: '{}'", key),
    }

    Ok(())
}

/// Empty or `none` clears an optional setting
fn optional(value: &str) -> Option<String> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.to_string())
    }
}
