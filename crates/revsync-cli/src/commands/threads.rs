//! Threads and show commands - Read review threads
//!
//! Provides:
//! 1. `revsync threads <pr>` listing every thread, grouped by file
//! 2. `revsync show <pr> <file> <line>` printing the full conversation
//!    of the thread(s) anchored at a line

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use tracing::info;

use revsync_core::domain::{ReviewId, ReviewThread};

use super::Location;
use crate::context::CliContext;
use crate::output::{comment_lines, thread_json, thread_summary};

/// List review threads of a pull request
#[derive(Debug, Args)]
pub struct ThreadsCommand {
    /// Pull request number
    pub pr: ReviewId,
    /// Only list threads in this file
    #[arg(long)]
    pub file: Option<String>,
    /// Hide resolved threads
    #[arg(long)]
    pub unresolved: bool,
}

impl ThreadsCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let review = ctx.open(self.pr, None)?;
        review.fetch().await?;

        let store = review.session.snapshot();
        let threads: Vec<&ReviewThread> = match &self.file {
            Some(file) => store.get_for_file(file),
            None => store.all().iter().collect(),
        }
        .into_iter()
        .filter(|t| !self.unresolved || !t.is_resolved())
        .collect();

        info!(review = %self.pr, threads = threads.len(), "Listing threads");

        if ctx.is_json() {
            let json: Vec<serde_json::Value> = threads.iter().map(|t| thread_json(t)).collect();
            formatter.print_json(&serde_json::Value::Array(json));
            return Ok(());
        }

        if threads.is_empty() {
            formatter.success(&format!("No review threads on {}", self.pr));
            return Ok(());
        }

        let open = threads.iter().filter(|t| !t.is_resolved()).count();
        formatter.success(&format!(
            "{} thread{} on {} ({} open)",
            threads.len(),
            if threads.len() == 1 { "" } else { "s" },
            self.pr,
            open
        ));

        let mut current_file = None;
        for thread in threads {
            if current_file != Some(thread.path()) {
                current_file = Some(thread.path());
                formatter.info("");
                formatter.info(thread.path().as_str());
            }
            formatter.info(&format!("  {}", thread_summary(thread)));
        }

        Ok(())
    }
}

/// Show the conversation at a line
#[derive(Debug, Args)]
pub struct ShowCommand {
    #[command(flatten)]
    pub location: Location,
}

impl ShowCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let loc = &self.location;
        let review = ctx.open(loc.pr, Some(loc.cursor()))?;
        review.fetch().await?;

        let threads = review
            .session
            .read(|store| -> Vec<ReviewThread> {
                store
                    .get_all_at_line(&loc.file, loc.line)
                    .into_iter()
                    .cloned()
                    .collect()
            });

        if ctx.is_json() {
            let json: Vec<serde_json::Value> = threads.iter().map(thread_json).collect();
            formatter.print_json(&serde_json::Value::Array(json));
            return Ok(());
        }

        if threads.is_empty() {
            formatter.error(&format!("No thread at {}:{}", loc.file, loc.line));
            return Ok(());
        }

        let now = Utc::now();
        for thread in &threads {
            formatter.success(&thread_summary(thread));
            for comment in thread.comments() {
                formatter.info("");
                for line in comment_lines(comment, now) {
                    formatter.info(&line);
                }
            }
        }

        Ok(())
    }
}
