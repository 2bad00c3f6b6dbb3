//! Next / prev commands - Jump between threads of a file
//!
//! Navigation is cyclic: past the last thread it wraps to the first one
//! (and the other way round for `prev`).

use anyhow::Result;
use clap::Args;
use tracing::info;

use revsync_core::store::navigation::Direction;

use super::Location;
use crate::context::CliContext;
use crate::output::{thread_json, thread_summary};

/// Find the next or previous thread from a line
#[derive(Debug, Args)]
pub struct NavigateCommand {
    #[command(flatten)]
    pub location: Location,
}

impl NavigateCommand {
    pub async fn execute(&self, ctx: &CliContext, direction: Direction) -> Result<()> {
        let formatter = ctx.formatter();
        let loc = &self.location;
        let review = ctx.open(loc.pr, Some(loc.cursor()))?;
        review.fetch().await?;

        let target = match direction {
            Direction::Next => review.session.next_thread(&loc.file, loc.line),
            Direction::Prev => review.session.prev_thread(&loc.file, loc.line),
        };

        info!(
            ?direction,
            file = %loc.file,
            line = loc.line,
            found = target.is_some(),
            "Navigating threads"
        );

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "direction": format!("{direction:?}").to_lowercase(),
                "from": { "file": loc.file, "line": loc.line },
                "thread": target.as_ref().map(thread_json),
            }));
            return Ok(());
        }

        match target {
            Some(thread) => {
                formatter.success(&format!("{}:{}", thread.path(), thread.line()));
                formatter.info(&thread_summary(&thread));
            }
            None => formatter.error(&format!("No threads in {}", loc.file)),
        }

        Ok(())
    }
}
