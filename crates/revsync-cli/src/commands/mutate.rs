//! Mutating commands - Comment, reply, edit, delete, resolve and react
//!
//! Each command fetches the review, locates the target thread at the given
//! line, runs one sync-engine pipeline and reports the result. `comment`
//! waits for the deferred reconciliation so the process does not exit while
//! it is pending.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use revsync_core::domain::{DiffSide, ReactionKind};
use revsync_sync::{NewThread, ReconcileOutcome, SubmitStatus, SyncError};

use super::Location;
use crate::context::{CliContext, OpenReview};
use crate::output::OutputFormatter;

// ============================================================================
// comment
// ============================================================================

/// Start a new thread
#[derive(Debug, Args)]
pub struct CommentCommand {
    #[command(flatten)]
    pub location: Location,
    /// Comment body (Markdown)
    #[arg(long, short)]
    pub body: String,
    /// First line of a multi-line comment
    #[arg(long)]
    pub start_line: Option<u32>,
    /// Diff side: LEFT (base) or RIGHT (head)
    #[arg(long)]
    pub side: Option<DiffSide>,
}

impl CommentCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let loc = &self.location;
        let review = ctx.open(loc.pr, Some(loc.cursor()))?;
        review.fetch().await?;

        let mut new = NewThread::new(&loc.file, loc.line, &self.body);
        new.start_line = self.start_line;
        new.side = self.side;

        let created = match review.engine.create_thread(&review.session, new).await {
            Ok(created) => created,
            Err(err) => return report_failure(&*formatter, err, "create thread"),
        };
        let outcome = created.reconcile.wait().await;

        info!(
            thread = %created.remote_thread_id,
            submit = ?created.submit,
            ?outcome,
            "Comment command finished"
        );

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "thread_id": created.remote_thread_id.as_str(),
                "submitted": created.submit == SubmitStatus::Submitted,
                "reconciled": matches!(outcome, ReconcileOutcome::Reconciled { .. }),
            }));
            return Ok(());
        }

        formatter.success(&format!("Commented on {}:{}", loc.file, loc.line));
        if created.submit == SubmitStatus::Draft {
            formatter.warn("The review could not be submitted; the comment is still a draft");
        }
        if !matches!(outcome, ReconcileOutcome::Reconciled { .. }) {
            formatter.warn("Could not refresh threads after commenting");
        }
        Ok(())
    }
}

// ============================================================================
// reply / edit
// ============================================================================

/// Action taking a body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyAction {
    Reply,
    Edit,
}

/// Reply to a thread, or edit your last comment in it
#[derive(Debug, Args)]
pub struct BodyCommand {
    #[command(flatten)]
    pub location: Location,
    /// Comment body (Markdown)
    #[arg(long, short)]
    pub body: String,
}

impl BodyCommand {
    pub async fn execute(&self, ctx: &CliContext, action: BodyAction) -> Result<()> {
        let formatter = ctx.formatter();
        let loc = &self.location;
        let review = open_and_fetch(ctx, loc).await?;
        let thread = review.target(&loc.file, loc.line)?;

        let result = match action {
            BodyAction::Reply => review
                .engine
                .reply(&review.session, &thread, &self.body)
                .await
                .map(|()| format!("Replied to thread at {}:{}", loc.file, loc.line)),
            BodyAction::Edit => review
                .engine
                .edit_last_comment(&review.session, &thread, &self.body)
                .await
                .map(|id| format!("Edited comment {id}")),
        };

        match result {
            Ok(message) => report_success(ctx, &*formatter, &message),
            Err(err) => report_failure(&*formatter, err, action_name(action)),
        }
    }
}

fn action_name(action: BodyAction) -> &'static str {
    match action {
        BodyAction::Reply => "reply",
        BodyAction::Edit => "edit comment",
    }
}

// ============================================================================
// resolve / delete
// ============================================================================

/// Action on a located thread without further input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetAction {
    /// Toggle resolution
    Resolve,
    /// Delete your last comment
    Delete,
}

/// Toggle resolution of a thread, or delete your last comment in it
#[derive(Debug, Args)]
pub struct TargetCommand {
    #[command(flatten)]
    pub location: Location,
}

impl TargetCommand {
    pub async fn execute(&self, ctx: &CliContext, action: TargetAction) -> Result<()> {
        let formatter = ctx.formatter();
        let loc = &self.location;
        let review = open_and_fetch(ctx, loc).await?;
        let thread = review.target(&loc.file, loc.line)?;

        let result = match action {
            TargetAction::Resolve => review
                .engine
                .toggle_resolve(&review.session, &thread)
                .await
                .map(|resolved| {
                    if resolved {
                        format!("Resolved thread at {}:{}", loc.file, loc.line)
                    } else {
                        format!("Reopened thread at {}:{}", loc.file, loc.line)
                    }
                }),
            TargetAction::Delete => review
                .engine
                .delete_last_comment(&review.session, &thread)
                .await
                .map(|id| format!("Deleted comment {id}")),
        };

        let what = match action {
            TargetAction::Resolve => "toggle resolution",
            TargetAction::Delete => "delete comment",
        };
        match result {
            Ok(message) => report_success(ctx, &*formatter, &message),
            Err(err) => report_failure(&*formatter, err, what),
        }
    }
}

// ============================================================================
// react
// ============================================================================

/// React to the last comment of a thread
#[derive(Debug, Args)]
pub struct ReactCommand {
    #[command(flatten)]
    pub location: Location,
    /// Reaction: THUMBS_UP (+1), THUMBS_DOWN (-1), LAUGH, HOORAY, CONFUSED, HEART, ROCKET, EYES
    #[arg(allow_hyphen_values = true)]
    pub reaction: ReactionKind,
}

impl ReactCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let loc = &self.location;
        let review = open_and_fetch(ctx, loc).await?;
        let thread = review.target(&loc.file, loc.line)?;

        match review
            .engine
            .add_reaction(&review.session, &thread, self.reaction)
            .await
        {
            Ok(id) => report_success(
                ctx,
                &*formatter,
                &format!("Reacted {} to comment {id}", self.reaction),
            ),
            Err(err) => report_failure(&*formatter, err, "add reaction"),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

async fn open_and_fetch(ctx: &CliContext, loc: &Location) -> Result<OpenReview> {
    let review = ctx.open(loc.pr, Some(loc.cursor()))?;
    review.fetch().await?;
    Ok(review)
}

fn report_success(ctx: &CliContext, formatter: &dyn OutputFormatter, message: &str) -> Result<()> {
    if ctx.is_json() {
        formatter.print_json(&serde_json::json!({ "success": true, "message": message }));
    } else {
        formatter.success(message);
    }
    Ok(())
}

/// "Nothing to act on" is reported to the user; everything else is an error
fn report_failure(formatter: &dyn OutputFormatter, err: SyncError, what: &str) -> Result<()> {
    match err {
        SyncError::NotFound(message) => {
            formatter.error(&message);
            Ok(())
        }
        other => Err(other).with_context(|| format!("Failed to {what}")),
    }
}
