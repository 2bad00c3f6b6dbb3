use chrono::{DateTime, Utc};
use revsync_core::domain::{Comment, ReviewThread};

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    fn print_json(&self, value: &serde_json::Value);
}

/// Human-readable output formatter with checkmarks and indentation
pub struct HumanFormatter {
    quiet: bool,
}

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        if !self.quiet {
            println!("\u{2713} {}", message);
        }
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {}", message);
    }
    fn warn(&self, message: &str) {
        eprintln!("\u{26a0} Warning: {}", message);
    }
    fn info(&self, message: &str) {
        if !self.quiet {
            println!("  {}", message);
        }
    }
    fn print_json(&self, _value: &serde_json::Value) {
        // Human formatter doesn't print JSON
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!(
            "{}",
            serde_json::json!({"success": true, "message": message})
        );
    }
    fn error(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"success": false, "error": message})
        );
    }
    fn warn(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"level": "warning", "message": message})
        );
    }
    fn info(&self, _message: &str) {}
    fn print_json(&self, value: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }
}

pub fn get_formatter(format: OutputFormat, quiet: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Human => Box::new(HumanFormatter { quiet }),
    }
}

// ============================================================================
// Thread rendering
// ============================================================================

/// One-line summary: `src/lib.rs:10-12 [resolved] alice: first line (3 comments)`
pub fn thread_summary(thread: &ReviewThread) -> String {
    let (start, end) = thread.span();
    let location = if start == end {
        format!("{}:{}", thread.path(), end)
    } else {
        format!("{}:{}-{}", thread.path(), start, end)
    };

    let mut flags = Vec::new();
    if thread.is_pending() {
        flags.push("pending");
    }
    if thread.is_resolved() {
        flags.push("resolved");
    }
    if thread.is_outdated() {
        flags.push("outdated");
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    };

    let opening = thread
        .root_comment()
        .map(|c| format!(" {}: {}", c.author, first_line(&c.body)))
        .unwrap_or_default();

    let count = thread.comments().len();
    format!(
        "{location}{flags}{opening} ({count} comment{})",
        if count == 1 { "" } else { "s" }
    )
}

/// Header line and indented body of a comment
pub fn comment_lines(comment: &Comment, now: DateTime<Utc>) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({}):",
        comment.author,
        relative_age(comment.created_at, now)
    )];
    lines.extend(comment.body.lines().map(|l| format!("  {l}")));

    if !comment.reactions.is_empty() {
        let reactions: Vec<String> = comment
            .reactions
            .iter()
            .map(|(kind, count)| format!("{kind} x{count}"))
            .collect();
        lines.push(format!("  [{}]", reactions.join(", ")));
    }
    lines
}

/// JSON value of a thread in its wire shape
pub fn thread_json(thread: &ReviewThread) -> serde_json::Value {
    serde_json::to_value(thread).unwrap_or(serde_json::Value::Null)
}

/// Coarse "how long ago" label
pub fn relative_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    if elapsed.num_seconds() < 60 {
        "just now".to_string()
    } else if elapsed.num_minutes() < 60 {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed.num_hours() < 24 {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed.num_days() < 30 {
        format!("{}d ago", elapsed.num_days())
    } else {
        then.format("%Y-%m-%d").to_string()
    }
}

fn first_line(body: &str) -> &str {
    body.lines().next().unwrap_or_default().trim()
}
