use std::sync::Mutex;

use crate::catalog::{Acl, Privilege, Schema};
use crate::RenderSummary;

/// Trait for handling output in a way that works for both CLI and library usage
pub trait OutputHandler: Send + Sync {
    fn success(&self, message: &str);

    fn error(&self, message: &str);

    fn info(&self, message: &str);

    fn warning(&self, message: &str);

    fn heading(&self, message: &str);

    /// Display a status message (e.g., "Rendered 3 tables")
    fn status(&self, action: &str, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLevel {
    Success,
    Error,
    Info,
    Warning,
    Heading,
    Status,
}

/// Library output handler that collects messages
#[derive(Default)]
pub struct LibraryOutputHandler {
    messages: Mutex<Vec<(OutputLevel, String)>>,
}

impl LibraryOutputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_messages(&self) -> Vec<(OutputLevel, String)> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn add_message(&self, level: OutputLevel, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((level, message.to_string()));
    }
}

impl OutputHandler for LibraryOutputHandler {
    fn success(&self, message: &str) {
        self.add_message(OutputLevel::Success, message);
    }

    fn error(&self, message: &str) {
        self.add_message(OutputLevel::Error, message);
    }

    fn info(&self, message: &str) {
        self.add_message(OutputLevel::Info, message);
    }

    fn warning(&self, message: &str) {
        self.add_message(OutputLevel::Warning, message);
    }

    fn heading(&self, message: &str) {
        self.add_message(OutputLevel::Heading, message);
    }

    fn status(&self, action: &str, message: &str) {
        self.add_message(OutputLevel::Status, &format!("{} {}", action, message));
    }
}

/// CLI output handler; everything goes to stderr so stdout can carry DDL.
#[cfg(feature = "cli")]
pub struct CliOutputHandler;

#[cfg(feature = "cli")]
impl OutputHandler for CliOutputHandler {
    fn success(&self, message: &str) {
        use owo_colors::OwoColorize;
        eprintln!("{} {}", "✓".green(), message);
    }

    fn error(&self, message: &str) {
        use owo_colors::OwoColorize;
        eprintln!("{} {}", "✗".red(), message);
    }

    fn info(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn warning(&self, message: &str) {
        use owo_colors::OwoColorize;
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    fn heading(&self, message: &str) {
        use owo_colors::OwoColorize;
        eprintln!("\n{}", message.bold());
    }

    fn status(&self, action: &str, message: &str) {
        use owo_colors::OwoColorize;
        eprintln!("{:>12} {}", action.green().bold(), message);
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

pub fn report_summary(handler: &dyn OutputHandler, summary: &RenderSummary) {
    handler.heading("Pre-data summary");
    handler.status("Schemas", &plural(summary.schemas, "schema"));
    handler.status("Functions", &plural(summary.functions, "function"));
    handler.status("Types", &plural(summary.types, "type"));
    handler.status("Tables", &plural(summary.tables, "table"));
    handler.status("Constraints", &plural(summary.constraints, "constraint"));
    handler.success(&format!("Wrote {}", plural(summary.blocks, "statement block")));
}

pub fn report_schemas(handler: &dyn OutputHandler, schemas: &[Schema]) {
    if schemas.is_empty() {
        handler.warning("No schema owns a relation in this catalog");
        return;
    }
    for schema in schemas {
        handler.info(&schema.to_string());
    }
}

/// Show a parsed ACL entry; `None` stands for the object type's default privileges.
pub fn report_acl(handler: &dyn OutputHandler, acl: Option<&Acl>) {
    let Some(acl) = acl else {
        handler.warning("Empty ACL: the object keeps its default privileges");
        return;
    };
    handler.heading(&format!("Grantee: {}", acl.grantee_sql()));
    for privilege in Privilege::ALL {
        let flags = acl.flags(privilege);
        if !flags.held() {
            continue;
        }
        let suffix = if flags.with_grant_option { " WITH GRANT OPTION" } else { "" };
        handler.info(&format!("  {}{}", privilege.keyword(), suffix));
    }
}
