//! TUI rendering traits for schedsync types.
//!
//! Extension traits that add colored terminal rendering to schedsync-core
//! types using owo_colors.

use owo_colors::OwoColorize;
use schedsync_core::sync::{
    DiffKind, ItemOutcome, OutcomeStatus, SyncAction, SyncPlan, SyncReport,
};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for DiffKind {
    fn render(&self) -> String {
        let symbol = self.symbol();
        match self {
            DiffKind::Create => symbol.green().to_string(),
            DiffKind::Update => symbol.yellow().to_string(),
            DiffKind::Delete => symbol.red().to_string(),
        }
    }
}

/// Colorize text according to the diff kind
fn colorize_diff(kind: DiffKind, text: &str) -> String {
    match kind {
        DiffKind::Create => text.green().to_string(),
        DiffKind::Update => text.yellow().to_string(),
        DiffKind::Delete => text.red().to_string(),
    }
}

impl Render for SyncAction {
    fn render(&self) -> String {
        let kind = self.kind();
        let title = colorize_diff(kind, self.title());

        let when = match self {
            SyncAction::Create { event, .. } | SyncAction::Update { event, .. } => {
                event.start.to_string()
            }
            SyncAction::Delete { target } => target.start.to_string(),
        };

        let mut line = format!("{} {} {}", kind.render(), title, when.dimmed());

        if let SyncAction::Update { reasons, .. } = self {
            let reasons: Vec<String> = reasons.iter().map(|r| r.to_string()).collect();
            line.push_str(&format!(" {}", format!("({})", reasons.join(", ")).dimmed()));
        }

        line
    }
}

impl Render for ItemOutcome {
    fn render(&self) -> String {
        match &self.status {
            OutcomeStatus::Applied => {
                format!("{} {}", self.kind.render(), colorize_diff(self.kind, &self.title))
            }
            OutcomeStatus::Skipped(reason) => format!(
                "{} {} {}",
                self.kind.render(),
                self.title.dimmed(),
                format!("(skipped: {})", reason).dimmed()
            ),
            OutcomeStatus::Failed { stage, error } => format!(
                "{} {} {}",
                "!".red(),
                self.title.red(),
                format!("({} failed: {})", stage, error).red()
            ),
        }
    }
}

/// Threshold for compact view (show counts instead of individual events)
const COMPACT_THRESHOLD: usize = 5;

/// Simple pluralization helper
fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

impl Render for SyncPlan {
    fn render(&self) -> String {
        if self.is_empty() {
            return "   No changes".dimmed().to_string();
        }

        let mut lines = Vec::new();

        if self.actions.len() <= COMPACT_THRESHOLD {
            for action in &self.actions {
                lines.push(format!("   {}", action.render()));
            }
        } else {
            let (creates, updates, deletes) = self.counts();

            if creates > 0 {
                let label = format!("({} new {})", creates, pluralize("event", creates));
                lines.push(format!("   {} {}", "+".green(), label.green()));
            }
            if updates > 0 {
                let label = format!("({} changed {})", updates, pluralize("event", updates));
                lines.push(format!("   {} {}", "~".yellow(), label.yellow()));
            }
            if deletes > 0 {
                let label = format!("({} deleted {})", deletes, pluralize("event", deletes));
                lines.push(format!("   {} {}", "-".red(), label.red()));
            }
        }

        for rejected in &self.rejected {
            lines.push(format!(
                "   {} {} {}",
                "!".red(),
                rejected.source.title.red(),
                format!("({})", rejected.reason).red()
            ));
        }

        lines.join("\n")
    }
}

impl Render for SyncReport {
    fn render(&self) -> String {
        if self.is_noop() {
            return "   No changes".dimmed().to_string();
        }

        let mut lines: Vec<String> = self
            .outcomes
            .iter()
            .map(|outcome| format!("   {}", outcome.render()))
            .collect();

        lines.push(String::new());
        lines.push(format!(
            "Synced: {} created, {} updated, {} deleted",
            self.created, self.updated, self.deleted
        ));

        let failed = self.failures().count();
        if failed > 0 {
            lines.push(format!("{} {}", failed, pluralize("failure", failed)).red().to_string());
        }

        lines.join("\n")
    }
}
