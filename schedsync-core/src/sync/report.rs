//! Per-item results of one reconciliation run.

use std::fmt;

use crate::sync::DiffKind;

/// The call an item failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Normalize,
    Create,
    Update,
    Delete,
    PatchBackLink,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Normalize => write!(f, "normalize"),
            Stage::Create => write!(f, "create"),
            Stage::Update => write!(f, "update"),
            Stage::Delete => write!(f, "delete"),
            Stage::PatchBackLink => write!(f, "patch back-link"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Applied,
    Skipped(String),
    Failed { stage: Stage, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    pub kind: DiffKind,
    /// Source record id, or the event id for deletes of unreadable links.
    pub item_id: String,
    pub title: String,
    pub status: OutcomeStatus,
}

impl ItemOutcome {
    pub fn is_applied(&self) -> bool {
        self.status == OutcomeStatus::Applied
    }
}

/// Tally plus the outcome of every attempted item.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub outcomes: Vec<ItemOutcome>,
}

impl SyncReport {
    /// Only applied outcomes count towards the tally.
    pub fn record(&mut self, outcome: ItemOutcome) {
        if outcome.is_applied() {
            match outcome.kind {
                DiffKind::Create => self.created += 1,
                DiffKind::Update => self.updated += 1,
                DiffKind::Delete => self.deleted += 1,
            }
        }
        self.outcomes.push(outcome);
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Failed { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Skipped(_)))
    }

    pub fn is_noop(&self) -> bool {
        self.outcomes.is_empty()
    }
}
