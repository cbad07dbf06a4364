use std::fmt;

use crate::event::{NormalizedEvent, TargetEvent};
use crate::source::SourceItem;
use crate::sync::DiffKind;

/// Why a linked event is considered out of date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateReason {
    Title,
    StartDay,
    EndDay,
    /// The record was edited after the event, e.g. only its status or url.
    SourceNewer,
}

impl fmt::Display for UpdateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateReason::Title => write!(f, "title"),
            UpdateReason::StartDay => write!(f, "start"),
            UpdateReason::EndDay => write!(f, "end"),
            UpdateReason::SourceNewer => write!(f, "edited"),
        }
    }
}

/// One decided change against the calendar.
#[derive(Debug, Clone)]
pub enum SyncAction {
    Create {
        source: SourceItem,
        event: NormalizedEvent,
    },
    Update {
        source: SourceItem,
        target: TargetEvent,
        event: NormalizedEvent,
        reasons: Vec<UpdateReason>,
    },
    Delete {
        target: TargetEvent,
    },
}

impl SyncAction {
    pub fn kind(&self) -> DiffKind {
        match self {
            SyncAction::Create { .. } => DiffKind::Create,
            SyncAction::Update { .. } => DiffKind::Update,
            SyncAction::Delete { .. } => DiffKind::Delete,
        }
    }

    /// Title as it will appear in the calendar (or did, for deletes).
    pub fn title(&self) -> &str {
        match self {
            SyncAction::Create { event, .. } | SyncAction::Update { event, .. } => &event.title,
            SyncAction::Delete { target } => &target.title,
        }
    }

    /// Id of the source record this action concerns, if it is known.
    pub fn source_id(&self) -> Option<&str> {
        match self {
            SyncAction::Create { source, .. } | SyncAction::Update { source, .. } => {
                Some(&source.id)
            }
            SyncAction::Delete { target } => target.linked_source_id.as_deref(),
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind(), self.title())
    }
}

/// A source record whose date range could not be turned into an event.
#[derive(Debug, Clone)]
pub struct RejectedItem {
    pub kind: DiffKind,
    pub source: SourceItem,
    pub reason: String,
}

/// Everything one run intends to do, in application order.
#[derive(Debug, Clone, Default)]
pub struct SyncPlan {
    pub actions: Vec<SyncAction>,
    pub rejected: Vec<RejectedItem>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.rejected.is_empty()
    }

    /// (created, updated, deleted) the plan would produce if every call succeeds.
    pub fn counts(&self) -> (usize, usize, usize) {
        let mut created = 0;
        let mut updated = 0;
        let mut deleted = 0;

        for action in &self.actions {
            match action.kind() {
                DiffKind::Create => created += 1,
                DiffKind::Update => updated += 1,
                DiffKind::Delete => deleted += 1,
            }
        }

        (created, updated, deleted)
    }
}
