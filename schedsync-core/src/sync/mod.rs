mod action;
mod diff_kind;
mod engine;
mod report;
mod run;

pub use action::{RejectedItem, SyncAction, SyncPlan, UpdateReason};
pub use diff_kind::DiffKind;
pub use engine::ReconciliationEngine;
pub use report::{ItemOutcome, OutcomeStatus, Stage, SyncReport};
pub use run::{Snapshot, Syncer};
