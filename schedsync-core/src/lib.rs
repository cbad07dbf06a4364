//! Core types for schedsync.
//!
//! This crate holds everything that does not talk to a network:
//! - `source` and `event` for the two sides being reconciled
//! - `normalize` and `link` for date mapping and the event marker
//! - `sync` for planning and applying changes
//! - `remote` for the client traits implemented by the provider crates

pub mod config;
pub mod error;
pub mod event;
pub mod link;
pub mod normalize;
pub mod remote;
pub mod source;
pub mod sync;
pub mod window;

pub use error::{RemoteWriteError, Side, SyncError, SyncResult};
