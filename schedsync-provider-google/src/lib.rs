//! schedsync-provider-google - Google Calendar target for schedsync
//!
//! The provider manages its own credentials and tokens:
//!   ~/.config/schedsync/providers/google/app_config.toml
//!   ~/.config/schedsync/providers/google/session/{account}.toml

pub mod app_config;
pub mod auth;
mod calendar;
mod convert;
pub mod session;

pub use calendar::GoogleCalendar;
