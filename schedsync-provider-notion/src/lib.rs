//! schedsync-provider-notion - Notion database source for schedsync
//!
//! Queries the schedule database through the Notion REST API and stores the
//! id of each created calendar event back on its page.

mod client;
pub mod properties;

pub use client::{NOTION_API_VERSION, NotionClient};
