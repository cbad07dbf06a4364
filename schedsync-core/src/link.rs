//! The marker block that links a calendar event back to its source record.
//!
//! The block lives in the event description:
//!
//! ```text
//! [Notion-Sync]
//! Notion ID: <source id>
//! Status: <status or None>
//! URL: <url>
//!
//! Notion Page: https://www.notion.so/<source id without dashes>
//! ```
//!
//! Events created by earlier versions are only recognised while this layout
//! stays byte-compatible; changing it requires migrating existing events.

use std::sync::LazyLock;

use regex::Regex;

/// First line of every owned event's description.
pub const MARKER_TAG: &str = "[Notion-Sync]";

const ID_LABEL: &str = "Notion ID";
const PAGE_BASE_URL: &str = "https://www.notion.so/";

static ID_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[Notion-Sync\]\s*Notion ID:\s*([A-Za-z0-9-]+)")
        .expect("ID_LINE is a valid regex")
});

/// Build the description block for a source record.
pub fn embed(source_id: &str, status: Option<&str>, url: Option<&str>) -> String {
    let status = status.filter(|s| !s.is_empty()).unwrap_or("None");

    let mut text = format!("{MARKER_TAG}\n{ID_LABEL}: {source_id}\nStatus: {status}\n");
    if let Some(url) = url.filter(|u| !u.is_empty()) {
        text.push_str(&format!("URL: {url}\n"));
    }
    text.push_str(&format!("\nNotion Page: {}", deep_link(source_id)));

    text
}

/// Source id embedded in a description, if any.
pub fn extract(annotation: &str) -> Option<String> {
    ID_LINE
        .captures(annotation)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// True iff the description carries the marker tag, readable id or not.
pub fn is_owned(annotation: &str) -> bool {
    annotation.contains(MARKER_TAG)
}

/// Canonical page link: the id with its separators stripped.
pub fn deep_link(source_id: &str) -> String {
    format!("{PAGE_BASE_URL}{}", source_id.replace('-', ""))
}
