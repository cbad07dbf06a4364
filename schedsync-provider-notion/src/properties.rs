//! Notion page objects and their mapping onto `SourceItem`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use schedsync_core::config::PropertyNames;
use schedsync_core::source::{ActionDay, SourceItem};

/// One page of a database query response.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Page {
    pub id: String,
    pub last_edited_time: DateTime<Utc>,
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
}

/// The property types schedsync reads. Anything else is `Other`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title { title: Vec<RichText> },
    RichText { rich_text: Vec<RichText> },
    Date { date: Option<DateValue> },
    Status { status: Option<Named> },
    Select { select: Option<Named> },
    Url { url: Option<String> },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

#[derive(Debug, Deserialize)]
pub struct DateValue {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Named {
    pub name: String,
}

impl PropertyValue {
    /// Text of a title, rich text, status, select or url property.
    /// Only the first fragment of a text property is read.
    pub fn text(&self) -> Option<String> {
        let text = match self {
            PropertyValue::Title { title: fragments }
            | PropertyValue::RichText {
                rich_text: fragments,
            } => fragments.first().map(|f| f.plain_text.clone()),
            PropertyValue::Status { status: named }
            | PropertyValue::Select { select: named } => named.as_ref().map(|n| n.name.clone()),
            PropertyValue::Url { url } => url.clone(),
            PropertyValue::Date { .. } | PropertyValue::Other => None,
        };

        text.filter(|t| !t.is_empty())
    }

    pub fn date(&self) -> Option<ActionDay> {
        match self {
            PropertyValue::Date { date: Some(date) } => Some(ActionDay {
                start: date.start.clone(),
                end: date.end.clone(),
            }),
            _ => None,
        }
    }
}

impl Page {
    fn text(&self, name: &str) -> Option<String> {
        self.properties.get(name).and_then(PropertyValue::text)
    }

    /// Map onto a source record using the configured property names.
    /// Missing properties become empty values; eligibility is decided later.
    pub fn to_source_item(&self, names: &PropertyNames) -> SourceItem {
        let action_day = self
            .properties
            .get(&names.action_day)
            .and_then(PropertyValue::date)
            .unwrap_or_default();

        SourceItem {
            id: self.id.clone(),
            title: self.text(&names.title).unwrap_or_default(),
            action_day,
            status: self.text(&names.status),
            external_event_id: self.text(&names.event_id),
            url: self.text(&names.url),
            last_modified_at: self.last_edited_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(properties: serde_json::Value) -> Page {
        serde_json::from_value(json!({
            "object": "page",
            "id": "1f2e3d4c-0000-4000-8000-123456789abc",
            "last_edited_time": "2023-12-01T09:00:00.000Z",
            "url": "https://www.notion.so/Dentist-1f2e3d4c000040008000123456789abc",
            "properties": properties,
        }))
        .unwrap()
    }

    #[test]
    fn test_maps_all_properties() {
        let page = page(json!({
            "Title": {"id": "title", "type": "title", "title": [
                {"type": "text", "plain_text": "Dentist"},
                {"type": "text", "plain_text": " (bring card)"}
            ]},
            "Action Day": {"id": "a", "type": "date", "date": {
                "start": "2023-12-25", "end": "2023-12-27", "time_zone": null
            }},
            "Status": {"id": "b", "type": "status", "status": {"id": "x", "name": "In progress", "color": "blue"}},
            "Event ID": {"id": "c", "type": "rich_text", "rich_text": [{"plain_text": "evt123"}]},
            "URL": {"id": "d", "type": "url", "url": "https://example.com/booking"},
            "Tags": {"id": "e", "type": "relation", "relation": [{"id": "tag"}], "has_more": false}
        }));

        let item = page.to_source_item(&PropertyNames::default());

        assert_eq!(item.title, "Dentist");
        assert_eq!(item.action_day, ActionDay::new("2023-12-25", Some("2023-12-27")));
        assert_eq!(item.status.as_deref(), Some("In progress"));
        assert_eq!(item.external_event_id.as_deref(), Some("evt123"));
        assert_eq!(item.url.as_deref(), Some("https://example.com/booking"));
        assert_eq!(item.last_modified_at.to_rfc3339(), "2023-12-01T09:00:00+00:00");
    }

    #[test]
    fn test_missing_and_empty_properties() {
        let page = page(json!({
            "Title": {"id": "title", "type": "title", "title": []},
            "Action Day": {"id": "a", "type": "date", "date": null},
            "Status": {"id": "b", "type": "select", "select": null},
            "URL": {"id": "d", "type": "url", "url": null}
        }));

        let item = page.to_source_item(&PropertyNames::default());

        assert_eq!(item.title, "");
        assert!(!item.is_eligible());
        assert_eq!(item.status, None);
        assert_eq!(item.external_event_id, None);
        assert_eq!(item.url, None);
    }

    #[test]
    fn test_select_status_and_custom_names() {
        let page = page(json!({
            "Name": {"id": "title", "type": "title", "title": [{"plain_text": "Standup"}]},
            "When": {"id": "a", "type": "date", "date": {"start": "2023-12-25T10:00:00.000+09:00", "end": null}},
            "State": {"id": "b", "type": "select", "select": {"name": "Done"}}
        }));
        let names = PropertyNames {
            title: "Name".to_string(),
            action_day: "When".to_string(),
            status: "State".to_string(),
            ..PropertyNames::default()
        };

        let item = page.to_source_item(&names);

        assert_eq!(item.title, "Standup");
        assert_eq!(item.action_day.start(), Some("2023-12-25T10:00:00.000+09:00"));
        assert_eq!(item.action_day.end(), None);
        assert_eq!(item.status.as_deref(), Some("Done"));
    }

    #[test]
    fn test_unknown_property_types_are_ignored() {
        let page = page(json!({
            "Title": {"id": "title", "type": "formula", "formula": {"type": "string", "string": "x"}}
        }));

        assert_eq!(page.to_source_item(&PropertyNames::default()).title, "");
    }
}
