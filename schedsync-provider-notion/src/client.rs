//! HTTP client for the Notion REST API.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use schedsync_core::config::NotionConfig;
use schedsync_core::error::{RemoteWriteError, Side, SyncError, SyncResult};
use schedsync_core::remote::SourceClient;
use schedsync_core::source::SourceItem;

use crate::properties::{Page, QueryResponse};

pub const NOTION_API_VERSION: &str = "2022-06-28";
/// Largest page size the query endpoint accepts.
const PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Reads schedule records from one database and writes back event ids.
pub struct NotionClient {
    http: reqwest::Client,
    config: NotionConfig,
}

impl NotionClient {
    pub fn new(config: NotionConfig) -> Self {
        NotionClient {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.url(path))
            .bearer_auth(&self.config.api_key)
            .header("Notion-Version", NOTION_API_VERSION)
    }

    /// Body of one query call: tagged records with a date, most recently updated first.
    pub fn query_body(&self, start_cursor: Option<&str>) -> Value {
        let names = &self.config.properties;
        let mut body = json!({
            "filter": {
                "and": [
                    {
                        "property": names.tags,
                        "relation": { "contains": self.config.schedule_tag_id }
                    },
                    {
                        "property": names.action_day,
                        "date": { "is_not_empty": true }
                    }
                ]
            },
            "sorts": [
                { "property": names.updated_at, "direction": "descending" }
            ],
            "page_size": PAGE_SIZE
        });

        if let Some(cursor) = start_cursor {
            body["start_cursor"] = json!(cursor);
        }

        body
    }

    /// Every matching page, following pagination to the end.
    pub async fn query_pages(&self) -> SyncResult<Vec<Page>> {
        let path = format!("databases/{}/query", self.config.database_id);
        let fetch_error = |message: String| SyncError::bulk_fetch(Side::Source, message);

        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let resp = self
                .request(reqwest::Method::POST, &path)
                .json(&self.query_body(cursor.as_deref()))
                .send()
                .await
                .map_err(|e| fetch_error(format!("Notion query failed: {}", e)))?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(fetch_error(describe_error(status, &body)));
            }

            let batch: QueryResponse = resp
                .json()
                .await
                .map_err(|e| fetch_error(format!("Unexpected Notion response: {}", e)))?;
            debug!(count = batch.results.len(), has_more = batch.has_more, "fetched Notion page batch");
            pages.extend(batch.results);

            match batch.next_cursor {
                Some(next) if batch.has_more => cursor = Some(next),
                _ => break,
            }
        }

        Ok(pages)
    }

    pub fn back_link_body(&self, target_id: &str) -> Value {
        json!({
            "properties": {
                self.config.properties.event_id.as_str(): {
                    "rich_text": [
                        { "text": { "content": target_id } }
                    ]
                }
            }
        })
    }
}

#[async_trait]
impl SourceClient for NotionClient {
    async fn query(&self) -> SyncResult<Vec<SourceItem>> {
        let pages = self.query_pages().await?;
        Ok(pages
            .iter()
            .map(|page| page.to_source_item(&self.config.properties))
            .collect())
    }

    async fn patch_back_link(
        &self,
        source_id: &str,
        target_id: &str,
    ) -> Result<(), RemoteWriteError> {
        let resp = self
            .request(reqwest::Method::PATCH, &format!("pages/{}", source_id))
            .json(&self.back_link_body(target_id))
            .send()
            .await
            .map_err(|e| RemoteWriteError::Failed(format!("Notion update failed: {}", e)))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        let message = describe_error(status, &body);
        if status == StatusCode::NOT_FOUND {
            Err(RemoteWriteError::NotFound(message))
        } else {
            Err(RemoteWriteError::Failed(message))
        }
    }
}

fn describe_error(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) if !err.message.is_empty() => {
            format!("Notion returned {} ({}): {}", status, err.code, err.message)
        }
        _ => format!("Notion returned {}", status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> NotionClient {
        NotionClient::new(NotionConfig {
            api_key: "secret".to_string(),
            database_id: "db1".to_string(),
            schedule_tag_id: "tag1".to_string(),
            ..NotionConfig::default()
        })
    }

    #[test]
    fn test_query_body_filters_and_sorts() {
        let body = client().query_body(None);

        assert_eq!(body["filter"]["and"][0]["property"], "Tags");
        assert_eq!(body["filter"]["and"][0]["relation"]["contains"], "tag1");
        assert_eq!(body["filter"]["and"][1]["property"], "Action Day");
        assert_eq!(body["filter"]["and"][1]["date"]["is_not_empty"], true);
        assert_eq!(body["sorts"][0]["property"], "Update At");
        assert_eq!(body["sorts"][0]["direction"], "descending");
        assert!(body.get("start_cursor").is_none());
    }

    #[test]
    fn test_query_body_carries_cursor() {
        let body = client().query_body(Some("cursor-2"));

        assert_eq!(body["start_cursor"], "cursor-2");
    }

    #[test]
    fn test_back_link_body() {
        let body = client().back_link_body("evt123");

        assert_eq!(
            body["properties"]["Event ID"]["rich_text"][0]["text"]["content"],
            "evt123"
        );
    }

    #[test]
    fn test_describe_error_uses_api_message() {
        let body = r#"{"object":"error","status":400,"code":"validation_error","message":"Could not find property"}"#;

        assert_eq!(
            describe_error(StatusCode::BAD_REQUEST, body),
            "Notion returned 400 Bad Request (validation_error): Could not find property"
        );
        assert_eq!(
            describe_error(StatusCode::BAD_GATEWAY, "<html>"),
            "Notion returned 502 Bad Gateway"
        );
    }

    #[test]
    fn test_url_tolerates_trailing_slash() {
        let client = NotionClient::new(NotionConfig {
            base_url: "http://localhost:1234/v1/".to_string(),
            ..NotionConfig::default()
        });

        assert_eq!(client.url("pages/p1"), "http://localhost:1234/v1/pages/p1");
    }
}
