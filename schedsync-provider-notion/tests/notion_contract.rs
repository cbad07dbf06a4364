//! Notion API contract tests
//!
//! Verify the exact requests sent to the Notion REST API and how its
//! responses and errors are mapped.

use schedsync_core::config::NotionConfig;
use schedsync_core::error::{RemoteWriteError, Side, SyncError};
use schedsync_core::remote::SourceClient;
use schedsync_provider_notion::NotionClient;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DATABASE_ID: &str = "0a1b2c3d4e5f40718293a4b5c6d7e8f9";
const TAG_ID: &str = "9f8e7d6c-5b4a-4392-8170-6f5e4d3c2b1a";

fn client(server: &MockServer) -> NotionClient {
    NotionClient::new(NotionConfig {
        api_key: "secret_test".to_string(),
        database_id: DATABASE_ID.to_string(),
        schedule_tag_id: TAG_ID.to_string(),
        base_url: format!("{}/v1", server.uri()),
        ..NotionConfig::default()
    })
}

fn page(id: &str, title: &str, start: &str) -> Value {
    json!({
        "object": "page",
        "id": id,
        "last_edited_time": "2023-12-01T09:00:00.000Z",
        "properties": {
            "Title": {"id": "title", "type": "title", "title": [{"plain_text": title}]},
            "Action Day": {"id": "a", "type": "date", "date": {"start": start, "end": null}},
            "Status": {"id": "b", "type": "status", "status": {"name": "Not started"}}
        }
    })
}

fn results(pages: Vec<Value>, next_cursor: Option<&str>) -> Value {
    json!({
        "object": "list",
        "results": pages,
        "has_more": next_cursor.is_some(),
        "next_cursor": next_cursor,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Query
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_query_sends_headers_filter_and_sort() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/v1/databases/{}/query", DATABASE_ID)))
        .and(header("authorization", "Bearer secret_test"))
        .and(header("notion-version", "2022-06-28"))
        .and(body_partial_json(json!({
            "filter": {"and": [
                {"property": "Tags", "relation": {"contains": TAG_ID}},
                {"property": "Action Day", "date": {"is_not_empty": true}}
            ]},
            "sorts": [{"property": "Update At", "direction": "descending"}],
            "page_size": 100
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(results(
            vec![page("page-1", "Dentist", "2023-12-25")],
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let items = client(&server).query().await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "page-1");
    assert_eq!(items[0].title, "Dentist");
    assert_eq!(items[0].action_day.start(), Some("2023-12-25"));
    assert_eq!(items[0].status.as_deref(), Some("Not started"));
}

#[tokio::test]
async fn test_query_follows_pagination() {
    let server = MockServer::start().await;
    let query_path = format!("/v1/databases/{}/query", DATABASE_ID);

    Mock::given(method("POST"))
        .and(path(query_path.clone()))
        .and(body_partial_json(json!({"start_cursor": "cursor-2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(results(
            vec![page("page-3", "Trip", "2023-12-27")],
            None,
        )))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(query_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(results(
            vec![
                page("page-1", "Dentist", "2023-12-25"),
                page("page-2", "Call", "2023-12-26T10:00:00.000+09:00"),
            ],
            Some("cursor-2"),
        )))
        .with_priority(2)
        .expect(1)
        .mount(&server)
        .await;

    let items = client(&server).query().await.unwrap();

    let ids: Vec<&str> = items.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["page-1", "page-2", "page-3"]);
}

#[tokio::test]
async fn test_query_error_is_bulk_fetch_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "object": "error",
            "status": 401,
            "code": "unauthorized",
            "message": "API token is invalid."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server).query().await.unwrap_err();

    match err {
        SyncError::BulkFetch { side, message } => {
            assert_eq!(side, Side::Source);
            assert!(message.contains("API token is invalid."), "{}", message);
        }
        other => panic!("expected bulk fetch error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_query_rejects_malformed_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server).query().await.unwrap_err();

    assert!(matches!(err, SyncError::BulkFetch { side: Side::Source, .. }));
}

// ────────────────────────────────────────────────────────────────────────────
// Back-link
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_patch_back_link_writes_event_id() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/v1/pages/page-1"))
        .and(header("authorization", "Bearer secret_test"))
        .and(body_partial_json(json!({
            "properties": {
                "Event ID": {"rich_text": [{"text": {"content": "evt123"}}]}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            "page-1",
            "Dentist",
            "2023-12-25",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server).patch_back_link("page-1", "evt123").await;

    assert_eq!(result, Ok(()));
}

#[tokio::test]
async fn test_patch_back_link_missing_page() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "object": "error",
            "status": 404,
            "code": "object_not_found",
            "message": "Could not find page with ID: page-9."
        })))
        .mount(&server)
        .await;

    let result = client(&server).patch_back_link("page-9", "evt123").await;

    assert!(matches!(result, Err(RemoteWriteError::NotFound(_))));
}

#[tokio::test]
async fn test_patch_back_link_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let result = client(&server).patch_back_link("page-1", "evt123").await;

    assert_eq!(
        result,
        Err(RemoteWriteError::Failed("Notion returned 502 Bad Gateway".to_string()))
    );
}
