//! Integration tests for the S3 object store client
//!
//! These tests run `S3Store` against a mock S3 endpoint and verify that:
//! - Listing follows continuation tokens until the prefix is exhausted
//! - Object bodies are written and read back unchanged
//! - Service errors surface as `ObjectStoreFailed`

use std::sync::Arc;

use assert_matches::assert_matches;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use snake_scores::storage::object_store::{ObjectStore, ObjectStoreBackend};
use snake_scores::storage::s3::S3Store;
use snake_scores::storage::{ScoreBackend, StorageError};
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BUCKET: &str = "test-bucket";

fn store_for(mock_server: &MockServer) -> S3Store {
    let config = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("ap-southeast-1"))
        .credentials_provider(Credentials::new("test", "test", None, None, "tests"))
        .endpoint_url(mock_server.uri())
        .force_path_style(true)
        .build();

    S3Store::new(aws_sdk_s3::Client::from_conf(config), BUCKET.to_string())
}

fn list_page(keys: &[(&str, &str)], next_token: Option<&str>) -> String {
    let contents: String = keys
        .iter()
        .map(|(key, modified)| {
            format!(
                "<Contents><Key>{key}</Key><LastModified>{modified}</LastModified>\
                 <ETag>&quot;etag&quot;</ETag><Size>64</Size><StorageClass>STANDARD</StorageClass></Contents>"
            )
        })
        .collect();

    let truncation = match next_token {
        Some(token) => {
            format!("<IsTruncated>true</IsTruncated><NextContinuationToken>{token}</NextContinuationToken>")
        }
        None => "<IsTruncated>false</IsTruncated>".to_string(),
    };

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <ListBucketResult xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">\
         <Name>{BUCKET}</Name><Prefix>scores/</Prefix><KeyCount>{}</KeyCount><MaxKeys>1000</MaxKeys>\
         {truncation}{contents}</ListBucketResult>",
        keys.len()
    )
}

fn xml(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "application/xml")
}

#[tokio::test]
async fn test_listing_follows_continuation_tokens() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/test-bucket/?$"))
        .and(query_param("list-type", "2"))
        .respond_with(xml(list_page(
            &[
                ("scores/2024/01/01/a.json", "2024-01-01T10:00:00.000Z"),
                ("scores/2024/01/01/b.json", "2024-01-01T11:00:00.000Z"),
            ],
            Some("page-2"),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/test-bucket/?$"))
        .and(query_param("list-type", "2"))
        .and(query_param("continuation-token", "page-2"))
        .respond_with(xml(list_page(
            &[("scores/2024/01/02/c.json", "2024-01-02T09:30:15.250Z")],
            None,
        )))
        .with_priority(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server);
    let objects = store.list_objects("scores/").await.unwrap();

    let keys: Vec<&str> = objects.iter().map(|object| object.key.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "scores/2024/01/01/a.json",
            "scores/2024/01/01/b.json",
            "scores/2024/01/02/c.json",
        ]
    );

    let expected = Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 15).unwrap()
        + chrono::Duration::milliseconds(250);
    assert_eq!(objects[2].last_modified, Some(expected));
    assert!(objects.iter().all(|object| object.last_modified.is_some()));
}

#[tokio::test]
async fn test_put_and_get_object() {
    let mock_server = MockServer::start().await;
    let key = "scores/2024/01/02/abc.json";
    let body = br#"{"id":"abc","user_id":"ada","points":42,"created_at":"2024-01-02T03:04:05.006Z"}"#;

    Mock::given(method("PUT"))
        .and(path(format!("/{BUCKET}/{key}")))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/{BUCKET}/{key}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server);
    store
        .put_object(key, body.to_vec(), "application/json")
        .await
        .unwrap();

    let fetched = store.get_object(key).await.unwrap();
    assert_eq!(fetched, body.to_vec());
}

#[tokio::test]
async fn test_backend_lists_records_through_s3() {
    let mock_server = MockServer::start().await;
    let key = "scores/2024/01/02/abc.json";

    Mock::given(method("GET"))
        .and(path_regex(r"^/test-bucket/?$"))
        .and(query_param("list-type", "2"))
        .respond_with(xml(list_page(&[(key, "2024-01-02T03:04:05.006Z")], None)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/{BUCKET}/{key}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(
            br#"{"id":"abc","user_id":"ada","points":42,"created_at":"2024-01-02T03:04:05.006Z"}"#
                .to_vec(),
        ))
        .mount(&mock_server)
        .await;

    let backend = ObjectStoreBackend::new(Arc::new(store_for(&mock_server)));
    let scores = backend.list_recent(50).await.unwrap();

    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].id, "abc");
    assert_eq!(scores[0].user_id, "ada");
    assert_eq!(scores[0].points.as_i64(), Some(42));
}

#[tokio::test]
async fn test_missing_bucket_is_an_object_store_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path_regex(r"^/test-bucket/?$"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server);
    let result = store.head_bucket().await;
    assert_matches!(result, Err(StorageError::ObjectStoreFailed(_)));

    let backend = ObjectStoreBackend::new(Arc::new(store));
    assert!(backend.health_check().await.is_err());
}

#[tokio::test]
async fn test_get_failure_is_an_object_store_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/{BUCKET}/scores/missing.json")))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server);
    let result = store.get_object("scores/missing.json").await;
    assert_matches!(result, Err(StorageError::ObjectStoreFailed(_)));
}
