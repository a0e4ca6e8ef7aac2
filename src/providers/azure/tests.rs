use chrono::{TimeZone, Utc};
use mockito::Matcher;
use serde_json::json;

use super::client::AzureDevOpsClient;
use super::AzureDevOpsProvider;
use crate::auth::Token;
use crate::error::ReportError;

const BUILDS_PATH: &str = "/contoso/web/_apis/build/builds";

fn query() -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("queryOrder".into(), "finishTimeDescending".into()),
        Matcher::UrlEncoded("api-version".into(), "7.0".into()),
    ])
}

#[tokio::test]
async fn test_fetch_builds_sends_basic_auth_and_parses_list() {
    let mut server = mockito::Server::new_async().await;
    let body = json!({
        "count": 2,
        "value": [
            {"buildNumber": "2", "definition": {"name": "CI"}, "result": "failed"},
            {"buildNumber": "1", "definition": {"name": "CI"}, "result": "succeeded"}
        ]
    });
    let mock = server
        .mock("GET", BUILDS_PATH)
        .match_query(query())
        .match_header("authorization", "Basic OnNlY3JldC1wYXQ=")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let client =
        AzureDevOpsClient::new(&server.url(), "contoso", "web", Some(Token::from("secret-pat")))
            .unwrap();
    let builds = client.fetch_builds().await.unwrap();

    mock.assert_async().await;
    assert_eq!(builds.len(), 2);
    assert_eq!(builds[0].build_number(), Some("2"));
    assert_eq!(builds[1].result(), Some("succeeded"));
}

#[tokio::test]
async fn test_fetch_builds_reports_http_errors() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", BUILDS_PATH)
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body("project not found")
        .create_async()
        .await;

    let client = AzureDevOpsClient::new(&server.url(), "contoso", "web", None).unwrap();
    let err = client.fetch_builds().await.unwrap_err();

    match err {
        ReportError::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "project not found");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_fetch_builds_treats_sign_in_page_as_auth_failure() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", BUILDS_PATH)
        .match_query(Matcher::Any)
        .with_status(203)
        .with_header("content-type", "text/html")
        .with_body("<html>Sign in</html>")
        .create_async()
        .await;

    let client = AzureDevOpsClient::new(&server.url(), "contoso", "web", None).unwrap();
    let err = client.fetch_builds().await.unwrap_err();

    assert!(matches!(err, ReportError::Api { status: 203, .. }));
    assert!(err.to_string().contains("personal access token"));
}

#[tokio::test]
async fn test_fetch_builds_rejects_malformed_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", BUILDS_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("{not json")
        .create_async()
        .await;

    let client = AzureDevOpsClient::new(&server.url(), "contoso", "web", None).unwrap();

    assert!(matches!(
        client.fetch_builds().await,
        Err(ReportError::Network(_))
    ));
}

#[tokio::test]
async fn test_provider_filters_to_window() {
    let mut server = mockito::Server::new_async().await;
    let body = json!({
        "count": 3,
        "value": [
            {"buildNumber": "new", "definition": {"name": "CI"},
             "finishTime": "2024-03-02T11:00:00Z"},
            {"buildNumber": "in-progress", "definition": {"name": "CI"}},
            {"buildNumber": "old", "definition": {"name": "CI"},
             "finishTime": "2024-02-28T11:00:00Z"}
        ]
    });
    let _mock = server
        .mock("GET", BUILDS_PATH)
        .match_query(query())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let provider = AzureDevOpsProvider::new(
        &server.url(),
        "contoso".to_string(),
        "web".to_string(),
        None,
    )
    .unwrap();
    let now = Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap();
    let builds = provider.fetch_recent_builds(24, now).await.unwrap();

    assert_eq!(builds.len(), 1);
    assert_eq!(builds[0].build_number(), Some("new"));
}
