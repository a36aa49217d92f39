use mockito::{Matcher, Server};
use serde_json::json;

use vendor_sync::models::proposal::{Proposal, ReleaseLinks};
use vendor_sync::models::version::Version;
use vendor_sync::services::review_client::ReviewClient;
use vendor_sync::utils::error::UpdateError;

use super::support::{pull_json, short_timeout};

const PULLS_PATH: &str = "/repos/charlievieth/simdutf/pulls";

fn client(url: String) -> ReviewClient {
    ReviewClient::with_api_url(
        url,
        "charlievieth/simdutf".to_string(),
        "charlievieth".to_string(),
        short_timeout(),
    )
    .unwrap()
}

fn head_query(branch: &str) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("head".into(), format!("charlievieth:{branch}")),
        Matcher::UrlEncoded("state".into(), "open".into()),
    ])
}

fn proposal() -> Proposal {
    Proposal::for_update(
        &Version::new(7, 0, 1),
        &Version::new(7, 1, 0),
        "master",
        &ReleaseLinks::new("https://github.com", "simdutf/simdutf"),
    )
}

/// Test lookup when no proposal is open for the branch
#[tokio::test]
async fn test_find_open_none() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", PULLS_PATH)
        .match_query(head_query("deps/v7.1.0"))
        .match_header("authorization", "Bearer secret")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let found = client(server.url())
        .find_open("deps/v7.1.0", Some("secret"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(found.is_none());
}

/// Test lookup of an existing proposal
#[tokio::test]
async fn test_find_open_existing() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", PULLS_PATH)
        .match_query(head_query("deps/v7.1.0"))
        .with_status(200)
        .with_body(json!([pull_json(42, "deps/v7.1.0")]).to_string())
        .create_async()
        .await;

    let found = client(server.url())
        .find_open("deps/v7.1.0", None)
        .await
        .unwrap()
        .expect("existing proposal");

    assert_eq!(found.number, 42);
    assert_eq!(found.head.unwrap().branch, "deps/v7.1.0");
}

/// Creating a proposal sends the branch, base, title and body
#[tokio::test]
async fn test_create_proposal() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PULLS_PATH)
        .match_header("authorization", "Bearer secret")
        .match_body(Matcher::PartialJson(json!({
            "head": "deps/v7.1.0",
            "base": "master",
            "title": "deps: update bundled library version from v7.0.1 to v7.1.0"
        })))
        .with_status(201)
        .with_body(pull_json(43, "deps/v7.1.0").to_string())
        .create_async()
        .await;

    let created = client(server.url()).create(&proposal(), "secret").await.unwrap();

    mock.assert_async().await;
    assert_eq!(created.number, 43);
    assert_eq!(created.html_url, "https://github.com/charlievieth/simdutf/pull/43");
}

/// Rejected submissions surface as publish errors with the response body
#[tokio::test]
async fn test_create_proposal_rejected() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", PULLS_PATH)
        .with_status(422)
        .with_body(json!({"message": "Validation Failed"}).to_string())
        .create_async()
        .await;

    let err = client(server.url()).create(&proposal(), "secret").await.unwrap_err();
    match err {
        UpdateError::Publish(message) => {
            assert!(message.contains("422"));
            assert!(message.contains("Validation Failed"));
        }
        other => panic!("Expected Publish error, got {other:?}"),
    }
}

/// Unauthorized lookups fail instead of reporting no proposal
#[tokio::test]
async fn test_find_open_unauthorized() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", PULLS_PATH)
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(json!({"message": "Bad credentials"}).to_string())
        .create_async()
        .await;

    let err = client(server.url())
        .find_open("deps/v7.1.0", Some("wrong"))
        .await
        .unwrap_err();
    assert!(matches!(err, UpdateError::Publish(ref msg) if msg.contains("401")));
}
