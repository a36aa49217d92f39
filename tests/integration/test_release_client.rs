use mockito::{Matcher, Server};
use serde_json::json;
use tempfile::TempDir;

use vendor_sync::models::version::Version;
use vendor_sync::services::release_client::ReleaseClient;
use vendor_sync::utils::error::UpdateError;

use super::support::{release_json, short_timeout, singleheader_zip};

const LATEST_PATH: &str = "/repos/simdutf/simdutf/releases/latest";

fn client(url: String) -> ReleaseClient {
    ReleaseClient::with_api_url(
        url,
        "simdutf/simdutf".to_string(),
        "singleheader.zip".to_string(),
        short_timeout(),
    )
    .unwrap()
}

/// Test fetching and validating the latest release
#[tokio::test]
async fn test_fetch_latest_release() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", LATEST_PATH)
        .match_header("accept", "application/vnd.github+json")
        .match_header("x-github-api-version", "2022-11-28")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(release_json("v7.1.0", false, false, &server.url()).to_string())
        .create_async()
        .await;

    let client = client(server.url());
    let release = client.fetch_latest().await.unwrap();

    mock.assert_async().await;
    assert_eq!(release.tag, Version::new(7, 1, 0));
    assert!(release.is_installable());
    assert_eq!(
        client.resolve_archive_url(&release).unwrap(),
        format!("{}/downloads/v7.1.0/singleheader.zip", server.url())
    );
}

/// Upstream tags must be exactly v<int>.<int>.<int>
#[tokio::test]
async fn test_fetch_latest_rejects_non_strict_tags() {
    for tag in ["v1.2", "1.2.3", "v1.2.3-beta"] {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", LATEST_PATH)
            .with_status(200)
            .with_body(release_json(tag, false, false, &server.url()).to_string())
            .create_async()
            .await;

        let err = client(server.url()).fetch_latest().await.unwrap_err();
        assert!(
            matches!(err, UpdateError::MalformedVersion { .. }),
            "tag {tag} should be rejected, got {err:?}"
        );
    }
}

/// Drafts are fetched as-is; refusing them is the caller's decision
#[tokio::test]
async fn test_fetch_latest_keeps_draft_flags() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", LATEST_PATH)
        .with_status(200)
        .with_body(release_json("v8.0.0", true, true, &server.url()).to_string())
        .create_async()
        .await;

    let release = client(server.url()).fetch_latest().await.unwrap();
    assert!(release.is_draft);
    assert!(release.is_prerelease);
    assert!(matches!(
        release.ensure_installable(),
        Err(UpdateError::UnsafeRelease { .. })
    ));
}

/// Non-success responses carry status and body
#[tokio::test]
async fn test_fetch_latest_http_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", LATEST_PATH)
        .with_status(403)
        .with_body(json!({"message": "API rate limit exceeded"}).to_string())
        .create_async()
        .await;

    let err = client(server.url()).fetch_latest().await.unwrap_err();
    match err {
        UpdateError::ReleaseFeed(message) => {
            assert!(message.contains("403"));
            assert!(message.contains("API rate limit exceeded"));
            assert!(message.contains(LATEST_PATH));
        }
        other => panic!("Expected ReleaseFeed error, got {other:?}"),
    }
}

/// Unreachable feed is a release feed failure, not retried
#[tokio::test]
async fn test_fetch_latest_connection_refused() {
    let err = client("http://127.0.0.1:1".to_string())
        .fetch_latest()
        .await
        .unwrap_err();
    assert!(matches!(err, UpdateError::ReleaseFeed(_)));
}

/// Missing archive asset
#[tokio::test]
async fn test_resolve_archive_url_missing_asset() {
    let mut server = Server::new_async().await;
    let mut release = release_json("v7.1.0", false, false, &server.url());
    release["assets"] = json!([]);
    let _mock = server
        .mock("GET", LATEST_PATH)
        .with_status(200)
        .with_body(release.to_string())
        .create_async()
        .await;

    let client = client(server.url());
    let descriptor = client.fetch_latest().await.unwrap();
    let err = client.resolve_archive_url(&descriptor).unwrap_err();
    assert!(matches!(err, UpdateError::AssetNotFound { .. }));
}

/// Download streams into the destination and reports a digest
#[tokio::test]
async fn test_download_archive() {
    let mut server = Server::new_async().await;
    let bytes = singleheader_zip("v7.1.0");
    let mock = server
        .mock("GET", "/downloads/v7.1.0/singleheader.zip")
        .match_header("accept", "application/octet-stream")
        .with_status(200)
        .with_body(bytes.clone())
        .create_async()
        .await;

    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("singleheader.zip");
    let url = format!("{}/downloads/v7.1.0/singleheader.zip", server.url());
    let archive = client(server.url()).download_archive(&url, &destination).await.unwrap();

    mock.assert_async().await;
    assert_eq!(archive.size, bytes.len() as u64);
    assert_eq!(archive.sha256.len(), 64);
    assert_eq!(std::fs::read(&destination).unwrap(), bytes);
}

/// Failed downloads are installation errors
#[tokio::test]
async fn test_download_archive_not_found() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", Matcher::Regex("^/downloads/.*$".to_string()))
        .with_status(404)
        .with_body("Not Found")
        .create_async()
        .await;

    let temp_dir = TempDir::new().unwrap();
    let url = format!("{}/downloads/v7.1.0/singleheader.zip", server.url());
    let err = client(server.url())
        .download_archive(&url, &temp_dir.path().join("a.zip"))
        .await
        .unwrap_err();

    assert!(matches!(err, UpdateError::Installation(ref msg) if msg.contains("404")));
}
