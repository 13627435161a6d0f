//! Integration tests for saving exported artifacts.

mod support;

use std::time::Duration;

use support::{MockBackend, MockConfig, STL_BODY};
use tm_domain::error::Error;
use tm_rpc::RpcClient;

#[tokio::test]
async fn download_writes_file_atomically() {
    let mock = MockBackend::start(MockConfig::default()).await;
    let client = RpcClient::new(&mock.backend_config()).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let url = format!("{}/file/model.stl", mock.base_url);
    let path = client
        .download_file(&url, dir.path(), Some("bracket.stl"))
        .await
        .unwrap();

    assert_eq!(path, dir.path().join("bracket.stl"));
    assert_eq!(std::fs::read(&path).unwrap(), STL_BODY);
    // Only the final file remains; the temporary was renamed into place.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn download_names_file_from_url() {
    let mock = MockBackend::start(MockConfig::default()).await;
    let client = RpcClient::new(&mock.backend_config()).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let url = format!("{}/file/model.stl?download=1", mock.base_url);
    let path = client.download_file(&url, dir.path(), None).await.unwrap();
    assert_eq!(path.file_name().unwrap(), "model.stl");
}

#[tokio::test]
async fn failed_download_leaves_nothing_behind() {
    let mock = MockBackend::start(MockConfig::default()).await;
    let client = RpcClient::new(&mock.backend_config()).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let url = format!("{}/file/missing.stl", mock.base_url);
    let err = client
        .download_file(&url, dir.path(), Some("missing.stl"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Status { status: 404, .. }), "got {err:?}");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn stalled_download_hits_call_timeout() {
    let mock = MockBackend::start(MockConfig::default()).await;
    let mut cfg = mock.backend_config();
    cfg.call_timeout_ms = 300;
    let client = RpcClient::new(&cfg).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let url = format!("{}/file/stalled.stl", mock.base_url);
    let err = tokio::time::timeout(
        Duration::from_secs(10),
        client.download_file(&url, dir.path(), None),
    )
    .await
    .expect("download must give up on its own")
    .unwrap_err();

    assert!(matches!(err, Error::Timeout(_)), "got {err:?}");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
