//! Package fetcher, installer and uninstaller tests
//!
//! Tests cover:
//! - Download from the record URL and from the fallback template
//! - HTTP failures surfacing as download errors
//! - Temporary archive lifetime
//! - Installing into fresh and stale target directories
//! - Corrupt archives and missing payload directories
//! - Idempotent uninstall preferring the live directory

mod common;

use common::*;
use extsync_engine::{InventoryReader, PackageFetcher, PackageInstaller, SyncError, Uninstaller};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::MockServer;

fn fetcher(server: &MockServer, temp_dir: &std::path::Path) -> PackageFetcher {
    let config = ConfigBuilder::new(temp_dir).gallery(&server.uri()).build();
    PackageFetcher::new(&config)
        .unwrap()
        .with_temp_dir(temp_dir)
}

#[tokio::test]
async fn test_fetch_uses_fallback_url() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mock_package(&server, "pub", "ext", "1.0.0").await;

    let package = fetcher(&server, temp.path())
        .fetch(ext("pub.ext", "1.0.0"))
        .await
        .unwrap();

    assert_eq!(
        package.record.download_url.as_deref(),
        Some(format!("{}{}", server.uri(), package_path("pub", "ext", "1.0.0")).as_str())
    );
    assert_eq!(
        package.record.archive_path.as_deref(),
        Some(package.archive_path())
    );
    assert_eq!(
        fs::read(package.archive_path()).unwrap(),
        vsix_bytes("pub", "ext", "1.0.0")
    );
}

#[tokio::test]
async fn test_fetch_prefers_record_url() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mock_bytes(&server, "/cdn/latest.vsix", b"payload".to_vec()).await;

    let record =
        ext("pub.ext", "2.0.0").with_download_url(format!("{}/cdn/latest.vsix", server.uri()));
    let package = fetcher(&server, temp.path()).fetch(record).await.unwrap();

    assert_eq!(fs::read(package.archive_path()).unwrap(), b"payload");
}

#[tokio::test]
async fn test_fetch_http_error_is_download_error() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mock_failing_package(&server, "pub", "ext", "1.0.0").await;

    let err = fetcher(&server, temp.path())
        .fetch(ext("pub.ext", "1.0.0"))
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Download { ref id, .. } if id == "pub.ext"));
    assert_eq!(leftover_archives(temp.path()), 0);
}

#[tokio::test]
async fn test_fetch_unknown_package_is_download_error() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    let err = fetcher(&server, temp.path())
        .fetch(ext("pub.missing", "1.0.0"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "download");
}

#[tokio::test]
async fn test_archive_removed_when_package_dropped() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mock_package(&server, "pub", "ext", "1.0.0").await;

    let package = fetcher(&server, temp.path())
        .fetch(ext("pub.ext", "1.0.0"))
        .await
        .unwrap();
    let archive = package.archive_path().to_path_buf();
    assert!(archive.exists());
    assert_eq!(leftover_archives(temp.path()), 1);

    drop(package);
    assert!(!archive.exists());
    assert_eq!(leftover_archives(temp.path()), 0);
}

#[test]
fn test_install_into_missing_target() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("pkg.vsix");
    write_vsix(&archive, "pub", "ext", "1.0.0");

    let mut record = ext("pub.ext", "1.0.0");
    record.archive_path = Some(archive);
    let target = temp.path().join("exts/pub.ext-1.0.0");

    let installed = PackageInstaller::default().install(record, &target).unwrap();

    assert_eq!(installed.install_path.as_deref(), Some(target.as_path()));
    assert!(target.join("package.json").exists());
    assert!(target.join("README.md").exists());
    // Only the payload directory is copied
    assert!(!target.join("extension").exists());
    assert!(!target.join("[Content_Types].xml").exists());
}

#[test]
fn test_install_replaces_stale_content() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("pkg.vsix");
    write_vsix(&archive, "pub", "ext", "2.0.0");

    let target = install_dir(temp.path(), "target", "pub", "ext", "1.0.0");
    fs::create_dir_all(target.join("out/old")).unwrap();
    fs::write(target.join("out/old/stale.js"), "old").unwrap();
    fs::write(target.join("stale.txt"), "old").unwrap();

    let mut record = ext("pub.ext", "2.0.0");
    record.archive_path = Some(archive);
    PackageInstaller::default().install(record, &target).unwrap();

    assert!(!target.join("stale.txt").exists());
    assert!(!target.join("out").exists());
    let manifest = fs::read_to_string(target.join("package.json")).unwrap();
    assert!(manifest.contains("2.0.0"));
}

#[test]
fn test_install_without_archive_is_state_error() {
    let temp = TempDir::new().unwrap();
    let err = PackageInstaller::default()
        .install(ext("pub.ext", "1.0.0"), &temp.path().join("target"))
        .unwrap_err();

    assert_eq!(err.kind(), "state");
    assert!(!temp.path().join("target").exists());
}

#[test]
fn test_corrupt_archive_is_extract_error_and_target_untouched() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("pkg.vsix");
    fs::write(&archive, b"this is not a zip file").unwrap();
    let target = install_dir(temp.path(), "target", "pub", "ext", "1.0.0");

    let mut record = ext("pub.ext", "1.0.0");
    record.archive_path = Some(archive);
    let err = PackageInstaller::default()
        .install(record, &target)
        .unwrap_err();

    assert!(matches!(err, SyncError::Extract { .. }));
    assert!(target.join("package.json").exists());
}

#[test]
fn test_missing_payload_dir_is_extract_error() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("pkg.vsix");
    fs::write(&archive, zip_bytes(&[("other/package.json", "{}")])).unwrap();

    let mut record = ext("pub.ext", "1.0.0");
    record.archive_path = Some(archive);
    let err = PackageInstaller::default()
        .install(record, &temp.path().join("target"))
        .unwrap_err();

    assert!(matches!(err, SyncError::Extract { .. }));
    assert!(err.to_string().contains("'extension'"));
}

#[test]
fn test_custom_payload_dir() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("pkg.vsix");
    fs::write(&archive, zip_bytes(&[("payload/main.js", "x")])).unwrap();

    let mut record = ext("pub.ext", "1.0.0");
    record.archive_path = Some(archive);
    let target = temp.path().join("target");
    PackageInstaller::new("payload")
        .install(record, &target)
        .unwrap();

    assert!(target.join("main.js").exists());
}

#[tokio::test]
async fn test_uninstall_prefers_live_directory() {
    let temp = TempDir::new().unwrap();
    let live = install_dir(temp.path(), "renamed-by-host", "pub", "ext", "1.0.0");
    let installed = ext("pub.ext", "1.0.0").with_install_path(&live);
    let inventory = Arc::new(MockInventory::with_root(temp.path(), vec![installed]));

    let removed = Uninstaller::new(inventory.clone())
        .uninstall(ext("pub.ext", "1.0.0"))
        .await
        .unwrap();

    assert!(!live.exists());
    assert_eq!(removed.install_path.as_deref(), Some(live.as_path()));
}

#[tokio::test]
async fn test_uninstall_missing_directory_is_success() {
    let temp = TempDir::new().unwrap();
    let inventory: Arc<dyn InventoryReader> =
        Arc::new(MockInventory::with_root(temp.path(), vec![]));
    let uninstaller = Uninstaller::new(inventory);

    let record = ext("pub.gone", "1.0.0");
    uninstaller.uninstall(record.clone()).await.unwrap();
    uninstaller.uninstall(record).await.unwrap();
}

#[cfg(unix)]
#[tokio::test]
async fn test_uninstall_failure_is_uninstall_error() {
    let temp = TempDir::new().unwrap();
    // A regular file where a directory is expected
    let path = temp.path().join("pub.file-1.0.0");
    fs::write(&path, "not a directory").unwrap();
    let inventory = Arc::new(MockInventory::with_root(temp.path(), vec![]));

    let err = Uninstaller::new(inventory)
        .uninstall(ext("pub.file", "1.0.0"))
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Uninstall { ref path, .. } if path.ends_with("pub.file-1.0.0")));
}
