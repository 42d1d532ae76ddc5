//! Package archive and installed-directory fixtures

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::ZipWriter;

/// Manifest contents for one extension
pub fn manifest_json(publisher: &str, name: &str, version: &str) -> String {
    format!(
        r#"{{"name": "{}", "publisher": "{}", "version": "{}"}}"#,
        name, publisher, version
    )
}

/// Zip bytes with the given entries
pub fn zip_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in files {
        writer.start_file(*name, FileOptions::default()).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// A well-formed package: `extension/package.json` plus a readme
pub fn vsix_bytes(publisher: &str, name: &str, version: &str) -> Vec<u8> {
    let manifest = manifest_json(publisher, name, version);
    let readme = format!("{}.{} {}", publisher, name, version);
    zip_bytes(&[
        ("extension/package.json", manifest.as_str()),
        ("extension/README.md", readme.as_str()),
        ("[Content_Types].xml", "<Types/>"),
    ])
}

/// Write a package archive to disk
pub fn write_vsix(path: &Path, publisher: &str, name: &str, version: &str) {
    fs::write(path, vsix_bytes(publisher, name, version)).unwrap();
}

/// Create an installed extension directory named `dir`
pub fn install_dir(
    root: &Path,
    dir: &str,
    publisher: &str,
    name: &str,
    version: &str,
) -> PathBuf {
    let path = root.join(dir);
    fs::create_dir_all(&path).unwrap();
    fs::write(
        path.join("package.json"),
        manifest_json(publisher, name, version),
    )
    .unwrap();
    path
}

/// Create an installed extension in its conventional directory
pub fn install_conventional(root: &Path, publisher: &str, name: &str, version: &str) -> PathBuf {
    let dir = format!(
        "{}.{}-{}",
        publisher.to_lowercase(),
        name.to_lowercase(),
        version
    );
    install_dir(root, &dir, publisher, name, version)
}

/// Write an obsolete ledger with the given flagged directories
pub fn write_ledger(root: &Path, entries: &[&str]) -> PathBuf {
    let map: serde_json::Map<String, serde_json::Value> = entries
        .iter()
        .map(|e| (e.to_string(), serde_json::Value::Bool(true)))
        .collect();
    let path = root.join(".obsolete");
    fs::write(&path, serde_json::Value::Object(map).to_string()).unwrap();
    path
}

/// Parsed ledger contents, `None` when the file is absent
pub fn read_ledger(root: &Path) -> Option<serde_json::Map<String, serde_json::Value>> {
    let content = fs::read_to_string(root.join(".obsolete")).ok()?;
    serde_json::from_str(&content).ok()
}

/// Leftover temporary archives from the fetcher in `dir`
pub fn leftover_archives(dir: &Path) -> usize {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("extsync-"))
        .count()
}
