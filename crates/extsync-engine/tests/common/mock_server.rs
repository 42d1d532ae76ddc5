//! Mock server helpers for package downloads

use super::fixtures::vsix_bytes;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path the fallback URL template resolves to for one package
pub fn package_path(publisher: &str, name: &str, version: &str) -> String {
    format!("/{}.{}-{}.vsix", publisher, name, version)
}

/// Serve a well-formed package at its fallback path
pub async fn mock_package(server: &MockServer, publisher: &str, name: &str, version: &str) {
    Mock::given(method("GET"))
        .and(path(package_path(publisher, name, version)))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(vsix_bytes(publisher, name, version)),
        )
        .mount(server)
        .await;
}

/// Serve arbitrary bytes at a path
pub async fn mock_bytes(server: &MockServer, at: &str, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(at.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

/// Always fail with 500 at a package's fallback path
pub async fn mock_failing_package(server: &MockServer, publisher: &str, name: &str, version: &str) {
    Mock::given(method("GET"))
        .and(path(package_path(publisher, name, version)))
        .respond_with(ResponseTemplate::new(500))
        .mount(server)
        .await;
}
