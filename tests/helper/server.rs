//! Mock endpoint utilities

use mockito::{Mock, ServerGuard};

/// Version-check endpoint answering with `{"modelsVersion": version}`
pub async fn mock_version_endpoint(server: &mut ServerGuard, path: &str, version: &str) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(r#"{{"modelsVersion": "{version}"}}"#))
        .create_async()
        .await
}

/// Package endpoint serving `body` as `file_name`
pub async fn mock_package_endpoint(
    server: &mut ServerGuard,
    path: &str,
    file_name: &str,
    body: &[u8],
) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "application/octet-stream")
        .with_header(
            "content-disposition",
            &format!(r#"attachment; filename="{file_name}""#),
        )
        .with_body(body)
        .create_async()
        .await
}

/// Endpoint that answers with a bare status code
pub async fn mock_status(server: &mut ServerGuard, path: &str, status: usize) -> Mock {
    server
        .mock("GET", path)
        .with_status(status)
        .create_async()
        .await
}
