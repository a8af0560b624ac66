//! Package download from the package endpoints

use std::path::{Path, PathBuf};

use reqwest::header::CONTENT_DISPOSITION;
use reqwest::{Client, Response};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, warn};

use crate::config::{DOWNLOAD_CHUNK_SIZE, EndpointSet};
use crate::event::Event;
use crate::version::error::DownloadError;
use crate::version::source::{FetchStatus, PackageSource};

/// Downloads a package version from every package endpoint into one directory
pub struct HttpPackageFetcher {
    client: Client,
    endpoints: EndpointSet,
    output_dir: PathBuf,
}

impl HttpPackageFetcher {
    pub fn new(client: Client, endpoints: EndpointSet, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            endpoints,
            output_dir: output_dir.into(),
        }
    }

    /// Download one package and return the path it was written to
    async fn download(&self, url: &str) -> Result<PathBuf, DownloadError> {
        let mut response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status(status));
        }

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_disposition)
            .ok_or(DownloadError::MissingFilename)?;
        if !is_plain_file_name(&filename) {
            return Err(DownloadError::InvalidFilename(filename));
        }

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| DownloadError::Io {
                path: self.output_dir.clone(),
                source,
            })?;

        let path = self.output_dir.join(&filename);
        match write_body(&mut response, &path).await {
            Ok(written) => {
                debug!("Wrote {} bytes to {:?}", written, path);
                Ok(path)
            }
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                    warn!("Failed to remove partial file {:?}: {}", path, remove_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait::async_trait]
impl PackageSource for HttpPackageFetcher {
    async fn fetch(&self, version: &str) -> FetchStatus {
        let mut status = FetchStatus::Success;

        for (name, base) in &self.endpoints {
            let url = package_url(base, version);

            match self.download(&url).await {
                Ok(path) => Event::PackageDownloaded {
                    endpoint: name.clone(),
                    url,
                    path,
                }
                .emit(),
                Err(e) => {
                    Event::DownloadFailed {
                        endpoint: name.clone(),
                        url,
                        reason: e.to_string(),
                    }
                    .emit();
                    status = FetchStatus::Failure;
                }
            }
        }

        status
    }
}

/// Stream the response body to `path` through a fixed-size buffer
async fn write_body(response: &mut Response, path: &Path) -> Result<u64, DownloadError> {
    let io_error = |source| DownloadError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).await.map_err(io_error)?;
    let mut writer = BufWriter::with_capacity(DOWNLOAD_CHUNK_SIZE, file);
    let mut written = 0u64;

    while let Some(chunk) = response.chunk().await? {
        writer.write_all(&chunk).await.map_err(io_error)?;
        written += chunk.len() as u64;
    }
    writer.flush().await.map_err(io_error)?;

    Ok(written)
}

/// Join an endpoint base and a version with exactly one slash
///
/// Examples:
/// - ("http://feed/Models", "1.0.198") -> "http://feed/Models/1.0.198"
/// - ("http://feed/Models//", "1.0.198") -> "http://feed/Models/1.0.198"
pub fn package_url(base: &str, version: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), version)
}

/// Extract the `filename` parameter of a content-disposition header value
///
/// A quoted value runs to its closing quote, so it may contain `;`.
/// `filename*` (RFC 5987 extended notation) is not used; the plain
/// `filename` parameter names the file.
pub fn filename_from_disposition(value: &str) -> Option<String> {
    let mut rest = value.split_once(';')?.1;

    loop {
        let (key, after) = rest.split_once('=')?;
        let key = key.rsplit(';').next().unwrap_or(key);
        let after = after.trim_start();

        let (param, next) = match after.strip_prefix('"') {
            Some(quoted) => {
                let end = quoted.find('"')?;
                let tail = &quoted[end + 1..];
                (&quoted[..end], tail.split_once(';').map_or("", |(_, n)| n))
            }
            None => after.split_once(';').unwrap_or((after, "")),
        };

        if key.trim().eq_ignore_ascii_case("filename") {
            let name = param.trim();
            return (!name.is_empty()).then(|| name.to_string());
        }
        rest = next;
    }
}

fn is_plain_file_name(name: &str) -> bool {
    name != "." && name != ".." && !name.contains(['/', '\\'])
}
