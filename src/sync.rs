//! One sync run: poll, resolve, check history, fetch, record

use std::time::Duration;

use anyhow::Context;
use tracing::{debug, info};

use crate::config::Config;
use crate::event::Event;
use crate::schema::ResponseSchema;
use crate::version::dotted::max_version;
use crate::version::error::HistoryError;
use crate::version::history::{DownloadHistory, HistoryFile};
use crate::version::source::{PackageSource, VersionSource};
use crate::version::sources::{
    HttpPackageFetcher, HttpVersionPoller, build_client, build_download_client,
};

/// Run one sync with the HTTP sources and history file described by `config`
pub async fn run(config: &Config) -> anyhow::Result<SyncOutcome> {
    let schema = match &config.schema_path {
        Some(path) => ResponseSchema::load(path)?,
        None => ResponseSchema::for_field(&config.version_field),
    };
    let timeout = Duration::from_millis(config.request_timeout_ms);
    let client = build_client(timeout).context("Failed to create HTTP client")?;
    let download_client =
        build_download_client(timeout).context("Failed to create download client")?;

    let poller = HttpVersionPoller::new(
        client,
        config.version_endpoints.clone(),
        schema,
        config.version_field.as_str(),
    );
    let fetcher = HttpPackageFetcher::new(
        download_client,
        config.package_endpoints.clone(),
        config.output_dir.clone(),
    );
    let history = HistoryFile::new(config.history_path.clone());

    info!(
        "Checking {} version endpoints, history at {:?}",
        config.version_endpoints.len(),
        history.path()
    );

    Ok(sync_latest(&poller, &fetcher, &history).await?)
}

/// How a sync run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No endpoint reported a usable version; nothing was fetched
    NoVersionFound,
    /// The newest version is already in the history
    AlreadyDownloaded(String),
    /// The newest version was fetched from every endpoint and recorded
    Downloaded(String),
    /// At least one endpoint failed; the version stays unrecorded for the next run
    DownloadFailed(String),
}

/// Download the newest reported version unless the history already has it
///
/// Endpoint failures are logged and never returned as errors. Only history
/// I/O failures abort the run.
pub async fn sync_latest<H: DownloadHistory>(
    source: &dyn VersionSource,
    packages: &dyn PackageSource,
    history: &H,
) -> Result<SyncOutcome, HistoryError> {
    let report = source.poll().await;

    if report.is_empty() {
        Event::NoVersionFound {
            endpoints: report.attempted,
        }
        .emit();
        Event::NothingDownloaded.emit();
        return Ok(SyncOutcome::NoVersionFound);
    }

    let version = max_version(&report.versions);
    debug!("Resolved version {} from {} endpoints", version, report.versions.len());

    if !history.exists() {
        history.initialize()?;
    }

    if history.contains(&version)? {
        Event::AlreadyDownloaded {
            version: version.clone(),
        }
        .emit();
        return Ok(SyncOutcome::AlreadyDownloaded(version));
    }

    if !packages.fetch(&version).await.is_success() {
        return Ok(SyncOutcome::DownloadFailed(version));
    }

    history.append(&version)?;
    Event::VersionRecorded {
        version: version.clone(),
    }
    .emit();

    Ok(SyncOutcome::Downloaded(version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::history::MockDownloadHistory;
    use crate::version::source::{
        FetchStatus, MockPackageSource, MockVersionSource, VersionReport,
    };
    use mockall::predicate::eq;

    fn source_reporting(versions: &[(&str, &str)], attempted: &[&str]) -> MockVersionSource {
        let report = VersionReport {
            versions: versions
                .iter()
                .map(|(name, v)| (name.to_string(), v.to_string()))
                .collect(),
            attempted: attempted.iter().map(|s| s.to_string()).collect(),
        };
        let mut source = MockVersionSource::new();
        source.expect_poll().times(1).return_const(report);
        source
    }

    #[tokio::test]
    async fn sync_latest_skips_fetch_and_history_when_no_version_found() {
        let source = source_reporting(&[], &["dh1", "dh2"]);
        let mut packages = MockPackageSource::new();
        packages.expect_fetch().never();
        let mut history = MockDownloadHistory::new();
        history.expect_exists().never();
        history.expect_initialize().never();
        history.expect_append().never();

        let outcome = sync_latest(&source, &packages, &history).await.unwrap();

        assert_eq!(outcome, SyncOutcome::NoVersionFound);
    }

    #[tokio::test]
    async fn sync_latest_initializes_missing_history_and_records_download() {
        let source = source_reporting(
            &[("dh1", "1.0.166.1"), ("dh2", "1.0.198")],
            &["dh1", "dh2"],
        );
        let mut packages = MockPackageSource::new();
        packages
            .expect_fetch()
            .with(eq("1.0.198"))
            .times(1)
            .return_const(FetchStatus::Success);

        let mut history = MockDownloadHistory::new();
        history.expect_exists().return_const(false);
        history.expect_initialize().times(1).returning(|| Ok(()));
        history
            .expect_contains()
            .with(eq("1.0.198"))
            .returning(|_| Ok(false));
        history
            .expect_append()
            .with(eq("1.0.198"))
            .times(1)
            .returning(|_| Ok(()));

        let outcome = sync_latest(&source, &packages, &history).await.unwrap();

        assert_eq!(outcome, SyncOutcome::Downloaded("1.0.198".to_string()));
    }

    #[tokio::test]
    async fn sync_latest_is_noop_when_version_already_downloaded() {
        let source = source_reporting(&[("dh1", "1.0.198")], &["dh1"]);
        let mut packages = MockPackageSource::new();
        packages.expect_fetch().never();

        let mut history = MockDownloadHistory::new();
        history.expect_exists().return_const(true);
        history.expect_initialize().never();
        history.expect_contains().returning(|_| Ok(true));
        history.expect_append().never();

        let outcome = sync_latest(&source, &packages, &history).await.unwrap();

        assert_eq!(
            outcome,
            SyncOutcome::AlreadyDownloaded("1.0.198".to_string())
        );
    }

    #[tokio::test]
    async fn sync_latest_does_not_record_failed_download() {
        let source = source_reporting(&[("dh1", "1.0.198")], &["dh1"]);
        let mut packages = MockPackageSource::new();
        packages
            .expect_fetch()
            .times(1)
            .return_const(FetchStatus::Failure);

        let mut history = MockDownloadHistory::new();
        history.expect_exists().return_const(true);
        history.expect_contains().returning(|_| Ok(false));
        history.expect_append().never();

        let outcome = sync_latest(&source, &packages, &history).await.unwrap();

        assert_eq!(outcome, SyncOutcome::DownloadFailed("1.0.198".to_string()));
    }

    #[tokio::test]
    async fn sync_latest_propagates_history_errors() {
        let source = source_reporting(&[("dh1", "1.0.198")], &["dh1"]);
        let mut packages = MockPackageSource::new();
        packages.expect_fetch().never();

        let mut history = MockDownloadHistory::new();
        history.expect_exists().return_const(true);
        history.expect_contains().returning(|_| {
            Err(HistoryError::Io {
                path: "downloaded.txt".into(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            })
        });

        let result = sync_latest(&source, &packages, &history).await;

        assert!(matches!(result, Err(HistoryError::Io { .. })));
    }
}
