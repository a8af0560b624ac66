//! Traits for the remote side of a sync run

#[cfg(test)]
use mockall::automock;

use indexmap::IndexMap;

/// Versions collected from one round of polling
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionReport {
    /// Endpoint name to normalized version, only for endpoints that answered usefully
    pub versions: IndexMap<String, String>,
    /// Every endpoint that was asked, in polling order
    pub attempted: Vec<String>,
}

impl VersionReport {
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

/// Aggregate result of downloading one version from every package endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// Every endpoint delivered the package
    Success,
    /// At least one endpoint failed
    Failure,
}

impl FetchStatus {
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

/// Trait for asking every version-check endpoint for its current version
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait VersionSource: Send + Sync {
    /// Poll all endpoints once. A failing endpoint is left out of the report.
    async fn poll(&self) -> VersionReport;
}

/// Trait for downloading a package version from every package endpoint
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait PackageSource: Send + Sync {
    /// Download `version` from all endpoints, attempting each even after a failure
    async fn fetch(&self, version: &str) -> FetchStatus;
}
