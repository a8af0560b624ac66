//! Significant events of a sync run
//!
//! Every event renders to a single line and is emitted through `tracing`,
//! which adds the timestamp and severity.

use std::fmt;
use std::path::PathBuf;

use tracing::{Level, debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    VersionDecoded {
        endpoint: String,
        url: String,
        version: String,
    },
    ResponseNotValid {
        endpoint: String,
        url: String,
        reason: String,
    },
    ResponseNotDecodable {
        endpoint: String,
        url: String,
        reason: String,
    },
    RequestFailed {
        endpoint: String,
        url: String,
        reason: String,
    },
    PackageDownloaded {
        endpoint: String,
        url: String,
        path: PathBuf,
    },
    DownloadFailed {
        endpoint: String,
        url: String,
        reason: String,
    },
    NoVersionFound {
        endpoints: Vec<String>,
    },
    NothingDownloaded,
    AlreadyDownloaded {
        version: String,
    },
    HistoryInitialized {
        path: PathBuf,
    },
    VersionRecorded {
        version: String,
    },
}

impl Event {
    pub fn level(&self) -> Level {
        match self {
            Self::VersionDecoded { .. }
            | Self::PackageDownloaded { .. }
            | Self::HistoryInitialized { .. }
            | Self::VersionRecorded { .. } => Level::INFO,
            Self::ResponseNotValid { .. }
            | Self::ResponseNotDecodable { .. }
            | Self::RequestFailed { .. } => Level::WARN,
            Self::DownloadFailed { .. } | Self::NoVersionFound { .. } | Self::NothingDownloaded => {
                Level::ERROR
            }
            Self::AlreadyDownloaded { .. } => Level::DEBUG,
        }
    }

    pub fn emit(&self) {
        let level = self.level();
        if level == Level::ERROR {
            error!("{self}");
        } else if level == Level::WARN {
            warn!("{self}");
        } else if level == Level::INFO {
            info!("{self}");
        } else {
            debug!("{self}");
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VersionDecoded {
                endpoint,
                url,
                version,
            } => write!(f, "{endpoint}: version {version} decoded from {url}"),
            Self::ResponseNotValid {
                endpoint,
                url,
                reason,
            } => write!(f, "{endpoint}: response from {url} is not valid: {reason}"),
            Self::ResponseNotDecodable {
                endpoint,
                url,
                reason,
            } => write!(f, "{endpoint}: response from {url} is not decodable: {reason}"),
            Self::RequestFailed {
                endpoint,
                url,
                reason,
            } => write!(f, "{endpoint}: request to {url} failed: {reason}"),
            Self::PackageDownloaded {
                endpoint,
                url,
                path,
            } => write!(
                f,
                "{endpoint}: package downloaded from {url} to {}",
                path.display()
            ),
            Self::DownloadFailed {
                endpoint,
                url,
                reason,
            } => write!(f, "{endpoint}: package download from {url} failed: {reason}"),
            Self::NoVersionFound { endpoints } => {
                write!(f, "no version found in [{}]", endpoints.join(", "))
            }
            Self::NothingDownloaded => f.write_str("no package was downloaded"),
            Self::AlreadyDownloaded { version } => {
                write!(f, "version {version} was already downloaded")
            }
            Self::HistoryInitialized { path } => {
                write!(f, "created download history at {}", path.display())
            }
            Self::VersionRecorded { version } => {
                write!(f, "version {version} recorded in download history")
            }
        }
    }
}
