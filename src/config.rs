use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Timeout for each HTTP request in milliseconds (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// JSON field of a version-check response that holds the version
pub const DEFAULT_VERSION_FIELD: &str = "modelsVersion";

/// Buffer size used when streaming a package to disk
pub const DOWNLOAD_CHUNK_SIZE: usize = 8192;

const APP_DIR_NAME: &str = "models-loader";
const CONFIG_FILE_NAME: &str = "config.json";
const HISTORY_FILE_NAME: &str = "downloaded_versions.txt";

/// Logical endpoint name to URL, in document order
pub type EndpointSet = IndexMap<String, String>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Config {path:?} defines no {field}")]
    NoEndpoints { path: PathBuf, field: &'static str },
}

/// Loader configuration, read once at startup
///
/// The snake_case aliases accept configuration documents written for the
/// earlier loader.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Endpoints reporting the currently available version
    #[serde(alias = "urls_with_model_version")]
    pub version_endpoints: EndpointSet,

    /// Endpoints serving the package, the version is appended as last path segment
    #[serde(alias = "urls_with_model_package")]
    pub package_endpoints: EndpointSet,

    /// JSON schema for version-check responses; a built-in schema is used when absent
    #[serde(default, alias = "dh_api_scheme")]
    pub schema_path: Option<PathBuf>,

    #[serde(
        default = "default_history_path",
        alias = "file_path_for_save_download_history"
    )]
    pub history_path: PathBuf,

    #[serde(default = "default_output_dir", alias = "folder_for_package_save")]
    pub output_dir: PathBuf,

    #[serde(default = "default_version_field")]
    pub version_field: String,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_history_path() -> PathBuf {
    data_dir().join(HISTORY_FILE_NAME)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_version_field() -> String {
    DEFAULT_VERSION_FIELD.to_string()
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

impl Config {
    /// Read the configuration document at `path`.
    ///
    /// Relative schema and history paths are resolved against the directory
    /// containing the document. The output directory is used as given.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        for (field, endpoints) in [
            ("versionEndpoints", &config.version_endpoints),
            ("packageEndpoints", &config.package_endpoints),
        ] {
            if endpoints.is_empty() {
                return Err(ConfigError::NoEndpoints {
                    path: path.to_path_buf(),
                    field,
                });
            }
        }

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.resolve_relative_to(base_dir))
    }

    fn resolve_relative_to(mut self, base_dir: &Path) -> Self {
        let resolve = |p: PathBuf| {
            if p.is_relative() {
                base_dir.join(p)
            } else {
                p
            }
        };
        self.schema_path = self.schema_path.map(resolve);
        self.history_path = resolve(self.history_path);
        self
    }
}

/// Returns the config file to use when none is given on the command line.
/// Prefers ./config.json, then $XDG_CONFIG_HOME/models-loader/config.json,
/// then ~/.config/models-loader/config.json.
pub fn default_config_path() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    app_dir_with_env(
        std::env::var("XDG_CONFIG_HOME").ok(),
        dirs::home_dir(),
        ".config",
    )
    .join(CONFIG_FILE_NAME)
}

/// Returns the path to the data directory for models-loader.
/// Uses $XDG_DATA_HOME/models-loader if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/models-loader,
/// or ./models-loader if neither is available.
pub fn data_dir() -> PathBuf {
    app_dir_with_env(
        std::env::var("XDG_DATA_HOME").ok(),
        dirs::home_dir(),
        ".local/share",
    )
}

fn app_dir_with_env(
    xdg_home: Option<String>,
    home_dir: Option<PathBuf>,
    home_relative: &str,
) -> PathBuf {
    let base = xdg_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(home_relative)))
        .unwrap_or_else(|| PathBuf::from("."));

    base.join(APP_DIR_NAME)
}
