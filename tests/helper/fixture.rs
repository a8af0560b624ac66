//! Config and ledger test utilities

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tempfile::TempDir;

use models_loader::config::{Config, DEFAULT_VERSION_FIELD, EndpointSet};

/// Temporary working area holding the ledger and the output directory
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn history_path(&self) -> PathBuf {
        self.dir.path().join("downloaded.txt")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("packages")
    }

    /// Current ledger content, or None when no ledger exists yet
    pub fn ledger(&self) -> Option<String> {
        std::fs::read_to_string(self.history_path()).ok()
    }

    pub fn write_ledger(&self, content: &str) {
        std::fs::write(self.history_path(), content).unwrap();
    }

    pub fn downloaded(&self, file_name: &str) -> Option<Vec<u8>> {
        std::fs::read(self.output_dir().join(file_name)).ok()
    }

    /// Config pointing every endpoint at `base_url` joined with the given paths
    pub fn config(
        &self,
        base_url: &str,
        version_paths: &[(&str, &str)],
        package_paths: &[(&str, &str)],
    ) -> Config {
        Config {
            version_endpoints: endpoints(base_url, version_paths),
            package_endpoints: endpoints(base_url, package_paths),
            schema_path: None,
            history_path: self.history_path(),
            output_dir: self.output_dir(),
            version_field: DEFAULT_VERSION_FIELD.to_string(),
            request_timeout_ms: 5_000,
        }
    }

    /// Write a JSON document into the workspace and return its path
    pub fn write_json(&self, name: &str, value: serde_json::Value) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
        path
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

pub fn endpoints(base_url: &str, paths: &[(&str, &str)]) -> EndpointSet {
    paths
        .iter()
        .map(|(name, path)| (name.to_string(), format!("{base_url}{path}")))
        .collect::<IndexMap<_, _>>()
}
