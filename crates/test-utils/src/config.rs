//! Temporary configuration files.

use std::io::Write;
use std::path::PathBuf;

use tempfile::TempDir;

/// A temporary directory holding config files; removed on drop.
pub struct TempConfig {
    dir: TempDir,
}

impl TempConfig {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Write `contents` to `name` inside the directory and return its path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    /// Write a default-parameter JSON document.
    pub fn write_defaults(&self, name: &str, defaults: &serde_json::Value) -> PathBuf {
        self.write(name, &defaults.to_string())
    }

    /// Path inside the directory that does not exist.
    pub fn missing(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

impl Default for TempConfig {
    fn default() -> Self {
        Self::new()
    }
}
