use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chatdock::{KeyValueStore, StoreError, StoreResult};
use snafu::{ResultExt, Snafu};

/// JSON object on disk standing in for the browser's `localStorage`.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> StateFileResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(&self.path).context(ReadFileSnafu {
            stage: "read-state-file",
            path: self.path.clone(),
        })?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).context(ParseSnafu {
            stage: "parse-state-file",
            path: self.path.clone(),
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> StateFileResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).context(CreateDirSnafu {
                stage: "create-state-directory",
                path: parent.to_path_buf(),
            })?;
        }

        let content = serde_json::to_string_pretty(entries).context(SerializeSnafu {
            stage: "serialize-state",
        })?;

        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).context(WriteFileSnafu {
            stage: "write-temporary-state-file",
            path: temp_path.clone(),
        })?;

        std::fs::rename(&temp_path, &self.path).context(RenameTempFileSnafu {
            stage: "rename-temporary-state-file",
            from: temp_path,
            to: self.path.clone(),
        })?;

        tracing::debug!("saved state to {:?}", self.path);
        Ok(())
    }
}

impl KeyValueStore for StateFile {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut entries = self.read_entries().map_err(|error| StoreError::Read {
            stage: "state-file-get",
            key: key.to_string(),
            message: error.to_string(),
        })?;
        Ok(entries.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let to_store_error = |error: StateFileError| StoreError::Write {
            stage: "state-file-set",
            key: key.to_string(),
            message: error.to_string(),
        };

        let mut entries = self.read_entries().map_err(to_store_error)?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries).map_err(to_store_error)
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StateFileError {
    #[snafu(display("failed to create state directory at {path:?} on `{stage}`: {source}"))]
    CreateDir {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to read state file at {path:?} on `{stage}`: {source}"))]
    ReadFile {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to parse state file at {path:?} on `{stage}`: {source}"))]
    Parse {
        stage: &'static str,
        path: PathBuf,
        source: serde_json::Error,
    },
    #[snafu(display("failed to serialize state on `{stage}`: {source}"))]
    Serialize {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("failed to write state file at {path:?} on `{stage}`: {source}"))]
    WriteFile {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display(
        "failed to replace state file from {from:?} to {to:?} on `{stage}`: {source}"
    ))]
    RenameTempFile {
        stage: &'static str,
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

pub type StateFileResult<T> = Result<T, StateFileError>;
