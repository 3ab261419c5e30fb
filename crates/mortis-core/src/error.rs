//! Error types for the library engine.

use std::path::PathBuf;

use thiserror::Error;

/// Failure reading or writing one of the launcher's data files.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub fn read(path: &std::path::Path, source: std::io::Error) -> Self {
        StoreError::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn write(path: &std::path::Path, source: std::io::Error) -> Self {
        StoreError::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Failure starting the emulator process.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid launch wrapper {wrapper:?}: {reason}")]
    Wrapper { wrapper: String, reason: String },
}
