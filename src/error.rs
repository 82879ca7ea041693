//! Error types shared across the recorder

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or persisting the frequency record
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record file does not exist or cannot be opened for reading
    #[error("no old record ({}), will create later", path.display())]
    MissingPersistedStore { path: PathBuf },

    /// The record file cannot be opened for writing
    #[error("cannot open and write ({}), will not create: {source}", path.display())]
    PersistWriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A line of the record file is not a `name count` pair
    #[error("malformed record at line {line} of ({}): {content:?}, stopped loading", path.display())]
    MalformedPersistedRecord {
        path: PathBuf,
        line: usize,
        content: String,
    },

    /// A partly loaded record file could not be backed up before rewriting
    #[error(
        "cannot back up ({}) to ({}), will not overwrite: {source}",
        path.display(),
        backup.display()
    )]
    BackupFailed {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading or writing failed after the file was opened
    #[error("IO error on ({}): {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    /// Whether the record file may have been left truncated.
    ///
    /// True for `Io`, which persist raises once the file has been created.
    /// The in-memory counts are intact after every store error.
    pub fn may_have_truncated(&self) -> bool {
        matches!(self, StoreError::Io { .. })
    }
}

/// Errors raised while attaching to the key event source
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The device ID argument is not a number
    #[error("invalid event ID {0:?}: expected a number such as 3")]
    InvalidDevice(String),

    /// The capture tool could not be started
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The capture tool started without a readable stdout
    #[error("capture tool has no readable output")]
    NoOutput,

    /// The input device could not be opened
    #[error("cannot open input device {}: {source}", path.display())]
    Device {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The requested backend is not available on this platform
    #[error("capture backend `{0}` is not supported on this platform")]
    Unsupported(&'static str),

    /// Signal handlers could not be installed
    #[error("failed to install signal handlers: {0}")]
    Signal(String),
}
