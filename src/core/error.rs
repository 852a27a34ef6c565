//! Custom error types for the shell core.
//!
//! Provides structured error handling with meaningful error messages
//! and proper error categorization for each domain:
//!
//! - [`VfsError`] - Virtual filesystem operation failures
//! - [`RegistryError`] - Command registration failures
//! - [`HandlerError`] - Unexpected failures raised by command handlers
//! - [`StorageError`] - Persistence backend failures (always non-fatal)

use thiserror::Error;

/// Virtual filesystem errors.
///
/// Each variant carries the path the caller asked about, so handlers can
/// render `"<command>: <error>"` without re-formatting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VfsError {
    #[error("{0}: No such file or directory")]
    NotFound(String),
    #[error("{0}: Not a directory")]
    NotADirectory(String),
    #[error("{0}: Is a directory")]
    IsADirectory(String),
    #[error("{0}: File exists")]
    AlreadyExists(String),
    #[error("{0}: Permission denied")]
    PermissionDenied(String),
    #[error("{0}: Directory not empty")]
    DirectoryNotEmpty(String),
    #[error("{0}: Cannot remove root directory")]
    CannotDeleteRoot(String),
    /// The destination is the source itself or lies inside it.
    #[error("{0}: Destination is the source or inside it")]
    CopyIntoSelf(String),
    /// A persisted snapshot could not be restored.
    #[error("corrupt filesystem snapshot: {0}")]
    CorruptSnapshot(String),
}

/// Command registration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Command names must match `[a-z0-9-]+`.
    #[error("invalid command name: '{0}'")]
    InvalidName(String),
}

/// Failure raised by a command handler for a condition it did not design for.
///
/// Expected failures (missing file, bad arguments) are returned as output
/// text instead; the registry turns these into `"Error: <message>"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Vfs(#[from] VfsError),
    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

/// Persistence backend errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Browser storage is not available (private mode, no window).
    #[error("storage not available")]
    Unavailable,
    #[error("failed to write to storage")]
    WriteFailed,
    #[error("failed to read from storage")]
    ReadFailed,
}
