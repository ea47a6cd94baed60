// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use crate::handle::OpenMode;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by filesystem, handle and persistence operations.
///
/// None of these are fatal to a session: the operation that produced one
/// leaves the in-memory state as it was before the call.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Entry already exists: {0}")]
    AlreadyExists(String),

    #[error("Parent directory does not exist: {0}")]
    ParentMissing(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("Cannot {op} through a handle opened in {mode} mode: {path}")]
    InvalidMode {
        path: String,
        mode: OpenMode,
        op: &'static str,
    },

    #[error("Invalid range start={start} size={size} target={target} for content of length {len}")]
    InvalidRange {
        start: i64,
        size: i64,
        target: i64,
        len: usize,
    },

    #[error("Invalid size: {0}")]
    InvalidSize(i64),

    #[error("Immutable path: {0}")]
    Immutable(String),

    #[error("Cannot place {source_path} inside itself at {target}")]
    MoveIntoSelf { source_path: String, target: String },

    #[error("Unknown open mode: {0}")]
    InvalidOpenMode(String),

    #[error("Persistence failure at {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Discriminant of [`Error`] for callers that only care about the category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    ParentMissing,
    NotADirectory,
    NotAFile,
    InvalidMode,
    InvalidRange,
    InvalidSize,
    Immutable,
    MoveIntoSelf,
    InvalidOpenMode,
    PersistenceFailure,
}

impl Error {
    pub fn not_found<S: AsRef<str>>(path: S) -> Self {
        Error::NotFound(path.as_ref().to_string())
    }

    pub fn already_exists<S: AsRef<str>>(path: S) -> Self {
        Error::AlreadyExists(path.as_ref().to_string())
    }

    pub fn parent_missing<S: AsRef<str>>(path: S) -> Self {
        Error::ParentMissing(path.as_ref().to_string())
    }

    pub fn not_a_directory<S: AsRef<str>>(path: S) -> Self {
        Error::NotADirectory(path.as_ref().to_string())
    }

    pub fn not_a_file<S: AsRef<str>>(path: S) -> Self {
        Error::NotAFile(path.as_ref().to_string())
    }

    pub fn immutable<S: AsRef<str>>(path: S) -> Self {
        Error::Immutable(path.as_ref().to_string())
    }

    pub fn invalid_range(start: i64, size: i64, target: i64, len: usize) -> Self {
        Error::InvalidRange {
            start,
            size,
            target,
            len,
        }
    }

    pub fn persistence<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Error::Persistence {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Error::ParentMissing(_) => ErrorKind::ParentMissing,
            Error::NotADirectory(_) => ErrorKind::NotADirectory,
            Error::NotAFile(_) => ErrorKind::NotAFile,
            Error::InvalidMode { .. } => ErrorKind::InvalidMode,
            Error::InvalidRange { .. } => ErrorKind::InvalidRange,
            Error::InvalidSize(_) => ErrorKind::InvalidSize,
            Error::Immutable(_) => ErrorKind::Immutable,
            Error::MoveIntoSelf { .. } => ErrorKind::MoveIntoSelf,
            Error::InvalidOpenMode(_) => ErrorKind::InvalidOpenMode,
            Error::Persistence { .. } | Error::Serialization(_) => ErrorKind::PersistenceFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_distinct_per_kind() {
        let errors = [
            Error::not_found("/a"),
            Error::already_exists("/a"),
            Error::parent_missing("/a"),
            Error::not_a_directory("/a"),
            Error::not_a_file("/a"),
            Error::immutable("/a"),
            Error::InvalidSize(-1),
            Error::invalid_range(0, 1, 0, 0),
        ];
        let mut messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        messages.sort();
        messages.dedup();
        assert_eq!(messages.len(), errors.len());
    }

    #[test]
    fn test_kind() {
        assert_eq!(Error::not_found("/x").kind(), ErrorKind::NotFound);
        let io = std::io::Error::other("disk full");
        assert_eq!(
            Error::persistence("/tmp/state.json", io).kind(),
            ErrorKind::PersistenceFailure
        );
    }
}
