// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! File handles: content access bound to one content block.
//!
//! A handle holds the block id rather than the path, so it keeps working
//! after the file is moved. Every mutation goes through
//! [`Filesystem::commit_content`], which refreshes the cached size and
//! flushes the whole state.
//!
//! Offsets arrive as `i64` because front ends pass user input straight
//! through; negative values are reported as `InvalidRange`/`InvalidSize`
//! instead of being unrepresentable.

use crate::error::{Error, Result};
use crate::fs::Filesystem;
use crate::node::ContentId;
use crate::store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
    Append,
}

impl OpenMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpenMode::Read => "read",
            OpenMode::Write => "write",
            OpenMode::Append => "append",
        }
    }

    pub fn is_writable(&self) -> bool {
        !matches!(self, OpenMode::Read)
    }
}

impl std::fmt::Display for OpenMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OpenMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "r" | "read" => Ok(OpenMode::Read),
            "w" | "write" => Ok(OpenMode::Write),
            "a" | "append" => Ok(OpenMode::Append),
            other => Err(Error::InvalidOpenMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    path: String,
    content_id: ContentId,
    mode: OpenMode,
}

fn non_negative(value: i64) -> Option<usize> {
    usize::try_from(value).ok()
}

impl FileHandle {
    pub(crate) fn new(path: String, content_id: ContentId, mode: OpenMode) -> Self {
        Self {
            path,
            content_id,
            mode,
        }
    }

    /// Same handle registered under a new path after a move
    pub(crate) fn relocated(self, path: String) -> Self {
        Self { path, ..self }
    }

    /// Full path the handle is registered under
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn content_id(&self) -> &ContentId {
        &self.content_id
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    fn require_writable(&self, op: &'static str) -> Result<()> {
        if self.mode.is_writable() {
            Ok(())
        } else {
            Err(Error::InvalidMode {
                path: self.path.clone(),
                mode: self.mode,
                op,
            })
        }
    }

    /// Reads `size` characters from `start`.
    ///
    /// No `start` returns everything. A `start` past the end, or a `size` of
    /// zero or less, returns an empty string. The range is clamped to the
    /// content.
    pub fn read(&self, fs: &Filesystem, start: Option<i64>, size: Option<i64>) -> Result<String> {
        let content = fs.content(self)?;
        let Some(start) = start else {
            return Ok(content.to_string());
        };
        let begin = non_negative(start).ok_or_else(|| {
            Error::invalid_range(start, size.unwrap_or(0), 0, store::char_len(content) as usize)
        })?;
        let end = match size {
            None => usize::MAX,
            Some(n) if n <= 0 => return Ok(String::new()),
            Some(n) => begin.saturating_add(non_negative(n).unwrap_or(usize::MAX)),
        };
        Ok(store::slice(content, begin, end).to_string())
    }

    /// Writes `text` and returns the new content length.
    ///
    /// Without `at`, write mode replaces the content and append mode adds to
    /// the end. With `at`, the characters from `at` onward are overwritten
    /// in place (see [`store::overwrite`]).
    pub fn write(&self, fs: &mut Filesystem, text: &str, at: Option<i64>) -> Result<u64> {
        self.require_writable("write")?;
        let content = fs.content(self)?;
        let updated = match (at, self.mode) {
            (Some(at), _) => {
                let len = store::char_len(content) as usize;
                let at = non_negative(at)
                    .ok_or_else(|| Error::invalid_range(at, store::char_len(text) as i64, 0, len))?;
                store::overwrite(content, at, text)
            }
            (None, OpenMode::Append) => format!("{content}{text}"),
            (None, _) => text.to_string(),
        };
        fs.commit_content(self, updated, "write")
    }

    /// Moves `[start, start+size)` to `target`, where `target` indexes the
    /// content after the range has been cut out.
    pub fn move_within(&self, fs: &mut Filesystem, start: i64, size: i64, target: i64) -> Result<()> {
        self.require_writable("move content")?;
        let content = fs.content(self)?;
        let len = store::char_len(content) as usize;
        let invalid = || Error::invalid_range(start, size, target, len);

        let (Some(from), Some(count), Some(to)) =
            (non_negative(start), non_negative(size), non_negative(target))
        else {
            return Err(invalid());
        };
        let end = from.checked_add(count).ok_or_else(invalid)?;
        if end > len || to > len - count {
            return Err(invalid());
        }

        let updated = store::move_range(content, from, count, to);
        _ = fs.commit_content(self, updated, "move")?;
        Ok(())
    }

    /// Keeps the first `max_size` characters and returns the new length
    pub fn truncate(&self, fs: &mut Filesystem, max_size: i64) -> Result<u64> {
        self.require_writable("truncate")?;
        let max = non_negative(max_size).ok_or(Error::InvalidSize(max_size))?;
        let content = fs.content(self)?;
        if store::char_len(content) as usize <= max {
            return Ok(store::char_len(content));
        }
        let updated = store::truncate(content, max);
        fs.commit_content(self, updated, "truncate")
    }

    /// Unregisters the handle; same as [`Filesystem::close`] on its path
    pub fn close(self, fs: &mut Filesystem) -> Result<bool> {
        fs.close(&self.path)
    }
}
