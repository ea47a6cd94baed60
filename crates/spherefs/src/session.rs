// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Status-line surface over [`Filesystem`].
//!
//! Every call returns one human-readable line (or block) of text. Failures
//! render as `Error: <message>`; each error kind has its own message.
//! Content operations address a file by path and use the handle registered
//! for that path by an earlier `open`.

use diagnostics::log_debug;

use crate::error::Result;
use crate::fs::Filesystem;
use crate::handle::{FileHandle, OpenMode};
use crate::report::format_size;

pub struct Session {
    fs: Filesystem,
}

fn render<T>(result: Result<T>, ok: impl FnOnce(T) -> String) -> String {
    match result {
        Ok(value) => ok(value),
        Err(e) => {
            let error = e.to_string();
            log_debug!("Operation failed: {error}", error: &error);
            format!("Error: {error}")
        }
    }
}

fn plural(n: u64, one: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {one}s")
    }
}

impl Session {
    pub fn new(fs: Filesystem) -> Self {
        Self { fs }
    }

    pub fn fs(&self) -> &Filesystem {
        &self.fs
    }

    pub fn fs_mut(&mut self) -> &mut Filesystem {
        &mut self.fs
    }

    pub fn into_inner(self) -> Filesystem {
        self.fs
    }

    pub fn pwd(&self) -> String {
        self.fs.cwd().to_string()
    }

    pub fn create(&mut self, path: &str) -> String {
        render(self.fs.create(path), |full| format!("Created file {full}"))
    }

    pub fn mkdir(&mut self, path: &str) -> String {
        render(self.fs.mkdir(path), |full| format!("Created directory {full}"))
    }

    pub fn delete(&mut self, path: &str) -> String {
        render(self.fs.delete(path), |removed| {
            format!(
                "Deleted {} {} ({} freed)",
                removed.entry_type,
                removed.path,
                plural(removed.freed_blocks as u64, "block")
            )
        })
    }

    pub fn chdir(&mut self, path: &str) -> String {
        render(self.fs.chdir(path), |full| format!("Current directory: {full}"))
    }

    pub fn move_entry(&mut self, source: &str, target: &str) -> String {
        render(self.fs.move_entry(source, target), |(from, to)| {
            format!("Moved {from} to {to}")
        })
    }

    pub fn copy(&mut self, source: &str, target: &str) -> String {
        render(self.fs.copy(source, target), |(from, to)| {
            format!("Copied {from} to {to}")
        })
    }

    pub fn list(&self, path: Option<&str>) -> String {
        render(self.fs.list(path), |listing| listing.to_string())
    }

    pub fn stat(&self, path: &str) -> String {
        render(self.fs.stat(path), |props| props.to_string())
    }

    pub fn find(&self, pattern: &str, path: Option<&str>) -> String {
        render(self.fs.find(pattern, path), |found| {
            if found.is_empty() {
                format!("No entries matching '{pattern}'")
            } else {
                found.join("\n")
            }
        })
    }

    pub fn tag(&mut self, path: &str, tag: &str) -> String {
        let full = self.fs.resolve(path);
        render(self.fs.tag(path, tag), |added| {
            if added {
                format!("Tagged {full} with '{tag}'")
            } else {
                format!("{full} is already tagged '{tag}'")
            }
        })
    }

    pub fn untag(&mut self, path: &str, tag: &str) -> String {
        let full = self.fs.resolve(path);
        render(self.fs.untag(path, tag), |removed| {
            if removed {
                format!("Removed tag '{tag}' from {full}")
            } else {
                format!("{full} has no tag '{tag}'")
            }
        })
    }

    pub fn open(&mut self, path: &str, mode: &str) -> String {
        let opened = mode
            .parse::<OpenMode>()
            .and_then(|mode| self.fs.open(path, mode));
        render(opened, |handle| {
            format!("Opened {} in {} mode", handle.path(), handle.mode())
        })
    }

    pub fn close(&mut self, path: &str) -> String {
        let full = self.fs.resolve(path);
        render(self.fs.close(path), |closed| {
            if closed {
                format!("Closed {full}")
            } else {
                format!("File not open: {full}")
            }
        })
    }

    pub fn memory_map_report(&self) -> String {
        self.fs.memory_map_report().to_string()
    }

    /// Returns the content itself on success
    pub fn read(&self, path: &str, start: Option<i64>, size: Option<i64>) -> String {
        match self.handle(path) {
            Ok(handle) => render(handle.read(&self.fs, start, size), |content| content),
            Err(msg) => msg,
        }
    }

    pub fn write(&mut self, path: &str, text: &str, at: Option<i64>) -> String {
        match self.handle(path) {
            Ok(handle) => render(handle.write(&mut self.fs, text, at), |size| {
                format!(
                    "Wrote {} to {} (size {})",
                    plural(crate::store::char_len(text), "character"),
                    handle.path(),
                    format_size(size)
                )
            }),
            Err(msg) => msg,
        }
    }

    pub fn move_within(&mut self, path: &str, start: i64, size: i64, target: i64) -> String {
        match self.handle(path) {
            Ok(handle) => render(handle.move_within(&mut self.fs, start, size, target), |()| {
                format!(
                    "Moved {} from {start} to {target} in {}",
                    plural(size as u64, "character"),
                    handle.path()
                )
            }),
            Err(msg) => msg,
        }
    }

    pub fn truncate(&mut self, path: &str, max_size: i64) -> String {
        match self.handle(path) {
            Ok(handle) => render(handle.truncate(&mut self.fs, max_size), |size| {
                format!("Truncated {} to {}", handle.path(), plural(size, "character"))
            }),
            Err(msg) => msg,
        }
    }

    fn handle(&self, path: &str) -> std::result::Result<FileHandle, String> {
        self.fs
            .handle(path)
            .cloned()
            .ok_or_else(|| format!("Error: File not open: {}", self.fs.resolve(path)))
    }
}
