// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Snapshot types returned by read-only operations, with their text forms.

use std::fmt;

use crate::EntryType;
use crate::node::{ContentId, Timestamp};

/// Human-readable size: whole units below 1 KB, one decimal above
pub fn format_size(units: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = units as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", units, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

fn short_time(ts: &Timestamp) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    pub name: String,
    pub entry_type: EntryType,
    /// Cached size; `None` for directories
    pub size: Option<u64>,
    pub created: Timestamp,
}

impl fmt::Display for ListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self
            .size
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        write!(
            f,
            "{:<9} {:>10}  {}  {}",
            self.entry_type.as_str(),
            size,
            short_time(&self.created),
            self.name
        )
    }
}

/// Immediate children of one directory, sorted by name
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub path: String,
    pub entries: Vec<ListEntry>,
}

impl Listing {
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} entries)", self.path, self.entries.len())?;
        for entry in &self.entries {
            write!(f, "\n{entry}")?;
        }
        Ok(())
    }
}

/// Properties of a single node
#[derive(Debug, Clone, PartialEq)]
pub struct Properties {
    pub path: String,
    pub name: String,
    pub entry_type: EntryType,
    pub size: Option<u64>,
    pub children: Option<usize>,
    pub created: Timestamp,
    /// Parent directory; `None` for the root
    pub location: Option<String>,
    pub tags: Vec<String>,
    pub content_id: Option<ContentId>,
}

impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Type: {}", self.entry_type.label())?;
        if let Some(size) = self.size {
            writeln!(f, "Size: {} ({} units)", format_size(size), size)?;
        }
        if let Some(children) = self.children {
            writeln!(f, "Items: {children}")?;
        }
        writeln!(f, "Created: {}", self.created.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "Location: {}", self.location.as_deref().unwrap_or("-"))?;
        if let Some(id) = &self.content_id {
            writeln!(f, "Content id: {id}")?;
        }
        if self.tags.is_empty() {
            write!(f, "Tags: (none)")
        } else {
            write!(f, "Tags: {}", self.tags.join(", "))
        }
    }
}

/// One content block and the file bound to it
#[derive(Debug, Clone, PartialEq)]
pub struct BlockUsage {
    pub id: ContentId,
    pub size: u64,
    /// Owning file, `None` for an orphan block
    pub path: Option<String>,
}

/// A tree entry whose block is missing, or whose cached size disagrees
#[derive(Debug, Clone, PartialEq)]
pub enum Inconsistency {
    DanglingId { path: String, id: ContentId },
    OrphanBlock { id: ContentId, size: u64 },
    SizeMismatch { path: String, cached: u64, actual: u64 },
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inconsistency::DanglingId { path, id } => {
                write!(f, "dangling id {id} at {path}")
            }
            Inconsistency::OrphanBlock { id, size } => {
                write!(f, "orphan block {id} ({})", format_size(*size))
            }
            Inconsistency::SizeMismatch {
                path,
                cached,
                actual,
            } => write!(f, "size mismatch at {path}: cached {cached}, actual {actual}"),
        }
    }
}

/// Block usage across the whole filesystem
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryMapReport {
    pub location: String,
    pub blocks: Vec<BlockUsage>,
    pub files: usize,
    pub directories: usize,
    pub total_units: u64,
    pub open_handles: usize,
    pub problems: Vec<Inconsistency>,
}

impl MemoryMapReport {
    pub fn is_consistent(&self) -> bool {
        self.problems.is_empty()
    }
}

impl fmt::Display for MemoryMapReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Memory map ({})", self.location)?;
        write!(
            f,
            "blocks: {}  files: {}  directories: {}  total: {}  open handles: {}",
            self.blocks.len(),
            self.files,
            self.directories,
            format_size(self.total_units),
            self.open_handles
        )?;
        for block in &self.blocks {
            write!(
                f,
                "\n  {}  {:>10}  {}",
                block.id,
                format_size(block.size),
                block.path.as_deref().unwrap_or("(orphan)")
            )?;
        }
        for problem in &self.problems {
            write!(f, "\n! {problem}")?;
        }
        Ok(())
    }
}
