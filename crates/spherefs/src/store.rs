// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Content blocks, stored apart from the tree.
//!
//! Offsets and lengths in this module count characters, not bytes, so no
//! edit can leave a block holding a split code point.

use std::collections::BTreeMap;

use crate::node::ContentId;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContentStore {
    blocks: BTreeMap<ContentId, String>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks(blocks: BTreeMap<ContentId, String>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &BTreeMap<ContentId, String> {
        &self.blocks
    }

    /// Allocates an empty block under a fresh id
    pub fn allocate(&mut self) -> ContentId {
        let id = ContentId::generate();
        _ = self.blocks.insert(id.clone(), String::new());
        id
    }

    /// Allocates a block pre-filled with `content`, used by copies
    pub fn allocate_with(&mut self, content: String) -> ContentId {
        let id = ContentId::generate();
        _ = self.blocks.insert(id.clone(), content);
        id
    }

    pub fn get(&self, id: &ContentId) -> Option<&str> {
        self.blocks.get(id).map(String::as_str)
    }

    /// Replaces the block's content and returns its new length
    pub fn put(&mut self, id: &ContentId, content: String) -> Option<u64> {
        let block = self.blocks.get_mut(id)?;
        *block = content;
        Some(char_len(block))
    }

    pub fn remove(&mut self, id: &ContentId) -> Option<String> {
        self.blocks.remove(id)
    }

    pub fn contains(&self, id: &ContentId) -> bool {
        self.blocks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ContentId, &str)> {
        self.blocks.iter().map(|(id, c)| (id, c.as_str()))
    }

    /// Total characters held across all blocks
    pub fn total_units(&self) -> u64 {
        self.blocks.values().map(|c| char_len(c)).sum()
    }
}

pub fn char_len(s: &str) -> u64 {
    s.chars().count() as u64
}

/// Byte offset of the character at `idx`, clamped to the end of `s`
fn byte_offset(s: &str, idx: usize) -> usize {
    s.char_indices().nth(idx).map_or(s.len(), |(b, _)| b)
}

/// Characters `[start, end)`, clamped to the content
pub fn slice(s: &str, start: usize, end: usize) -> &str {
    let from = byte_offset(s, start);
    let to = byte_offset(s, end.max(start));
    &s[from..to]
}

/// Overwrites the window starting at `at` with `text`.
///
/// `at` is clamped to the end of the content. Characters before the window
/// and after it stay where they are; the content grows only when the window
/// runs past the end.
pub fn overwrite(s: &str, at: usize, text: &str) -> String {
    let len = s.chars().count();
    let at = at.min(len);
    let end = at + text.chars().count();
    let mut out = String::with_capacity(s.len() + text.len());
    out.push_str(slice(s, 0, at));
    out.push_str(text);
    if end < len {
        out.push_str(slice(s, end, len));
    }
    out
}

/// Removes `[start, start+size)` and reinserts it at `target` of the
/// shortened content. Callers validate the range first.
pub fn move_range(s: &str, start: usize, size: usize, target: usize) -> String {
    let len = s.chars().count();
    let moved = slice(s, start, start + size);
    let mut rest = String::with_capacity(s.len());
    rest.push_str(slice(s, 0, start));
    rest.push_str(slice(s, start + size, len));

    let split = byte_offset(&rest, target);
    let mut out = String::with_capacity(s.len());
    out.push_str(&rest[..split]);
    out.push_str(moved);
    out.push_str(&rest[split..]);
    out
}

/// Keeps the first `max` characters. Never pads.
pub fn truncate(s: &str, max: usize) -> String {
    slice(s, 0, max).to_string()
}
