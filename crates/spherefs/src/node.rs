// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::EntryType;

pub type Timestamp = DateTime<Utc>;

/// Identifier of a content block in the [`ContentStore`](crate::ContentStore)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    /// Generate a fresh, time-ordered identifier
    pub fn generate() -> Self {
        Self(uuid7::uuid7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tree node, tagged by `type` in the persisted form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Directory(DirectoryNode),
    File(FileNode),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryNode {
    pub created: Timestamp,
    #[serde(default)]
    pub contents: BTreeMap<String, Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// File metadata. The payload lives in the content store under `content_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNode {
    /// Cached length of the bound content, in characters
    pub size: u64,
    pub created: Timestamp,
    #[serde(rename = "data_id")]
    pub content_id: ContentId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl DirectoryNode {
    pub fn new() -> Self {
        Self {
            created: Utc::now(),
            contents: BTreeMap::new(),
            tags: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.contents.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.contents.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.contents.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

impl Default for DirectoryNode {
    fn default() -> Self {
        Self::new()
    }
}

impl FileNode {
    pub fn new(content_id: ContentId) -> Self {
        Self {
            size: 0,
            created: Utc::now(),
            content_id,
            tags: Vec::new(),
        }
    }
}

impl Node {
    pub fn entry_type(&self) -> EntryType {
        match self {
            Node::Directory(_) => EntryType::Directory,
            Node::File(_) => EntryType::File,
        }
    }

    pub fn created(&self) -> Timestamp {
        match self {
            Node::Directory(d) => d.created,
            Node::File(f) => f.created,
        }
    }

    pub fn tags(&self) -> &[String] {
        match self {
            Node::Directory(d) => &d.tags,
            Node::File(f) => &f.tags,
        }
    }

    pub fn tags_mut(&mut self) -> &mut Vec<String> {
        match self {
            Node::Directory(d) => &mut d.tags,
            Node::File(f) => &mut f.tags,
        }
    }

    pub fn as_dir(&self) -> Option<&DirectoryNode> {
        match self {
            Node::Directory(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dir_mut(&mut self) -> Option<&mut DirectoryNode> {
        match self {
            Node::Directory(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            Node::File(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_file_mut(&mut self) -> Option<&mut FileNode> {
        match self {
            Node::File(f) => Some(f),
            _ => None,
        }
    }

    /// Content ids of every file at or beneath this node
    pub fn content_ids(&self) -> Vec<ContentId> {
        let mut ids = Vec::new();
        self.collect_content_ids(&mut ids);
        ids
    }

    fn collect_content_ids(&self, ids: &mut Vec<ContentId>) {
        match self {
            Node::File(f) => ids.push(f.content_id.clone()),
            Node::Directory(d) => {
                for child in d.contents.values() {
                    child.collect_content_ids(ids);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisted_shape() {
        let mut dir = DirectoryNode::new();
        let file = FileNode::new(ContentId::from("block-1"));
        _ = dir.contents.insert("a.txt".to_string(), Node::File(file));

        let value = serde_json::to_value(Node::Directory(dir)).unwrap();
        assert_eq!(value["type"], "directory");
        assert!(value["created"].is_string());
        let a = &value["contents"]["a.txt"];
        assert_eq!(a["type"], "file");
        assert_eq!(a["size"], 0);
        assert_eq!(a["data_id"], "block-1");
        // empty tags are omitted
        assert!(a.get("tags").is_none());
    }

    #[test]
    fn test_content_ids_recurse() {
        let mut inner = DirectoryNode::new();
        _ = inner
            .contents
            .insert("b".into(), Node::File(FileNode::new("2".into())));
        let mut outer = DirectoryNode::new();
        _ = outer
            .contents
            .insert("a".into(), Node::File(FileNode::new("1".into())));
        _ = outer.contents.insert("sub".into(), Node::Directory(inner));

        let mut ids = Node::Directory(outer).content_ids();
        ids.sort();
        assert_eq!(ids, vec![ContentId::from("1"), ContentId::from("2")]);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(ContentId::generate(), ContentId::generate());
    }
}
