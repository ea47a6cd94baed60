// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The directory tree: a root directory owning nested child maps.
//!
//! All traversal is root-down by canonical path; there are no parent links.
//! Lookups return `Option` and leave error wording to the caller, which knows
//! which path the user actually asked about.

use crate::error::{Error, Result};
use crate::node::{ContentId, DirectoryNode, FileNode, Node};
use crate::path::{self, ROOT};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tree {
    root: DirectoryNode,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_root(root: DirectoryNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &DirectoryNode {
        &self.root
    }

    pub fn into_root(self) -> DirectoryNode {
        self.root
    }

    /// Walks segment by segment from the root. Any missing or non-directory
    /// segment yields `None`.
    pub fn lookup_dir(&self, full: &str) -> Option<&DirectoryNode> {
        let mut dir = &self.root;
        for name in path::segments(full) {
            dir = dir.get(name)?.as_dir()?;
        }
        Some(dir)
    }

    pub fn lookup_dir_mut(&mut self, full: &str) -> Option<&mut DirectoryNode> {
        let mut dir = &mut self.root;
        for name in path::segments(full) {
            dir = dir.get_mut(name)?.as_dir_mut()?;
        }
        Some(dir)
    }

    /// Looks up a non-root node. The root has no `Node` wrapper, so callers
    /// that accept `/` check for it first.
    pub fn lookup(&self, full: &str) -> Option<&Node> {
        let (parent, name) = path::split(full)?;
        self.lookup_dir(&parent)?.get(&name)
    }

    pub fn lookup_mut(&mut self, full: &str) -> Option<&mut Node> {
        let (parent, name) = path::split(full)?;
        self.lookup_dir_mut(&parent)?.get_mut(&name)
    }

    pub fn exists(&self, full: &str) -> bool {
        full == ROOT || self.lookup(full).is_some()
    }

    /// Tags of any node, the root included
    pub fn tags_mut(&mut self, full: &str) -> Option<&mut Vec<String>> {
        if full == ROOT {
            Some(&mut self.root.tags)
        } else {
            self.lookup_mut(full).map(Node::tags_mut)
        }
    }

    /// Inserts `node` at `full`, which must name a free slot in an existing
    /// directory.
    pub fn insert(&mut self, full: &str, node: Node) -> Result<()> {
        let (parent, name) = path::split(full).ok_or_else(|| Error::already_exists(full))?;
        let dir = self
            .lookup_dir_mut(&parent)
            .ok_or_else(|| Error::parent_missing(full))?;
        if dir.contains(&name) {
            return Err(Error::already_exists(full));
        }
        _ = dir.contents.insert(name, node);
        Ok(())
    }

    /// Detaches and returns the node at `full` together with its subtree
    pub fn remove(&mut self, full: &str) -> Result<Node> {
        let (parent, name) = path::split(full).ok_or_else(|| Error::immutable(full))?;
        self.lookup_dir_mut(&parent)
            .and_then(|dir| dir.contents.remove(&name))
            .ok_or_else(|| Error::not_found(full))
    }

    /// Finds the file bound to `id`, wherever it currently sits
    pub fn find_file_mut(&mut self, id: &ContentId) -> Option<&mut FileNode> {
        fn search<'a>(dir: &'a mut DirectoryNode, id: &ContentId) -> Option<&'a mut FileNode> {
            for child in dir.contents.values_mut() {
                match child {
                    Node::File(f) if &f.content_id == id => return Some(f),
                    Node::File(_) => {}
                    Node::Directory(d) => {
                        if let Some(found) = search(d, id) {
                            return Some(found);
                        }
                    }
                }
            }
            None
        }
        search(&mut self.root, id)
    }

    /// Visits every node beneath `start` depth-first, in name order.
    ///
    /// The visitor receives the canonical path of each node. `start` itself
    /// is not visited. Nothing is visited if `start` is not a directory.
    pub fn visit<F>(&self, start: &str, visitor: &mut F)
    where
        F: FnMut(&str, &Node),
    {
        fn walk<F: FnMut(&str, &Node)>(dir: &DirectoryNode, at: &str, visitor: &mut F) {
            for (name, child) in &dir.contents {
                let child_path = path::join(at, name);
                visitor(&child_path, child);
                if let Node::Directory(d) = child {
                    walk(d, &child_path, visitor);
                }
            }
        }
        if let Some(dir) = self.lookup_dir(start) {
            walk(dir, start, visitor);
        }
    }

    /// Every file in the tree with its canonical path
    pub fn files(&self) -> Vec<(String, FileNode)> {
        let mut files = Vec::new();
        self.visit(ROOT, &mut |p, node| {
            if let Node::File(f) = node {
                files.push((p.to_string(), f.clone()));
            }
        });
        files
    }
}
