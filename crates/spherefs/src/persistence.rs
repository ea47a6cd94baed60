// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Whole-state persistence.
//!
//! The tree and the content store are written together as one artifact:
//!
//! ```json
//! { "structure": { "/": { "type": "directory", ... } },
//!   "memory_map": { "<data_id>": "<content>" } }
//! ```
//!
//! A [`Persistence`] backend only moves opaque bytes; encoding lives here so
//! backends can be swapped without touching the format.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::node::{ContentId, DirectoryNode, Node};
use crate::path::ROOT;
use crate::store::ContentStore;
use crate::tree::Tree;

/// Storage medium for the encoded state
pub trait Persistence {
    /// Returns `None` when nothing has been saved yet
    fn read(&self) -> Result<Option<Vec<u8>>>;

    /// Replaces the saved artifact
    fn write(&self, bytes: &[u8]) -> Result<()>;

    /// Human-readable location, for logs and reports
    fn location(&self) -> String;
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RootView<'a> {
    Directory(&'a DirectoryNode),
}

#[derive(Serialize)]
struct SnapshotView<'a> {
    structure: BTreeMap<&'static str, RootView<'a>>,
    memory_map: &'a BTreeMap<ContentId, String>,
}

#[derive(Deserialize)]
struct Snapshot {
    structure: BTreeMap<String, Node>,
    #[serde(default)]
    memory_map: BTreeMap<ContentId, String>,
}

pub fn encode(tree: &Tree, store: &ContentStore) -> Result<Vec<u8>> {
    let view = SnapshotView {
        structure: BTreeMap::from([(ROOT, RootView::Directory(tree.root()))]),
        memory_map: store.blocks(),
    };
    Ok(serde_json::to_vec_pretty(&view)?)
}

pub fn decode(bytes: &[u8]) -> Result<(Tree, ContentStore)> {
    let mut snapshot: Snapshot = serde_json::from_slice(bytes)?;
    match snapshot.structure.remove(ROOT) {
        Some(Node::Directory(root)) => Ok((
            Tree::from_root(root),
            ContentStore::from_blocks(snapshot.memory_map),
        )),
        Some(Node::File(_)) => Err(invalid("root entry is not a directory")),
        None => Err(invalid("structure has no root entry")),
    }
}

fn invalid(msg: &str) -> Error {
    Error::Serialization(<serde_json::Error as serde::de::Error>::custom(msg))
}

/// JSON artifact on the host filesystem.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// artifact, so a crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Persistence for FilePersistence {
    fn read(&self) -> Result<Option<Vec<u8>>> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::persistence(&self.path, e)),
        }
    }

    fn write(&self, bytes: &[u8]) -> Result<()> {
        let staging = self.staging_path();
        std::fs::write(&staging, bytes).map_err(|e| Error::persistence(&staging, e))?;
        std::fs::rename(&staging, &self.path).map_err(|e| Error::persistence(&self.path, e))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
