// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::Utc;
use diagnostics::{log_debug, log_error, log_info, log_warn};

use crate::EntryType;
use crate::error::{Error, Result};
use crate::handle::{FileHandle, OpenMode};
use crate::memory_persistence::MemoryPersistence;
use crate::node::{ContentId, DirectoryNode, FileNode, Node};
use crate::path::{self, ROOT};
use crate::persistence::{self, FilePersistence, Persistence};
use crate::report::{BlockUsage, Inconsistency, ListEntry, Listing, MemoryMapReport, Properties};
use crate::store::{self, ContentStore};
use crate::tree::Tree;

/// What a successful `delete` removed
#[derive(Debug, Clone, PartialEq)]
pub struct Removed {
    pub path: String,
    pub entry_type: EntryType,
    /// Number of content blocks released
    pub freed_blocks: usize,
}

/// State restored when an operation fails part way or cannot be saved
struct Checkpoint {
    tree: Tree,
    store: ContentStore,
    cwd: String,
    handles: BTreeMap<String, FileHandle>,
}

/// The virtual filesystem: tree, content store, cursor and open handles.
///
/// Every mutating operation either completes and is flushed to the
/// persistence backend as one snapshot, or fails and leaves the in-memory
/// state exactly as it was.
///
/// Not safe for shared use across threads; wrap it in a mutex at the
/// boundary if that is ever needed. The handle table is bookkeeping, not a
/// lock: two handles on the same file can interleave freely.
pub struct Filesystem {
    tree: Tree,
    store: ContentStore,
    cwd: String,
    handles: BTreeMap<String, FileHandle>,
    persistence: Box<dyn Persistence>,
}

impl Filesystem {
    /// Loads the saved state from `persistence`.
    ///
    /// A missing, unreadable or malformed artifact yields a fresh root-only
    /// filesystem; the problem is logged, not returned.
    pub fn load<P: Persistence + 'static>(persistence: P) -> Self {
        let location = persistence.location();
        let (tree, store) = match persistence.read() {
            Ok(Some(bytes)) => match persistence::decode(&bytes) {
                Ok(state) => {
                    log_info!("Loaded state from {location}", location: &location);
                    state
                }
                Err(e) => {
                    let error = e.to_string();
                    log_warn!("Discarding unreadable state at {location}: {error}", location: &location, error: &error);
                    (Tree::new(), ContentStore::new())
                }
            },
            Ok(None) => {
                log_info!("No saved state at {location}, starting empty", location: &location);
                (Tree::new(), ContentStore::new())
            }
            Err(e) => {
                let error = e.to_string();
                log_warn!("Cannot read state at {location}: {error}", location: &location, error: &error);
                (Tree::new(), ContentStore::new())
            }
        };

        let fs = Filesystem {
            tree,
            store,
            cwd: ROOT.to_string(),
            handles: BTreeMap::new(),
            persistence: Box::new(persistence),
        };

        for problem in fs.verify() {
            let problem = problem.to_string();
            log_warn!("Loaded state is inconsistent: {problem}", problem: &problem);
        }
        fs
    }

    /// Loads from (and saves to) a JSON file on the host
    pub fn with_state_file<P: Into<PathBuf>>(path: P) -> Self {
        Self::load(FilePersistence::new(path))
    }

    /// A fresh filesystem that keeps its snapshots in memory
    pub fn in_memory() -> Self {
        Self::load(MemoryPersistence::new())
    }

    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Canonical full path of `path` relative to the cursor
    pub fn resolve(&self, path: &str) -> String {
        path::resolve(&self.cwd, path)
    }

    pub fn lookup_directory(&self, path: &str) -> Option<&DirectoryNode> {
        self.tree.lookup_dir(&self.resolve(path))
    }

    /// Node at `path`; `None` for the root, which has no `Node` wrapper
    pub fn lookup(&self, path: &str) -> Option<&Node> {
        self.tree.lookup(&self.resolve(path))
    }

    pub fn exists(&self, path: &str) -> bool {
        self.tree.exists(&self.resolve(path))
    }

    /// Creates an empty file and returns its full path
    pub fn create(&mut self, path: &str) -> Result<String> {
        let full = self.resolve(path);
        self.transact("create", |fs| fs.create_at(&full))?;
        Ok(full)
    }

    fn create_at(&mut self, full: &str) -> Result<ContentId> {
        self.check_free_slot(full)?;
        let id = self.store.allocate();
        self.tree.insert(full, Node::File(FileNode::new(id.clone())))?;
        log_debug!("Created file {path} with block {id}", path: full, id: id.as_str());
        Ok(id)
    }

    /// Creates an empty directory and returns its full path
    pub fn mkdir(&mut self, path: &str) -> Result<String> {
        let full = self.resolve(path);
        self.transact("mkdir", |fs| {
            fs.check_free_slot(&full)?;
            fs.tree
                .insert(&full, Node::Directory(DirectoryNode::new()))?;
            log_debug!("Created directory {path}", path: &full);
            Ok(())
        })?;
        Ok(full)
    }

    /// Removes a file, or a directory with everything beneath it.
    ///
    /// Every content block under the removed node is released, and handles
    /// bound to those blocks are dropped from the handle table.
    pub fn delete(&mut self, path: &str) -> Result<Removed> {
        let full = self.resolve(path);
        self.transact("delete", |fs| {
            if full == ROOT {
                return Err(Error::immutable(&full));
            }
            let node = fs.tree.remove(&full)?;
            let ids: BTreeSet<ContentId> = node.content_ids().into_iter().collect();
            for id in &ids {
                _ = fs.store.remove(id);
            }
            fs.handles.retain(|_, h| !ids.contains(h.content_id()));

            if path::is_within(&fs.cwd, &full) {
                fs.cwd = path::split(&full).map_or_else(|| ROOT.to_string(), |(p, _)| p);
            }

            log_debug!("Deleted {path}, freed {count} blocks", path: &full, count: ids.len());
            Ok(Removed {
                path: full.clone(),
                entry_type: node.entry_type(),
                freed_blocks: ids.len(),
            })
        })
    }

    /// Moves the cursor. The cursor is session state and is not persisted.
    pub fn chdir(&mut self, path: &str) -> Result<String> {
        let full = self.resolve(path);
        if self.tree.lookup_dir(&full).is_none() {
            return Err(if self.tree.exists(&full) {
                Error::not_a_directory(&full)
            } else {
                Error::not_found(&full)
            });
        }
        self.cwd = full.clone();
        Ok(full)
    }

    /// Re-parents a node. Content ids, subtrees and timestamps travel
    /// unchanged. A cursor inside a moved directory follows it, and so do
    /// the handle table entries for files beneath it.
    pub fn move_entry(&mut self, source: &str, target: &str) -> Result<(String, String)> {
        let from = self.resolve(source);
        let to = self.resolve(target);
        self.transact("move", |fs| {
            fs.check_relocation(&from, &to)?;
            let node = fs.tree.remove(&from)?;
            fs.tree.insert(&to, node)?;
            if path::is_within(&fs.cwd, &from) {
                fs.cwd = path::rebase(&fs.cwd, &from, &to);
            }
            let moved: Vec<String> = fs
                .handles
                .keys()
                .filter(|key| path::is_within(key, &from))
                .cloned()
                .collect();
            for key in moved {
                if let Some(handle) = fs.handles.remove(&key) {
                    let rebased = path::rebase(&key, &from, &to);
                    _ = fs
                        .handles
                        .insert(rebased.clone(), handle.relocated(rebased));
                }
            }
            log_debug!("Moved {from} to {to}", from: &from, to: &to);
            Ok(())
        })?;
        Ok((from, to))
    }

    /// Deep copy. Every copied file gets a new block holding a copy of the
    /// original's content.
    pub fn copy(&mut self, source: &str, target: &str) -> Result<(String, String)> {
        let from = self.resolve(source);
        let to = self.resolve(target);
        self.transact("copy", |fs| {
            fs.check_relocation(&from, &to)?;
            let original = fs
                .tree
                .lookup(&from)
                .cloned()
                .ok_or_else(|| Error::not_found(&from))?;
            let duplicate = duplicate(&original, &mut fs.store);
            fs.tree.insert(&to, duplicate)?;
            log_debug!("Copied {from} to {to}", from: &from, to: &to);
            Ok(())
        })?;
        Ok((from, to))
    }

    /// Immediate children of `path` (the cursor when `None`)
    pub fn list(&self, path: Option<&str>) -> Result<Listing> {
        let full = self.resolve(path.unwrap_or(""));
        let dir = self.existing_dir(&full)?;
        let entries = dir
            .contents
            .iter()
            .map(|(name, node)| ListEntry {
                name: name.clone(),
                entry_type: node.entry_type(),
                size: node.as_file().map(|f| f.size),
                created: node.created(),
            })
            .collect();
        Ok(Listing {
            path: full,
            entries,
        })
    }

    pub fn stat(&self, path: &str) -> Result<Properties> {
        let full = self.resolve(path);
        if full == ROOT {
            let root = self.tree.root();
            return Ok(Properties {
                path: full.clone(),
                name: full,
                entry_type: EntryType::Directory,
                size: None,
                children: Some(root.len()),
                created: root.created,
                location: None,
                tags: root.tags.clone(),
                content_id: None,
            });
        }

        let node = self
            .tree
            .lookup(&full)
            .ok_or_else(|| Error::not_found(&full))?;
        let (location, name) = path::split(&full).ok_or_else(|| Error::not_found(&full))?;
        Ok(Properties {
            path: full,
            name,
            entry_type: node.entry_type(),
            size: node.as_file().map(|f| f.size),
            children: node.as_dir().map(DirectoryNode::len),
            created: node.created(),
            location: Some(location),
            tags: node.tags().to_vec(),
            content_id: node.as_file().map(|f| f.content_id.clone()),
        })
    }

    /// Full paths beneath `path` whose name contains `pattern`, ignoring case
    pub fn find(&self, pattern: &str, path: Option<&str>) -> Result<Vec<String>> {
        let full = self.resolve(path.unwrap_or(""));
        _ = self.existing_dir(&full)?;
        let needle = pattern.to_lowercase();
        let mut found = Vec::new();
        self.tree.visit(&full, &mut |p, _| {
            let name = p.rsplit('/').next().unwrap_or_default();
            if name.to_lowercase().contains(&needle) {
                found.push(p.to_string());
            }
        });
        found.sort();
        Ok(found)
    }

    /// Adds a tag. Returns `false` when the node already carried it.
    pub fn tag(&mut self, path: &str, tag: &str) -> Result<bool> {
        let full = self.resolve(path);
        let tags = self
            .tree
            .tags_mut(&full)
            .ok_or_else(|| Error::not_found(&full))?;
        if tags.iter().any(|t| t == tag) {
            return Ok(false);
        }
        self.transact("tag", |fs| {
            let tags = fs
                .tree
                .tags_mut(&full)
                .ok_or_else(|| Error::not_found(&full))?;
            tags.push(tag.to_string());
            Ok(true)
        })
    }

    /// Removes a tag. Returns `false` when the node did not carry it.
    pub fn untag(&mut self, path: &str, tag: &str) -> Result<bool> {
        let full = self.resolve(path);
        let tags = self
            .tree
            .tags_mut(&full)
            .ok_or_else(|| Error::not_found(&full))?;
        if !tags.iter().any(|t| t == tag) {
            return Ok(false);
        }
        self.transact("untag", |fs| {
            let tags = fs
                .tree
                .tags_mut(&full)
                .ok_or_else(|| Error::not_found(&full))?;
            tags.retain(|t| t != tag);
            Ok(true)
        })
    }

    /// Opens a file, creating it first in write and append modes.
    ///
    /// The handle is registered under the full path, replacing any earlier
    /// handle for that path.
    pub fn open(&mut self, path: &str, mode: OpenMode) -> Result<FileHandle> {
        let full = self.resolve(path);
        let existing = match self.tree.lookup(&full) {
            Some(Node::File(f)) => Some(f.content_id.clone()),
            Some(Node::Directory(_)) => return Err(Error::not_a_file(&full)),
            None if full == ROOT => return Err(Error::not_a_file(&full)),
            None => None,
        };

        let handle = match (existing, mode) {
            (Some(id), _) => {
                let handle = FileHandle::new(full.clone(), id, mode);
                _ = self.handles.insert(full.clone(), handle.clone());
                handle
            }
            (None, OpenMode::Read) => return Err(Error::not_found(&full)),
            (None, _) => self.transact("open", |fs| {
                let id = fs.create_at(&full)?;
                let handle = FileHandle::new(full.clone(), id, mode);
                _ = fs.handles.insert(full.clone(), handle.clone());
                Ok(handle)
            })?,
        };
        log_debug!("Opened {path} for {mode}", path: &full, mode: mode.as_str());
        Ok(handle)
    }

    /// Unregisters the handle for `path` and flushes.
    ///
    /// Returns `false`, without flushing, when no handle was registered.
    pub fn close(&mut self, path: &str) -> Result<bool> {
        let full = self.resolve(path);
        if !self.handles.contains_key(&full) {
            return Ok(false);
        }
        self.transact("close", |fs| {
            _ = fs.handles.remove(&full);
            log_debug!("Closed {path}", path: &full);
            Ok(true)
        })
    }

    /// Registered handle for `path`, if any
    pub fn handle(&self, path: &str) -> Option<&FileHandle> {
        self.handles.get(&self.resolve(path))
    }

    pub fn open_handles(&self) -> impl Iterator<Item = &FileHandle> {
        self.handles.values()
    }

    pub fn memory_map_report(&self) -> MemoryMapReport {
        let files = self.tree.files();
        let owners: BTreeMap<&ContentId, &str> = files
            .iter()
            .map(|(p, f)| (&f.content_id, p.as_str()))
            .collect();

        let blocks = self
            .store
            .iter()
            .map(|(id, content)| BlockUsage {
                id: id.clone(),
                size: store::char_len(content),
                path: owners.get(id).map(|p| p.to_string()),
            })
            .collect();

        let mut directories = 0;
        self.tree.visit(ROOT, &mut |_, node| {
            if node.as_dir().is_some() {
                directories += 1;
            }
        });

        MemoryMapReport {
            location: self.persistence.location(),
            blocks,
            files: files.len(),
            directories,
            total_units: self.store.total_units(),
            open_handles: self.handles.len(),
            problems: self.verify(),
        }
    }

    /// Checks the tree against the store: every file's block exists with a
    /// matching length, and every block is owned by a file.
    pub fn verify(&self) -> Vec<Inconsistency> {
        let mut problems = Vec::new();
        let mut owned = BTreeSet::new();

        for (path, file) in self.tree.files() {
            match self.store.get(&file.content_id) {
                None => problems.push(Inconsistency::DanglingId {
                    path,
                    id: file.content_id.clone(),
                }),
                Some(content) => {
                    let actual = store::char_len(content);
                    if actual != file.size {
                        problems.push(Inconsistency::SizeMismatch {
                            path,
                            cached: file.size,
                            actual,
                        });
                    }
                }
            }
            _ = owned.insert(file.content_id);
        }

        for (id, content) in self.store.iter() {
            if !owned.contains(id) {
                problems.push(Inconsistency::OrphanBlock {
                    id: id.clone(),
                    size: store::char_len(content),
                });
            }
        }
        problems
    }

    /// Content bound to `handle`
    pub(crate) fn content(&self, handle: &FileHandle) -> Result<&str> {
        self.store
            .get(handle.content_id())
            .ok_or_else(|| Error::not_found(handle.path()))
    }

    /// Replaces the handle's content, refreshes the owning file's cached
    /// size and flushes. Returns the new size.
    pub(crate) fn commit_content(
        &mut self,
        handle: &FileHandle,
        content: String,
        op: &'static str,
    ) -> Result<u64> {
        self.transact(op, |fs| {
            let size = fs
                .store
                .put(handle.content_id(), content)
                .ok_or_else(|| Error::not_found(handle.path()))?;
            let file = fs
                .tree
                .find_file_mut(handle.content_id())
                .ok_or_else(|| Error::not_found(handle.path()))?;
            file.size = size;
            log_debug!("{op} on {path}, size now {size}", op: op, path: handle.path(), size: size);
            Ok(size)
        })
    }

    fn existing_dir(&self, full: &str) -> Result<&DirectoryNode> {
        self.tree.lookup_dir(full).ok_or_else(|| {
            if self.tree.exists(full) {
                Error::not_a_directory(full)
            } else {
                Error::not_found(full)
            }
        })
    }

    fn check_free_slot(&self, full: &str) -> Result<()> {
        let (parent, _) = path::split(full).ok_or_else(|| Error::already_exists(full))?;
        if self.tree.lookup_dir(&parent).is_none() {
            return Err(Error::parent_missing(full));
        }
        if self.tree.exists(full) {
            return Err(Error::already_exists(full));
        }
        Ok(())
    }

    /// Shared precondition of move and copy
    fn check_relocation(&self, from: &str, to: &str) -> Result<()> {
        if from == ROOT {
            return Err(Error::immutable(from));
        }
        if !self.tree.exists(from) {
            return Err(Error::not_found(from));
        }
        self.check_free_slot(to)?;
        if path::is_within(to, from) {
            return Err(Error::MoveIntoSelf {
                source_path: from.to_string(),
                target: to.to_string(),
            });
        }
        Ok(())
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            tree: self.tree.clone(),
            store: self.store.clone(),
            cwd: self.cwd.clone(),
            handles: self.handles.clone(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.tree = checkpoint.tree;
        self.store = checkpoint.store;
        self.cwd = checkpoint.cwd;
        self.handles = checkpoint.handles;
    }

    /// Runs `op` and flushes. On any failure, the operation's own or the
    /// save's, the state is rolled back to what it was before `op`.
    ///
    /// The checkpoint is a full copy of the tree and the store, so each
    /// mutation costs as much as the whole-state snapshot `flush` writes.
    fn transact<T, F>(&mut self, name: &'static str, op: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let checkpoint = self.checkpoint();
        let result = op(self).and_then(|value| self.flush().map(|()| value));
        if let Err(e) = &result {
            if e.kind() == crate::ErrorKind::PersistenceFailure {
                let error = e.to_string();
                log_error!("Failed to save after {op}: {error}", op: name, error: &error);
            }
            self.restore(checkpoint);
        }
        result
    }

    fn flush(&self) -> Result<()> {
        let bytes = persistence::encode(&self.tree, &self.store)?;
        self.persistence.write(&bytes)
    }
}

impl std::fmt::Debug for Filesystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filesystem")
            .field("cwd", &self.cwd)
            .field("blocks", &self.store.len())
            .field("handles", &self.handles.len())
            .field("persistence", &self.persistence.location())
            .finish()
    }
}

/// Deep-copies `node`, allocating a fresh block for every file
fn duplicate(node: &Node, store: &mut ContentStore) -> Node {
    let now = Utc::now();
    match node {
        Node::File(f) => {
            let content = store.get(&f.content_id).unwrap_or_default().to_string();
            let size = store::char_len(&content);
            let id = store.allocate_with(content);
            Node::File(FileNode {
                size,
                created: now,
                content_id: id,
                tags: f.tags.clone(),
            })
        }
        Node::Directory(d) => Node::Directory(DirectoryNode {
            created: now,
            contents: d
                .contents
                .iter()
                .map(|(name, child)| (name.clone(), duplicate(child, store)))
                .collect(),
            tags: d.tags.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_create_allocates_block() {
        let mut fs = Filesystem::in_memory();
        let full = fs.create("a.txt").unwrap();
        assert_eq!(full, "/a.txt");
        let file = fs.lookup("/a.txt").unwrap().as_file().unwrap().clone();
        assert_eq!(file.size, 0);
        assert_eq!(fs.store().get(&file.content_id), Some(""));
    }

    #[test]
    fn test_create_errors() {
        let mut fs = Filesystem::in_memory();
        assert_eq!(
            fs.create("/missing/a").unwrap_err().kind(),
            ErrorKind::ParentMissing
        );
        _ = fs.create("a").unwrap();
        assert_eq!(fs.create("a").unwrap_err().kind(), ErrorKind::AlreadyExists);
        assert_eq!(fs.mkdir("a").unwrap_err().kind(), ErrorKind::AlreadyExists);
        assert_eq!(fs.store().len(), 1);
        // a file cannot act as a parent
        assert_eq!(fs.create("a/b").unwrap_err().kind(), ErrorKind::ParentMissing);
    }

    #[test]
    fn test_chdir() {
        let mut fs = Filesystem::in_memory();
        _ = fs.mkdir("docs").unwrap();
        _ = fs.create("f").unwrap();
        assert_eq!(fs.chdir("docs").unwrap(), "/docs");
        assert_eq!(fs.cwd(), "/docs");

        assert_eq!(fs.chdir("/f").unwrap_err().kind(), ErrorKind::NotADirectory);
        assert_eq!(fs.chdir("nope").unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(fs.cwd(), "/docs");

        assert_eq!(fs.chdir("..").unwrap(), "/");
    }

    #[test]
    fn test_delete_root_is_refused() {
        let mut fs = Filesystem::in_memory();
        assert_eq!(fs.delete("/").unwrap_err().kind(), ErrorKind::Immutable);
        assert_eq!(fs.delete("..").unwrap_err().kind(), ErrorKind::Immutable);
    }

    #[test]
    fn test_delete_resets_cursor_inside_removed_tree() {
        let mut fs = Filesystem::in_memory();
        _ = fs.mkdir("/a").unwrap();
        _ = fs.mkdir("/a/b").unwrap();
        _ = fs.chdir("/a/b").unwrap();
        let removed = fs.delete("/a").unwrap();
        assert_eq!(removed.entry_type, EntryType::Directory);
        assert_eq!(fs.cwd(), "/");
    }

    #[test]
    fn test_delete_drops_bound_handles() {
        let mut fs = Filesystem::in_memory();
        let handle = fs.open("x", OpenMode::Write).unwrap();
        _ = fs.delete("x").unwrap();
        assert!(fs.handle("x").is_none());
        assert_eq!(
            handle.read(&fs, None, None).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_move_checks() {
        let mut fs = Filesystem::in_memory();
        _ = fs.mkdir("/a").unwrap();
        _ = fs.mkdir("/a/b").unwrap();
        _ = fs.create("/f").unwrap();

        let kind = |r: Result<(String, String)>| r.unwrap_err().kind();
        assert_eq!(kind(fs.move_entry("/nope", "/x")), ErrorKind::NotFound);
        assert_eq!(kind(fs.move_entry("/f", "/nope/x")), ErrorKind::ParentMissing);
        assert_eq!(kind(fs.move_entry("/f", "/a")), ErrorKind::AlreadyExists);
        assert_eq!(kind(fs.move_entry("/a", "/a/b/c")), ErrorKind::MoveIntoSelf);
        assert_eq!(kind(fs.move_entry("/", "/z")), ErrorKind::Immutable);
    }

    #[test]
    fn test_move_directory_carries_cursor_and_timestamps() {
        let mut fs = Filesystem::in_memory();
        _ = fs.mkdir("/a").unwrap();
        _ = fs.mkdir("/a/b").unwrap();
        let created = fs.lookup("/a/b").unwrap().created();
        _ = fs.chdir("/a/b").unwrap();

        _ = fs.move_entry("/a", "/z").unwrap();
        assert_eq!(fs.cwd(), "/z/b");
        assert_eq!(fs.lookup("/z/b").unwrap().created(), created);
        assert!(!fs.exists("/a"));
    }

    #[test]
    fn test_copy_allocates_new_blocks() {
        let mut fs = Filesystem::in_memory();
        _ = fs.mkdir("/src").unwrap();
        let h = fs.open("/src/a", OpenMode::Write).unwrap();
        _ = h.write(&mut fs, "alpha", None).unwrap();

        _ = fs.copy("/src", "/dst").unwrap();
        let a = fs.lookup("/src/a").unwrap().as_file().unwrap().clone();
        let b = fs.lookup("/dst/a").unwrap().as_file().unwrap().clone();
        assert_ne!(a.content_id, b.content_id);
        assert_eq!(b.size, 5);
        assert_eq!(fs.store().get(&b.content_id), Some("alpha"));
        assert_eq!(fs.store().len(), 2);

        // the copies are independent
        _ = h.write(&mut fs, "changed", None).unwrap();
        assert_eq!(fs.store().get(&b.content_id), Some("alpha"));
        assert!(fs.verify().is_empty());
    }

    #[test]
    fn test_list() {
        let mut fs = Filesystem::in_memory();
        _ = fs.mkdir("docs").unwrap();
        _ = fs.create("b.txt").unwrap();
        let listing = fs.list(None).unwrap();
        assert_eq!(listing.names(), vec!["b.txt", "docs"]);
        assert_eq!(listing.entries[0].size, Some(0));
        assert_eq!(listing.entries[1].size, None);

        assert_eq!(fs.list(Some("b.txt")).unwrap_err().kind(), ErrorKind::NotADirectory);
        assert_eq!(fs.list(Some("zz")).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_stat() {
        let mut fs = Filesystem::in_memory();
        _ = fs.mkdir("docs").unwrap();
        _ = fs.create("docs/a").unwrap();

        let props = fs.stat("/docs/a").unwrap();
        assert_eq!(props.name, "a");
        assert_eq!(props.location.as_deref(), Some("/docs"));
        assert_eq!(props.size, Some(0));
        assert!(props.content_id.is_some());

        let root = fs.stat("/").unwrap();
        assert_eq!(root.children, Some(1));
        assert_eq!(root.location, None);
    }

    #[test]
    fn test_find() {
        let mut fs = Filesystem::in_memory();
        _ = fs.mkdir("/Docs").unwrap();
        _ = fs.create("/Docs/report.TXT").unwrap();
        _ = fs.create("/notes.txt").unwrap();
        assert_eq!(
            fs.find("txt", None).unwrap(),
            vec!["/Docs/report.TXT", "/notes.txt"]
        );
        assert_eq!(fs.find("doc", Some("/")).unwrap(), vec!["/Docs"]);
        assert_eq!(fs.find("x", Some("/notes.txt")).unwrap_err().kind(), ErrorKind::NotADirectory);
    }

    #[test]
    fn test_tags() {
        let persistence = MemoryPersistence::new();
        let mut fs = Filesystem::load(persistence.clone());
        _ = fs.create("a").unwrap();
        let writes = persistence.writes();

        assert!(fs.tag("a", "work").unwrap());
        assert!(!fs.tag("a", "work").unwrap());
        assert_eq!(persistence.writes(), writes + 1);
        assert_eq!(fs.stat("a").unwrap().tags, vec!["work"]);

        assert!(fs.tag("/", "root").unwrap());
        assert!(fs.untag("a", "work").unwrap());
        assert!(!fs.untag("a", "work").unwrap());
        assert_eq!(fs.tag("zz", "x").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_open_rules() {
        let mut fs = Filesystem::in_memory();
        _ = fs.mkdir("d").unwrap();
        assert_eq!(fs.open("d", OpenMode::Read).unwrap_err().kind(), ErrorKind::NotAFile);
        assert_eq!(fs.open("/", OpenMode::Write).unwrap_err().kind(), ErrorKind::NotAFile);
        assert_eq!(fs.open("nope", OpenMode::Read).unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(
            fs.open("/nope/x", OpenMode::Write).unwrap_err().kind(),
            ErrorKind::ParentMissing
        );

        let h = fs.open("new", OpenMode::Append).unwrap();
        assert_eq!(h.path(), "/new");
        assert!(fs.exists("new"));
        assert_eq!(fs.handle("/new"), Some(&h));
    }

    #[test]
    fn test_reopen_last_wins() {
        let mut fs = Filesystem::in_memory();
        _ = fs.open("x", OpenMode::Write).unwrap();
        _ = fs.open("x", OpenMode::Read).unwrap();
        assert_eq!(fs.open_handles().count(), 1);
        assert_eq!(fs.handle("x").unwrap().mode(), OpenMode::Read);
    }

    #[test]
    fn test_close() {
        let persistence = MemoryPersistence::new();
        let mut fs = Filesystem::load(persistence.clone());
        _ = fs.open("x", OpenMode::Write).unwrap();
        let writes = persistence.writes();
        assert!(fs.close("x").unwrap());
        assert_eq!(persistence.writes(), writes + 1);
        assert!(!fs.close("x").unwrap());
        assert_eq!(persistence.writes(), writes + 1);
    }

    #[test]
    fn test_save_failure_rolls_back() {
        let persistence = MemoryPersistence::new();
        let mut fs = Filesystem::load(persistence.clone());
        _ = fs.create("keep").unwrap();
        let saved = persistence.saved();

        persistence.fail_writes(true);
        let err = fs.mkdir("lost").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert!(!fs.exists("lost"));
        assert_eq!(persistence.saved(), saved);

        let h = fs.open("keep", OpenMode::Write).unwrap();
        assert_eq!(
            h.write(&mut fs, "data", None).unwrap_err().kind(),
            ErrorKind::PersistenceFailure
        );
        assert_eq!(h.read(&fs, None, None).unwrap(), "");
        assert_eq!(fs.lookup("keep").unwrap().as_file().unwrap().size, 0);
    }

    #[test]
    fn test_memory_map_report() {
        let mut fs = Filesystem::in_memory();
        _ = fs.mkdir("d").unwrap();
        let h = fs.open("d/a", OpenMode::Write).unwrap();
        _ = h.write(&mut fs, "12345", None).unwrap();

        let report = fs.memory_map_report();
        assert_eq!(report.blocks.len(), 1);
        assert_eq!(report.blocks[0].path.as_deref(), Some("/d/a"));
        assert_eq!(report.blocks[0].size, 5);
        assert_eq!(report.files, 1);
        assert_eq!(report.directories, 1);
        assert_eq!(report.total_units, 5);
        assert_eq!(report.open_handles, 1);
        assert!(report.is_consistent());
        assert!(report.to_string().contains("/d/a"));
    }
}
