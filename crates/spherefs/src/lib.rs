// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! An in-process hierarchical filesystem: a tree of directories and file
//! metadata, a detached store of content blocks, handle-based content
//! access, and whole-state persistence after every mutation.

mod entry_type;
mod error;
mod fs;
mod handle;
mod memory_persistence;
mod node;
pub mod path;
mod persistence;
mod report;
mod session;
pub mod store;
mod tree;

pub use entry_type::EntryType;
pub use error::{Error, ErrorKind, Result};
pub use fs::{Filesystem, Removed};
pub use handle::{FileHandle, OpenMode};
pub use memory_persistence::MemoryPersistence;
pub use node::{ContentId, DirectoryNode, FileNode, Node, Timestamp};
pub use persistence::{FilePersistence, Persistence, decode, encode};
pub use report::{
    BlockUsage, Inconsistency, ListEntry, Listing, MemoryMapReport, Properties, format_size,
};
pub use session::Session;
pub use store::ContentStore;
pub use tree::Tree;

#[cfg(test)]
mod tests;
