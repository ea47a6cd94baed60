// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::{Component, Path};

/// Canonical path of the root directory
pub const ROOT: &str = "/";

/// Resolves `path` against the cursor `cwd` and returns the canonical form.
///
/// Absolute paths ignore the cursor. `.` is dropped, `..` pops one level and
/// stops at the root, and repeated or trailing separators collapse. The
/// result always starts with `/` and never ends with one unless it is the
/// root itself.
pub fn resolve(cwd: &str, path: &str) -> String {
    let path = Path::new(path);
    if path.has_root() {
        canonical(path)
    } else {
        canonical(&Path::new(cwd).join(path))
    }
}

fn canonical(path: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();

    for component in path.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_string_lossy().to_string()),
            Component::ParentDir => {
                _ = parts.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    if parts.is_empty() {
        ROOT.to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

/// Iterates the names along a canonical path, root excluded
pub fn segments(full: &str) -> impl Iterator<Item = &str> {
    full.split('/').filter(|s| !s.is_empty())
}

/// Splits a canonical path into its parent directory and final name.
///
/// Returns `None` for the root, which has no parent.
pub fn split(full: &str) -> Option<(String, String)> {
    let (parent, name) = full.rsplit_once('/')?;
    if name.is_empty() {
        return None;
    }
    let parent = if parent.is_empty() { ROOT } else { parent };
    Some((parent.to_string(), name.to_string()))
}

/// Joins a child name onto a canonical directory path
pub fn join(dir: &str, name: &str) -> String {
    if dir == ROOT {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// True when `path` is `ancestor` or lies somewhere beneath it
pub fn is_within(path: &str, ancestor: &str) -> bool {
    if ancestor == ROOT {
        return true;
    }
    path == ancestor
        || path
            .strip_prefix(ancestor)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Rewrites `path` so that the `from` prefix becomes `to`.
///
/// The caller must have checked `is_within(path, from)`.
pub fn rebase(path: &str, from: &str, to: &str) -> String {
    let rest = path.strip_prefix(from).unwrap_or_default();
    if rest.is_empty() {
        to.to_string()
    } else if to == ROOT {
        rest.to_string()
    } else {
        format!("{to}{rest}")
    }
}
