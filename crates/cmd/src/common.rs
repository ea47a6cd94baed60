// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use diagnostics::log_debug;
use spherefs::{FileHandle, Filesystem, OpenMode};

/// Environment variable naming the state file
pub const STATE_ENV: &str = "SPHERE_STATE";

/// State file used when neither `--state` nor `SPHERE_STATE` is given
pub const DEFAULT_STATE_FILE: &str = "filesystem_data.json";

/// Get the state path with an optional override, falling back to
/// SPHERE_STATE and then to the default file in the working directory
pub fn get_state_path_with_override(override_path: Option<PathBuf>) -> PathBuf {
    if let Some(path) = override_path {
        return path;
    }
    match env::var(STATE_ENV) {
        Ok(val) if !val.is_empty() => PathBuf::from(val),
        _ => PathBuf::from(DEFAULT_STATE_FILE),
    }
}

/// Settings shared by every subcommand of one invocation
#[derive(Debug, Clone)]
pub struct Context {
    state_path: PathBuf,
    cwd: Option<String>,
}

impl Context {
    pub fn new(state_override: Option<PathBuf>, cwd: Option<String>) -> Self {
        Self {
            state_path: get_state_path_with_override(state_override),
            cwd,
        }
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Loads the filesystem and moves the cursor to `--cwd` when given
    pub fn open_filesystem(&self) -> Result<Filesystem> {
        let state = self.state_path.display().to_string();
        log_debug!("Opening state file {state}", state: &state);
        let mut fs = Filesystem::with_state_file(&self.state_path);
        if let Some(cwd) = &self.cwd {
            _ = fs
                .chdir(cwd)
                .with_context(|| format!("Cannot start in directory {cwd}"))?;
        }
        Ok(fs)
    }
}

/// Opens `path`, runs `op` on the handle, then closes it.
///
/// A file created by the open is removed again when `op` fails.
pub fn with_handle<T, F>(fs: &mut Filesystem, path: &str, mode: OpenMode, op: F) -> Result<T>
where
    F: FnOnce(&FileHandle, &mut Filesystem) -> spherefs::Result<T>,
{
    let existed = fs.exists(path);
    let handle = fs.open(path, mode)?;
    match op(&handle, fs) {
        Ok(value) => {
            _ = handle.close(fs)?;
            Ok(value)
        }
        Err(e) if existed => {
            _ = handle.close(fs)?;
            Err(e.into())
        }
        Err(e) => {
            let full = handle.path().to_string();
            log_debug!("Removing {path} created by a failed operation", path: &full);
            _ = fs.delete(&full)?;
            Err(e.into())
        }
    }
}
