// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! One-shot content edits: each opens the file, applies one change and
//! closes it again.

use anyhow::Result;
use spherefs::OpenMode;

use crate::common::{Context, with_handle};
use diagnostics::log_info;

/// Write `text` into `path`, creating the file when missing.
///
/// Without `at` the content is replaced, or extended when `append` is set.
/// With `at` the text overwrites in place from that offset.
pub fn write_command(
    ctx: &Context,
    path: &str,
    text: &str,
    at: Option<i64>,
    append: bool,
) -> Result<()> {
    let mode = if append {
        OpenMode::Append
    } else {
        OpenMode::Write
    };
    let mut fs = ctx.open_filesystem()?;
    let size = with_handle(&mut fs, path, mode, |h, fs| h.write(fs, text, at))?;
    log_info!("Wrote {path}, size now {size}", path: path, size: size);
    Ok(())
}

pub fn truncate_command(ctx: &Context, path: &str, max_size: i64) -> Result<()> {
    let mut fs = ctx.open_filesystem()?;
    // opening for write would create a missing file
    _ = fs.stat(path)?;
    let size = with_handle(&mut fs, path, OpenMode::Write, |h, fs| {
        h.truncate(fs, max_size)
    })?;
    log_info!("Truncated {path} to {size}", path: path, size: size);
    Ok(())
}

pub fn move_within_command(
    ctx: &Context,
    path: &str,
    start: i64,
    size: i64,
    target: i64,
) -> Result<()> {
    let mut fs = ctx.open_filesystem()?;
    _ = fs.stat(path)?;
    with_handle(&mut fs, path, OpenMode::Write, |h, fs| {
        h.move_within(fs, start, size, target)
    })?;
    log_info!("Moved {size} characters within {path}", size: size, path: path);
    Ok(())
}
