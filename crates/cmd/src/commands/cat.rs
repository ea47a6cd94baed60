// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use spherefs::OpenMode;

use crate::common::{Context, with_handle};

/// Read a file's content, optionally a `[start, start+size)` window
pub fn cat_command<F>(
    ctx: &Context,
    path: &str,
    start: Option<i64>,
    size: Option<i64>,
    mut handler: F,
) -> Result<()>
where
    F: FnMut(String),
{
    let mut fs = ctx.open_filesystem()?;
    let content = with_handle(&mut fs, path, OpenMode::Read, |h, fs| {
        h.read(fs, start, size)
    })?;
    handler(content);
    Ok(())
}
