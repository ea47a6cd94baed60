// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;

use crate::common::Context;

/// List the immediate children of a directory.
///
/// Each entry is passed to `handler` as one formatted line; the header line
/// comes first.
pub fn list_command<F>(ctx: &Context, path: Option<&str>, mut handler: F) -> Result<()>
where
    F: FnMut(String),
{
    let fs = ctx.open_filesystem()?;
    let listing = fs.list(path)?;
    handler(format!("{} ({} entries)", listing.path, listing.entries.len()));
    for entry in &listing.entries {
        handler(entry.to_string());
    }
    Ok(())
}
