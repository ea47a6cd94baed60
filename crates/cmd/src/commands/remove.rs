// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;

use crate::common::Context;
use diagnostics::log_info;

/// Removes a file or a whole directory tree
pub fn remove_command(ctx: &Context, path: &str) -> Result<()> {
    let mut fs = ctx.open_filesystem()?;
    let removed = fs.delete(path)?;
    log_info!(
        "Removed {path}, {count} blocks freed",
        path: &removed.path,
        count: removed.freed_blocks
    );
    Ok(())
}
