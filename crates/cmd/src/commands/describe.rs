// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;

use crate::common::Context;
use diagnostics::log_warn;

/// Show the properties of one entry
pub fn stat_command<F>(ctx: &Context, path: &str, mut handler: F) -> Result<()>
where
    F: FnMut(String),
{
    let fs = ctx.open_filesystem()?;
    handler(fs.stat(path)?.to_string());
    Ok(())
}

/// Show every content block with its owning file, and any inconsistency
/// between the tree and the store
pub fn map_command<F>(ctx: &Context, mut handler: F) -> Result<()>
where
    F: FnMut(String),
{
    let fs = ctx.open_filesystem()?;
    let report = fs.memory_map_report();
    if !report.is_consistent() {
        let count = report.problems.len();
        log_warn!("Memory map has {count} problems", count: count);
    }
    handler(report.to_string());
    Ok(())
}
