// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;

use crate::common::Context;
use diagnostics::log_info;

pub fn copy_command(ctx: &Context, source: &str, dest: &str) -> Result<()> {
    let mut fs = ctx.open_filesystem()?;
    let (from, to) = fs.copy(source, dest)?;
    log_info!("Copied {from} to {to}", from: &from, to: &to);
    Ok(())
}

pub fn move_command(ctx: &Context, source: &str, dest: &str) -> Result<()> {
    let mut fs = ctx.open_filesystem()?;
    let (from, to) = fs.move_entry(source, dest)?;
    log_info!("Moved {from} to {to}", from: &from, to: &to);
    Ok(())
}
