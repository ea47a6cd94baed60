// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;

use crate::common::Context;
use diagnostics::log_info;

pub fn touch_command(ctx: &Context, path: &str) -> Result<()> {
    let mut fs = ctx.open_filesystem()?;
    let full = fs.create(path)?;
    log_info!("File created successfully: {path}", path: &full);
    Ok(())
}
