// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;

use crate::common::Context;
use diagnostics::{log_debug, log_info};

pub fn mkdir_command(ctx: &Context, path: &str) -> Result<()> {
    log_debug!("Creating directory: {path}", path: path);

    let mut fs = ctx.open_filesystem()?;
    let full = fs.mkdir(path)?;

    log_info!("Directory created successfully: {path}", path: &full);
    Ok(())
}
