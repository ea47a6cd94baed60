// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;

use crate::common::Context;
use diagnostics::log_info;

pub fn tag_command(ctx: &Context, path: &str, tag: &str) -> Result<()> {
    let mut fs = ctx.open_filesystem()?;
    if fs.tag(path, tag)? {
        log_info!("Tagged {path} with {tag}", path: path, tag: tag);
    } else {
        log_info!("{path} already has tag {tag}", path: path, tag: tag);
    }
    Ok(())
}

pub fn untag_command(ctx: &Context, path: &str, tag: &str) -> Result<()> {
    let mut fs = ctx.open_filesystem()?;
    if fs.untag(path, tag)? {
        log_info!("Removed tag {tag} from {path}", path: path, tag: tag);
    } else {
        log_info!("{path} has no tag {tag}", path: path, tag: tag);
    }
    Ok(())
}
