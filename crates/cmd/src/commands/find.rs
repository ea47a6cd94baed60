// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;

use crate::common::Context;

pub fn find_command<F>(ctx: &Context, pattern: &str, path: Option<&str>, mut handler: F) -> Result<()>
where
    F: FnMut(String),
{
    let fs = ctx.open_filesystem()?;
    for found in fs.find(pattern, path)? {
        handler(found);
    }
    Ok(())
}
