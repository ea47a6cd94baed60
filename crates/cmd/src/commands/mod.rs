// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod cat;
pub mod copy;
pub mod describe;
pub mod find;
pub mod list;
pub mod mkdir;
pub mod remove;
pub mod shell;
pub mod tag;
pub mod touch;
pub mod write;

pub use cat::cat_command;
pub use copy::{copy_command, move_command};
pub use describe::{map_command, stat_command};
pub use find::find_command;
pub use list::list_command;
pub use mkdir::mkdir_command;
pub use remove::remove_command;
pub use shell::shell_command;
pub use tag::{tag_command, untag_command};
pub use touch::touch_command;
pub use write::{move_within_command, truncate_command, write_command};
