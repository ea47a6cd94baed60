// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use cmd::commands;
use cmd::common::Context;
use diagnostics::log_debug;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "sphere")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// State file (defaults to $SPHERE_STATE, then ./filesystem_data.json)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Directory that relative paths start from
    #[arg(long, global = true)]
    cwd: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List a directory
    Ls {
        /// Directory to list (defaults to the starting directory)
        path: Option<String>,
    },
    /// Create a directory
    Mkdir { path: String },
    /// Create an empty file
    Touch { path: String },
    /// Delete a file, or a directory with everything beneath it
    Rm { path: String },
    /// Move an entry
    Mv { source: String, dest: String },
    /// Copy an entry; copied files get their own content blocks
    Cp { source: String, dest: String },
    /// Print a file's content
    #[command(allow_negative_numbers = true)]
    Cat {
        path: String,
        /// First character to print
        #[arg(long)]
        start: Option<i64>,
        /// Number of characters to print
        #[arg(long)]
        size: Option<i64>,
    },
    /// Write text into a file, creating it when missing
    #[command(allow_negative_numbers = true)]
    Write {
        path: String,
        text: String,
        /// Overwrite in place starting at this character offset
        #[arg(long)]
        at: Option<i64>,
        /// Add to the end instead of replacing the content
        #[arg(long)]
        append: bool,
    },
    /// Keep only the first SIZE characters of a file
    #[command(allow_negative_numbers = true)]
    Truncate { path: String, size: i64 },
    /// Move a range of characters to another offset in the same file
    #[command(allow_negative_numbers = true)]
    MoveWithin {
        path: String,
        start: i64,
        size: i64,
        /// Offset in the content after the range has been removed
        target: i64,
    },
    /// Show the properties of an entry
    Stat { path: String },
    /// Find entries whose name contains PATTERN, ignoring case
    Find {
        pattern: String,
        /// Directory to search (defaults to the starting directory)
        path: Option<String>,
    },
    /// Add a tag to an entry
    Tag { path: String, tag: String },
    /// Remove a tag from an entry
    Untag { path: String, tag: String },
    /// Show content blocks and the files that own them
    Map,
    /// Read commands from standard input
    Shell,
}

fn main() -> Result<()> {
    diagnostics::init_diagnostics();

    let cli = Cli::parse();
    let ctx = Context::new(cli.state, cli.cwd);
    let state = ctx.state_path().display().to_string();
    log_debug!("Using state file {state}", state: &state);

    let print = |line: String| println!("{line}");

    match cli.command {
        Commands::Ls { path } => commands::list_command(&ctx, path.as_deref(), print),
        Commands::Mkdir { path } => commands::mkdir_command(&ctx, &path),
        Commands::Touch { path } => commands::touch_command(&ctx, &path),
        Commands::Rm { path } => commands::remove_command(&ctx, &path),
        Commands::Mv { source, dest } => commands::move_command(&ctx, &source, &dest),
        Commands::Cp { source, dest } => commands::copy_command(&ctx, &source, &dest),
        Commands::Cat { path, start, size } => {
            commands::cat_command(&ctx, &path, start, size, |content| print!("{content}"))
        }
        Commands::Write {
            path,
            text,
            at,
            append,
        } => commands::write_command(&ctx, &path, &text, at, append),
        Commands::Truncate { path, size } => commands::truncate_command(&ctx, &path, size),
        Commands::MoveWithin {
            path,
            start,
            size,
            target,
        } => commands::move_within_command(&ctx, &path, start, size, target),
        Commands::Stat { path } => commands::stat_command(&ctx, &path, print),
        Commands::Find { pattern, path } => {
            commands::find_command(&ctx, &pattern, path.as_deref(), print)
        }
        Commands::Tag { path, tag } => commands::tag_command(&ctx, &path, &tag),
        Commands::Untag { path, tag } => commands::untag_command(&ctx, &path, &tag),
        Commands::Map => commands::map_command(&ctx, print),
        Commands::Shell => commands::shell_command(&ctx),
    }
}
