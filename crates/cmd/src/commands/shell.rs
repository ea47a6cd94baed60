// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Line-oriented shell over a [`Session`].
//!
//! Handles opened with `open` stay registered until `close` or the end of
//! the shell, so content verbs can be issued against them one at a time.

use std::io::{BufRead, IsTerminal, Write};

use anyhow::Result;
use spherefs::Session;

use crate::common::Context;
use diagnostics::{log_debug, log_info};

const HELP: &str = "\
Commands:
  pwd                               show the current directory
  cd <path>                         change directory
  ls [path]                         list a directory
  mkdir <path>                      create a directory
  touch <path>                      create an empty file
  rm <path>                         delete a file or directory tree
  mv <source> <dest>                move an entry
  cp <source> <dest>                copy an entry
  stat <path>                       show properties
  find <pattern> [path]             search names beneath a directory
  tag <path> <tag>                  add a tag
  untag <path> <tag>                remove a tag
  map                               show the memory map
  open <path> <r|w|a>               open a file handle
  close <path>                      close a file handle
  read <path> [start [size]]        read through an open handle
  write <path> <text> [at]          write through an open handle
  move-within <path> <start> <size> <target>
  truncate <path> <size>            truncate through an open handle
  cat <path>                        print a whole file
  help                              show this text
  exit                              leave the shell";

/// Outcome of one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Output(String),
    Nothing,
    Exit,
}

pub struct Shell {
    session: Session,
}

/// Splits a command line into words.
///
/// Single and double quotes group words; inside double quotes a backslash
/// escapes the next character, and `\n` is a newline.
pub fn split_words(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some('n') => current.push('\n'),
                            Some('t') => current.push('\t'),
                            Some(other) => current.push(other),
                            None => return Err("unterminated quote".to_string()),
                        },
                        Some(other) => current.push(other),
                        None => return Err("unterminated quote".to_string()),
                    }
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(other) => current.push(other),
                        None => return Err("unterminated quote".to_string()),
                    }
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

fn number(word: &str) -> std::result::Result<i64, String> {
    word.parse()
        .map_err(|_| format!("Error: Not a number: {word}"))
}

fn usage(verb: &str) -> String {
    format!("Error: Wrong arguments for {verb}, try 'help'")
}

impl Shell {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn prompt(&self) -> String {
        format!("sphere:{}$ ", self.session.pwd())
    }

    pub fn execute(&mut self, line: &str) -> Step {
        let words = match split_words(line) {
            Ok(words) => words,
            Err(e) => return Step::Output(format!("Error: {e}")),
        };
        let Some((verb, args)) = words.split_first() else {
            return Step::Nothing;
        };
        log_debug!("Shell command {verb}", verb: verb.as_str());

        if matches!(verb.as_str(), "exit" | "quit") {
            return Step::Exit;
        }
        let output = self
            .dispatch(verb, args)
            .unwrap_or_else(|message| message);
        if output.is_empty() {
            Step::Nothing
        } else {
            Step::Output(output)
        }
    }

    fn dispatch(&mut self, verb: &str, args: &[String]) -> std::result::Result<String, String> {
        let s = &mut self.session;
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let out = match (verb, args.as_slice()) {
            ("help", []) => HELP.to_string(),
            ("pwd", []) => s.pwd(),
            ("cd", [path]) => s.chdir(path),
            ("cd", []) => s.chdir("/"),
            ("ls", []) => s.list(None),
            ("ls", [path]) => s.list(Some(*path)),
            ("mkdir", [path]) => s.mkdir(path),
            ("touch", [path]) => s.create(path),
            ("rm", [path]) => s.delete(path),
            ("mv", [from, to]) => s.move_entry(from, to),
            ("cp", [from, to]) => s.copy(from, to),
            ("stat", [path]) => s.stat(path),
            ("find", [pattern]) => s.find(pattern, None),
            ("find", [pattern, path]) => s.find(pattern, Some(*path)),
            ("tag", [path, tag]) => s.tag(path, tag),
            ("untag", [path, tag]) => s.untag(path, tag),
            ("map", []) => s.memory_map_report(),
            ("open", [path, mode]) => s.open(path, mode),
            ("close", [path]) => s.close(path),
            ("read", [path]) => s.read(path, None, None),
            ("read", [path, start]) => s.read(path, Some(number(start)?), None),
            ("read", [path, start, size]) => {
                s.read(path, Some(number(start)?), Some(number(size)?))
            }
            ("write", [path, text]) => s.write(path, text, None),
            ("write", [path, text, at]) => s.write(path, text, Some(number(at)?)),
            ("move-within", [path, start, size, target]) => {
                s.move_within(path, number(start)?, number(size)?, number(target)?)
            }
            ("truncate", [path, size]) => s.truncate(path, number(size)?),
            ("cat", [path]) => cat(s, path),
            (
                "help" | "pwd" | "cd" | "ls" | "mkdir" | "touch" | "rm" | "mv" | "cp" | "stat"
                | "find" | "tag" | "untag" | "map" | "open" | "close" | "read" | "write"
                | "move-within" | "truncate" | "cat",
                _,
            ) => return Err(usage(verb)),
            _ => return Err(format!("Error: Unknown command: {verb}")),
        };
        Ok(out)
    }
}

/// Whole content of `path`, reusing a registered handle when there is one
/// and otherwise opening and closing a read handle around the read
fn cat(s: &mut Session, path: &str) -> String {
    if s.fs().handle(path).is_some() {
        return s.read(path, None, None);
    }
    let opened = s.open(path, "r");
    if opened.starts_with("Error: ") {
        return opened;
    }
    let content = s.read(path, None, None);
    _ = s.close(path);
    content
}

/// Runs the shell until `exit` or end of input
pub fn run_shell<R, W>(shell: &mut Shell, input: R, mut output: W, prompt: bool) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        if prompt {
            write!(output, "{}", shell.prompt())?;
            output.flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        match shell.execute(&line?) {
            Step::Output(text) => writeln!(output, "{text}")?,
            Step::Nothing => {}
            Step::Exit => break,
        }
    }
    Ok(())
}

/// Interactive shell on stdin/stdout; the prompt is shown only on a terminal
pub fn shell_command(ctx: &Context) -> Result<()> {
    let fs = ctx.open_filesystem()?;
    let mut shell = Shell::new(Session::new(fs));
    let stdin = std::io::stdin();
    let prompt = stdin.is_terminal();
    log_info!("Shell started");
    run_shell(&mut shell, stdin.lock(), std::io::stdout().lock(), prompt)?;
    let open = shell.session().fs().open_handles().count();
    log_info!("Shell finished with {open} handles open", open: open);
    Ok(())
}
