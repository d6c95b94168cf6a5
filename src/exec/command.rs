use std::ffi::CString;
use std::fmt::{Display, Formatter};

use crate::errors::{Handle, Result};

/// A single command: the program name followed by its arguments.
/// The end of the vector is the end of the arguments; consumers never look past `len()`,
/// and the null terminator `execvp` needs is added only when converting to C strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    args: Vec<String>,
}

impl From<Vec<String>> for Command {
    fn from(args: Vec<String>) -> Self {
        Self { args }
    }
}

// * This implementation is here to make it easier to build commands from string literals
impl From<Vec<&str>> for Command {
    fn from(args: Vec<&str>) -> Self {
        Self {
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.args.join(" "))
    }
}

impl Command {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, arg: impl Into<String>) {
        self.args.push(arg.into());
    }

    /// The program to run, if the command has a non-empty name
    pub fn program(&self) -> Option<&str> {
        self.args
            .first()
            .map(|name| name.as_str())
            .filter(|name| !name.is_empty())
    }

    /// All arguments, including the program name
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Whether there is nothing to launch for this command
    pub fn is_noop(&self) -> bool {
        self.program().is_none()
    }

    /// Drops every argument from `position` onwards
    pub fn truncate(&mut self, position: usize) {
        self.args.truncate(position);
    }

    /// Converts the arguments into the null-terminated form `execvp` expects
    pub fn to_cstrings(&self) -> Result<Vec<CString>> {
        self.args
            .iter()
            .map(|arg| {
                CString::new(arg.as_bytes()).replace_err(|| launch_err!(InvalidArgument: arg))
            })
            .collect()
    }
}

/// The parsed form of one input line: one `Command` per pipeline stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    stages: Vec<Command>,
    background: bool,
}

impl ParseResult {
    pub fn new(stages: Vec<Command>, background: bool) -> Self {
        Self { stages, background }
    }

    pub fn stages(&self) -> &[Command] {
        &self.stages
    }

    /// The number of `|` separators, which is always one less than the number of stages
    pub fn pipe_count(&self) -> usize {
        self.stages.len().saturating_sub(1)
    }

    pub fn background(&self) -> bool {
        self.background
    }

    /// Whether no stage has anything to launch
    pub fn is_noop(&self) -> bool {
        self.stages.iter().all(Command::is_noop)
    }

    pub fn first(&self) -> Option<&Command> {
        self.stages.first()
    }
}

impl Display for ParseResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let stages: Vec<String> = self.stages.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", stages.join(" | "))?;
        if self.background {
            write!(f, " &")?;
        }

        Ok(())
    }
}
