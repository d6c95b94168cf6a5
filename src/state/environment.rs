use std::env;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use bitflags::bitflags;

bitflags! {
    /// Control tokens seen while tokenizing the current line
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LineFlags: u8 {
        const PIPING = 1 << 0;
        const BACKGROUND = 1 << 1;
    }
}

/// Per-line execution state.
/// Reset at the start of every line, written only by the tokenizer and read only by the
/// dispatcher while running that same line, so nothing leaks from one prompt to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellEnvironment {
    flags: LineFlags,
    pipe_count: usize,
}

impl Default for ShellEnvironment {
    fn default() -> Self {
        Self {
            flags: LineFlags::empty(),
            pipe_count: 0,
        }
    }
}

impl ShellEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears everything recorded for the previous line
    pub fn reset(&mut self) {
        self.flags = LineFlags::empty();
        self.pipe_count = 0;
    }

    pub fn piping(&self) -> bool {
        self.flags.contains(LineFlags::PIPING)
    }

    pub fn background(&self) -> bool {
        self.flags.contains(LineFlags::BACKGROUND)
    }

    pub fn pipe_count(&self) -> usize {
        self.pipe_count
    }

    /// Records a `|` separator
    pub fn add_pipe(&mut self) {
        self.flags.insert(LineFlags::PIPING);
        self.pipe_count += 1;
    }

    /// Records a bare `&` token
    pub fn set_background(&mut self) {
        self.flags.insert(LineFlags::BACKGROUND);
    }
}

impl Display for ShellEnvironment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "piping: {}, background: {}, pipes: {}",
            self.piping(),
            self.background(),
            self.pipe_count
        )
    }
}

/// Identifier enum for the variables the shell reads from the environment it was started in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvVariable {
    User,
    Home,
}

impl EnvVariable {
    /// Names to try, in order, when looking the variable up
    fn names(self) -> &'static [&'static str] {
        match self {
            Self::User => &["USER", "LOGNAME"],
            Self::Home => &["HOME"],
        }
    }

    /// Reads the variable from the process environment, ignoring empty values
    pub fn get(self) -> Option<String> {
        self.names()
            .iter()
            .filter_map(|name| env::var(name).ok())
            .find(|value| !value.is_empty())
    }
}

/// Gets the home directory of the user who invoked the shell
pub fn home_directory() -> Option<PathBuf> {
    EnvVariable::Home.get().map(PathBuf::from)
}
