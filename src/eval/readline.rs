use std::io::{stdin, BufRead, Stdin};
use std::path::PathBuf;

use rustyline::error::ReadlineError;
use rustyline::{CompletionType, Config, DefaultEditor};

use crate::errors::{Handle, Result};

/// Supplies raw lines of input to the shell
pub trait LineSource {
    /// Reads the next line, or returns `None` once the input is exhausted
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

/// Interactive line editor with history, used when stdin is a terminal
pub struct LineEditor {
    editor: DefaultEditor,
    history_file: Option<PathBuf>,
}

impl LineEditor {
    // Creates a LineEditor with the default configuration and an optional history file
    pub fn new(history_file: Option<PathBuf>) -> Result<Self> {
        let config = Config::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::Fuzzy)
            .build();

        let mut editor = DefaultEditor::with_config(config)
            .replace_err(|| state_err!(FailedToInitializeLineEditor))?;

        if let Some(path) = &history_file {
            if editor.load_history(path).is_err() {
                log::info!("no history file at {}, creating one", path.display());
                if let Err(e) = fs_err::File::create(path) {
                    log::warn!("failed to create history file: {}", e);
                }
            }
        }

        Ok(Self {
            editor,
            history_file,
        })
    }

    fn remember(&mut self, line: &str) {
        // * This fails in the case of a blank/all-whitespace line,
        // * a line that is already in the history, or if the history is full
        // * None of these require any special handling
        let _ = self.editor.add_history_entry(line);
        if let Some(path) = &self.history_file {
            if let Err(e) = self.editor.save_history(path) {
                log::warn!("failed to save history file {}: {}", path.display(), e);
            }
        }
    }
}

impl LineSource for LineEditor {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.remember(&line);
                }

                Some(line)
            }
            // Ctrl-C abandons the current line but keeps the shell running
            Err(ReadlineError::Interrupted) => Some(String::new()),
            Err(ReadlineError::Eof) => None,
            Err(e) => {
                log::error!("unhandled error occurred while line-editing: {}", e);
                None
            }
        }
    }
}

/// Non-interactive input, used when stdin is a pipe or a file.
/// Lines are returned with their trailing newline; the tokenizer strips it.
pub struct PipedInput<R: BufRead = std::io::StdinLock<'static>> {
    reader: R,
}

impl PipedInput {
    pub fn stdin() -> Self {
        let stdin: Stdin = stdin();
        Self {
            reader: stdin.lock(),
        }
    }
}

impl<R: BufRead> PipedInput<R> {
    pub fn from_reader(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for PipedInput<R> {
    fn read_line(&mut self, _prompt: &str) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(e) => {
                log::error!("failed to read input: {}", e);
                None
            }
        }
    }
}
