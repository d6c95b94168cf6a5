use nix::unistd::{gethostname, getuid};

use super::config::Configuration;
use super::environment::{EnvVariable, ShellEnvironment};
use crate::exec::BackgroundJobs;

/// Represents the shell state and provides methods for interacting with it
#[derive(Debug)]
pub struct ShellState {
    pub config: Configuration,
    /// Flags for the line currently being executed
    pub line: ShellEnvironment,
    pub jobs: BackgroundJobs,
    pub should_exit: bool,
}

impl ShellState {
    pub fn new(config: Configuration) -> Self {
        Self {
            config,
            line: ShellEnvironment::new(),
            jobs: BackgroundJobs::new(),
            should_exit: false,
        }
    }

    /// Generates the prompt string used by the `LineEditor`, e.g. `alice@box$ `
    pub fn generate_prompt(&self) -> String {
        let user = EnvVariable::User.get().unwrap_or_default();
        let host = gethostname()
            .map(|host| host.to_string_lossy().into_owned())
            .unwrap_or_default();
        let prompt_symbol = match getuid().is_root() {
            true => '#',
            false => '$',
        };

        format!("{}@{}{} ", user, host, prompt_symbol)
    }
}

/// The welcome banner shown when an interactive session starts
pub fn banner() -> String {
    use crossterm::style::Stylize;

    let art = [
        r"            _____ _    _",
        r"           / ____| |  | |",
        r" _ __ ___ | (___ | |__| |",
        r"| '_ ` _ \ \___ \|  __  |",
        r"| | | | | |____) | |  | |",
        r"|_| |_| |_|_____/|_|  |_|",
    ];

    let mut text = String::new();
    for line in art {
        text.push('\t');
        text.push_str(line);
        text.push('\n');
    }

    text.push_str("\n\t   THE MINIATURE SHELL\n\n");
    text.push_str("Welcome to mSH!\n\n");
    text.push_str(&format!(
        "Enter {} at any time for extra information.\n",
        "help".red().bold()
    ));
    text.push_str(&format!("Enter {} to close the shell.\n", "exit".red().bold()));
    text
}
