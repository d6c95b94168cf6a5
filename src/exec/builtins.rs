/*
Builtins are commands that are run by the shell process itself rather than by a forked child.
They are the only commands able to change the shell's own state, such as its working directory,
which is exactly why `cd` and `exit` cannot be ordinary programs.
 */

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::errors::{os_reason, Handle, Result};
use crate::state::{home_directory, ShellState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Builtin {
    Cd,
    Exit,
    Help,
}

impl Builtin {
    /// Attempts to locate a builtin by the name the user typed
    pub fn resolve(command_name: &str) -> Option<Self> {
        Self::from_str(command_name).ok()
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Cd => "change the working directory (defaults to $HOME)",
            Self::Exit => "exit the shell",
            Self::Help => "get a listing of the builtin commands",
        }
    }

    /// Runs the builtin in the shell process. `args` includes the builtin's own name.
    pub fn run(self, shell: &mut ShellState, args: &[String]) -> Result<()> {
        match self {
            Self::Cd => change_directory(args),
            Self::Exit => {
                exit(shell);
                Ok(())
            }
            Self::Help => {
                print!("{}", help_text());
                Ok(())
            }
        }
    }
}

fn change_directory(args: &[String]) -> Result<()> {
    if args.len() > 2 {
        return Err(builtin_err!(TooManyArguments: Builtin::Cd.to_string()));
    }

    let target = resolve_directory(args.get(1).map(String::as_str))?;
    env::set_current_dir(&target).map_err(|error| {
        builtin_err!(FailedToChangeDirectory: target.display().to_string(), os_reason(&error))
    })?;

    // Children look at PWD, so keep it in sync with the real working directory
    if let Ok(cwd) = env::current_dir() {
        env::set_var("PWD", cwd);
    }

    log::debug!("changed directory to {}", target.display());
    Ok(())
}

/// Works out where `cd` should go: nothing or `~` means home, `~/x` is relative to home
fn resolve_directory(argument: Option<&str>) -> Result<PathBuf> {
    match argument {
        None | Some("~") => home_directory().replace_err(|| builtin_err!(MissingHomeDirectory)),
        Some(path) => match path.strip_prefix("~/") {
            Some(rest) => Ok(home_directory()
                .replace_err(|| builtin_err!(MissingHomeDirectory))?
                .join(rest)),
            None => Ok(PathBuf::from(path)),
        },
    }
}

// * Exiting is deferred to the read-eval loop so the line editor can save its history first
fn exit(shell: &mut ShellState) {
    shell.should_exit = true;
}

fn help_text() -> String {
    let mut text = String::from("Usage:\n\n");
    for builtin in Builtin::iter() {
        text.push_str(&format!("{}: {}\n", builtin, builtin.description()));
    }

    text.push('\n');
    text
}
