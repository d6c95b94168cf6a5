use std::os::unix::io::RawFd;
use std::path::PathBuf;

use nix::errno::Errno;
use thiserror::Error;

/// `Result` alias which automatically uses `MshError` as the error type.
pub type Result<T> = std::result::Result<T, MshError>;

pub trait Handle<T> {
    /// Replaces any error kind with a new one.
    /// The replacement is only constructed if there actually is an error.
    fn replace_err<F: FnOnce() -> MshError>(self, new_error: F) -> Result<T>;
}

impl<T, E> Handle<T> for std::result::Result<T, E> {
    fn replace_err<F: FnOnce() -> MshError>(self, new_error: F) -> Result<T> {
        self.map_err(|_| new_error())
    }
}

impl<T> Handle<T> for Option<T> {
    fn replace_err<F: FnOnce() -> MshError>(self, new_error: F) -> Result<T> {
        self.ok_or_else(new_error)
    }
}

/// Error type for mSH.
/// Every error which can reach the read-eval loop is one of these kinds, and its `Display`
/// output is exactly the text shown to the user after the shell name prefix.
#[derive(Error, Debug)]
pub enum MshError {
    #[error(transparent)]
    Builtin(#[from] BuiltinError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error(transparent)]
    Redirect(#[from] RedirectError),
    #[error(transparent)]
    State(#[from] StateError),
}

impl MshError {
    /// Exit status a forked child should terminate with when it fails with this error
    pub fn child_exit_code(&self) -> i32 {
        match self {
            // * 127 is the conventional "command not found" status,
            // * as per https://tldp.org/LDP/abs/html/exitcodes.html
            MshError::Launch(LaunchError::CommandNotFound(_)) => 127,
            MshError::Launch(LaunchError::NotExecutable(_)) => 126,
            _ => 1,
        }
    }
}

/// Error type for errors which occur while running a builtin inside the shell process.
#[derive(Error, Debug)]
pub enum BuiltinError {
    #[error("cd: {0}: {1}")]
    FailedToChangeDirectory(String, String),
    #[error("cd: HOME not set")]
    MissingHomeDirectory,
    #[error("{0}: too many arguments")]
    TooManyArguments(String),
}

/// Error type for errors which occur while creating, replacing or reaping processes.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("{0}: command not found")]
    CommandNotFound(String),
    // * Same text as CommandNotFound, only the exit status tells them apart
    #[error("{0}: command not found")]
    NotExecutable(String),
    #[error("{0}: argument contains a nul byte")]
    InvalidArgument(String),
    #[error("fork failed: {}", .0.desc())]
    ForkFailed(Errno),
    #[error("pipe failed: {}", .0.desc())]
    PipeFailed(Errno),
    #[error("wait failed: {}", .0.desc())]
    WaitFailed(Errno),
}

/// Error type for errors which occur while remapping the standard streams of a child.
#[derive(Error, Debug)]
pub enum RedirectError {
    #[error("{}: {}", .0, .1.desc())]
    FailedToOpen(String, Errno),
    #[error("failed to duplicate file descriptor {}: {}", .0, .1.desc())]
    FailedToDuplicate(RawFd, Errno),
}

/// Error type for errors which occur while loading or updating shell state.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to open configuration file: {}", .0.display())]
    FailedToOpenConfigFile(PathBuf),
    #[error("Failed to read configuration file: {}", .0.display())]
    FailedToReadConfigFile(PathBuf),
    #[error("Invalid value for configuration key '{0}': {1}")]
    InvalidConfigValue(String, String),
    #[error("Failed to initialize logger: {0}")]
    FailedToInitializeLogger(String),
    #[error("Failed to initialize line editor")]
    FailedToInitializeLineEditor,
}

/// Converts an OS error into the short human-readable reason used in shell messages,
/// e.g. "No such file or directory" rather than the `io::Error` debug form
pub fn os_reason(error: &std::io::Error) -> String {
    match error.raw_os_error() {
        Some(code) => Errno::from_i32(code).desc().to_owned(),
        None => error.to_string(),
    }
}

/// Shortcut for creating a `MshError::Builtin` without explicit imports
#[macro_export]
macro_rules! builtin_err {
    ($variant:ident) => {
        $crate::errors::MshError::from($crate::errors::BuiltinError::$variant)
    };
    ($variant:ident: $($field:expr),+) => {
        $crate::errors::MshError::from($crate::errors::BuiltinError::$variant($($field.into()),+))
    };
}

/// Shortcut for creating a `MshError::Launch` without explicit imports
#[macro_export]
macro_rules! launch_err {
    ($variant:ident: $($field:expr),+) => {
        $crate::errors::MshError::from($crate::errors::LaunchError::$variant($($field.into()),+))
    };
}

/// Shortcut for creating a `MshError::Redirect` without explicit imports
#[macro_export]
macro_rules! redirect_err {
    ($variant:ident: $($field:expr),+) => {
        $crate::errors::MshError::from($crate::errors::RedirectError::$variant($($field.into()),+))
    };
}

/// Shortcut for creating a `MshError::State` without explicit imports
#[macro_export]
macro_rules! state_err {
    ($variant:ident) => {
        $crate::errors::MshError::from($crate::errors::StateError::$variant)
    };
    ($variant:ident: $($field:expr),+) => {
        $crate::errors::MshError::from($crate::errors::StateError::$variant($($field.into()),+))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_not_found_message() {
        let error = launch_err!(CommandNotFound: "frobnicate");
        assert_eq!(error.to_string(), "frobnicate: command not found");
        assert_eq!(error.child_exit_code(), 127);
    }

    #[test]
    fn redirect_error_uses_errno_description() {
        let error = redirect_err!(FailedToOpen: "missing.txt", Errno::ENOENT);
        assert_eq!(error.to_string(), "missing.txt: No such file or directory");
        assert_eq!(error.child_exit_code(), 1);
    }

    #[test]
    fn os_reason_strips_error_code() {
        let error = std::io::Error::from_raw_os_error(Errno::ENOENT as i32);
        assert_eq!(os_reason(&error), "No such file or directory");
    }

    #[test]
    fn handle_replaces_option_none() {
        let missing: Option<u8> = None;
        let result = missing.replace_err(|| builtin_err!(MissingHomeDirectory));
        assert!(matches!(
            result,
            Err(MshError::Builtin(BuiltinError::MissingHomeDirectory))
        ));
    }
}
