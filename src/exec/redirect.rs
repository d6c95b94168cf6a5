use std::os::unix::io::RawFd;

use nix::fcntl::{open, OFlag};
use nix::libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::sys::stat::Mode;
use nix::unistd::{close, dup2};

use super::process::syscall;
use super::Command;
use crate::errors::Result;
use crate::eval::symbols::{DGREAT, GREAT, LESS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectOperator {
    /// `<`
    Input,
    /// `>`
    Output,
    /// `>>`
    Append,
}

impl RedirectOperator {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            LESS => Some(Self::Input),
            GREAT => Some(Self::Output),
            DGREAT => Some(Self::Append),
            _ => None,
        }
    }

    /// The standard stream this operator replaces
    pub fn target_fd(self) -> RawFd {
        match self {
            Self::Input => STDIN_FILENO,
            Self::Output | Self::Append => STDOUT_FILENO,
        }
    }

    pub fn open_flags(self) -> OFlag {
        match self {
            Self::Input => OFlag::O_RDONLY,
            Self::Output => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
            Self::Append => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_APPEND,
        }
    }
}

/// One operator/filename pair found in a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub operator: RedirectOperator,
    pub file: String,
    /// Index of the operator in the command's arguments
    pub position: usize,
}

/// Finds every redirection in a command, left to right.
/// An operator in the program-name position, or one without a filename after it,
/// is not a redirection and stays an ordinary argument.
pub fn scan(command: &Command) -> Vec<Redirection> {
    let args = command.args();
    let mut redirections = Vec::new();
    let mut index = 1;

    while index < args.len() {
        let operator = RedirectOperator::from_token(&args[index]);
        match (operator, args.get(index + 1)) {
            (Some(operator), Some(file)) => {
                redirections.push(Redirection {
                    operator,
                    file: file.clone(),
                    position: index,
                });
                // Skip the filename, it can never be an operator itself
                index += 2;
            }
            _ => index += 1,
        }
    }

    redirections
}

/// Remaps the standard streams of the current process according to the redirections in
/// `command`, then cuts the arguments off at the first operator so neither operators nor
/// filenames reach the program.
///
/// Only ever called in a freshly forked child, right before `exec`.
pub fn apply_redirection(command: &mut Command) -> Result<()> {
    let redirections = scan(command);

    for redirection in &redirections {
        redirect_stream(redirection)?;
    }

    if let Some(first) = redirections.first() {
        command.truncate(first.position);
    }

    Ok(())
}

fn redirect_stream(redirection: &Redirection) -> Result<()> {
    let file = redirection.file.as_str();
    let fd = syscall(|| {
        open(
            file,
            redirection.operator.open_flags(),
            Mode::from_bits_truncate(0o666),
        )
    })
    .map_err(|errno| redirect_err!(FailedToOpen: file, errno))?;

    let target = redirection.operator.target_fd();
    let duplicated = syscall(|| dup2(fd, target));
    // The original descriptor is closed whether or not the duplication worked
    let _ = close(fd);
    duplicated.map_err(|errno| redirect_err!(FailedToDuplicate: target, errno))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn redirection(operator: RedirectOperator, file: &str, position: usize) -> Redirection {
        Redirection {
            operator,
            file: file.to_string(),
            position,
        }
    }

    #[test]
    fn operators_from_tokens() {
        assert_eq!(RedirectOperator::from_token("<"), Some(RedirectOperator::Input));
        assert_eq!(RedirectOperator::from_token(">"), Some(RedirectOperator::Output));
        assert_eq!(RedirectOperator::from_token(">>"), Some(RedirectOperator::Append));
        assert_eq!(RedirectOperator::from_token(">>>"), None);
        assert_eq!(RedirectOperator::from_token("2>"), None);
    }

    #[test]
    fn operator_targets() {
        assert_eq!(RedirectOperator::Input.target_fd(), 0);
        assert_eq!(RedirectOperator::Output.target_fd(), 1);
        assert_eq!(RedirectOperator::Append.target_fd(), 1);
        assert!(RedirectOperator::Output.open_flags().contains(OFlag::O_TRUNC));
        assert!(RedirectOperator::Append.open_flags().contains(OFlag::O_APPEND));
        assert!(RedirectOperator::Append.open_flags().contains(OFlag::O_CREAT));
    }

    #[test]
    fn finds_single_redirection() {
        let command = Command::from(vec!["echo", "hello", ">", "f.txt"]);
        assert_eq!(
            scan(&command),
            vec![redirection(RedirectOperator::Output, "f.txt", 2)]
        );
    }

    #[test]
    fn finds_every_redirection() {
        let command = Command::from(vec!["sort", "<", "in.txt", ">>", "out.txt"]);
        assert_eq!(
            scan(&command),
            vec![
                redirection(RedirectOperator::Input, "in.txt", 1),
                redirection(RedirectOperator::Append, "out.txt", 3),
            ]
        );
    }

    #[test]
    fn operator_without_filename_is_ignored() {
        let command = Command::from(vec!["echo", "hi", ">"]);
        assert!(scan(&command).is_empty());
    }

    #[test]
    fn operator_in_program_position_is_ignored() {
        let command = Command::from(vec![">", "f.txt"]);
        assert!(scan(&command).is_empty());
    }

    #[test]
    fn filename_is_never_an_operator() {
        let command = Command::from(vec!["echo", ">", ">", "x"]);
        assert_eq!(
            scan(&command),
            vec![redirection(RedirectOperator::Output, ">", 1)]
        );
    }

    #[test]
    fn nothing_to_apply_leaves_command_untouched() {
        let mut command = Command::from(vec!["echo", "hi", ">"]);
        apply_redirection(&mut command).unwrap();
        assert_eq!(command.args(), ["echo", "hi", ">"]);
    }

    #[test]
    fn unopenable_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        let missing = missing.to_str().unwrap();
        let mut command = Command::from(vec!["cat", "<", missing]);

        let error = apply_redirection(&mut command).unwrap_err();
        assert_eq!(
            error.to_string(),
            format!("{}: No such file or directory", missing)
        );
    }
}
