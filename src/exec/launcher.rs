use nix::errno::Errno;
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::unistd::execvp;

use super::process::{exit_child, fail_child};
use super::redirect::apply_redirection;
use super::Command;
use crate::errors::Result;

/// Replaces the current process image with `command`.
///
/// Redirections are applied first, then the program is looked up through `PATH` and
/// executed with the remaining arguments. Only returns if the command has no program name
/// (`Ok`) or could not be run (`Err`).
fn launch(mut command: Command) -> Result<()> {
    let Some(program) = command.program().map(str::to_owned) else {
        return Ok(());
    };

    apply_redirection(&mut command)?;

    let args = command.to_cstrings()?;
    let Some(filename) = args.first() else {
        return Ok(());
    };

    let errno = match execvp(filename, &args) {
        Ok(never) => match never {},
        Err(errno) => errno,
    };

    Err(match errno {
        Errno::EACCES | Errno::EISDIR => launch_err!(NotExecutable: program),
        _ => launch_err!(CommandNotFound: program),
    })
}

/// Runs `command` in a forked child and never returns.
/// A successful launch replaces the child; a failed one prints one line and exits non-zero,
/// and an empty command exits 0 without doing anything.
pub fn launch_in_child(command: Command, shell_name: &str, color: bool) -> ! {
    // Rust ignores SIGPIPE and ignored signals survive exec, so put the default back
    // SAFETY: restoring the default disposition installs no handler
    let _ = unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) };

    match launch(command) {
        Ok(()) => exit_child(0),
        Err(error) => fail_child(shell_name, &error, color),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{LaunchError, MshError};

    #[test]
    fn empty_command_returns_immediately() {
        assert!(launch(Command::new()).is_ok());
        assert!(launch(Command::from(vec!["", "arg"])).is_ok());
    }

    #[test]
    fn unknown_program_is_not_found() {
        let command = Command::from(vec!["msh-test-no-such-program-x7q"]);
        assert!(matches!(
            launch(command),
            Err(MshError::Launch(LaunchError::CommandNotFound(name)))
                if name == "msh-test-no-such-program-x7q"
        ));
    }

    #[test]
    fn directory_is_not_executable() {
        let dir = tempfile::tempdir().unwrap();
        let name = dir.path().to_str().unwrap();
        let error = launch(Command::from(vec![name])).unwrap_err();
        assert!(matches!(
            error,
            MshError::Launch(LaunchError::NotExecutable(_))
        ));
        assert_eq!(error.to_string(), format!("{}: command not found", name));
        assert_eq!(error.child_exit_code(), 126);
    }
}
