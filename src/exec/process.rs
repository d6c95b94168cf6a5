use std::io::{stderr, stdout, IsTerminal, Write};

use crossterm::style::Stylize;
use nix::errno::Errno;
use nix::libc;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{fork, ForkResult, Pid};

use crate::errors::{MshError, Result};

/// Retries a system call for as long as it is interrupted by a signal
pub fn syscall<F, T>(mut f: F) -> nix::Result<T>
where
    F: FnMut() -> nix::Result<T>,
{
    loop {
        match f() {
            Err(Errno::EINTR) => (),
            result => return result,
        }
    }
}

/// Forks the current process.
/// Buffered output is flushed first so the child does not inherit and re-print it.
pub fn fork_process() -> Result<ForkResult> {
    let _ = stdout().flush();
    // SAFETY: the shell is single-threaded, and every child either execs or exits
    // through `exit_child` without returning into the read-eval loop
    syscall(|| unsafe { fork() }).map_err(|errno| launch_err!(ForkFailed: errno))
}

/// Blocks until `pid` terminates and returns its exit status.
/// A process killed by a signal reports 128 plus the signal number, the way shells do.
pub fn wait_for(pid: Pid) -> Result<i32> {
    loop {
        let status =
            syscall(|| waitpid(pid, None)).map_err(|errno| launch_err!(WaitFailed: errno))?;

        match status {
            WaitStatus::Exited(_, code) => return Ok(code),
            WaitStatus::Signaled(_, signal, _) => return Ok(128 + signal as i32),
            // Stopped or continued children are still alive, keep waiting
            _ => continue,
        }
    }
}

/// Terminates a forked child immediately, skipping the exit handlers inherited from the shell
pub fn exit_child(code: i32) -> ! {
    let _ = stdout().flush();
    // SAFETY: `_exit` has no preconditions
    unsafe { libc::_exit(code) }
}

/// Prints an error for the user, prefixed with the shell name.
/// Colour is only used when stderr is a terminal.
pub fn report_error(shell_name: &str, error: &MshError, color: bool) {
    let message = format!("{}: {}", shell_name, error);
    if color && stderr().is_terminal() {
        eprintln!("{}", message.red().bold());
    } else {
        eprintln!("{}", message);
    }
}

/// Reports an error from inside a forked child and terminates it with a matching status
pub fn fail_child(shell_name: &str, error: &MshError, color: bool) -> ! {
    report_error(shell_name, error, color);
    exit_child(error.child_exit_code())
}
