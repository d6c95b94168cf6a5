use std::thread::sleep;

use nix::unistd::{ForkResult, Pid};

use super::tokenizer::tokenize;
use crate::errors::Result;
use crate::exec::{fork_process, launch_in_child, run_pipeline, wait_for, Builtin, ParseResult};
use crate::state::ShellState;

/// Turns lines of input into running processes.
/// Builtins run in the shell itself; everything else is forked, either as a single child or
/// as a pipeline, and then waited for unless the line asked to run in the background.
#[derive(Debug, Default)]
pub struct Dispatcher;

impl Dispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Evaluates and executes one line of input
    pub fn eval(&self, shell: &mut ShellState, line: &str) -> Result<()> {
        for (job, outcome) in shell.jobs.reap_finished() {
            log::debug!("reaped {} ({:?})", job, outcome);
        }

        shell.line.reset();
        let Some(parsed) = tokenize(line, &shell.config.shell_name, &mut shell.line) else {
            return Ok(());
        };

        log::debug!("parsed '{}' ({})", parsed, shell.line);
        if parsed.is_noop() {
            return Ok(());
        }

        if let Some(first) = parsed.first() {
            if let Some(builtin) = first.program().and_then(Builtin::resolve) {
                return builtin.run(shell, first.args());
            }
        }

        let pid = match shell.line.piping() {
            true => run_pipeline(&parsed, &shell.config.shell_name, shell.config.color)?,
            false => self.spawn_single(shell, &parsed)?,
        };

        self.finish(shell, pid, &parsed)
    }

    /// Forks one child for a line without pipes
    fn spawn_single(&self, shell: &ShellState, parsed: &ParseResult) -> Result<Pid> {
        let command = parsed.first().cloned().unwrap_or_default();

        match fork_process()? {
            ForkResult::Parent { child } => {
                log::debug!("forked {} for '{}'", child, command);
                Ok(child)
            }
            ForkResult::Child => {
                launch_in_child(command, &shell.config.shell_name, shell.config.color)
            }
        }
    }

    /// Waits for a foreground job, or reports and registers a background one
    fn finish(&self, shell: &mut ShellState, pid: Pid, parsed: &ParseResult) -> Result<()> {
        if !shell.line.background() {
            let status = wait_for(pid)?;
            log::debug!("{} exited with status {}", pid, status);
            return Ok(());
        }

        if !shell.config.background_delay.is_zero() {
            sleep(shell.config.background_delay);
        }

        println!("{}", pid);
        shell.jobs.register(pid, parsed.to_string());
        Ok(())
    }
}
