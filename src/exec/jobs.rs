use std::fmt::{Display, Formatter};

use chrono::{DateTime, Local};
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use super::process::syscall;

/// A process the shell started without waiting for it
#[derive(Debug, Clone)]
pub struct BackgroundJob {
    pub pid: Pid,
    pub command: String,
    pub started: DateTime<Local>,
}

impl Display for BackgroundJob {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} (started {})",
            self.pid,
            self.command,
            self.started.format("%H:%M:%S")
        )
    }
}

/// How a background job ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Exited(i32),
    Signaled(i32),
    /// The process was already reaped elsewhere
    Vanished,
}

/// Registry of background jobs which have not been reaped yet.
/// There is no job control; the registry only exists so finished jobs do not linger as
/// zombies and so their completion can be logged.
#[derive(Debug, Default)]
pub struct BackgroundJobs {
    jobs: Vec<BackgroundJob>,
}

impl BackgroundJobs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, pid: Pid, command: impl Into<String>) {
        let job = BackgroundJob {
            pid,
            command: command.into(),
            started: Local::now(),
        };

        log::info!("started background job {}", job);
        self.jobs.push(job);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &BackgroundJob> {
        self.jobs.iter()
    }

    /// Reaps every job that has finished, without blocking on the ones still running
    pub fn reap_finished(&mut self) -> Vec<(BackgroundJob, JobOutcome)> {
        let mut finished = Vec::new();
        let mut still_running = Vec::with_capacity(self.jobs.len());

        for job in self.jobs.drain(..) {
            match poll(job.pid) {
                Some(outcome) => {
                    log::info!("background job {} finished: {:?}", job, outcome);
                    finished.push((job, outcome));
                }
                None => still_running.push(job),
            }
        }

        self.jobs = still_running;
        finished
    }
}

fn poll(pid: Pid) -> Option<JobOutcome> {
    match syscall(|| waitpid(pid, Some(WaitPidFlag::WNOHANG))) {
        Ok(WaitStatus::Exited(_, code)) => Some(JobOutcome::Exited(code)),
        Ok(WaitStatus::Signaled(_, signal, _)) => Some(JobOutcome::Signaled(signal as i32)),
        Ok(_) => None,
        Err(Errno::ECHILD) => Some(JobOutcome::Vanished),
        Err(errno) => {
            log::error!("failed to poll background job {}: {}", pid, errno.desc());
            None
        }
    }
}
