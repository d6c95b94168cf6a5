use std::os::unix::io::RawFd;

use nix::libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::unistd::{close, dup2, pipe, ForkResult, Pid};

use super::launcher::launch_in_child;
use super::process::{exit_child, fail_child, fork_process, report_error, syscall, wait_for};
use super::{Command, ParseResult};
use crate::errors::Result;

/// An anonymous pipe connecting one stage's stdout to the next stage's stdin.
/// Each end is closed at most once; whatever is still open when the link is dropped gets
/// closed then.
#[derive(Debug)]
pub struct PipelineLink {
    read: Option<RawFd>,
    write: Option<RawFd>,
}

impl PipelineLink {
    pub fn open() -> Result<Self> {
        let (read, write) = syscall(pipe).map_err(|errno| launch_err!(PipeFailed: errno))?;
        Ok(Self {
            read: Some(read),
            write: Some(write),
        })
    }

    #[cfg(test)]
    fn read_fd(&self) -> Option<RawFd> {
        self.read
    }

    #[cfg(test)]
    fn write_fd(&self) -> Option<RawFd> {
        self.write
    }

    pub fn close_read(&mut self) {
        if let Some(fd) = self.read.take() {
            let _ = close(fd);
        }
    }

    pub fn close_write(&mut self) {
        if let Some(fd) = self.write.take() {
            let _ = close(fd);
        }
    }

    /// Makes the read end this process's stdin, leaving no raw descriptor behind
    fn attach_read_to_stdin(&mut self) -> Result<()> {
        let attached = duplicate_onto(self.read, STDIN_FILENO);
        self.close_read();
        attached
    }

    /// Makes the write end this process's stdout, leaving no raw descriptor behind
    fn attach_write_to_stdout(&mut self) -> Result<()> {
        let attached = duplicate_onto(self.write, STDOUT_FILENO);
        self.close_write();
        attached
    }
}

impl Drop for PipelineLink {
    fn drop(&mut self) {
        self.close_read();
        self.close_write();
    }
}

fn duplicate_onto(fd: Option<RawFd>, target: RawFd) -> Result<()> {
    if let Some(fd) = fd {
        syscall(|| dup2(fd, target))
            .map_err(|errno| redirect_err!(FailedToDuplicate: target, errno))?;
    }

    Ok(())
}

/// Links indexed by stage: link `i` carries data from stage `i` to stage `i + 1`.
/// A link is only opened right before its writing stage is forked, so at any moment the
/// supervisor holds at most the read end of the previous link plus the current pair.
struct LinkArena {
    links: Vec<PipelineLink>,
}

impl LinkArena {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            links: Vec::with_capacity(capacity),
        }
    }

    fn open_for(&mut self, stage: usize) -> Result<()> {
        debug_assert_eq!(self.links.len(), stage, "links must be opened in stage order");
        self.links.push(PipelineLink::open()?);
        Ok(())
    }

    fn incoming(&mut self, stage: usize) -> Option<&mut PipelineLink> {
        stage.checked_sub(1).and_then(|i| self.links.get_mut(i))
    }

    fn outgoing(&mut self, stage: usize) -> Option<&mut PipelineLink> {
        self.links.get_mut(stage)
    }
}

/// Runs every stage of `pipeline` in its own process, each connected to the next by a pipe.
///
/// A pipeline-owner process is forked first so the shell's own descriptors are never
/// touched; the owner starts the stages left to right, then reaps them in the same order
/// and exits with the status of the last one. Returns the owner's process ID, which the
/// caller either waits for or leaves running in the background.
pub fn run_pipeline(pipeline: &ParseResult, shell_name: &str, color: bool) -> Result<Pid> {
    match fork_process()? {
        ForkResult::Parent { child } => {
            log::debug!(
                "forked pipeline owner {} for {} stages",
                child,
                pipeline.stages().len()
            );
            Ok(child)
        }
        ForkResult::Child => {
            let status = supervise(pipeline.stages(), shell_name, color);
            exit_child(status)
        }
    }
}

// Runs inside the pipeline owner
fn supervise(stages: &[Command], shell_name: &str, color: bool) -> i32 {
    let mut arena = LinkArena::with_capacity(stages.len().saturating_sub(1));
    let mut workers = Vec::with_capacity(stages.len());
    let mut failure = None;

    for (index, stage) in stages.iter().enumerate() {
        let is_last = index + 1 == stages.len();
        match start_stage(&mut arena, index, is_last, stage, shell_name, color) {
            Ok(worker) => workers.push(worker),
            Err(error) => {
                failure = Some(error);
                break;
            }
        }
    }

    // Anything still open would keep a reader waiting for input that never comes
    drop(arena);

    // Stages already run concurrently, waiting only decides the order they are reaped in
    let mut status = 0;
    for worker in workers {
        status = wait_for(worker).unwrap_or(1);
    }

    match failure {
        Some(error) => {
            report_error(shell_name, &error, color);
            1
        }
        None => status,
    }
}

fn start_stage(
    arena: &mut LinkArena,
    index: usize,
    is_last: bool,
    stage: &Command,
    shell_name: &str,
    color: bool,
) -> Result<Pid> {
    if !is_last {
        arena.open_for(index)?;
    }

    match fork_process()? {
        ForkResult::Child => {
            if let Err(error) = connect_worker(arena, index) {
                fail_child(shell_name, &error, color);
            }

            launch_in_child(stage.clone(), shell_name, color)
        }
        ForkResult::Parent { child } => {
            // The worker owns these ends now
            if let Some(incoming) = arena.incoming(index) {
                incoming.close_read();
            }
            if let Some(outgoing) = arena.outgoing(index) {
                outgoing.close_write();
            }

            Ok(child)
        }
    }
}

// Runs inside a freshly forked worker: stdin from the previous link, stdout into the next
fn connect_worker(arena: &mut LinkArena, index: usize) -> Result<()> {
    if let Some(incoming) = arena.incoming(index) {
        incoming.close_write();
        incoming.attach_read_to_stdin()?;
    }

    if let Some(outgoing) = arena.outgoing(index) {
        outgoing.close_read();
        outgoing.attach_write_to_stdout()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use nix::unistd::{read, write};

    use super::*;

    #[test]
    fn link_carries_bytes_until_writer_closes() {
        let mut link = PipelineLink::open().unwrap();
        let (read_fd, write_fd) = (link.read_fd().unwrap(), link.write_fd().unwrap());
        assert_ne!(read_fd, write_fd);

        assert_eq!(write(write_fd, b"hello").unwrap(), 5);
        link.close_write();
        assert_eq!(link.write_fd(), None);

        let mut buffer = [0u8; 16];
        let count = read(read_fd, &mut buffer).unwrap();
        assert_eq!(&buffer[..count], b"hello");
        // With the only writer gone the reader sees end-of-stream instead of blocking
        assert_eq!(read(read_fd, &mut buffer).unwrap(), 0);
    }

    #[test]
    fn closing_twice_is_harmless() {
        let mut link = PipelineLink::open().unwrap();
        link.close_read();
        link.close_read();
        link.close_write();
        link.close_write();
        assert_eq!(link.read_fd(), None);
        assert_eq!(link.write_fd(), None);
    }

    #[test]
    fn arena_links_are_indexed_by_stage() {
        let mut arena = LinkArena::with_capacity(2);
        arena.open_for(0).unwrap();
        arena.open_for(1).unwrap();

        assert!(arena.incoming(0).is_none());
        let first_write = arena.outgoing(0).and_then(|l| l.write_fd());
        let second_read = arena.incoming(1).and_then(|l| l.write_fd());
        assert_eq!(first_write, second_read);
        assert!(arena.outgoing(2).is_none());
    }
}
