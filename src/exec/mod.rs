mod builtins;
mod command;
mod jobs;
mod launcher;
mod pipeline;
mod process;
mod redirect;

pub use builtins::Builtin;
pub use command::{Command, ParseResult};
pub use jobs::{BackgroundJob, BackgroundJobs, JobOutcome};
pub use launcher::launch_in_child;
pub use pipeline::run_pipeline;
pub use process::{fork_process, report_error, wait_for};
