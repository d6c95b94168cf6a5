//! mSH, the miniature shell.
//!
//! Turns lines of user input into running processes: single commands, pipelines connected
//! by anonymous pipes, `<`/`>`/`>>` redirection and `&` background jobs, plus the `cd`,
//! `exit` and `help` builtins.

#[macro_use]
pub mod errors;
pub mod eval;
pub mod exec;
pub mod logging;
pub mod state;
