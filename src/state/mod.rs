mod config;
mod environment;
mod shell;

pub use config::{Configuration, DEFAULT_CONFIG_PATH};
pub use environment::{home_directory, EnvVariable, LineFlags, ShellEnvironment};
pub use shell::{banner, ShellState};
