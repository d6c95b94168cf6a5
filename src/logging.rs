use std::path::Path;

use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};

use crate::errors::{Handle, Result};

/// Installs a file logger.
/// The terminal belongs to the user and the programs they run, so log records only ever go
/// to a file; without one no logger is installed and every log call is a no-op.
pub fn init(log_file: Option<&Path>, level: LevelFilter) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    if level == LevelFilter::Off {
        return Ok(());
    }

    let file = fs_err::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| state_err!(FailedToInitializeLogger: e.to_string()))?;

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(LevelFilter::Off)
        .build();

    WriteLogger::init(level, config, file)
        .replace_err(|| state_err!(FailedToInitializeLogger: "a logger is already installed"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_log_file_installs_nothing() {
        assert!(init(None, LevelFilter::Debug).is_ok());
    }

    #[test]
    fn off_level_does_not_create_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("msh.log");
        assert!(init(Some(&path), LevelFilter::Off).is_ok());
        assert!(!path.exists());
    }
}
