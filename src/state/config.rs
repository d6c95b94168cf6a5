use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

use fs_err::File;
use log::LevelFilter;

use crate::errors::{Handle, Result};

/// Default location of the configuration file, relative to where the shell is started
pub const DEFAULT_CONFIG_PATH: &str = "./config/config.msh";

// Represents any settings for the shell, most of which can be configured by the user
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    // The name substituted for `$0` and used to prefix error messages
    pub shell_name: String,
    // How long to pause before printing the process ID of a background job
    pub background_delay: Duration,
    // Where to persist line history, if anywhere
    pub history_file: Option<PathBuf>,
    // Whether to print the welcome banner in interactive sessions
    pub show_banner: bool,
    // Whether error messages may be colored (only ever applied on a terminal)
    pub color: bool,
    /// File to write log records to; no logger is installed without one
    pub log_file: Option<PathBuf>,
    pub log_level: LevelFilter,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            shell_name: String::from("msh"),
            background_delay: Duration::ZERO,
            history_file: None,
            show_banner: true,
            color: true,
            log_file: None,
            log_level: LevelFilter::Warn,
        }
    }
}

impl Configuration {
    // Scans a configuration file for settings and updates the configuration accordingly
    pub fn from_file(filename: impl AsRef<Path>) -> Result<Self> {
        let filename = filename.as_ref().to_path_buf();
        let file = File::open(&filename)
            .replace_err(|| state_err!(FailedToOpenConfigFile: filename.clone()))?;

        Self::from_reader(BufReader::new(file), &filename)
    }

    /// Loads the configuration if the file exists, falling back to the defaults if it does not.
    /// A file which exists but cannot be parsed is still an error.
    pub fn load_or_default(filename: impl AsRef<Path>) -> Result<Self> {
        if filename.as_ref().exists() {
            Self::from_file(filename)
        } else {
            Ok(Self::default())
        }
    }

    fn from_reader(reader: impl BufRead, filename: &Path) -> Result<Self> {
        // Relative paths inside the file are resolved against the file's own directory
        let dirname = filename.parent().unwrap_or(Path::new("."));
        let mut config = Self::default();

        for line in reader.lines() {
            let line =
                line.replace_err(|| state_err!(FailedToReadConfigFile: filename.to_path_buf()))?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once(": ") else {
                return Err(state_err!(FailedToReadConfigFile: filename.to_path_buf()));
            };

            let (key, value) = (key.trim(), value.trim());
            match key {
                "shell-name" => config.shell_name = value.to_owned(),
                "background-delay" => {
                    let millis = value
                        .parse::<u64>()
                        .replace_err(|| state_err!(InvalidConfigValue: key, value))?;
                    config.background_delay = Duration::from_millis(millis);
                }
                "history-file" => config.history_file = optional_path(dirname, value),
                "show-banner" => config.show_banner = parse_bool(key, value)?,
                "color" => config.color = parse_bool(key, value)?,
                "log-file" => config.log_file = optional_path(dirname, value),
                "log-level" => {
                    config.log_level = value
                        .parse::<LevelFilter>()
                        .replace_err(|| state_err!(InvalidConfigValue: key, value))?;
                }
                _ => return Err(state_err!(FailedToReadConfigFile: filename.to_path_buf())),
            }
        }

        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    value
        .parse::<bool>()
        .replace_err(|| state_err!(InvalidConfigValue: key, value))
}

// "false" disables a path setting, anything else is taken as a path
fn optional_path(dirname: &Path, value: &str) -> Option<PathBuf> {
    match value {
        "false" | "" => None,
        _ => Some(dirname.join(value)),
    }
}
