use std::io::{stdin, IsTerminal};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use msh::errors::MshError;
use msh::eval::{Dispatcher, LineEditor, LineSource, PipedInput};
use msh::exec::report_error;
use msh::logging;
use msh::state::{banner, Configuration, ShellState, DEFAULT_CONFIG_PATH};

/// mSH, the miniature shell
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Path of the configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Run a single line and exit
    #[arg(short = 'c', long)]
    command: Option<String>,
    /// Do not print the welcome banner
    #[arg(long)]
    no_banner: bool,
    /// File to write log records to
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Log level: off, error, warn, info, debug or trace
    #[arg(long, value_parser = parse_level)]
    log_level: Option<LevelFilter>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_configuration(&cli);
    logging::init(config.log_file.as_deref(), config.log_level)?;

    // The ShellState type stores everything that outlives a single line: the configuration,
    // the background jobs and whether the user has asked to leave
    let mut shell = ShellState::new(config);
    // The Dispatcher type is responsible for turning a line into builtin calls or processes
    let dispatcher = Dispatcher::new();

    if let Some(line) = &cli.command {
        let status = dispatcher.eval(&mut shell, line);
        handle_error(status, &shell);
        return Ok(());
    }

    let interactive = stdin().is_terminal();
    let mut input: Box<dyn LineSource> = match interactive {
        true => Box::new(LineEditor::new(shell.config.history_file.clone())?),
        false => Box::new(PipedInput::stdin()),
    };

    if interactive && shell.config.show_banner {
        println!("{}", banner());
    }

    while !shell.should_exit {
        let prompt = match interactive {
            true => shell.generate_prompt(),
            false => String::new(),
        };

        let Some(line) = input.read_line(&prompt) else {
            break;
        };

        let status = dispatcher.eval(&mut shell, &line);
        handle_error(status, &shell);
    }

    log::info!("shell exiting");
    Ok(())
}

// Reads the configuration file, then lets command-line flags override it
fn load_configuration(cli: &Cli) -> Configuration {
    let mut config = match Configuration::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}; using the default configuration", e);
            Configuration::default()
        }
    };

    if cli.no_banner {
        config.show_banner = false;
    }

    if let Some(path) = &cli.log_file {
        config.log_file = Some(path.clone());
    }

    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    config
}

fn parse_level(value: &str) -> std::result::Result<LevelFilter, String> {
    value
        .parse::<LevelFilter>()
        .map_err(|_| format!("invalid log level '{}'", value))
}

// Prints an appropriate error message for the given error, if applicable
fn handle_error(status: std::result::Result<(), MshError>, shell: &ShellState) {
    if let Err(e) = status {
        log::warn!("command failed: {}", e);
        report_error(&shell.config.shell_name, &e, shell.config.color);
    }
}
