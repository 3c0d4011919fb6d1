use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Cli, Command};
use crate::cli::commands::{devices, exit_for_error, wizard};
use crate::config::load_config;
use crate::disk::HostProbe;
use crate::types::RunMode;
use crate::util::paths::read_version_file;

const LICENSE_NAME: &str = "GNU GPL v3 or later";

pub mod args;
pub mod commands;
pub mod elevate;

pub fn run() -> Result<()> {
    let cli = parse_cli();
    init_tracing(cli.verbose);
    let version = read_version_file();

    if cli.version {
        print_banner(&version);
        println!("License: {}", LICENSE_NAME);
        return Ok(());
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => exit_for_error(&err),
    };
    if cli.print_config {
        print!("{}", serde_yaml::to_string(&config.to_config())?);
        return Ok(());
    }

    if !elevate::is_root() {
        match elevate::restart_with_sudo() {
            Ok(code) => std::process::exit(code),
            Err(err) => exit_for_error(&err),
        }
    }

    print_banner(&version);
    let run_mode = RunMode {
        dry_run: cli.dry_run,
        verbose: cli.verbose,
    };
    let result = match cli.command {
        Some(Command::Devices) => devices::run_devices(&HostProbe),
        other => wizard::run_wizard(
            other.and_then(|command| command.operation()),
            &config,
            run_mode,
            &version,
        ),
    };
    if let Err(err) = result {
        exit_for_error(&err);
    }
    Ok(())
}

fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                print!("{}", err);
                std::process::exit(0);
            }
            println!("{}", err);
            std::process::exit(2);
        }
    }
}

fn print_banner(version: &str) {
    println!("HardClone {}", version);
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
