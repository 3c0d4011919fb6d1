use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::types::Operation;

#[derive(Parser, Debug)]
#[command(
    name = "hardclone",
    about = "Back up and restore partitions as raw images",
    disable_version_flag = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Print the commands instead of running them
    #[arg(long, global = true)]
    pub dry_run: bool,
    /// Print each command before it runs and log at debug level
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Print the effective configuration and exit
    #[arg(long, global = true)]
    pub print_config: bool,

    #[arg(long)]
    pub version: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Image a partition to a file
    Backup,
    /// Write an image file back to a partition
    Restore,
    /// List storage devices and their partitions
    Devices,
}

impl Command {
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Command::Backup => Some(Operation::Backup),
            Command::Restore => Some(Operation::Restore),
            Command::Devices => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommand_and_globals() {
        let cli = Cli::try_parse_from(["hardclone", "restore", "--dry-run", "-v"]).unwrap();
        assert_eq!(cli.command, Some(Command::Restore));
        assert!(cli.dry_run && cli.verbose);
        assert_eq!(cli.command.and_then(|c| c.operation()), Some(Operation::Restore));
    }

    #[test]
    fn no_subcommand_means_menu() {
        let cli = Cli::try_parse_from(["hardclone", "--config", "/tmp/h.yaml"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/h.yaml")));
    }

    #[test]
    fn rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["hardclone", "verify"]).is_err());
    }
}
