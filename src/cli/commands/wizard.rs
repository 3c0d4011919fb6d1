use std::io::{self, IsTerminal};

use crate::config::RuntimeConfig;
use crate::disk::HostProbe;
use crate::error::{HardcloneError, Result};
use crate::executor::HostRunner;
use crate::types::{Operation, RunMode};
use crate::ui::TerminalDialog;
use crate::wizard::Wizard;

pub fn require_terminal() -> Result<()> {
    if io::stdin().is_terminal() && io::stdout().is_terminal() {
        Ok(())
    } else {
        Err(HardcloneError::NoTerminal)
    }
}

pub fn run_wizard(
    operation: Option<Operation>,
    config: &RuntimeConfig,
    run_mode: RunMode,
    version: &str,
) -> Result<()> {
    require_terminal()?;
    let probe = HostProbe;
    let mut dialog = TerminalDialog::new(format!("HardClone {}", version));
    let mut runner = HostRunner::new(run_mode);
    let mut wizard = Wizard {
        dialog: &mut dialog,
        probe: &probe,
        runner: &mut runner,
        config,
        dry_run: run_mode.dry_run,
    };
    wizard.run(operation)
}
