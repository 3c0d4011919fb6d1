use std::env;
use std::process::Command;

use nix::unistd::geteuid;

use crate::error::{ExecError, HardcloneError, Result};

pub fn is_root() -> bool {
    geteuid().is_root()
}

/// `sudo <this executable> <original arguments>`
pub fn sudo_command() -> Result<Command> {
    let exe = env::current_exe()
        .map_err(|e| HardcloneError::message(format!("locate executable: {}", e)))?;
    let mut cmd = Command::new("sudo");
    cmd.arg(exe).args(env::args_os().skip(1));
    Ok(cmd)
}

/// Re-runs the program under sudo and returns its exit status.
pub fn restart_with_sudo() -> Result<i32> {
    println!("Restarting with sudo...");
    let mut cmd = sudo_command()?;
    tracing::debug!(command = ?cmd, "elevating");
    let status = cmd.status().map_err(|source| ExecError::Spawn {
        program: "sudo".to_string(),
        source,
    })?;
    Ok(status.code().unwrap_or(1))
}
