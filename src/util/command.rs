use std::process::{Command, Stdio};

use crate::error::{HardcloneError, Result};

pub fn describe_command(cmd: &Command) -> String {
    let program = cmd.get_program().to_string_lossy();
    let args: Vec<String> = cmd
        .get_args()
        .map(|a| a.to_string_lossy().to_string())
        .collect();
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

/// Runs a query command and returns its trimmed stdout. Non-zero exit is an error.
pub fn command_output(cmd: &mut Command) -> Result<String> {
    let line = describe_command(cmd);
    tracing::trace!(command = %line, "query");
    let output = cmd
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| HardcloneError::message(format!("{}: {}", line, e)))?;
    if !output.status.success() {
        return Err(HardcloneError::message(format!(
            "{} failed with exit code {}",
            line,
            output.status.code().unwrap_or(1)
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_joins_program_and_args() {
        let mut cmd = Command::new("blockdev");
        cmd.arg("--getsize64").arg("/dev/sda1");
        assert_eq!(describe_command(&cmd), "blockdev --getsize64 /dev/sda1");
        assert_eq!(describe_command(&Command::new("sync")), "sync");
    }

    #[test]
    fn output_of_failing_command_is_error() {
        let mut cmd = Command::new("false");
        assert!(command_output(&mut cmd).is_err());
    }

    #[test]
    fn output_is_trimmed() {
        let mut cmd = Command::new("echo");
        cmd.arg("value");
        assert_eq!(command_output(&mut cmd).unwrap(), "value");
    }
}
