pub mod devices;
pub mod wizard;

use crate::error::HardcloneError;

pub fn exit_code(err: &HardcloneError) -> i32 {
    match err {
        HardcloneError::Cancelled => 0,
        HardcloneError::Discovery(_) | HardcloneError::Exec(_) | HardcloneError::NoTerminal => 1,
        _ => 2,
    }
}

/// Discovery failures were already shown to the user; cancels stay silent.
pub fn exit_for_error(err: &HardcloneError) -> ! {
    match err {
        HardcloneError::Cancelled => tracing::debug!("cancelled by user"),
        HardcloneError::Discovery(_) => {}
        _ => println!("{}", err),
    }
    std::process::exit(exit_code(err));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, DiscoveryError, ExecError};

    #[test]
    fn exit_codes() {
        assert_eq!(exit_code(&HardcloneError::Cancelled), 0);
        assert_eq!(exit_code(&DiscoveryError::NoDevices.into()), 1);
        assert_eq!(
            exit_code(&DiscoveryError::NoPartitions("/dev/sda".into()).into()),
            1
        );
        assert_eq!(
            exit_code(
                &ExecError::StepFailed {
                    step: "dd".into(),
                    code: 3
                }
                .into()
            ),
            1
        );
        assert_eq!(exit_code(&HardcloneError::NoTerminal), 1);
        assert_eq!(exit_code(&ConfigError::Parse("bad".into()).into()), 2);
        assert_eq!(exit_code(&HardcloneError::message("boom")), 2);
    }
}
