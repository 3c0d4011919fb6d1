use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HardcloneError {
    #[error("{0}")]
    Message(String),
    #[error("cancelled by user")]
    Cancelled,
    #[error("an interactive terminal is required; run hardclone from a console")]
    NoTerminal,
    #[error("{0}")]
    Discovery(DiscoveryError),
    #[error("{0}")]
    Exec(ExecError),
    #[error("{0}")]
    Config(ConfigError),
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("dialog: {0}")]
    Dialog(#[from] dialoguer::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("parse config: {0}")]
    Parse(String),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("No storage devices found!")]
    NoDevices,
    #[error("No partitions found on device {0}!")]
    NoPartitions(String),
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("{program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{step} failed with exit code {code}")]
    StepFailed { step: String, code: i32 },
    #[error("interrupted while running {0}")]
    Interrupted(String),
}

pub type Result<T> = std::result::Result<T, HardcloneError>;

impl HardcloneError {
    pub fn message(msg: impl Into<String>) -> Self {
        HardcloneError::Message(msg.into())
    }
}

impl From<DiscoveryError> for HardcloneError {
    fn from(err: DiscoveryError) -> Self {
        HardcloneError::Discovery(err)
    }
}

impl From<ExecError> for HardcloneError {
    fn from(err: ExecError) -> Self {
        HardcloneError::Exec(err)
    }
}

impl From<ConfigError> for HardcloneError {
    fn from(err: ConfigError) -> Self {
        HardcloneError::Config(err)
    }
}
