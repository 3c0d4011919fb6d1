use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::RuntimeConfig;
use crate::error::{HardcloneError, Result};
use crate::session::{BackupSession, Encryption, RestoreSession, CHUNK_DIGITS};
use crate::types::{MapperName, Operation, Secret};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Invocation {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl From<&Invocation> for Command {
    fn from(inv: &Invocation) -> Self {
        let mut cmd = Command::new(&inv.program);
        cmd.args(&inv.args);
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv().join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepInput {
    Inherit,
    Secret(Secret),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutput {
    Inherit,
    File(PathBuf),
}

/// One pipeline: every stage's stdout feeds the next stage's stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub stages: Vec<Invocation>,
    pub stdin: StepInput,
    pub stdout: StepOutput,
    /// Runs after the plan finishes, whatever the outcome, once this step succeeded.
    pub undo: Option<Box<Step>>,
}

impl Step {
    pub fn pipeline(stages: Vec<Invocation>) -> Self {
        Step {
            stages,
            stdin: StepInput::Inherit,
            stdout: StepOutput::Inherit,
            undo: None,
        }
    }

    pub fn single(invocation: Invocation) -> Self {
        Step::pipeline(vec![invocation])
    }

    pub fn feeding(mut self, secret: &Secret) -> Self {
        self.stdin = StepInput::Secret(secret.clone());
        self
    }

    pub fn writing_to(mut self, path: &Path) -> Self {
        self.stdout = StepOutput::File(path.to_path_buf());
        self
    }

    pub fn with_undo(mut self, undo: Step) -> Self {
        self.undo = Some(Box::new(undo));
        self
    }

    pub fn argvs(&self) -> Vec<Vec<&str>> {
        self.stages.iter().map(Invocation::argv).collect()
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self
            .stages
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(" | ");
        f.write_str(&line)?;
        if let StepInput::Secret(_) = self.stdin {
            f.write_str(" < <passphrase>")?;
        }
        if let StepOutput::File(path) = &self.stdout {
            write!(f, " > {}", path.display())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Plan {
    pub operation: Operation,
    pub steps: Vec<Step>,
}

fn dd_copy(input: &Path, output: &Path, block_size: &str) -> Invocation {
    Invocation::new("dd")
        .arg(format!("if={}", input.display()))
        .arg(format!("of={}", output.display()))
        .arg(format!("bs={}", block_size))
        .arg("status=progress")
}

fn dd_read(input: &Path, block_size: &str) -> Invocation {
    Invocation::new("dd")
        .arg(format!("if={}", input.display()))
        .arg(format!("bs={}", block_size))
        .arg("status=progress")
}

fn dd_write(output: &Path, block_size: &str) -> Invocation {
    Invocation::new("dd")
        .arg(format!("of={}", output.display()))
        .arg(format!("bs={}", block_size))
        .arg("status=progress")
}

fn mapper_path(mapper: &MapperName) -> PathBuf {
    Path::new("/dev/mapper").join(mapper.as_str())
}

fn luks_open(container: &Path, mapper: &MapperName, secret: &Secret) -> Step {
    Step::single(
        Invocation::new("cryptsetup")
            .arg("luksOpen")
            .arg("--key-file=-")
            .arg(container.display().to_string())
            .arg(mapper.as_str()),
    )
    .feeding(secret)
    .with_undo(Step::single(
        Invocation::new("cryptsetup").arg("luksClose").arg(mapper.as_str()),
    ))
}

/// An encrypted backup goes into a container sized from the partition's exact byte
/// count plus the configured LUKS headroom, so it fails without a known size.
pub fn backup_plan(session: &BackupSession, config: &RuntimeConfig) -> Result<Plan> {
    let bs = config.block_size.as_str();
    let steps = match &session.encryption {
        Encryption::Luks(secret) => {
            let source_bytes = session.source_bytes.ok_or_else(|| {
                HardcloneError::message(format!(
                    "size of {} is unknown; cannot size the encrypted container",
                    session.partition.display()
                ))
            })?;
            let container_bytes = config
                .luks_headroom_bytes()
                .and_then(|headroom| source_bytes.checked_add(headroom))
                .ok_or_else(|| {
                    HardcloneError::message(format!(
                        "encrypted container for {} would exceed {} bytes",
                        session.partition.display(),
                        u64::MAX
                    ))
                })?;
            let mapper = &config.mapper_name;
            vec![
                Step::single(
                    Invocation::new("truncate")
                        .arg("-s")
                        .arg(container_bytes.to_string())
                        .arg(session.output.display().to_string()),
                ),
                Step::single(
                    Invocation::new("cryptsetup")
                        .arg("luksFormat")
                        .arg("-q")
                        .arg("--key-file=-")
                        .arg(session.output.display().to_string()),
                )
                .feeding(secret),
                luks_open(&session.output, mapper, secret),
                Step::single(dd_copy(&session.partition, &mapper_path(mapper), bs)),
            ]
        }
        Encryption::None => {
            let mut stages = Vec::new();
            if session.compress || session.split.is_some() {
                stages.push(dd_read(&session.partition, bs));
                if session.compress {
                    stages.push(Invocation::new("gzip").arg("-c"));
                }
            } else {
                stages.push(dd_copy(&session.partition, &session.output, bs));
            }
            let step = match &session.split {
                Some(size) => {
                    stages.push(
                        Invocation::new("split")
                            .arg("-b")
                            .arg(size.as_str())
                            .arg("-d")
                            .arg("-a")
                            .arg(CHUNK_DIGITS.to_string())
                            .arg("-")
                            .arg(session.chunk_prefix().display().to_string()),
                    );
                    Step::pipeline(stages)
                }
                None if session.compress => Step::pipeline(stages).writing_to(&session.output),
                None => Step::pipeline(stages),
            };
            vec![step]
        }
    };
    Ok(Plan {
        operation: Operation::Backup,
        steps,
    })
}

pub fn restore_plan(session: &RestoreSession, config: &RuntimeConfig) -> Result<Plan> {
    let bs = config.block_size.as_str();
    let steps = match &session.encryption {
        Encryption::Luks(secret) => {
            if !session.layout.chunks.is_empty() {
                return Err(HardcloneError::message(
                    "split encrypted images cannot be restored; join the chunks first",
                ));
            }
            let mapper = &config.mapper_name;
            vec![
                luks_open(&session.source, mapper, secret),
                Step::single(dd_copy(&mapper_path(mapper), &session.partition, bs)),
            ]
        }
        Encryption::None => {
            let mut stages = Vec::new();
            let chunked = !session.layout.chunks.is_empty();
            if chunked {
                let mut cat = Invocation::new("cat");
                for chunk in &session.layout.chunks {
                    cat = cat.arg(chunk.display().to_string());
                }
                stages.push(cat);
            }
            if session.is_compressed() {
                let mut gzip = Invocation::new("gzip").arg("-dc");
                if !chunked {
                    gzip = gzip.arg(session.source.display().to_string());
                }
                stages.push(gzip);
            }
            if stages.is_empty() {
                stages.push(dd_copy(&session.source, &session.partition, bs));
            } else {
                stages.push(dd_write(&session.partition, bs));
            }
            vec![Step::pipeline(stages)]
        }
    };
    Ok(Plan {
        operation: Operation::Restore,
        steps,
    })
}
