use std::fs::File;
use std::io::Write;
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};

use crate::command::{Plan, Step, StepInput, StepOutput};
use crate::error::{ExecError, HardcloneError, Result};
use crate::signal_handler::SignalWatcher;
use crate::types::RunMode;

/// Runs assembled plans.
pub trait Runner {
    fn run(&mut self, plan: &Plan) -> Result<()>;
}

#[derive(Debug, Clone, Copy)]
pub struct HostRunner {
    run_mode: RunMode,
}

impl HostRunner {
    pub fn new(run_mode: RunMode) -> Self {
        HostRunner { run_mode }
    }
}

impl Runner for HostRunner {
    fn run(&mut self, plan: &Plan) -> Result<()> {
        if self.run_mode.dry_run {
            for step in &plan.steps {
                println!("{}", step);
            }
            for undo in plan.steps.iter().rev().filter_map(|s| s.undo.as_deref()) {
                println!("{}", undo);
            }
            return Ok(());
        }

        let watcher = SignalWatcher::install()?;
        let mut undo_stack: Vec<&Step> = Vec::new();
        let mut result = Ok(());
        for step in &plan.steps {
            if self.run_mode.verbose {
                println!("{}", step);
            }
            tracing::info!(operation = plan.operation.as_str(), step = %step, "running");
            match run_step(step, || watcher.interrupted()) {
                Ok(()) => {
                    if let Some(undo) = step.undo.as_deref() {
                        undo_stack.push(undo);
                    }
                }
                Err(err) => {
                    tracing::error!(step = %step, error = %err, "step failed");
                    result = Err(err);
                    break;
                }
            }
        }
        for undo in undo_stack.into_iter().rev() {
            if self.run_mode.verbose {
                println!("{}", undo);
            }
            if let Err(err) = run_step(undo, || false) {
                tracing::warn!(step = %undo, error = %err, "cleanup failed");
            }
        }
        result
    }
}

fn spawn_error(program: &str, source: std::io::Error) -> HardcloneError {
    ExecError::Spawn {
        program: program.to_string(),
        source,
    }
    .into()
}

fn abandon(children: Vec<(String, Child)>) {
    for (_, mut child) in children {
        let _ = child.kill();
        let _ = child.wait();
    }
}

/// Consumes every wait result before reporting.
/// Returns the first failing stage's exit code, or the first wait error.
fn reap(
    waited: impl Iterator<Item = (String, std::io::Result<ExitStatus>)>,
) -> Result<Option<i32>> {
    let mut failure: Option<i32> = None;
    let mut wait_error = None;
    for (program, status) in waited {
        let status = match status {
            Ok(status) => status,
            Err(err) => {
                tracing::debug!(program = %program, error = %err, "wait failed");
                if wait_error.is_none() {
                    wait_error = Some(spawn_error(&program, err));
                }
                continue;
            }
        };
        if !status.success() {
            tracing::debug!(program = %program, code = ?status.code(), "stage failed");
            if failure.is_none() {
                failure = Some(status.code().unwrap_or(1));
            }
        }
    }
    match wait_error {
        Some(err) => Err(err),
        None => Ok(failure),
    }
}

/// Runs one pipeline. It succeeds only when every stage exits 0.
pub fn run_step(step: &Step, interrupted: impl Fn() -> bool) -> Result<()> {
    if step.stages.is_empty() {
        return Ok(());
    }
    let last = step.stages.len() - 1;
    let mut children: Vec<(String, Child)> = Vec::new();
    let mut previous: Option<ChildStdout> = None;

    for (idx, stage) in step.stages.iter().enumerate() {
        let mut cmd: Command = stage.into();
        if let Some(out) = previous.take() {
            cmd.stdin(Stdio::from(out));
        } else if let StepInput::Secret(_) = step.stdin {
            cmd.stdin(Stdio::piped());
        }
        if idx < last {
            cmd.stdout(Stdio::piped());
        } else if let StepOutput::File(path) = &step.stdout {
            let file = match File::create(path) {
                Ok(file) => file,
                Err(err) => {
                    abandon(children);
                    return Err(HardcloneError::message(format!(
                        "create {}: {}",
                        path.display(),
                        err
                    )));
                }
            };
            cmd.stdout(Stdio::from(file));
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                abandon(children);
                return Err(spawn_error(&stage.program, err));
            }
        };
        if idx == 0 {
            if let StepInput::Secret(secret) = &step.stdin {
                if let Some(mut stdin) = child.stdin.take() {
                    if let Err(err) = stdin.write_all(secret.expose().as_bytes()) {
                        tracing::debug!(program = %stage.program, error = %err, "writing passphrase failed");
                    }
                }
            }
        }
        if idx < last {
            previous = child.stdout.take();
        }
        children.push((stage.program.clone(), child));
    }

    let waited = children.into_iter().map(|(program, mut child)| {
        let status = child.wait();
        (program, status)
    });
    let failure = reap(waited)?;
    match failure {
        None => Ok(()),
        Some(_) if interrupted() => Err(ExecError::Interrupted(step.to_string()).into()),
        Some(code) => Err(ExecError::StepFailed {
            step: step.to_string(),
            code,
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Invocation;
    use crate::types::{Operation, Secret};
    use std::fs;
    use tempfile::TempDir;

    fn sh(script: &str) -> Invocation {
        Invocation::new("sh").arg("-c").arg(script)
    }

    fn plan(steps: Vec<Step>) -> Plan {
        Plan {
            operation: Operation::Backup,
            steps,
        }
    }

    #[test]
    fn pipeline_output_redirected_to_file() {
        let dir = TempDir::new().expect("tempdir");
        let out = dir.path().join("out.txt");
        let step = Step::pipeline(vec![
            Invocation::new("echo").arg("hello"),
            Invocation::new("tr").arg("a-z").arg("A-Z"),
        ])
        .writing_to(&out);
        run_step(&step, || false).expect("run");
        assert_eq!(fs::read_to_string(&out).unwrap(), "HELLO\n");
    }

    #[test]
    fn secret_is_fed_on_stdin() {
        let dir = TempDir::new().expect("tempdir");
        let out = dir.path().join("key");
        let secret = Secret::new("pa ss").unwrap();
        let step = Step::single(Invocation::new("cat")).feeding(&secret).writing_to(&out);
        run_step(&step, || false).expect("run");
        assert_eq!(fs::read_to_string(&out).unwrap(), "pa ss");
    }

    #[test]
    fn any_failing_stage_fails_the_step() {
        let step = Step::pipeline(vec![sh("exit 3"), Invocation::new("cat")]);
        let err = run_step(&step, || false).unwrap_err();
        assert!(matches!(
            err,
            HardcloneError::Exec(ExecError::StepFailed { code: 3, .. })
        ));
        let step = Step::single(Invocation::new("false"));
        let err = run_step(&step, || true).unwrap_err();
        assert!(matches!(err, HardcloneError::Exec(ExecError::Interrupted(_))));
    }

    #[test]
    fn wait_error_still_reaps_remaining_stages() {
        use std::cell::Cell;
        use std::io;
        use std::os::unix::process::ExitStatusExt;

        let reaped = Cell::new(0);
        let results = vec![
            ("dd".to_string(), Err(io::Error::new(io::ErrorKind::Other, "wait"))),
            ("gzip".to_string(), Ok(ExitStatus::from_raw(2 << 8))),
            ("split".to_string(), Ok(ExitStatus::from_raw(0))),
        ];
        let waited = results.into_iter().inspect(|_| reaped.set(reaped.get() + 1));
        let err = reap(waited).unwrap_err();
        assert_eq!(reaped.get(), 3);
        assert!(matches!(
            err,
            HardcloneError::Exec(ExecError::Spawn { ref program, .. }) if program == "dd"
        ));

        let ok = vec![
            ("cat".to_string(), Ok(ExitStatus::from_raw(0))),
            ("dd".to_string(), Ok(ExitStatus::from_raw(1 << 8))),
        ];
        assert_eq!(reap(ok.into_iter()).expect("reap"), Some(1));
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let step = Step::single(Invocation::new("hardclone-no-such-tool"));
        assert!(matches!(
            run_step(&step, || false),
            Err(HardcloneError::Exec(ExecError::Spawn { .. }))
        ));
    }

    #[test]
    fn undo_runs_after_later_failure() {
        let dir = TempDir::new().expect("tempdir");
        let marker = dir.path().join("undone");
        let later = dir.path().join("later");
        let undo = sh(&format!("echo undone > {}", marker.display()));
        let mut runner = HostRunner::new(RunMode::default());
        let result = runner.run(&plan(vec![
            Step::single(Invocation::new("true")).with_undo(Step::single(undo)),
            Step::single(Invocation::new("false")),
            Step::single(sh(&format!("touch {}", later.display()))),
        ]));
        assert!(result.is_err());
        assert!(marker.exists());
        assert!(!later.exists());
    }

    #[test]
    fn dry_run_executes_nothing() {
        let dir = TempDir::new().expect("tempdir");
        let marker = dir.path().join("touched");
        let mut runner = HostRunner::new(RunMode {
            dry_run: true,
            verbose: false,
        });
        runner
            .run(&plan(vec![Step::single(sh(&format!("touch {}", marker.display())))]))
            .expect("dry run");
        assert!(!marker.exists());
    }
}
