pub mod backup;
pub mod restore;

use crate::command::Plan;
use crate::config::RuntimeConfig;
use crate::disk::discovery::require_devices;
use crate::disk::partitions::require_partitions;
use crate::disk::{BlockProbe, Partition, StorageDevice};
use crate::error::{HardcloneError, Result};
use crate::executor::Runner;
use crate::types::Operation;
use crate::ui::{Dialog, MenuItem};

/// Turns a dialog reply into a value, or a cancel.
pub fn answered<T>(reply: Option<T>) -> Result<T> {
    reply.ok_or(HardcloneError::Cancelled)
}

/// One linear pass through the backup or restore questions.
///
/// Every step either yields a value or ends the whole run; nothing runs until the
/// summary was confirmed.
pub struct Wizard<'a> {
    pub dialog: &'a mut dyn Dialog,
    pub probe: &'a dyn BlockProbe,
    pub runner: &'a mut dyn Runner,
    pub config: &'a RuntimeConfig,
    pub dry_run: bool,
}

impl<'a> Wizard<'a> {
    pub fn run(&mut self, operation: Option<Operation>) -> Result<()> {
        let operation = match operation {
            Some(operation) => operation,
            None => self.choose_operation()?,
        };
        tracing::debug!(operation = operation.as_str(), "wizard start");
        match operation {
            Operation::Backup => self.backup(),
            Operation::Restore => self.restore(),
        }
    }

    pub fn choose_operation(&mut self) -> Result<Operation> {
        let items = [
            MenuItem::new("backup", "Create an image of a partition"),
            MenuItem::new("restore", "Write an image back to a partition"),
        ];
        let tag = answered(self.dialog.menu("Choose an operation", &items)?)?;
        Operation::parse(&tag).map_err(HardcloneError::message)
    }

    pub fn choose_device(&mut self, prompt: &str) -> Result<StorageDevice> {
        let devices = match require_devices(self.probe) {
            Ok(devices) => devices,
            Err(err) => {
                self.dialog.message(&err.to_string())?;
                return Err(err);
            }
        };
        let items: Vec<MenuItem> = devices
            .iter()
            .map(|d| MenuItem::new(d.name.as_str(), d.description()))
            .collect();
        let tag = answered(self.dialog.menu(prompt, &items)?)?;
        devices
            .into_iter()
            .find(|d| d.name == tag)
            .ok_or_else(|| HardcloneError::message(format!("unknown device {}", tag)))
    }

    pub fn choose_partition(&mut self, device: &StorageDevice, prompt: &str) -> Result<Partition> {
        let partitions = match require_partitions(self.probe, &device.path()) {
            Ok(partitions) => partitions,
            Err(err) => {
                self.dialog.message(&err.to_string())?;
                return Err(err);
            }
        };
        let items: Vec<MenuItem> = partitions
            .iter()
            .map(|p| MenuItem::new(p.name.as_str(), p.description()))
            .collect();
        let tag = answered(self.dialog.menu(prompt, &items)?)?;
        partitions
            .into_iter()
            .find(|p| p.name == tag)
            .ok_or_else(|| HardcloneError::message(format!("unknown partition {}", tag)))
    }

    /// Shows the recap and asks for the go-ahead. Declining is a cancel.
    pub fn confirm(&mut self, operation: Operation, recap: &str, warnings: &[String]) -> Result<()> {
        let mut text = format!("{} summary\n\n{}", operation.title(), recap);
        for warning in warnings {
            text.push_str(&format!("\nWARNING: {}", warning));
        }
        self.dialog.message(&text)?;
        let prompt = format!("Start the {}?", operation.as_str());
        match answered(self.dialog.yes_no(&prompt)?)? {
            true => Ok(()),
            false => Err(HardcloneError::Cancelled),
        }
    }

    pub fn execute(&mut self, plan: &Plan) -> Result<()> {
        let title = plan.operation.title();
        match self.runner.run(plan) {
            Ok(()) if self.dry_run => {
                self.dialog.message("Dry run: nothing was executed.")?;
                Ok(())
            }
            Ok(()) => {
                tracing::info!(operation = plan.operation.as_str(), "finished");
                self.dialog.message(&format!("{} finished successfully!", title))?;
                Ok(())
            }
            Err(err) => {
                self.dialog.message(&format!("ERROR: {} failed!", title))?;
                Err(err)
            }
        }
    }
}

/// Mount warning for a partition about to be read or overwritten.
fn mounted_warning(partition: &Partition, action: &str) -> Option<String> {
    partition.mount_point.as_ref().map(|mount| {
        format!(
            "{} is mounted at {}; {}",
            partition.path().display(),
            mount.display(),
            action
        )
    })
}
