use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::command::backup_plan;
use crate::disk::Partition;
use crate::error::Result;
use crate::session::{BackupSession, Encryption};
use crate::types::Operation;
use crate::util::size::{format_size, parse_size_spec};
use crate::wizard::{answered, mounted_warning, Wizard};

/// `<partition>-YYYYMMDD-HHMM.img`
pub fn suggested_name(partition: &str, at: NaiveDateTime) -> String {
    format!("{}-{}.img", partition, at.format("%Y%m%d-%H%M"))
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

impl<'a> Wizard<'a> {
    pub fn backup(&mut self) -> Result<()> {
        let device = self.choose_device("Select the device to back up")?;
        let partition = self.choose_partition(&device, "Select the partition to back up")?;
        let output = self.ask_output(&partition)?;
        let encryption = self.ask_encryption()?;
        let (compress, split) = if encryption.is_enabled() {
            self.dialog
                .message("Compression and splitting are not available for encrypted backups.")?;
            (false, None)
        } else {
            let compress = answered(self.dialog.yes_no("Compress the image with gzip?")?)?;
            (compress, self.ask_split()?)
        };

        let source_bytes = match self.probe.size_bytes(&partition.path()) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                tracing::debug!(partition = %partition.name, error = %err, "partition size unknown");
                None
            }
        };
        let session = BackupSession {
            device: device.path(),
            partition: partition.path(),
            output: BackupSession::normalize_output(&output, encryption.is_enabled(), compress),
            encryption,
            compress,
            split,
            source_bytes,
        };
        let warnings = self.backup_warnings(&session, &partition);
        self.confirm(Operation::Backup, &session.recap(), &warnings)?;

        let plan = backup_plan(&session, self.config)?;
        self.execute(&plan)
    }

    fn ask_output(&mut self, partition: &Partition) -> Result<PathBuf> {
        let name = suggested_name(&partition.name, Local::now().naive_local());
        let suggested = self.config.browse_root.join(&name);
        loop {
            let path = answered(self.dialog.path("Output file for the image", &suggested)?)?;
            let path = if path.is_dir() { path.join(&name) } else { path };
            if parent_dir(&path).is_dir() {
                return Ok(path);
            }
            self.dialog.message(&format!(
                "Directory {} does not exist.",
                parent_dir(&path).display()
            ))?;
        }
    }

    /// The flag is only set together with its password.
    fn ask_encryption(&mut self) -> Result<Encryption> {
        if !answered(self.dialog.yes_no("Encrypt the image with LUKS?")?)? {
            return Ok(Encryption::None);
        }
        let secret = answered(self.dialog.password("Encryption password", true)?)?;
        Ok(Encryption::Luks(secret))
    }

    fn ask_split(&mut self) -> Result<Option<String>> {
        if !answered(self.dialog.yes_no("Split the image into chunks?")?)? {
            return Ok(None);
        }
        loop {
            let text = answered(
                self.dialog
                    .text("Chunk size (e.g. 700M, 4G)", &self.config.split_size)?,
            )?;
            match parse_size_spec(&text) {
                Ok(size) => return Ok(Some(size)),
                Err(err) => self.dialog.message(&format!("Invalid chunk size: {}", err))?,
            }
        }
    }

    fn backup_warnings(&self, session: &BackupSession, partition: &Partition) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(bytes) = session.source_bytes {
            match self.probe.free_space(&session.output) {
                Ok(free) if bytes > free => warnings.push(format!(
                    "the partition ({}) is larger than the free space in {} ({})",
                    format_size(bytes),
                    parent_dir(&session.output).display(),
                    format_size(free)
                )),
                Ok(_) => {}
                Err(err) => tracing::debug!(error = %err, "free space unknown"),
            }
        }
        warnings.extend(mounted_warning(partition, "the image may be inconsistent"));
        warnings
    }
}
