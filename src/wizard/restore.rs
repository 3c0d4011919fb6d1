use std::fs;
use std::path::PathBuf;

use crate::command::restore_plan;
use crate::disk::Partition;
use crate::error::{HardcloneError, Result};
use crate::session::{detect_layout, Encryption, RestoreSession};
use crate::types::Operation;
use crate::util::size::format_size;
use crate::wizard::{answered, mounted_warning, Wizard};

impl<'a> Wizard<'a> {
    pub fn restore(&mut self) -> Result<()> {
        let source = self.ask_restore_file()?;
        let layout = detect_layout(&source)?;
        if layout.encrypted && !layout.chunks.is_empty() {
            let text = "Split encrypted images cannot be restored; join the chunks first.";
            self.dialog.message(text)?;
            return Err(HardcloneError::message(text));
        }
        let device = self.choose_device("Select the device to restore to")?;
        let partition = self.choose_partition(&device, "Select the partition to overwrite")?;
        let encryption = if layout.encrypted {
            let secret = answered(self.dialog.password("Password of the encrypted image", false)?)?;
            Encryption::Luks(secret)
        } else {
            Encryption::None
        };

        let session = RestoreSession {
            source,
            layout,
            device: device.path(),
            partition: partition.path(),
            encryption,
        };
        let warnings = self.restore_warnings(&session, &partition);
        self.confirm(Operation::Restore, &session.recap(), &warnings)?;

        let plan = restore_plan(&session, self.config)?;
        self.execute(&plan)
    }

    fn ask_restore_file(&mut self) -> Result<PathBuf> {
        loop {
            let path = answered(
                self.dialog
                    .path("Image file to restore", &self.config.browse_root)?,
            )?;
            if path.is_file() {
                return Ok(path);
            }
            self.dialog
                .message(&format!("File not found: {}", path.display()))?;
        }
    }

    fn restore_warnings(&self, session: &RestoreSession, partition: &Partition) -> Vec<String> {
        let mut warnings = Vec::new();
        warnings.extend(mounted_warning(
            partition,
            "it will be overwritten while in use",
        ));
        if session.encryption.is_enabled() || session.is_compressed() {
            return warnings;
        }
        let files = if session.layout.chunks.is_empty() {
            vec![session.source.clone()]
        } else {
            session.layout.chunks.clone()
        };
        let image_bytes: Option<u64> = files
            .iter()
            .map(|file| fs::metadata(file).ok().map(|meta| meta.len()))
            .sum();
        let target_bytes = match self.probe.size_bytes(&session.partition) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                tracing::debug!(error = %err, "target size unknown");
                None
            }
        };
        if let (Some(image), Some(target)) = (image_bytes, target_bytes) {
            if image > target {
                warnings.push(format!(
                    "the image ({}) is larger than {} ({})",
                    format_size(image),
                    session.partition.display(),
                    format_size(target)
                ));
            }
        }
        warnings
    }
}
