use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{HardcloneError, Result};
use crate::types::Secret;
use crate::util::paths::with_suffix;

pub const LUKS_SUFFIX: &str = ".luks";
pub const GZIP_SUFFIX: &str = ".gz";
/// `split` writes `<output>.part000`, `<output>.part001`, ...
pub const CHUNK_MARKER: &str = ".part";
pub const CHUNK_DIGITS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encryption {
    None,
    Luks(Secret),
}

impl Encryption {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Encryption::Luks(_))
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

#[derive(Debug, Clone)]
pub struct BackupSession {
    pub device: PathBuf,
    pub partition: PathBuf,
    pub output: PathBuf,
    pub encryption: Encryption,
    pub compress: bool,
    /// Chunk size for `split -b`, when the image is split.
    pub split: Option<String>,
    /// Exact partition size, when blockdev could report it.
    pub source_bytes: Option<u64>,
}

impl BackupSession {
    /// The file actually written: `.luks` for encrypted images, `.gz` for compressed ones.
    pub fn normalize_output(output: &Path, encrypted: bool, compress: bool) -> PathBuf {
        if encrypted {
            with_suffix(output, LUKS_SUFFIX)
        } else if compress {
            with_suffix(output, GZIP_SUFFIX)
        } else {
            output.to_path_buf()
        }
    }

    /// Name prefix handed to `split`.
    pub fn chunk_prefix(&self) -> PathBuf {
        PathBuf::from(format!("{}{}", self.output.display(), CHUNK_MARKER))
    }

    pub fn recap(&self) -> String {
        let mut text = format!(
            "Device: {}\nPartition: {}\nOutput path: {}\n",
            self.device.display(),
            self.partition.display(),
            self.output.display()
        );
        text.push_str(&format!("Encryption: {}\n", yes_no(self.encryption.is_enabled())));
        if self.encryption.is_enabled() {
            text.push_str("Compression: No (not available with encryption)\n");
        } else {
            text.push_str(&format!("Compression: {}\n", yes_no(self.compress)));
            if let Some(size) = &self.split {
                text.push_str(&format!(
                    "Split: {} chunks ({}{}000, ...)\n",
                    size,
                    self.output.display(),
                    CHUNK_MARKER
                ));
            }
        }
        text
    }
}

/// How a restore image is stored, derived from its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLayout {
    pub encrypted: bool,
    pub compressed: bool,
    /// All chunks in order when the image is split; empty for a single file.
    pub chunks: Vec<PathBuf>,
}

/// Splits `name` into `(prefix, digits)` when it ends in `.part<digits>`.
fn chunk_name(name: &str) -> Option<(&str, &str)> {
    let idx = name.rfind(CHUNK_MARKER)?;
    let digits = &name[idx + CHUNK_MARKER.len()..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((&name[..idx], digits))
}

pub fn detect_layout(file: &Path) -> Result<ImageLayout> {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| HardcloneError::message(format!("{} is not a file", file.display())))?;

    let (stem, chunks) = match chunk_name(&name) {
        Some((prefix, _)) => {
            let dir = match file.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            let mut chunks = Vec::new();
            for entry in fs::read_dir(&dir)
                .map_err(|e| HardcloneError::message(format!("read {}: {}", dir.display(), e)))?
            {
                let entry = entry
                    .map_err(|e| HardcloneError::message(format!("read {}: {}", dir.display(), e)))?;
                let entry_name = entry.file_name().to_string_lossy().to_string();
                if matches!(chunk_name(&entry_name), Some((p, _)) if p == prefix) {
                    chunks.push(dir.join(entry_name));
                }
            }
            chunks.sort();
            (prefix.to_string(), chunks)
        }
        None => (name.clone(), Vec::new()),
    };

    Ok(ImageLayout {
        encrypted: stem.ends_with(LUKS_SUFFIX),
        compressed: stem.ends_with(GZIP_SUFFIX),
        chunks,
    })
}

#[derive(Debug, Clone)]
pub struct RestoreSession {
    pub source: PathBuf,
    pub layout: ImageLayout,
    pub device: PathBuf,
    pub partition: PathBuf,
    pub encryption: Encryption,
}

impl RestoreSession {
    pub fn is_compressed(&self) -> bool {
        self.layout.compressed
    }

    pub fn recap(&self) -> String {
        let mut text = format!(
            "Restore file: {}\nDevice: {}\nPartition: {}\n",
            self.source.display(),
            self.device.display(),
            self.partition.display()
        );
        text.push_str(&format!("Encrypted: {}\n", yes_no(self.encryption.is_enabled())));
        text.push_str(&format!("Compressed: {}\n", yes_no(self.is_compressed())));
        if !self.layout.chunks.is_empty() {
            text.push_str(&format!("Chunks: {}\n", self.layout.chunks.len()));
        }
        text
    }
}
