use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{HardcloneError, Result};

pub const DEV_DIR: &str = "/dev";

pub fn device_path(name: &str) -> PathBuf {
    if name.starts_with("/dev/") {
        PathBuf::from(name)
    } else {
        Path::new(DEV_DIR).join(name)
    }
}

pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Appends `suffix` (including its dot) unless the file name already ends with it.
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let text = path.to_string_lossy();
    if text.ends_with(suffix) {
        path.to_path_buf()
    } else {
        PathBuf::from(format!("{}{}", text, suffix))
    }
}

/// Free bytes available to unprivileged writers of the filesystem holding `path`'s
/// parent directory.
pub fn free_space_for(path: &Path) -> Result<u64> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let stat = nix::sys::statvfs::statvfs(dir)
        .map_err(|e| HardcloneError::message(format!("statvfs {}: {}", dir.display(), e)))?;
    Ok(stat.blocks_available() as u64 * stat.fragment_size() as u64)
}

pub fn list_dev_names(dir: &Path) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)
        .map_err(|e| HardcloneError::message(format!("read {}: {}", dir.display(), e)))?
    {
        let entry = entry
            .map_err(|e| HardcloneError::message(format!("read {}: {}", dir.display(), e)))?;
        out.push(entry.file_name().to_string_lossy().to_string());
    }
    out.sort();
    Ok(out)
}

/// Contents of a `VERSION` file next to the running executable, or `unknown`.
pub fn read_version_file() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("VERSION")))
        .map(|path| version_from(&path))
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn version_from(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => "unknown".to_string(),
    }
}
