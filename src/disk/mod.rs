pub mod discovery;
pub mod fs_type;
pub mod lsblk;
pub mod partitions;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::disk::fs_type::FsType;
use crate::error::{HardcloneError, Result};
use crate::util::command::command_output;
use crate::util::paths::{device_path, free_space_for, list_dev_names, DEV_DIR};

pub const UNKNOWN_MODEL: &str = "Unknown model";
pub const UNKNOWN_SIZE: &str = "Unknown size";
pub const NOT_MOUNTED: &str = "not mounted";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageDevice {
    pub name: String,
    pub size: String,
    pub model: String,
}

impl StorageDevice {
    pub fn path(&self) -> PathBuf {
        device_path(&self.name)
    }

    pub fn description(&self) -> String {
        format!("{} | {}", self.size, self.model)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub name: String,
    pub size: String,
    pub fs_type: FsType,
    pub mount_point: Option<PathBuf>,
}

impl Partition {
    pub fn path(&self) -> PathBuf {
        device_path(&self.name)
    }

    pub fn description(&self) -> String {
        let mount = self
            .mount_point
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| NOT_MOUNTED.to_string());
        format!("{} | {} | {}", self.size, self.fs_type, mount)
    }
}

/// Typed queries against the host's block-device tools.
///
/// Each method is one tool invocation; callers decide which failures matter.
pub trait BlockProbe {
    /// `lsblk -d -o NAME,SIZE,MODEL,TYPE --noheadings`
    fn disk_listing(&self) -> Result<String>;
    /// `lsblk -o NAME,SIZE,MODEL,TYPE,PKNAME --noheadings`
    fn block_tree(&self) -> Result<String>;
    fn proc_partitions(&self) -> Result<String>;
    /// Entry names under `/dev`.
    fn dev_names(&self) -> Result<Vec<String>>;
    /// `blockdev --getsize64 <device>`
    fn size_bytes(&self, device: &Path) -> Result<u64>;
    /// `lsblk -d -n -o MODEL <device>`
    fn model(&self, device: &Path) -> Result<String>;
    /// `lsblk -n -r <device> -o NAME,SIZE,FSTYPE,MOUNTPOINT`
    fn partition_listing(&self, device: &Path) -> Result<String>;
    /// `blkid -o value -s TYPE <device>`
    fn fs_type(&self, device: &Path) -> Result<String>;
    /// `findmnt -n -o TARGET <device>`
    fn mount_point(&self, device: &Path) -> Result<String>;
    /// Free bytes on the filesystem that would hold `path`.
    fn free_space(&self, path: &Path) -> Result<u64>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HostProbe;

impl BlockProbe for HostProbe {
    fn disk_listing(&self) -> Result<String> {
        let mut cmd = Command::new("lsblk");
        cmd.arg("-d")
            .arg("-o")
            .arg("NAME,SIZE,MODEL,TYPE")
            .arg("--noheadings");
        command_output(&mut cmd)
    }

    fn block_tree(&self) -> Result<String> {
        let mut cmd = Command::new("lsblk");
        cmd.arg("-o")
            .arg("NAME,SIZE,MODEL,TYPE,PKNAME")
            .arg("--noheadings");
        command_output(&mut cmd)
    }

    fn proc_partitions(&self) -> Result<String> {
        fs::read_to_string("/proc/partitions")
            .map_err(|e| HardcloneError::message(format!("read /proc/partitions: {}", e)))
    }

    fn dev_names(&self) -> Result<Vec<String>> {
        list_dev_names(Path::new(DEV_DIR))
    }

    fn size_bytes(&self, device: &Path) -> Result<u64> {
        let mut cmd = Command::new("blockdev");
        cmd.arg("--getsize64").arg(device);
        let text = command_output(&mut cmd)?;
        text.trim().parse::<u64>().map_err(|e| {
            HardcloneError::message(format!("blockdev {}: bad size {:?}: {}", device.display(), text, e))
        })
    }

    fn model(&self, device: &Path) -> Result<String> {
        let mut cmd = Command::new("lsblk");
        cmd.arg("-d").arg("-n").arg("-o").arg("MODEL").arg(device);
        Ok(command_output(&mut cmd)?.trim().to_string())
    }

    fn partition_listing(&self, device: &Path) -> Result<String> {
        let mut cmd = Command::new("lsblk");
        cmd.arg("-n")
            .arg("-r")
            .arg(device)
            .arg("-o")
            .arg("NAME,SIZE,FSTYPE,MOUNTPOINT");
        command_output(&mut cmd)
    }

    fn fs_type(&self, device: &Path) -> Result<String> {
        let mut cmd = Command::new("blkid");
        cmd.arg("-o").arg("value").arg("-s").arg("TYPE").arg(device);
        Ok(command_output(&mut cmd)?.trim().to_string())
    }

    fn mount_point(&self, device: &Path) -> Result<String> {
        let mut cmd = Command::new("findmnt");
        cmd.arg("-n").arg("-o").arg("TARGET").arg(device);
        Ok(command_output(&mut cmd)?.trim().to_string())
    }

    fn free_space(&self, path: &Path) -> Result<u64> {
        free_space_for(path)
    }
}

/// Current mount point of a block device, if any. Lookup failures count as unmounted.
pub fn mount_point_of(probe: &dyn BlockProbe, device: &Path) -> Option<PathBuf> {
    probe
        .mount_point(device)
        .ok()
        .map(|text| text.lines().next().unwrap_or_default().trim().to_string())
        .filter(|text| !text.is_empty())
        .map(PathBuf::from)
}
