use std::path::{Path, PathBuf};

use crate::disk::fs_type::FsType;
use crate::disk::lsblk::{parse_partition_rows, partition_number};
use crate::disk::{mount_point_of, BlockProbe, Partition, UNKNOWN_SIZE};
use crate::error::{DiscoveryError, Result};
use crate::util::paths::{base_name, device_path};
use crate::util::size::format_size;

/// Partitions of `device`, never including the device's own whole-disk row.
pub fn list_partitions(probe: &dyn BlockProbe, device: &Path) -> Vec<Partition> {
    let from_lsblk = match probe.partition_listing(device) {
        Ok(output) => partitions_from_listing(&output, device),
        Err(err) => {
            tracing::debug!(device = %device.display(), error = %err, "lsblk partition listing failed");
            Vec::new()
        }
    };
    if !from_lsblk.is_empty() {
        return from_lsblk;
    }
    partitions_from_dev_nodes(probe, device)
}

pub fn require_partitions(probe: &dyn BlockProbe, device: &Path) -> Result<Vec<Partition>> {
    let partitions = list_partitions(probe, device);
    if partitions.is_empty() {
        return Err(DiscoveryError::NoPartitions(device.display().to_string()).into());
    }
    Ok(partitions)
}

fn partitions_from_listing(output: &str, device: &Path) -> Vec<Partition> {
    let device_base = base_name(device);
    parse_partition_rows(output)
        .into_iter()
        .filter_map(|row| {
            let name = base_name(Path::new(&row.name));
            if name == device_base {
                return None;
            }
            Some(Partition {
                name,
                size: row.size,
                fs_type: FsType::from_str(row.fs_type.as_deref().unwrap_or_default()),
                mount_point: row.mount_point.map(PathBuf::from),
            })
        })
        .collect()
}

fn partitions_from_dev_nodes(probe: &dyn BlockProbe, device: &Path) -> Vec<Partition> {
    let device_base = base_name(device);
    let names = match probe.dev_names() {
        Ok(names) => names,
        Err(err) => {
            tracing::debug!(error = %err, "listing /dev failed");
            return Vec::new();
        }
    };
    let mut numbered: Vec<(u32, String)> = names
        .into_iter()
        .filter_map(|name| partition_number(&device_base, &name).map(|n| (n, name)))
        .collect();
    numbered.sort();

    numbered
        .into_iter()
        .map(|(_, name)| {
            let path = device_path(&name);
            let size = probe
                .size_bytes(&path)
                .map(format_size)
                .unwrap_or_else(|_| UNKNOWN_SIZE.to_string());
            let fs_type = probe
                .fs_type(&path)
                .map(|t| FsType::from_str(&t))
                .unwrap_or(FsType::Unknown);
            let mount_point = mount_point_of(probe, &path);
            Partition {
                name,
                size,
                fs_type,
                mount_point,
            }
        })
        .collect()
}
