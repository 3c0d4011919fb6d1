use std::collections::HashSet;

use crate::disk::lsblk::{
    disk_node_rank, is_excluded_name, parse_block_rows, parse_proc_partitions,
};
use crate::disk::{BlockProbe, StorageDevice, UNKNOWN_MODEL};
use crate::error::{DiscoveryError, Result};
use crate::util::paths::device_path;
use crate::util::size::format_size;

/// One way of finding whole-disk devices. Strategies are tried in order until one
/// yields something.
pub trait DiscoveryStrategy {
    fn name(&self) -> &'static str;
    fn discover(&self, probe: &dyn BlockProbe) -> Result<Vec<StorageDevice>>;
}

/// `lsblk -d`: top-level devices of type disk.
pub struct LsblkDisks;

/// Full `lsblk` tree: disks without a parent.
pub struct LsblkTree;

/// `/proc/partitions` names with sizes and models queried per device.
pub struct ProcPartitions;

/// `/dev` entries matching the well-known whole-disk name patterns.
pub struct DevNodes;

impl DiscoveryStrategy for LsblkDisks {
    fn name(&self) -> &'static str {
        "lsblk-disks"
    }

    fn discover(&self, probe: &dyn BlockProbe) -> Result<Vec<StorageDevice>> {
        let output = probe.disk_listing()?;
        Ok(parse_block_rows(&output)
            .into_iter()
            .filter(|row| row.kind == "disk")
            .map(|row| StorageDevice {
                name: row.name,
                size: row.size,
                model: row.model.unwrap_or_else(|| UNKNOWN_MODEL.to_string()),
            })
            .collect())
    }
}

impl DiscoveryStrategy for LsblkTree {
    fn name(&self) -> &'static str {
        "lsblk-tree"
    }

    fn discover(&self, probe: &dyn BlockProbe) -> Result<Vec<StorageDevice>> {
        let output = probe.block_tree()?;
        Ok(parse_block_rows(&output)
            .into_iter()
            .filter(|row| row.kind == "disk" && row.parent.is_none())
            .map(|row| StorageDevice {
                name: row.name,
                size: row.size,
                model: row.model.unwrap_or_else(|| UNKNOWN_MODEL.to_string()),
            })
            .collect())
    }
}

impl DiscoveryStrategy for ProcPartitions {
    fn name(&self) -> &'static str {
        "proc-partitions"
    }

    fn discover(&self, probe: &dyn BlockProbe) -> Result<Vec<StorageDevice>> {
        let contents = probe.proc_partitions()?;
        let mut devices = Vec::new();
        for name in parse_proc_partitions(&contents) {
            let path = device_path(&name);
            let bytes = match probe.size_bytes(&path) {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::debug!(device = %path.display(), error = %err, "size query failed; skipping");
                    continue;
                }
            };
            let model = probe
                .model(&path)
                .ok()
                .filter(|m| !m.is_empty() && m != "-")
                .unwrap_or_else(|| UNKNOWN_MODEL.to_string());
            devices.push(StorageDevice {
                name,
                size: format_size(bytes),
                model,
            });
        }
        Ok(devices)
    }
}

impl DiscoveryStrategy for DevNodes {
    fn name(&self) -> &'static str {
        "dev-nodes"
    }

    fn discover(&self, probe: &dyn BlockProbe) -> Result<Vec<StorageDevice>> {
        let mut candidates: Vec<(u8, String)> = probe
            .dev_names()?
            .into_iter()
            .filter_map(|name| disk_node_rank(&name).map(|rank| (rank, name)))
            .collect();
        candidates.sort();
        let mut devices = Vec::new();
        for (_, name) in candidates {
            let path = device_path(&name);
            match probe.size_bytes(&path) {
                Ok(bytes) => devices.push(StorageDevice {
                    name,
                    size: format_size(bytes),
                    model: UNKNOWN_MODEL.to_string(),
                }),
                Err(err) => {
                    tracing::debug!(device = %path.display(), error = %err, "size query failed; skipping");
                }
            }
        }
        Ok(devices)
    }
}

pub fn default_strategies() -> Vec<Box<dyn DiscoveryStrategy>> {
    vec![
        Box::new(LsblkDisks),
        Box::new(LsblkTree),
        Box::new(ProcPartitions),
        Box::new(DevNodes),
    ]
}

/// Ordered, name-unique device list that refuses excluded names.
#[derive(Debug, Default)]
pub struct DeviceList {
    devices: Vec<StorageDevice>,
    seen: HashSet<String>,
}

impl DeviceList {
    pub fn push(&mut self, device: StorageDevice) -> bool {
        if device.name.is_empty() || is_excluded_name(&device.name) {
            return false;
        }
        if !self.seen.insert(device.name.clone()) {
            return false;
        }
        self.devices.push(device);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn into_vec(self) -> Vec<StorageDevice> {
        self.devices
    }
}

pub fn discover_with(
    probe: &dyn BlockProbe,
    strategies: &[Box<dyn DiscoveryStrategy>],
) -> Vec<StorageDevice> {
    let mut list = DeviceList::default();
    for strategy in strategies {
        if !list.is_empty() {
            break;
        }
        match strategy.discover(probe) {
            Ok(devices) => {
                let added = devices.into_iter().filter(|d| list.push(d.clone())).count();
                tracing::debug!(strategy = strategy.name(), added, "device discovery");
            }
            Err(err) => {
                tracing::debug!(strategy = strategy.name(), error = %err, "device discovery failed");
            }
        }
    }
    list.into_vec()
}

pub fn list_devices(probe: &dyn BlockProbe) -> Vec<StorageDevice> {
    discover_with(probe, &default_strategies())
}

pub fn require_devices(probe: &dyn BlockProbe) -> Result<Vec<StorageDevice>> {
    let devices = list_devices(probe);
    if devices.is_empty() {
        return Err(DiscoveryError::NoDevices.into());
    }
    Ok(devices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::fake::FakeProbe;
    use crate::error::HardcloneError;

    fn names(devices: &[StorageDevice]) -> Vec<&str> {
        devices.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn lsblk_disks_skip_loop_devices() {
        let probe = FakeProbe {
            disk_listing: Some("sda 20G ModelX disk\nloop0 100M  loop\n".to_string()),
            ..Default::default()
        };
        let devices = list_devices(&probe);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "sda");
        assert_eq!(devices[0].description(), "20G | ModelX");
    }

    #[test]
    fn first_strategy_short_circuits() {
        let probe = FakeProbe {
            disk_listing: Some("sda 20G ModelX disk\n".to_string()),
            block_tree: Some("sdb 40G ModelY disk\n".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&list_devices(&probe)), vec!["sda"]);
    }

    #[test]
    fn duplicates_keep_first_seen_order() {
        let probe = FakeProbe {
            disk_listing: Some(
                "sdb 40G ModelY disk\nsda 20G ModelX disk\nsdb 40G Other disk\n".to_string(),
            ),
            ..Default::default()
        };
        let devices = list_devices(&probe);
        assert_eq!(names(&devices), vec!["sdb", "sda"]);
        assert_eq!(devices[0].model, "ModelY");
    }

    #[test]
    fn tree_fallback_when_disk_listing_fails() {
        let probe = FakeProbe {
            block_tree: Some(
                "sda 20G ModelX disk\n├─sda1 10G  part sda\nsr0 1G DVD rom\nloop1 5M  disk\n"
                    .to_string(),
            ),
            ..Default::default()
        };
        assert_eq!(names(&list_devices(&probe)), vec!["sda"]);
    }

    #[test]
    fn proc_partitions_fallback_queries_size_and_model() {
        let mut probe = FakeProbe {
            disk_listing: Some(String::new()),
            block_tree: Some(String::new()),
            proc_partitions: Some(
                "major minor #blocks name\n\n 8 0 100 sda\n 8 1 50 sda1\n 8 16 100 sdb\n 252 0 10 vdc\n"
                    .to_string(),
            ),
            ..Default::default()
        }
        .with_size("/dev/sda", 21_474_836_480)
        .with_size("/dev/vdc", 1_073_741_824);
        probe
            .models
            .insert("/dev/sda".into(), "ModelX".to_string());
        probe.models.insert("/dev/vdc".into(), "-".to_string());
        let devices = list_devices(&probe);
        assert_eq!(names(&devices), vec!["sda", "vdc"]);
        assert_eq!(devices[0].description(), "20.0 GB | ModelX");
        assert_eq!(devices[1].model, UNKNOWN_MODEL);
    }

    #[test]
    fn dev_nodes_last_resort_in_pattern_order() {
        let probe = FakeProbe {
            dev_names: vec![
                "vda".to_string(),
                "sdb".to_string(),
                "nvme0n1".to_string(),
                "nvme0n1p1".to_string(),
                "sda".to_string(),
                "sda1".to_string(),
                "loop0".to_string(),
                "hdz".to_string(),
            ],
            ..Default::default()
        }
        .with_size("/dev/sda", 1 << 30)
        .with_size("/dev/sdb", 1 << 30)
        .with_size("/dev/nvme0n1", 1 << 40)
        .with_size("/dev/vda", 1 << 20);
        let devices = list_devices(&probe);
        assert_eq!(names(&devices), vec!["sda", "sdb", "nvme0n1", "vda"]);
        assert_eq!(devices[2].size, "1.0 TB");
    }

    struct Canned(&'static str, Vec<&'static str>);

    impl DiscoveryStrategy for Canned {
        fn name(&self) -> &'static str {
            self.0
        }

        fn discover(&self, _probe: &dyn BlockProbe) -> Result<Vec<StorageDevice>> {
            Ok(self
                .1
                .iter()
                .map(|name| StorageDevice {
                    name: name.to_string(),
                    size: "1G".to_string(),
                    model: self.0.to_string(),
                })
                .collect())
        }
    }

    #[test]
    fn excluded_names_never_listed_from_any_strategy() {
        let strategies: Vec<Box<dyn DiscoveryStrategy>> = vec![
            Box::new(Canned("a", vec!["loop0", "ram0", "rom1", "dm-0", "sr0"])),
            Box::new(Canned("b", vec!["dm-1", "sdc", "sr1", "sdc"])),
        ];
        let devices = discover_with(&FakeProbe::default(), &strategies);
        assert_eq!(names(&devices), vec!["sdc"]);
        assert_eq!(devices[0].model, "b");
    }

    #[test]
    fn no_devices_is_an_error() {
        let err = require_devices(&FakeProbe::default()).unwrap_err();
        assert!(matches!(err, HardcloneError::Discovery(DiscoveryError::NoDevices)));
    }
}
