use std::io::{self, Write};

use crate::disk::discovery::require_devices;
use crate::disk::partitions::list_partitions;
use crate::disk::BlockProbe;
use crate::error::Result;

pub fn run_devices(probe: &dyn BlockProbe) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_devices(probe, &mut out)
}

pub fn write_devices(probe: &dyn BlockProbe, out: &mut dyn Write) -> Result<()> {
    let devices = match require_devices(probe) {
        Ok(devices) => devices,
        Err(err) => {
            writeln!(out, "{}", err)?;
            return Err(err);
        }
    };
    for device in &devices {
        writeln!(out, "{}  {}", device.path().display(), device.description())?;
        let partitions = list_partitions(probe, &device.path());
        if partitions.is_empty() {
            writeln!(out, "    no partitions")?;
        }
        for partition in &partitions {
            writeln!(
                out,
                "    {}  {}",
                partition.path().display(),
                partition.description()
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::fake::FakeProbe;

    #[test]
    fn lists_devices_with_partitions() {
        let probe = FakeProbe {
            disk_listing: Some("sda 20G ModelX disk\nsdb 8G  disk\nloop0 50M  loop\n".to_string()),
            ..Default::default()
        }
        .with_partitions("/dev/sda", "sda 20G  \nsda1 10G ext4 /\n");
        let mut out = Vec::new();
        write_devices(&probe, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "/dev/sda  20G | ModelX\n    /dev/sda1  10G | ext4 | /\n/dev/sdb  8G | Unknown model\n    no partitions\n"
        );
    }

    #[test]
    fn reports_missing_devices() {
        let mut out = Vec::new();
        assert!(write_devices(&FakeProbe::default(), &mut out).is_err());
        assert_eq!(String::from_utf8(out).unwrap(), "No storage devices found!\n");
    }
}
