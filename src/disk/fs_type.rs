use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsType {
    Ext2,
    Ext3,
    Ext4,
    Xfs,
    Btrfs,
    Vfat,
    Exfat,
    Ntfs,
    Swap,
    Luks,
    Unknown,
    Other(String),
}

impl FsType {
    /// Parses blkid/lsblk TYPE output. Empty output means the type is not known.
    pub fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "unknown" => FsType::Unknown,
            "ext2" => FsType::Ext2,
            "ext3" => FsType::Ext3,
            "ext4" => FsType::Ext4,
            "xfs" => FsType::Xfs,
            "btrfs" => FsType::Btrfs,
            "vfat" | "fat" | "fat32" | "msdos" => FsType::Vfat,
            "exfat" => FsType::Exfat,
            "ntfs" | "ntfs3" => FsType::Ntfs,
            "swap" => FsType::Swap,
            "crypto_luks" => FsType::Luks,
            other => FsType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FsType::Ext2 => "ext2",
            FsType::Ext3 => "ext3",
            FsType::Ext4 => "ext4",
            FsType::Xfs => "xfs",
            FsType::Btrfs => "btrfs",
            FsType::Vfat => "vfat",
            FsType::Exfat => "exfat",
            FsType::Ntfs => "ntfs",
            FsType::Swap => "swap",
            FsType::Luks => "crypto_LUKS",
            FsType::Unknown => "unknown",
            FsType::Other(name) => name,
        }
    }
}

impl fmt::Display for FsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
