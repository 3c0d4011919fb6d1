use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::MapperName;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, rename = "blockSize", skip_serializing_if = "Option::is_none")]
    pub block_size: Option<String>,
    #[serde(default, rename = "mapperName", skip_serializing_if = "Option::is_none")]
    pub mapper_name: Option<String>,
    #[serde(default, rename = "browseRoot", skip_serializing_if = "Option::is_none")]
    pub browse_root: Option<String>,
    #[serde(default, rename = "splitSize", skip_serializing_if = "Option::is_none")]
    pub split_size: Option<String>,
    #[serde(default, rename = "luksHeadroomMib", skip_serializing_if = "Option::is_none")]
    pub luks_headroom_mib: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub block_size: String,
    pub mapper_name: MapperName,
    pub browse_root: PathBuf,
    pub split_size: String,
    pub luks_headroom_mib: u64,
}

impl RuntimeConfig {
    /// `None` when the MiB value does not fit in bytes.
    pub fn luks_headroom_bytes(&self) -> Option<u64> {
        self.luks_headroom_mib.checked_mul(1 << 20)
    }

    /// The effective settings in file form.
    pub fn to_config(&self) -> Config {
        Config {
            block_size: Some(self.block_size.clone()),
            mapper_name: Some(self.mapper_name.to_string()),
            browse_root: Some(self.browse_root.display().to_string()),
            split_size: Some(self.split_size.clone()),
            luks_headroom_mib: Some(self.luks_headroom_mib),
        }
    }
}
