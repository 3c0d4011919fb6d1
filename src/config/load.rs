use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config::model::{Config, RuntimeConfig};
use crate::error::{ConfigError, HardcloneError, Result};
use crate::types::MapperName;
use crate::util::size::parse_size_spec;

pub const CONFIG_FILE: &str = "/etc/hardclone.yaml";

const DEFAULT_BLOCK_SIZE: &str = "4M";
const DEFAULT_MAPPER_NAME: &str = "backup";
const DEFAULT_BROWSE_ROOT: &str = "/";
const DEFAULT_SPLIT_SIZE: &str = "4G";
const DEFAULT_LUKS_HEADROOM_MIB: u64 = 32;

/// Loads `path` when given (it must exist), otherwise the default file when present,
/// otherwise built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<RuntimeConfig> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(CONFIG_FILE), false),
    };
    if !required && !path.exists() {
        tracing::debug!(path = %path.display(), "no config file; using defaults");
        return parse_runtime(Config::default());
    }
    let mut contents = String::new();
    File::open(&path)
        .map_err(|e| HardcloneError::message(format!("open config {}: {}", path.display(), e)))?
        .read_to_string(&mut contents)
        .map_err(|e| HardcloneError::message(format!("read config {}: {}", path.display(), e)))?;
    let cfg: Config = if contents.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?
    };
    tracing::debug!(path = %path.display(), "loaded config");
    parse_runtime(cfg)
}

pub fn parse_runtime(cfg: Config) -> Result<RuntimeConfig> {
    let block_size = parse_size_spec(cfg.block_size.as_deref().unwrap_or(DEFAULT_BLOCK_SIZE))
        .map_err(|e| ConfigError::Invalid(format!("blockSize: {}", e)))?;
    let split_size = parse_size_spec(cfg.split_size.as_deref().unwrap_or(DEFAULT_SPLIT_SIZE))
        .map_err(|e| ConfigError::Invalid(format!("splitSize: {}", e)))?;
    let mapper_name = cfg
        .mapper_name
        .as_deref()
        .unwrap_or(DEFAULT_MAPPER_NAME)
        .parse::<MapperName>()
        .map_err(|e| ConfigError::Invalid(format!("mapperName: {}", e)))?;
    let browse_root = PathBuf::from(cfg.browse_root.as_deref().unwrap_or(DEFAULT_BROWSE_ROOT));
    if !browse_root.is_absolute() {
        return Err(ConfigError::Invalid(format!(
            "browseRoot: {} is not an absolute path",
            browse_root.display()
        ))
        .into());
    }
    let luks_headroom_mib = cfg.luks_headroom_mib.unwrap_or(DEFAULT_LUKS_HEADROOM_MIB);
    if luks_headroom_mib == 0 {
        return Err(ConfigError::Invalid(
            "luksHeadroomMib: must leave room for the LUKS header".to_string(),
        )
        .into());
    }
    if luks_headroom_mib.checked_mul(1 << 20).is_none() {
        return Err(ConfigError::Invalid(format!(
            "luksHeadroomMib: {} MiB is too large",
            luks_headroom_mib
        ))
        .into());
    }
    Ok(RuntimeConfig {
        block_size,
        mapper_name,
        browse_root,
        split_size,
        luks_headroom_mib,
    })
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            block_size: DEFAULT_BLOCK_SIZE.to_string(),
            mapper_name: MapperName::default(),
            browse_root: PathBuf::from(DEFAULT_BROWSE_ROOT),
            split_size: DEFAULT_SPLIT_SIZE.to_string(),
            luks_headroom_mib: DEFAULT_LUKS_HEADROOM_MIB,
        }
    }
}
