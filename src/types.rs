use std::fmt;
use std::str::FromStr;

/// Name of the `/dev/mapper` node used while a LUKS container is open.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapperName(String);

impl MapperName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for MapperName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == "." || s == ".." {
            return Err("mapper name is empty".to_string());
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.') {
            return Err("mapper name must use only letters, digits, '.', '-', '_'".to_string());
        }
        Ok(MapperName(s.to_string()))
    }
}

impl Default for MapperName {
    fn default() -> Self {
        MapperName("backup".to_string())
    }
}

impl fmt::Display for MapperName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A passphrase. Never printed, never placed on a command line.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Secret(value))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Backup,
    Restore,
}

impl Operation {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_lowercase().as_str() {
            "backup" => Ok(Operation::Backup),
            "restore" => Ok(Operation::Restore),
            _ => Err(format!(
                "invalid operation {}; expected backup or restore",
                value
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Backup => "backup",
            Operation::Restore => "restore",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Operation::Backup => "Backup",
            Operation::Restore => "Restore",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunMode {
    pub dry_run: bool,
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapper_name_rejects_paths() {
        assert!("backup".parse::<MapperName>().is_ok());
        assert!("hc-1.0_x".parse::<MapperName>().is_ok());
        assert!("".parse::<MapperName>().is_err());
        assert!("../x".parse::<MapperName>().is_err());
        assert!("a b".parse::<MapperName>().is_err());
    }

    #[test]
    fn secret_requires_value_and_hides_it() {
        assert!(Secret::new("").is_none());
        let secret = Secret::new("hunter2").unwrap();
        assert_eq!(secret.expose(), "hunter2");
        assert!(!format!("{:?}", secret).contains("hunter2"));
    }

    #[test]
    fn operation_parse() {
        assert_eq!(Operation::parse("Backup").unwrap(), Operation::Backup);
        assert_eq!(Operation::parse("restore").unwrap(), Operation::Restore);
        assert!(Operation::parse("verify").is_err());
    }
}
