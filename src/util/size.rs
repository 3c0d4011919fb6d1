const KIB: u64 = 1 << 10;
const MIB: u64 = 1 << 20;
const GIB: u64 = 1 << 30;
const TIB: u64 = 1 << 40;

/// Human-readable size using the largest unit whose threshold is met.
pub fn format_size(bytes: u64) -> String {
    if bytes >= TIB {
        format!("{:.1} TB", bytes as f64 / TIB as f64)
    } else if bytes >= GIB {
        format!("{:.1} GB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    } else {
        format!("{} KB", bytes / KIB)
    }
}

/// Validates a size for `split -b` or `dd bs=`: digits with an optional K/M/G/T suffix.
pub fn parse_size_spec(value: &str) -> Result<String, String> {
    let value = value.trim();
    let (digits, suffix) = match value.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        Some((idx, _)) => value.split_at(idx),
        None => (value, ""),
    };
    if digits.is_empty() {
        return Err(format!("invalid size {:?}; expected e.g. 4G or 700M", value));
    }
    let count: u64 = digits
        .parse()
        .map_err(|_| format!("size {} is too large", value))?;
    if count == 0 {
        return Err("size must be greater than zero".to_string());
    }
    let suffix = suffix.to_ascii_uppercase();
    if !matches!(suffix.as_str(), "" | "K" | "M" | "G" | "T") {
        return Err(format!("invalid size suffix {:?}; expected K, M, G or T", suffix));
    }
    Ok(format!("{}{}", count, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_size_thresholds() {
        assert_eq!(format_size(0), "0 KB");
        assert_eq!(format_size(1023), "0 KB");
        assert_eq!(format_size(1536), "1 KB");
        assert_eq!(format_size(MIB - 1), "1023 KB");
        assert_eq!(format_size(MIB), "1.0 MB");
        assert_eq!(format_size(1_073_741_824), "1.0 GB");
        assert_eq!(format_size(20 * GIB + GIB / 2), "20.5 GB");
        assert_eq!(format_size(TIB), "1.0 TB");
        assert_eq!(format_size(3 * TIB), "3.0 TB");
    }

    #[test]
    fn size_spec_accepts_units() {
        assert_eq!(parse_size_spec("4G").unwrap(), "4G");
        assert_eq!(parse_size_spec(" 700m ").unwrap(), "700M");
        assert_eq!(parse_size_spec("1048576").unwrap(), "1048576");
    }

    #[test]
    fn size_spec_rejects_garbage() {
        assert!(parse_size_spec("").is_err());
        assert!(parse_size_spec("G").is_err());
        assert!(parse_size_spec("0M").is_err());
        assert!(parse_size_spec("4GB").is_err());
        assert!(parse_size_spec("4X").is_err());
    }
}
