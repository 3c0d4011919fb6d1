//! Parsers for lsblk, `/proc/partitions` and `/dev` listings.
//!
//! Everything here is pure so the discovery strategies can be exercised with canned
//! tool output.

/// Device name prefixes that never count as selectable storage.
pub const EXCLUDED_PREFIXES: [&str; 5] = ["loop", "ram", "rom", "dm-", "sr"];

/// Name prefixes accepted from `/proc/partitions`.
pub const PROC_DISK_PREFIXES: [&str; 4] = ["sd", "nvme", "vd", "hd"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRow {
    pub name: String,
    pub size: String,
    pub model: Option<String>,
    pub kind: String,
    pub parent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionRow {
    pub name: String,
    pub size: String,
    pub fs_type: Option<String>,
    pub mount_point: Option<String>,
}

pub fn is_excluded_name(name: &str) -> bool {
    EXCLUDED_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

fn is_block_type(token: &str) -> bool {
    matches!(
        token,
        "disk" | "part" | "rom" | "loop" | "lvm" | "crypt" | "mpath" | "md" | "dmraid" | "linear"
    ) || token.starts_with("raid")
}

pub fn strip_tree_glyphs(name: &str) -> &str {
    name.trim_start_matches(|c| matches!(c, '├' | '└' | '│' | '─' | '`' | '|' | '-' | ' '))
}

/// Parses `lsblk -o NAME,SIZE,MODEL,TYPE[,PKNAME] --noheadings`.
///
/// MODEL may be empty or contain spaces, so TYPE is located from the end of the row:
/// it is either the last column or, when PKNAME is present, the one before it.
pub fn parse_block_rows(output: &str) -> Vec<BlockRow> {
    let mut rows = Vec::new();
    for line in output.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 3 {
            continue;
        }
        let last = tokens.len() - 1;
        let (type_idx, parent) = if is_block_type(tokens[last]) {
            (last, None)
        } else if tokens.len() >= 4 && is_block_type(tokens[last - 1]) {
            (last - 1, Some(tokens[last].to_string()))
        } else {
            continue;
        };
        if type_idx < 2 {
            continue;
        }
        let name = strip_tree_glyphs(tokens[0]);
        if name.is_empty() {
            continue;
        }
        let model = tokens[2..type_idx].join(" ");
        let model = if model.is_empty() || model == "-" {
            None
        } else {
            Some(model)
        };
        rows.push(BlockRow {
            name: name.to_string(),
            size: tokens[1].to_string(),
            model,
            kind: tokens[type_idx].to_string(),
            parent,
        });
    }
    rows
}

/// Whole-disk candidates from `/proc/partitions`.
pub fn parse_proc_partitions(contents: &str) -> Vec<String> {
    let mut names = Vec::new();
    for line in contents.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            continue;
        }
        let name = fields[3];
        let ends_with_digit = name.chars().last().map_or(true, |c| c.is_ascii_digit());
        if ends_with_digit {
            continue;
        }
        if PROC_DISK_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
            names.push(name.to_string());
        }
    }
    names
}

/// Parses `lsblk -n -r <dev> -o NAME,SIZE,FSTYPE,MOUNTPOINT`.
///
/// Raw mode separates columns with single spaces and leaves empty columns empty, so
/// the row is split on single spaces rather than whitespace runs.
pub fn parse_partition_rows(output: &str) -> Vec<PartitionRow> {
    let mut rows = Vec::new();
    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.splitn(4, ' ');
        let name = fields.next().unwrap_or_default();
        let size = fields.next().unwrap_or_default();
        if name.is_empty() || size.is_empty() {
            continue;
        }
        let non_empty = |value: Option<&str>| {
            value
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(decode_escapes)
        };
        let fs_type = non_empty(fields.next());
        let mount_point = non_empty(fields.next());
        rows.push(PartitionRow {
            name: decode_escapes(name),
            size: size.to_string(),
            fs_type,
            mount_point,
        });
    }
    rows
}

/// Decodes lsblk's `\xNN` escapes.
pub fn decode_escapes(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() && bytes[i + 1] == b'x' {
            let hex = std::str::from_utf8(&bytes[i + 2..i + 4]).ok();
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).to_string()
}

/// Order of a `/dev` name among the whole-disk patterns
/// `sd[a-z]`, `nvme<N>n<N>`, `vd[a-z]`, `hd[a-z]`.
pub fn disk_node_rank(name: &str) -> Option<u8> {
    let single_letter = |prefix: &str| {
        name.strip_prefix(prefix)
            .map_or(false, |rest| rest.len() == 1 && rest.chars().all(|c| c.is_ascii_lowercase()))
    };
    if single_letter("sd") {
        return Some(0);
    }
    if let Some(rest) = name.strip_prefix("nvme") {
        if let Some((ctrl, ns)) = rest.split_once('n') {
            let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
            if digits(ctrl) && digits(ns) {
                return Some(1);
            }
        }
    }
    if single_letter("vd") {
        return Some(2);
    }
    if single_letter("hd") {
        return Some(3);
    }
    None
}

/// Partition number of `name` when it is `<base><N>` or `<base>p<N>`.
pub fn partition_number(base: &str, name: &str) -> Option<u32> {
    let rest = name.strip_prefix(base)?;
    let digits = rest.strip_prefix('p').unwrap_or(rest);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_rows_with_spaced_and_missing_models() {
        let output = "\
sda   20G ModelX               disk
sdb  1.8T Samsung SSD 860 EVO  disk
vda   40G                      disk
sr0 1024M DVD-RW               rom
";
        let rows = parse_block_rows(output);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].model.as_deref(), Some("ModelX"));
        assert_eq!(rows[1].model.as_deref(), Some("Samsung SSD 860 EVO"));
        assert_eq!(rows[2].model, None);
        assert_eq!(rows[2].kind, "disk");
        assert_eq!(rows[3].kind, "rom");
    }

    #[test]
    fn model_containing_type_word() {
        let rows = parse_block_rows("sda 20G Virtual disk disk\n");
        assert_eq!(rows[0].model.as_deref(), Some("Virtual disk"));
        assert_eq!(rows[0].kind, "disk");
        assert_eq!(rows[0].parent, None);
    }

    #[test]
    fn tree_rows_strip_glyphs_and_keep_parent() {
        let output = "\
sda      20G ModelX disk
├─sda1   10G        part sda
└─sda2   10G        part sda
`-sdb1    5G        part sdb
";
        let rows = parse_block_rows(output);
        assert_eq!(rows[0].parent, None);
        assert_eq!(rows[1].name, "sda1");
        assert_eq!(rows[1].parent.as_deref(), Some("sda"));
        assert_eq!(rows[2].name, "sda2");
        assert_eq!(rows[3].name, "sdb1");
    }

    #[test]
    fn excluded_prefixes() {
        for name in ["loop0", "ram1", "rom", "dm-0", "sr0"] {
            assert!(is_excluded_name(name), "{}", name);
        }
        assert!(!is_excluded_name("sda"));
        assert!(!is_excluded_name("nvme0n1"));
    }

    #[test]
    fn proc_partitions_keeps_whole_disks() {
        let contents = "\
major minor  #blocks  name

   8        0  488386584 sda
   8        1     524288 sda1
 259        0  500107608 nvme0n1
 252        0   41943040 vda
   7        0      65536 loop0
  11        0    1048575 sr0
";
        assert_eq!(parse_proc_partitions(contents), vec!["sda", "vda"]);
    }

    #[test]
    fn partition_rows_keep_empty_columns() {
        let output = "sda 20G  \nsda1 10G ext4 /\nsda2 9G swap [SWAP]\nsda3 1G  \nsdb1 2G vfat /media/my\\x20stick\n";
        let rows = parse_partition_rows(output);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].fs_type, None);
        assert_eq!(rows[1].fs_type.as_deref(), Some("ext4"));
        assert_eq!(rows[1].mount_point.as_deref(), Some("/"));
        assert_eq!(rows[3].mount_point, None);
        assert_eq!(rows[4].mount_point.as_deref(), Some("/media/my stick"));
    }

    #[test]
    fn disk_node_patterns() {
        assert_eq!(disk_node_rank("sda"), Some(0));
        assert_eq!(disk_node_rank("sda1"), None);
        assert_eq!(disk_node_rank("sdaa"), None);
        assert_eq!(disk_node_rank("nvme0n1"), Some(1));
        assert_eq!(disk_node_rank("nvme0n1p1"), None);
        assert_eq!(disk_node_rank("nvme0"), None);
        assert_eq!(disk_node_rank("vdb"), Some(2));
        assert_eq!(disk_node_rank("hdc"), Some(3));
        assert_eq!(disk_node_rank("tty0"), None);
    }

    #[test]
    fn partition_numbers() {
        assert_eq!(partition_number("sda", "sda1"), Some(1));
        assert_eq!(partition_number("sda", "sda12"), Some(12));
        assert_eq!(partition_number("nvme0n1", "nvme0n1p3"), Some(3));
        assert_eq!(partition_number("sda", "sda"), None);
        assert_eq!(partition_number("sda", "sdb1"), None);
        assert_eq!(partition_number("sda", "sdap"), None);
    }
}
