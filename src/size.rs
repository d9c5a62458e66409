//! Byte-size parsing for configuration values.
//!
//! Database settings such as buffer pool sizes arrive as strings like
//! `"600M"` or `"2G"`; comparisons and arithmetic need them in bytes.

use std::sync::LazyLock;

use anyhow::{Result, anyhow};
use regex::Regex;

/// Canonical KB→bytes multiplier.
pub const BYTES_PER_KB: u64 = 1024;

/// Canonical MB→bytes multiplier.
pub const BYTES_PER_MB: u64 = 1024 * BYTES_PER_KB;

/// Canonical GB→bytes multiplier.
pub const BYTES_PER_GB: u64 = 1024 * BYTES_PER_MB;

/// Accepted size grammar: an integer with an optional `K`/`M`/`G` suffix.
static SIZE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)([KMG])?$").expect("Invalid size pattern"));

/// Convert a number with an optional byte suffix to bytes.
///
/// Suffixes are binary: `K` is 1024, `M` is 1024², `G` is 1024³. A plain
/// integer string is returned as-is.
///
/// # Errors
///
/// Returns an error if:
/// - The string does not match `<digits>[K|M|G]` (e.g., `"1.5G"`, `"10KB"`)
/// - The numeric part does not fit in `u64`
/// - The multiplied value would overflow `u64`
///
/// # Examples
///
/// ```
/// # use guest_utils::size::to_bytes;
/// # use anyhow::Result;
/// # fn main() -> Result<()> {
/// assert_eq!(to_bytes("1024")?, 1024);
/// assert_eq!(to_bytes("2K")?, 2_048);
/// assert_eq!(to_bytes("600M")?, 629_145_600);
/// assert_eq!(to_bytes("1G")?, 1_073_741_824);
/// # Ok(())
/// # }
/// ```
pub fn to_bytes(value: &str) -> Result<u64> {
    let captures = SIZE_PATTERN
        .captures(value)
        .ok_or_else(|| anyhow!("Invalid size value: {value:?}"))?;

    let number: u64 = captures[1]
        .parse()
        .map_err(|e| anyhow!("Invalid size value {value:?}: {e}"))?;

    let multiplier = match captures.get(2).map(|m| m.as_str()) {
        Some("K") => BYTES_PER_KB,
        Some("M") => BYTES_PER_MB,
        Some("G") => BYTES_PER_GB,
        _ => 1,
    };

    number
        .checked_mul(multiplier)
        .ok_or_else(|| anyhow!("Size value overflow: {value}"))
}
