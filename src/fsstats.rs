//! Filesystem volume statistics.
//!
//! The agent reports how much space the data volume has left before and
//! after provisioning operations. This module wraps a single `statvfs` call
//! into a serializable summary.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use humansize::{DECIMAL, format_size};
use nix::sys::statvfs::statvfs;
use serde::Serialize;
use tracing::debug;

use crate::size::BYTES_PER_GB;

/// Space statistics for a mounted filesystem.
///
/// All stored quantities are raw `statvfs` numbers or byte counts; use
/// [`VolumeStats::total_gb`] and [`VolumeStats::used_gb`] for the rounded
/// gigabyte figures reported to the control plane.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VolumeStats {
    /// Filesystem block size in bytes.
    pub block_size: u64,

    /// Total number of blocks on the volume.
    pub total_blocks: u64,

    /// Number of free blocks on the volume.
    pub free_blocks: u64,

    /// Total volume size in bytes.
    pub total_bytes: u64,

    /// Free space in bytes.
    pub free_bytes: u64,

    /// Used space in bytes.
    pub used_bytes: u64,
}

impl VolumeStats {
    /// Total volume size in gigabytes, rounded to two decimals.
    #[must_use]
    pub fn total_gb(&self) -> f64 {
        to_gb(self.total_bytes)
    }

    /// Used space in gigabytes, rounded to two decimals.
    #[must_use]
    pub fn used_gb(&self) -> f64 {
        to_gb(self.used_bytes)
    }
}

impl fmt::Display for VolumeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} used of {} ({} free)",
            format_size(self.used_bytes, DECIMAL),
            format_size(self.total_bytes, DECIMAL),
            format_size(self.free_bytes, DECIMAL),
        )
    }
}

/// Collect space statistics for the filesystem mounted at `fs_path`.
///
/// # Errors
///
/// Returns an error if the path does not exist or `statvfs` fails on it.
pub fn volume_stats(fs_path: &Path) -> Result<VolumeStats> {
    let stats = statvfs(fs_path)
        .with_context(|| format!("Filesystem not found ({})", fs_path.display()))?;

    let block_size = u64::from(stats.block_size());
    let total_blocks = u64::from(stats.blocks());
    let free_blocks = u64::from(stats.blocks_free());

    let total_bytes = total_blocks.saturating_mul(block_size);
    let free_bytes = free_blocks.saturating_mul(block_size);
    let used_bytes = total_bytes.saturating_sub(free_bytes);

    debug!("volume stats for {}: {total_bytes} bytes total, {free_bytes} free", fs_path.display());

    Ok(VolumeStats {
        block_size,
        total_blocks,
        free_blocks,
        total_bytes,
        free_bytes,
        used_bytes,
    })
}

/// Convert bytes to gigabytes, rounded to two decimals.
#[allow(clippy::cast_precision_loss)] // volume sizes are far below 2^52 bytes
fn to_gb(bytes: u64) -> f64 {
    if bytes == 0 {
        return 0.0;
    }
    let size = bytes as f64 / BYTES_PER_GB as f64;
    (size * 100.0).round() / 100.0
}
