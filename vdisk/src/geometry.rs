//! Disk geometry and size conversion.
//!
//! The virtualization layer describes a disk's shape as cylinders, heads
//! and sectors rather than a raw byte count. This module converts that
//! shape into the logical megabyte size used everywhere else, and
//! megabytes into the kilobyte capacity the create-disk command expects.

use serde::{Deserialize, Serialize};

/// Geometry sectors per kilobyte, as reported by the geometry query.
const SECTORS_PER_KB: u64 = 512;

/// Kilobytes per megabyte.
const KB_PER_MB: u64 = 1024;

/// Physical disk shape reported by the virtualization layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskGeometry {
    pub cylinders: u64,
    pub heads: u64,
    pub sectors: u64,
}

impl DiskGeometry {
    /// Logical size of a disk with this geometry, in megabytes.
    ///
    /// Rounds up: geometry rarely divides evenly into megabytes, and a
    /// disk must never be reported smaller than its backing size.
    pub fn size_in_mb(&self) -> u64 {
        let total_sectors = self.cylinders * self.heads * self.sectors;
        total_sectors.div_ceil(SECTORS_PER_KB * KB_PER_MB)
    }
}

/// Capacity in kilobytes for a disk of `size_in_mb` megabytes.
///
/// Exact by construction; used verbatim as the `capacity_kb` of a
/// create-disk command.
pub fn kilobytes_for_mb(size_in_mb: u64) -> u64 {
    size_in_mb * KB_PER_MB
}
