//! Virtualization command sink.
//!
//! Narrow seam over the SDK calls that physically create, inspect and
//! move disk images. The real implementation wraps the vendor SDK and
//! blocks on task completion; the provider only depends on this trait.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::DiskGeometry;

/// Fault surfaced by the virtualization client.
#[derive(Debug, Error)]
pub enum VimFault {
    /// The target file does not exist on the queried datastore.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Any other client-side failure (transport, permission, SOAP
    /// fault). Never reinterpreted by this crate.
    #[error("{message}")]
    Fault { message: String },
}

impl VimFault {
    /// Whether this is the "not found"-class fault a disk scan treats as
    /// "keep looking" rather than a hard failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound { .. })
    }
}

/// Backing allocation policy for a new virtual disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiskType {
    Preallocated,
    Thin,
    EagerZeroedThick,
}

impl DiskType {
    /// Wire string understood by the virtualization layer.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preallocated => "preallocated",
            Self::Thin => "thin",
            Self::EagerZeroedThick => "eagerZeroedThick",
        }
    }
}

impl fmt::Display for DiskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Virtual SCSI adapter a disk is created for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdapterType {
    LsiLogic,
    BusLogic,
    Ide,
}

impl AdapterType {
    /// Wire string understood by the virtualization layer.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LsiLogic => "lsiLogic",
            Self::BusLogic => "busLogic",
            Self::Ide => "ide",
        }
    }
}

impl fmt::Display for AdapterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a create-disk command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VirtualDiskSpec {
    pub disk_type: DiskType,
    pub adapter_type: AdapterType,
    pub capacity_kb: u64,
}

/// Imperative disk commands against the virtualization layer.
///
/// Every method is a single blocking command: no retries, no partial
/// failure handling. Faults come back as [`VimFault`] and the caller
/// decides what, if anything, they mean.
#[async_trait]
pub trait VirtualDiskClient: Send + Sync {
    /// Create a disk image at `path` on the given datacenter.
    async fn create_virtual_disk(
        &self,
        path: &str,
        datacenter: &str,
        spec: &VirtualDiskSpec,
    ) -> Result<(), VimFault>;

    /// Query the geometry of the disk image at `path`.
    ///
    /// A missing image surfaces as [`VimFault::FileNotFound`].
    async fn query_virtual_disk_geometry(
        &self,
        path: &str,
        datacenter: &str,
    ) -> Result<DiskGeometry, VimFault>;

    /// Move a disk image between datastore paths.
    async fn move_disk(
        &self,
        source_datacenter: &str,
        source_path: &str,
        dest_datacenter: &str,
        dest_path: &str,
    ) -> Result<(), VimFault>;

    /// Create a folder on a datastore. Creating a folder that already
    /// exists is not an error.
    async fn create_datastore_folder(
        &self,
        folder_path: &str,
        datacenter: &str,
    ) -> Result<(), VimFault>;
}
