//! The located-disk value entity.

use serde::{Deserialize, Serialize};

use crate::resources::Datastore;

/// Datastore-qualified path of a disk image.
pub(crate) fn disk_path(datastore_name: &str, folder: &str, cid: &str) -> String {
    format!("[{datastore_name}] {folder}/disk-{cid}.vmdk")
}

/// Datastore-qualified parent folder holding disk images.
pub(crate) fn folder_path(datastore_name: &str, folder: &str) -> String {
    format!("[{datastore_name}] {folder}")
}

/// An immutable snapshot of a located virtual disk.
///
/// Constructed fresh by every provider operation and never cached; the
/// authoritative state is the physical image plus the datastore's
/// bookkeeping, both external. The image path is always derived from
/// `(datastore, folder, cid)` rather than stored, so it cannot drift
/// from its components.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disk {
    cid: String,
    size_in_mb: u64,
    datastore: Datastore,
    folder: String,
}

impl Disk {
    pub(crate) fn new(
        cid: impl Into<String>,
        size_in_mb: u64,
        datastore: Datastore,
        folder: impl Into<String>,
    ) -> Self {
        Self {
            cid: cid.into(),
            size_in_mb,
            datastore,
            folder: folder.into(),
        }
    }

    /// Opaque disk identifier.
    pub fn cid(&self) -> &str {
        &self.cid
    }

    /// Logical size in megabytes.
    pub fn size_in_mb(&self) -> u64 {
        self.size_in_mb
    }

    /// The datastore currently holding the disk.
    pub fn datastore(&self) -> &Datastore {
        &self.datastore
    }

    /// `"[<datastore>] <folder>/disk-<cid>.vmdk"`, recomputed on every
    /// call.
    pub fn path(&self) -> String {
        disk_path(&self.datastore.name, &self.folder, &self.cid)
    }
}
