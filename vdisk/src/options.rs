//! Provider configuration.

use serde::{Deserialize, Serialize};

use crate::client::{AdapterType, DiskType};

/// Configuration for a disk provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderOptions {
    /// Datastore-relative directory holding persistent disk images.
    #[serde(default = "default_disk_folder")]
    pub disk_folder: String,

    /// Allocation policy for newly created disks.
    #[serde(default = "default_disk_type")]
    pub disk_type: DiskType,

    /// Adapter type newly created disks are attached through.
    #[serde(default = "default_adapter_type")]
    pub adapter_type: AdapterType,
}

fn default_disk_folder() -> String {
    "persistent_disks".to_string()
}

fn default_disk_type() -> DiskType {
    DiskType::Preallocated
}

fn default_adapter_type() -> AdapterType {
    AdapterType::LsiLogic
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            disk_folder: default_disk_folder(),
            disk_type: default_disk_type(),
            adapter_type: default_adapter_type(),
        }
    }
}
