//! Capacity-aware virtual disk placement and migration.
//!
//! Given a logical disk identifier and a requested size, this crate
//! decides which datastore should host the backing image, creates or
//! locates the image there, and relocates it when the datastore holding
//! it is not reachable from the compute placement that needs it.
//!
//! The SDK calls that actually touch disk images sit behind narrow
//! seams ([`VirtualDiskClient`], [`DatacenterView`], [`ClusterPicker`]);
//! this crate owns only the placement policy. See [`DiskProvider`] for
//! the operations.

pub mod client;
pub mod disk;
pub mod error;
pub mod geometry;
pub mod options;
pub mod provider;
pub mod resources;

pub use client::{AdapterType, DiskType, VimFault, VirtualDiskClient, VirtualDiskSpec};
pub use disk::Disk;
pub use error::{DiskError, DiskResult};
pub use geometry::{kilobytes_for_mb, DiskGeometry};
pub use options::ProviderOptions;
pub use provider::DiskProvider;
pub use resources::{Cluster, ClusterPicker, Datastore, DatacenterView};
