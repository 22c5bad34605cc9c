//! Error taxonomy for disk placement and migration.

use thiserror::Error;

use crate::client::VimFault;

/// Convenience alias for provider operations.
pub type DiskResult<T> = Result<T, DiskError>;

/// Failures surfaced by disk provider operations.
///
/// Nothing here is retried internally; every failure reaches the caller
/// synchronously, and none are logged-and-swallowed.
#[derive(Debug, Error)]
pub enum DiskError {
    /// No persistent datastore has enough free capacity. The caller must
    /// free space or request a smaller disk.
    #[error("no persistent datastore with at least {0} MB free")]
    NoDiskSpace(u64),

    /// The disk backs none of the persistent datastores.
    #[error("disk '{0}' not found in any persistent datastore")]
    DiskNotFound(String),

    /// A capacity-valid migration target is not reachable from the
    /// requesting cluster. Guards against the topology view answering
    /// with a placement-invalid datastore.
    #[error("Datastore '{datastore}' is not accessible to cluster '{cluster}'")]
    DatastoreNotAccessible { datastore: String, cluster: String },

    /// Opaque infrastructure fault from the virtualization client,
    /// propagated unmodified.
    #[error(transparent)]
    Client(#[from] VimFault),
}
