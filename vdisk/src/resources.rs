//! Read-only views over infrastructure topology.
//!
//! Datastores and clusters are owned by the infrastructure layer; this
//! module defines the value types and the narrow seams the disk provider
//! reads through. Implementations live with whatever discovers the
//! topology (live SDK inventory, cached bookkeeping, test fakes).

use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A named physical storage pool.
///
/// `free_space` and `capacity` are megabytes and reflect a point-in-time
/// snapshot of the infrastructure layer's bookkeeping. Two values refer
/// to the same datastore iff their names match; equality deliberately
/// ignores the capacity snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Datastore {
    pub name: String,
    pub free_space: u64,
    pub capacity: u64,
}

impl PartialEq for Datastore {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Datastore {}

impl Hash for Datastore {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// A compute cluster, identified by name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub name: String,
}

impl Cluster {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Read-only view over a datacenter and its persistent datastores.
///
/// "Persistent" datastores are the pools eligible for long-lived disk
/// storage, as opposed to ephemeral scratch space.
#[async_trait]
pub trait DatacenterView: Send + Sync {
    /// Datacenter name, for diagnostics.
    fn name(&self) -> &str;

    /// Native datacenter reference passed through to client commands.
    fn handle(&self) -> &str;

    /// A persistent datastore with at least `size_in_mb` free, if any.
    async fn pick_persistent_datastore(&self, size_in_mb: u64) -> Option<Datastore>;

    /// Every persistent datastore, in the view's enumeration order.
    ///
    /// The order is authoritative: disk lookups scan candidates in this
    /// order and stop at the first hit.
    async fn persistent_datastores(&self) -> Vec<Datastore>;
}

/// Capacity-aware datastore selection scoped to a cluster.
#[async_trait]
pub trait ClusterPicker: Send + Sync {
    /// A persistent datastore within `cluster` with at least
    /// `size_in_mb` free, if any.
    async fn pick_persistent_datastore_in_cluster(
        &self,
        cluster: &Cluster,
        size_in_mb: u64,
    ) -> Option<Datastore>;
}
