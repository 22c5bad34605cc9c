//! Scripted fakes for vdisk's collaborator seams.
//!
//! Each fake records the commands it receives and serves scripted
//! responses, so tests can assert both the disk values a provider
//! returns and the exact commands it issued to the virtualization
//! layer.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use vdisk::{
    Cluster, ClusterPicker, Datastore, DatacenterView, DiskGeometry, VimFault, VirtualDiskClient,
    VirtualDiskSpec,
};

/// Shorthand for a datastore snapshot.
pub fn datastore(name: &str, free_space: u64, capacity: u64) -> Datastore {
    Datastore {
        name: name.into(),
        free_space,
        capacity,
    }
}

// ============================================================================
// Fake virtualization client
// ============================================================================

/// A create-disk command the fake client received.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedDisk {
    pub path: String,
    pub datacenter: String,
    pub spec: VirtualDiskSpec,
}

/// A move-disk command the fake client received.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovedDisk {
    pub source_datacenter: String,
    pub source_path: String,
    pub dest_datacenter: String,
    pub dest_path: String,
}

#[derive(Default)]
struct ClientState {
    geometries: HashMap<String, DiskGeometry>,
    hard_faults: HashMap<String, String>,
    queried_paths: Vec<String>,
    created_disks: Vec<CreatedDisk>,
    created_folders: Vec<(String, String)>,
    moved_disks: Vec<MovedDisk>,
}

/// Fake virtualization client.
///
/// Geometry queries answer from a path-to-geometry script; a path with
/// a scripted hard fault returns [`VimFault::Fault`], and any other
/// unscripted path returns [`VimFault::FileNotFound`]. Create, move and
/// folder commands always succeed and are recorded.
#[derive(Default)]
pub struct FakeVimClient {
    state: Mutex<ClientState>,
}

impl FakeVimClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the geometry returned for `path`.
    pub fn put_geometry(&self, path: &str, geometry: DiskGeometry) {
        self.state.lock().geometries.insert(path.into(), geometry);
    }

    /// Script a non-not-found fault for geometry queries on `path`.
    pub fn put_fault(&self, path: &str, message: &str) {
        self.state.lock().hard_faults.insert(path.into(), message.into());
    }

    /// Paths queried for geometry, in order.
    pub fn queried_paths(&self) -> Vec<String> {
        self.state.lock().queried_paths.clone()
    }

    pub fn created_disks(&self) -> Vec<CreatedDisk> {
        self.state.lock().created_disks.clone()
    }

    /// `(folder_path, datacenter)` pairs, in order.
    pub fn created_folders(&self) -> Vec<(String, String)> {
        self.state.lock().created_folders.clone()
    }

    pub fn moved_disks(&self) -> Vec<MovedDisk> {
        self.state.lock().moved_disks.clone()
    }
}

#[async_trait]
impl VirtualDiskClient for FakeVimClient {
    async fn create_virtual_disk(
        &self,
        path: &str,
        datacenter: &str,
        spec: &VirtualDiskSpec,
    ) -> Result<(), VimFault> {
        self.state.lock().created_disks.push(CreatedDisk {
            path: path.into(),
            datacenter: datacenter.into(),
            spec: spec.clone(),
        });
        Ok(())
    }

    async fn query_virtual_disk_geometry(
        &self,
        path: &str,
        _datacenter: &str,
    ) -> Result<DiskGeometry, VimFault> {
        let mut state = self.state.lock();
        state.queried_paths.push(path.into());
        if let Some(message) = state.hard_faults.get(path) {
            return Err(VimFault::Fault {
                message: message.clone(),
            });
        }
        state
            .geometries
            .get(path)
            .copied()
            .ok_or_else(|| VimFault::FileNotFound { path: path.into() })
    }

    async fn move_disk(
        &self,
        source_datacenter: &str,
        source_path: &str,
        dest_datacenter: &str,
        dest_path: &str,
    ) -> Result<(), VimFault> {
        self.state.lock().moved_disks.push(MovedDisk {
            source_datacenter: source_datacenter.into(),
            source_path: source_path.into(),
            dest_datacenter: dest_datacenter.into(),
            dest_path: dest_path.into(),
        });
        Ok(())
    }

    async fn create_datastore_folder(
        &self,
        folder_path: &str,
        datacenter: &str,
    ) -> Result<(), VimFault> {
        self.state
            .lock()
            .created_folders
            .push((folder_path.into(), datacenter.into()));
        Ok(())
    }
}

// ============================================================================
// Fake topology views
// ============================================================================

#[derive(Default)]
struct DatacenterState {
    pick: Option<Datastore>,
    persistent: Vec<Datastore>,
    pick_requests: Vec<u64>,
}

/// Fake datacenter view with a scripted capacity pick and datastore
/// enumeration.
pub struct FakeDatacenter {
    name: String,
    handle: String,
    state: Mutex<DatacenterState>,
}

impl FakeDatacenter {
    pub fn new(name: &str, handle: &str) -> Self {
        Self {
            name: name.into(),
            handle: handle.into(),
            state: Mutex::new(DatacenterState::default()),
        }
    }

    /// Script the result of the next capacity picks.
    pub fn set_pick(&self, datastore: Option<Datastore>) {
        self.state.lock().pick = datastore;
    }

    /// Script the persistent datastore enumeration (order is kept).
    pub fn set_persistent_datastores(&self, datastores: Vec<Datastore>) {
        self.state.lock().persistent = datastores;
    }

    /// Sizes requested from `pick_persistent_datastore`, in order.
    pub fn pick_requests(&self) -> Vec<u64> {
        self.state.lock().pick_requests.clone()
    }
}

#[async_trait]
impl DatacenterView for FakeDatacenter {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self) -> &str {
        &self.handle
    }

    async fn pick_persistent_datastore(&self, size_in_mb: u64) -> Option<Datastore> {
        let mut state = self.state.lock();
        state.pick_requests.push(size_in_mb);
        state.pick.clone()
    }

    async fn persistent_datastores(&self) -> Vec<Datastore> {
        self.state.lock().persistent.clone()
    }
}

#[derive(Default)]
struct ResourcesState {
    pick: Option<Datastore>,
    pick_requests: Vec<(String, u64)>,
}

/// Fake cluster-scoped datastore picker.
#[derive(Default)]
pub struct FakeResources {
    state: Mutex<ResourcesState>,
}

impl FakeResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the result of the next in-cluster picks.
    pub fn set_pick(&self, datastore: Option<Datastore>) {
        self.state.lock().pick = datastore;
    }

    /// `(cluster_name, size_in_mb)` requests, in order.
    pub fn pick_requests(&self) -> Vec<(String, u64)> {
        self.state.lock().pick_requests.clone()
    }
}

#[async_trait]
impl ClusterPicker for FakeResources {
    async fn pick_persistent_datastore_in_cluster(
        &self,
        cluster: &Cluster,
        size_in_mb: u64,
    ) -> Option<Datastore> {
        let mut state = self.state.lock();
        state.pick_requests.push((cluster.name.clone(), size_in_mb));
        state.pick.clone()
    }
}
