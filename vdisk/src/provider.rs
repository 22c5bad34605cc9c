//! Disk placement and migration orchestration.
//!
//! [`DiskProvider`] is the entry point of this crate: it composes the
//! topology views and the virtualization client into the three
//! operations callers need — create a disk somewhere with room for it,
//! find the datastore currently holding a disk, and move a disk when
//! the compute placement that needs it cannot reach that datastore.
//!
//! Every operation recomputes topology from the external views; nothing
//! is cached between calls, and concurrent calls for the same disk are
//! not coordinated here.

use std::sync::Arc;

use uuid::Uuid;

use crate::client::{VirtualDiskClient, VirtualDiskSpec};
use crate::disk::{self, Disk};
use crate::error::{DiskError, DiskResult};
use crate::geometry::kilobytes_for_mb;
use crate::options::ProviderOptions;
use crate::resources::{Cluster, ClusterPicker, DatacenterView};

/// Places, locates and migrates persistent virtual disks.
pub struct DiskProvider {
    client: Arc<dyn VirtualDiskClient>,
    datacenter: Arc<dyn DatacenterView>,
    resources: Arc<dyn ClusterPicker>,
    options: ProviderOptions,
}

impl DiskProvider {
    pub fn new(
        client: Arc<dyn VirtualDiskClient>,
        datacenter: Arc<dyn DatacenterView>,
        resources: Arc<dyn ClusterPicker>,
        options: ProviderOptions,
    ) -> Self {
        Self {
            client,
            datacenter,
            resources,
            options,
        }
    }

    /// Create a `size_in_mb` disk on a persistent datastore with enough
    /// free capacity.
    ///
    /// Fails with [`DiskError::NoDiskSpace`] when no datastore
    /// qualifies. Client faults propagate unmodified; there are no
    /// retries. The parent folder create is idempotent, so a folder left
    /// behind by a later failure is harmless.
    pub async fn create(&self, size_in_mb: u64) -> DiskResult<Disk> {
        let datastore = self
            .datacenter
            .pick_persistent_datastore(size_in_mb)
            .await
            .ok_or(DiskError::NoDiskSpace(size_in_mb))?;

        let cid = Uuid::new_v4().to_string();
        let path = disk::disk_path(&datastore.name, &self.options.disk_folder, &cid);
        tracing::info!(
            %cid,
            datastore = %datastore.name,
            size_in_mb,
            "creating persistent disk"
        );

        self.client
            .create_datastore_folder(
                &disk::folder_path(&datastore.name, &self.options.disk_folder),
                self.datacenter.handle(),
            )
            .await?;

        let spec = VirtualDiskSpec {
            disk_type: self.options.disk_type,
            adapter_type: self.options.adapter_type,
            capacity_kb: kilobytes_for_mb(size_in_mb),
        };
        self.client
            .create_virtual_disk(&path, self.datacenter.handle(), &spec)
            .await?;

        Ok(Disk::new(
            cid,
            size_in_mb,
            datastore,
            self.options.disk_folder.clone(),
        ))
    }

    /// Locate the disk `cid` among the datacenter's persistent
    /// datastores.
    ///
    /// Candidates are scanned in the view's enumeration order and the
    /// first successful geometry query wins; later candidates are never
    /// queried. A not-found fault moves the scan to the next candidate,
    /// any other fault aborts it. Fails with [`DiskError::DiskNotFound`]
    /// once every candidate is exhausted.
    pub async fn find(&self, cid: &str) -> DiskResult<Disk> {
        for datastore in self.datacenter.persistent_datastores().await {
            let path = disk::disk_path(&datastore.name, &self.options.disk_folder, cid);
            match self
                .client
                .query_virtual_disk_geometry(&path, self.datacenter.handle())
                .await
            {
                Ok(geometry) => {
                    let size_in_mb = geometry.size_in_mb();
                    tracing::debug!(%cid, datastore = %datastore.name, size_in_mb, "disk located");
                    return Ok(Disk::new(
                        cid,
                        size_in_mb,
                        datastore,
                        self.options.disk_folder.clone(),
                    ));
                }
                Err(fault) if fault.is_not_found() => {
                    tracing::debug!(%cid, datastore = %datastore.name, "disk not on datastore");
                }
                Err(fault) => return Err(fault.into()),
            }
        }
        Err(DiskError::DiskNotFound(cid.to_string()))
    }

    /// Locate the disk `cid` and move it if the datastore holding it is
    /// not in `accessible_datastores`.
    ///
    /// When the disk is already accessible this is a pure read — the
    /// located disk comes back unchanged. Otherwise a destination is
    /// picked within `cluster` (sized to the disk's current size),
    /// validated against `accessible_datastores`, and the image is moved
    /// in a single best-effort attempt with no rollback. The capacity
    /// pick and the accessibility check can observe different topology
    /// snapshots, which is why the picked destination is re-validated
    /// here rather than trusted.
    pub async fn find_and_move(
        &self,
        cid: &str,
        cluster: &Cluster,
        target_datacenter: &str,
        accessible_datastores: &[String],
    ) -> DiskResult<Disk> {
        let disk = self.find(cid).await?;

        let current = &disk.datastore().name;
        if accessible_datastores.iter().any(|name| name == current) {
            tracing::debug!(%cid, datastore = %current, "disk already accessible");
            return Ok(disk);
        }

        let destination = self
            .resources
            .pick_persistent_datastore_in_cluster(cluster, disk.size_in_mb())
            .await
            .ok_or(DiskError::NoDiskSpace(disk.size_in_mb()))?;

        if !accessible_datastores
            .iter()
            .any(|name| name == &destination.name)
        {
            return Err(DiskError::DatastoreNotAccessible {
                datastore: destination.name,
                cluster: cluster.name.clone(),
            });
        }

        let dest_path = disk::disk_path(&destination.name, &self.options.disk_folder, cid);
        tracing::info!(
            %cid,
            from = %current,
            to = %destination.name,
            cluster = %cluster.name,
            "moving persistent disk"
        );

        self.client
            .create_datastore_folder(
                &disk::folder_path(&destination.name, &self.options.disk_folder),
                self.datacenter.handle(),
            )
            .await?;
        self.client
            .move_disk(
                target_datacenter,
                &disk.path(),
                target_datacenter,
                &dest_path,
            )
            .await?;

        Ok(Disk::new(
            cid,
            disk.size_in_mb(),
            destination,
            self.options.disk_folder.clone(),
        ))
    }
}
