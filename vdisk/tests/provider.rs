//! Integration tests for disk placement and migration, driven through
//! scripted fakes of the topology views and the virtualization client.

use std::sync::Arc;

use vdisk::{
    AdapterType, Cluster, DiskError, DiskGeometry, DiskProvider, DiskType, ProviderOptions,
    VimFault,
};
use vdisk_test_utils::{datastore, FakeDatacenter, FakeResources, FakeVimClient, MovedDisk};

// ============================================================================
// TEST FIXTURES
// ============================================================================

/// Geometry that converts to exactly 128 MB.
const GEOMETRY_128_MB: DiskGeometry = DiskGeometry {
    cylinders: 2_097_152,
    heads: 4,
    sectors: 8,
};

struct TestContext {
    client: Arc<FakeVimClient>,
    datacenter: Arc<FakeDatacenter>,
    resources: Arc<FakeResources>,
    provider: DiskProvider,
}

impl TestContext {
    fn new() -> Self {
        init_tracing();
        let client = Arc::new(FakeVimClient::new());
        let datacenter = Arc::new(FakeDatacenter::new("dc-1", "dc-1-mob"));
        let resources = Arc::new(FakeResources::new());
        let provider = DiskProvider::new(
            client.clone(),
            datacenter.clone(),
            resources.clone(),
            ProviderOptions {
                disk_folder: "fake-disk-path".into(),
                ..Default::default()
            },
        );
        Self {
            client,
            datacenter,
            resources,
            provider,
        }
    }

    /// Script a disk image with `geometry` for `cid` on `datastore_name`.
    fn seed_disk(&self, cid: &str, datastore_name: &str, geometry: DiskGeometry) {
        self.client.put_geometry(&disk_path(datastore_name, cid), geometry);
    }
}

fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

fn disk_path(datastore_name: &str, cid: &str) -> String {
    format!("[{datastore_name}] fake-disk-path/disk-{cid}.vmdk")
}

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

// ============================================================================
// CREATE
// ============================================================================

#[tokio::test]
async fn create_places_disk_on_picked_datastore() {
    let ctx = TestContext::new();
    ctx.datacenter.set_pick(Some(datastore("ds-1", 1024, 2048)));

    let disk = ctx.provider.create(24).await.unwrap();

    assert_eq!(disk.size_in_mb(), 24);
    assert_eq!(disk.datastore().name, "ds-1");
    assert_eq!(disk.path(), disk_path("ds-1", disk.cid()));

    // The pick was sized to the request.
    assert_eq!(ctx.datacenter.pick_requests(), vec![24]);

    // Parent folder first, then the create command itself.
    assert_eq!(
        ctx.client.created_folders(),
        vec![("[ds-1] fake-disk-path".to_string(), "dc-1-mob".to_string())]
    );
    let created = ctx.client.created_disks();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].path, disk.path());
    assert_eq!(created[0].datacenter, "dc-1-mob");
    assert_eq!(created[0].spec.capacity_kb, 24_576);
    assert_eq!(created[0].spec.disk_type, DiskType::Preallocated);
    assert_eq!(created[0].spec.adapter_type, AdapterType::LsiLogic);
}

#[tokio::test]
async fn create_generates_unique_cids() {
    let ctx = TestContext::new();
    ctx.datacenter.set_pick(Some(datastore("ds-1", 1024, 2048)));

    let first = ctx.provider.create(24).await.unwrap();
    let second = ctx.provider.create(24).await.unwrap();

    assert_ne!(first.cid(), second.cid());
    assert!(!first.cid().is_empty());
}

#[tokio::test]
async fn create_fails_when_no_datastore_fits() {
    let ctx = TestContext::new();
    ctx.datacenter.set_pick(None);

    let err = ctx.provider.create(24).await.unwrap_err();

    assert!(matches!(err, DiskError::NoDiskSpace(24)));
    assert!(ctx.client.created_disks().is_empty());
    assert!(ctx.client.created_folders().is_empty());
}

// ============================================================================
// FIND
// ============================================================================

#[tokio::test]
async fn find_returns_disk_with_converted_size() {
    let ctx = TestContext::new();
    ctx.datacenter
        .set_persistent_datastores(vec![datastore("ds-1", 1024, 2048)]);
    ctx.seed_disk("disk-cid", "ds-1", GEOMETRY_128_MB);

    let disk = ctx.provider.find("disk-cid").await.unwrap();

    assert_eq!(disk.cid(), "disk-cid");
    assert_eq!(disk.size_in_mb(), 128);
    assert_eq!(disk.datastore().name, "ds-1");
    assert_eq!(disk.path(), disk_path("ds-1", "disk-cid"));
}

#[tokio::test]
async fn find_rounds_partial_megabytes_up() {
    let ctx = TestContext::new();
    ctx.datacenter
        .set_persistent_datastores(vec![datastore("ds-1", 1024, 2048)]);
    ctx.seed_disk(
        "disk-cid",
        "ds-1",
        DiskGeometry {
            cylinders: 2_041_000,
            heads: 4,
            sectors: 8,
        },
    );

    let disk = ctx.provider.find("disk-cid").await.unwrap();
    assert_eq!(disk.size_in_mb(), 125);
}

#[tokio::test]
async fn find_stops_at_first_matching_datastore() {
    let ctx = TestContext::new();
    ctx.datacenter.set_persistent_datastores(vec![
        datastore("ds-1", 1024, 2048),
        datastore("ds-2", 1024, 2048),
    ]);
    ctx.seed_disk("disk-cid", "ds-1", GEOMETRY_128_MB);
    ctx.seed_disk("disk-cid", "ds-2", GEOMETRY_128_MB);

    let disk = ctx.provider.find("disk-cid").await.unwrap();

    assert_eq!(disk.datastore().name, "ds-1");
    assert_eq!(ctx.client.queried_paths(), vec![disk_path("ds-1", "disk-cid")]);
}

#[tokio::test]
async fn find_scans_candidates_in_enumeration_order() {
    let ctx = TestContext::new();
    ctx.datacenter.set_persistent_datastores(vec![
        datastore("ds-1", 1024, 2048),
        datastore("ds-2", 1024, 2048),
    ]);
    ctx.seed_disk("disk-cid", "ds-2", GEOMETRY_128_MB);

    let disk = ctx.provider.find("disk-cid").await.unwrap();

    assert_eq!(disk.datastore().name, "ds-2");
    assert_eq!(
        ctx.client.queried_paths(),
        vec![disk_path("ds-1", "disk-cid"), disk_path("ds-2", "disk-cid")]
    );
}

#[tokio::test]
async fn find_fails_when_disk_is_nowhere() {
    let ctx = TestContext::new();
    ctx.datacenter.set_persistent_datastores(vec![
        datastore("ds-1", 1024, 2048),
        datastore("ds-2", 1024, 2048),
    ]);

    let err = ctx.provider.find("disk-cid").await.unwrap_err();
    assert!(matches!(err, DiskError::DiskNotFound(cid) if cid == "disk-cid"));
}

#[tokio::test]
async fn find_propagates_faults_that_are_not_not_found() {
    let ctx = TestContext::new();
    ctx.datacenter.set_persistent_datastores(vec![
        datastore("ds-1", 1024, 2048),
        datastore("ds-2", 1024, 2048),
    ]);
    ctx.client
        .put_fault(&disk_path("ds-1", "disk-cid"), "permission denied");
    ctx.seed_disk("disk-cid", "ds-2", GEOMETRY_128_MB);

    let err = ctx.provider.find("disk-cid").await.unwrap_err();

    // The scan aborts on the hard fault instead of trying ds-2.
    assert!(matches!(
        err,
        DiskError::Client(VimFault::Fault { ref message }) if message == "permission denied"
    ));
    assert_eq!(ctx.client.queried_paths(), vec![disk_path("ds-1", "disk-cid")]);
}

#[tokio::test]
async fn find_twice_yields_identical_disks() {
    let ctx = TestContext::new();
    ctx.datacenter
        .set_persistent_datastores(vec![datastore("ds-1", 1024, 2048)]);
    ctx.seed_disk("disk-cid", "ds-1", GEOMETRY_128_MB);

    let first = ctx.provider.find("disk-cid").await.unwrap();
    let second = ctx.provider.find("disk-cid").await.unwrap();
    assert_eq!(first, second);
}

// ============================================================================
// FIND AND MOVE
// ============================================================================

#[tokio::test]
async fn find_and_move_is_a_no_op_when_disk_is_accessible() {
    let ctx = TestContext::new();
    ctx.datacenter
        .set_persistent_datastores(vec![datastore("ds-1", 1024, 2048)]);
    ctx.seed_disk("disk-cid", "ds-1", GEOMETRY_128_MB);
    let cluster = Cluster::new("cluster-1");

    let disk = ctx
        .provider
        .find_and_move("disk-cid", &cluster, "target-dc", &names(&["ds-1"]))
        .await
        .unwrap();

    assert_eq!(disk.datastore().name, "ds-1");
    assert_eq!(disk.path(), disk_path("ds-1", "disk-cid"));
    assert!(ctx.client.moved_disks().is_empty());
    assert!(ctx.resources.pick_requests().is_empty());
}

#[tokio::test]
async fn find_and_move_relocates_an_inaccessible_disk() {
    let ctx = TestContext::new();
    ctx.datacenter
        .set_persistent_datastores(vec![datastore("ds-1", 1024, 2048)]);
    ctx.seed_disk("disk-cid", "ds-1", GEOMETRY_128_MB);
    ctx.resources.set_pick(Some(datastore("ds-2", 4096, 8192)));
    let cluster = Cluster::new("cluster-1");

    let disk = ctx
        .provider
        .find_and_move("disk-cid", &cluster, "target-dc", &names(&["ds-2"]))
        .await
        .unwrap();

    assert_eq!(disk.cid(), "disk-cid");
    assert_eq!(disk.size_in_mb(), 128);
    assert_eq!(disk.datastore().name, "ds-2");
    assert_eq!(disk.path(), disk_path("ds-2", "disk-cid"));

    // Destination pick was sized to the disk's current size.
    assert_eq!(
        ctx.resources.pick_requests(),
        vec![("cluster-1".to_string(), 128)]
    );

    // Destination folder first, then the move itself.
    assert_eq!(
        ctx.client.created_folders(),
        vec![("[ds-2] fake-disk-path".to_string(), "dc-1-mob".to_string())]
    );
    assert_eq!(
        ctx.client.moved_disks(),
        vec![MovedDisk {
            source_datacenter: "target-dc".to_string(),
            source_path: disk_path("ds-1", "disk-cid"),
            dest_datacenter: "target-dc".to_string(),
            dest_path: disk_path("ds-2", "disk-cid"),
        }]
    );
}

#[tokio::test]
async fn find_and_move_fails_when_cluster_has_no_room() {
    let ctx = TestContext::new();
    ctx.datacenter
        .set_persistent_datastores(vec![datastore("ds-1", 1024, 2048)]);
    ctx.seed_disk("disk-cid", "ds-1", GEOMETRY_128_MB);
    ctx.resources.set_pick(None);
    let cluster = Cluster::new("cluster-1");

    let err = ctx
        .provider
        .find_and_move("disk-cid", &cluster, "target-dc", &names(&["ds-2"]))
        .await
        .unwrap_err();

    assert!(matches!(err, DiskError::NoDiskSpace(128)));
    assert!(ctx.client.moved_disks().is_empty());
}

#[tokio::test]
async fn find_and_move_rejects_an_inaccessible_destination() {
    let ctx = TestContext::new();
    ctx.datacenter
        .set_persistent_datastores(vec![datastore("ds-1", 1024, 2048)]);
    ctx.seed_disk("disk-cid", "ds-1", GEOMETRY_128_MB);
    // Capacity-valid pick that the requesting cluster cannot reach.
    ctx.resources.set_pick(Some(datastore("ds-3", 4096, 8192)));
    let cluster = Cluster::new("cluster-1");

    let err = ctx
        .provider
        .find_and_move("disk-cid", &cluster, "target-dc", &names(&["ds-2"]))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Datastore 'ds-3' is not accessible to cluster 'cluster-1'"
    );
    assert!(ctx.client.moved_disks().is_empty());
    assert!(ctx.client.created_folders().is_empty());
}

#[tokio::test]
async fn find_and_move_fails_when_disk_does_not_exist() {
    let ctx = TestContext::new();
    ctx.datacenter.set_persistent_datastores(vec![]);
    let cluster = Cluster::new("cluster-1");

    let err = ctx
        .provider
        .find_and_move("disk-cid", &cluster, "target-dc", &names(&["ds-1"]))
        .await
        .unwrap_err();

    assert!(matches!(err, DiskError::DiskNotFound(cid) if cid == "disk-cid"));
}
