//! In-memory fakes of the AWS capability traits

use crate::api::*;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tagsweep_cloud::{
    ApiError, DEFAULT_CLUSTER_TAG_KEY, Tag, TagFilter, TagQuery, TaggedResource, matches_all,
};

pub const CLUSTER_ID: &str = "testClusterID";

pub fn cluster_tags() -> Vec<Tag> {
    vec![Tag::new(DEFAULT_CLUSTER_TAG_KEY, CLUSTER_ID)]
}

/// Records calls as `method:argument` and replays configured failures
#[derive(Default)]
pub struct CallLog {
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<String, ApiError>>,
}

impl CallLog {
    pub fn record(&self, method: &str, argument: &str) -> ApiResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}:{}", method, argument));
        match self.failures.lock().unwrap().get(method) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        let prefix = format!("{}:", method);
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with(&prefix))
            .count()
    }

    /// Calls that change provider state
    pub fn mutating_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.starts_with("delete_") || call.starts_with("disable_"))
            .collect()
    }

    pub fn fail(&self, method: &str, err: ApiError) {
        self.failures
            .lock()
            .unwrap()
            .insert(method.to_string(), err);
    }

    pub fn succeed(&self, method: &str) {
        self.failures.lock().unwrap().remove(method);
    }
}

/// Tag index holding `(resource type, resource)` pairs
#[derive(Default)]
pub struct FakeTagging {
    resources: Mutex<Vec<(String, TaggedResource)>>,
    pub log: CallLog,
}

impl FakeTagging {
    pub fn with(resource_type: &str, arns: &[&str]) -> Self {
        let tagging = Self::default();
        for arn in arns {
            tagging.add(resource_type, arn, cluster_tags());
        }
        tagging
    }

    pub fn add(&self, resource_type: &str, arn: &str, tags: Vec<Tag>) {
        self.resources.lock().unwrap().push((
            resource_type.to_string(),
            TaggedResource {
                arn: arn.to_string(),
                tags,
            },
        ));
    }

    pub fn clear(&self) {
        self.resources.lock().unwrap().clear();
    }
}

#[async_trait]
impl TagQuery for FakeTagging {
    async fn get_resources(
        &self,
        resource_types: &[&str],
        tag_filters: &[TagFilter],
    ) -> ApiResult<Vec<TaggedResource>> {
        self.log.record("get_resources", &resource_types.join(","))?;
        Ok(self
            .resources
            .lock()
            .unwrap()
            .iter()
            .filter(|(kind, resource)| {
                resource_types.contains(&kind.as_str()) && matches_all(&resource.tags, tag_filters)
            })
            .map(|(_, resource)| resource.clone())
            .collect())
    }
}

#[derive(Default)]
pub struct FakeRds {
    pub instances: Vec<DbInstance>,
    pub snapshots: Vec<DbSnapshot>,
    pub subnet_groups: Vec<DbSubnetGroup>,
    pub tags: HashMap<String, Vec<Tag>>,
    pub deleted_instances: Mutex<Vec<DeleteDbInstance>>,
    pub log: CallLog,
}

#[async_trait]
impl RdsApi for FakeRds {
    async fn describe_db_instances(&self) -> ApiResult<Vec<DbInstance>> {
        self.log.record("describe_db_instances", "")?;
        Ok(self.instances.clone())
    }

    async fn describe_db_instance(&self, identifier: &str) -> ApiResult<DbInstance> {
        self.log.record("describe_db_instance", identifier)?;
        self.instances
            .iter()
            .find(|i| i.identifier == identifier)
            .cloned()
            .ok_or_else(|| ApiError::new("DBInstanceNotFound", "DBInstance not found"))
    }

    async fn list_tags_for_resource(&self, arn: &str) -> ApiResult<Vec<Tag>> {
        self.log.record("list_tags_for_resource", arn)?;
        Ok(self.tags.get(arn).cloned().unwrap_or_default())
    }

    async fn disable_deletion_protection(&self, identifier: &str) -> ApiResult<()> {
        self.log.record("disable_deletion_protection", identifier)
    }

    async fn delete_db_instance(&self, request: &DeleteDbInstance) -> ApiResult<()> {
        self.log.record("delete_db_instance", &request.identifier)?;
        self.deleted_instances.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn describe_db_snapshot(&self, identifier: &str) -> ApiResult<DbSnapshot> {
        self.log.record("describe_db_snapshot", identifier)?;
        self.snapshots
            .iter()
            .find(|s| s.identifier == identifier)
            .cloned()
            .ok_or_else(|| ApiError::new("DBSnapshotNotFound", "DBSnapshot not found"))
    }

    async fn delete_db_snapshot(&self, identifier: &str) -> ApiResult<()> {
        self.log.record("delete_db_snapshot", identifier)
    }

    async fn describe_db_subnet_groups(&self) -> ApiResult<Vec<DbSubnetGroup>> {
        self.log.record("describe_db_subnet_groups", "")?;
        Ok(self.subnet_groups.clone())
    }

    async fn delete_db_subnet_group(&self, name: &str) -> ApiResult<()> {
        self.log.record("delete_db_subnet_group", name)
    }
}

#[derive(Default)]
pub struct FakeElastiCache {
    pub clusters: Vec<CacheCluster>,
    pub replication_groups: Vec<ReplicationGroup>,
    pub snapshots: HashMap<String, Vec<CacheSnapshot>>,
    /// Snapshot status seen by `describe_snapshot`, when it differs from discovery
    pub live_status: HashMap<String, String>,
    pub log: CallLog,
}

#[async_trait]
impl ElastiCacheApi for FakeElastiCache {
    async fn describe_cache_cluster(&self, id: &str) -> ApiResult<CacheCluster> {
        self.log.record("describe_cache_cluster", id)?;
        self.clusters
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| ApiError::new("CacheClusterNotFound", "CacheCluster not found"))
    }

    async fn describe_replication_group(&self, id: &str) -> ApiResult<ReplicationGroup> {
        self.log.record("describe_replication_group", id)?;
        self.replication_groups
            .iter()
            .find(|g| g.id == id)
            .cloned()
            .ok_or_else(|| {
                ApiError::new("ReplicationGroupNotFoundFault", "ReplicationGroup not found")
            })
    }

    async fn delete_replication_group(
        &self,
        id: &str,
        retain_primary_cluster: bool,
    ) -> ApiResult<()> {
        self.log.record(
            "delete_replication_group",
            &format!("{}:retain={}", id, retain_primary_cluster),
        )
    }

    async fn delete_cache_cluster(&self, id: &str) -> ApiResult<()> {
        self.log.record("delete_cache_cluster", id)
    }

    async fn describe_snapshots(&self, cache_cluster_id: &str) -> ApiResult<Vec<CacheSnapshot>> {
        self.log.record("describe_snapshots", cache_cluster_id)?;
        Ok(self
            .snapshots
            .get(cache_cluster_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn describe_snapshot(&self, name: &str) -> ApiResult<CacheSnapshot> {
        self.log.record("describe_snapshot", name)?;
        let mut snapshot = self
            .snapshots
            .values()
            .flatten()
            .find(|snapshot| snapshot.name == name)
            .cloned()
            .ok_or_else(|| ApiError::new("SnapshotNotFoundFault", "snapshot not found"))?;
        if let Some(status) = self.live_status.get(name) {
            snapshot.status = status.clone();
        }
        Ok(snapshot)
    }

    async fn delete_snapshot(&self, name: &str) -> ApiResult<()> {
        self.log.record("delete_snapshot", name)
    }

    async fn delete_cache_subnet_group(&self, name: &str) -> ApiResult<()> {
        self.log.record("delete_cache_subnet_group", name)
    }
}

/// Buckets holding plain object keys, listed `page_size` keys at a time
#[derive(Default)]
pub struct FakeS3 {
    pub objects: HashMap<String, Vec<String>>,
    pub page_size: usize,
    pub deleted_keys: Mutex<Vec<String>>,
    pub log: CallLog,
}

#[async_trait]
impl S3Api for FakeS3 {
    async fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> ApiResult<ObjectPage> {
        self.log.record("list_objects", bucket)?;
        let keys = self.objects.get(bucket).cloned().unwrap_or_default();
        let start: usize = continuation_token
            .and_then(|t| t.parse().ok())
            .unwrap_or_default();
        let size = self.page_size.max(1);
        let end = (start + size).min(keys.len());
        Ok(ObjectPage {
            keys: keys[start.min(end)..end].to_vec(),
            next_token: (end < keys.len()).then(|| end.to_string()),
        })
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> ApiResult<()> {
        self.log.record("delete_objects", bucket)?;
        self.deleted_keys.lock().unwrap().extend_from_slice(keys);
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> ApiResult<()> {
        self.log.record("delete_bucket", bucket)
    }
}

#[derive(Default)]
pub struct FakeEc2 {
    pub log: CallLog,
}

#[async_trait]
impl Ec2Api for FakeEc2 {
    async fn delete_security_group(&self, group_id: &str) -> ApiResult<()> {
        self.log.record("delete_security_group", group_id)
    }

    async fn delete_vpc_peering_connection(&self, connection_id: &str) -> ApiResult<()> {
        self.log.record("delete_vpc_peering_connection", connection_id)
    }
}
