//! AWS service capabilities used by the resource managers
//!
//! Each trait covers only the calls its managers make. [`crate::sdk`] wraps
//! the `aws-sdk-*` clients; tests substitute in-memory fakes.

use async_trait::async_trait;
use tagsweep_cloud::{ApiError, Tag};

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Status AWS reports while a resource is being torn down
pub const STATUS_DELETING: &str = "deleting";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DbInstance {
    pub identifier: String,
    pub arn: String,
    pub status: String,
    pub deletion_protection: bool,
}

/// Parameters of a DB instance delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDbInstance {
    pub identifier: String,
    pub skip_final_snapshot: bool,
    pub delete_automated_backups: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DbSnapshot {
    pub identifier: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DbSubnetGroup {
    pub name: String,
    pub arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CacheCluster {
    pub id: String,
    pub status: String,
    pub replication_group_id: Option<String>,
    pub subnet_group_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReplicationGroup {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CacheSnapshot {
    pub name: String,
    pub arn: Option<String>,
    pub status: String,
}

/// One page of object keys
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectPage {
    pub keys: Vec<String>,
    pub next_token: Option<String>,
}

#[async_trait]
pub trait RdsApi: Send + Sync {
    async fn describe_db_instances(&self) -> ApiResult<Vec<DbInstance>>;

    async fn describe_db_instance(&self, identifier: &str) -> ApiResult<DbInstance>;

    async fn list_tags_for_resource(&self, arn: &str) -> ApiResult<Vec<Tag>>;

    /// Turn deletion protection off, applied immediately
    async fn disable_deletion_protection(&self, identifier: &str) -> ApiResult<()>;

    async fn delete_db_instance(&self, request: &DeleteDbInstance) -> ApiResult<()>;

    async fn describe_db_snapshot(&self, identifier: &str) -> ApiResult<DbSnapshot>;

    async fn delete_db_snapshot(&self, identifier: &str) -> ApiResult<()>;

    async fn describe_db_subnet_groups(&self) -> ApiResult<Vec<DbSubnetGroup>>;

    async fn delete_db_subnet_group(&self, name: &str) -> ApiResult<()>;
}

#[async_trait]
pub trait ElastiCacheApi: Send + Sync {
    async fn describe_cache_cluster(&self, id: &str) -> ApiResult<CacheCluster>;

    async fn describe_replication_group(&self, id: &str) -> ApiResult<ReplicationGroup>;

    async fn delete_replication_group(
        &self,
        id: &str,
        retain_primary_cluster: bool,
    ) -> ApiResult<()>;

    async fn delete_cache_cluster(&self, id: &str) -> ApiResult<()>;

    /// Snapshots taken from one cache cluster
    async fn describe_snapshots(&self, cache_cluster_id: &str) -> ApiResult<Vec<CacheSnapshot>>;

    async fn describe_snapshot(&self, name: &str) -> ApiResult<CacheSnapshot>;

    async fn delete_snapshot(&self, name: &str) -> ApiResult<()>;

    async fn delete_cache_subnet_group(&self, name: &str) -> ApiResult<()>;
}

#[async_trait]
pub trait S3Api: Send + Sync {
    /// One page of the bucket's object keys
    async fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> ApiResult<ObjectPage>;

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> ApiResult<()>;

    async fn delete_bucket(&self, bucket: &str) -> ApiResult<()>;
}

#[async_trait]
pub trait Ec2Api: Send + Sync {
    async fn delete_security_group(&self, group_id: &str) -> ApiResult<()>;

    async fn delete_vpc_peering_connection(&self, connection_id: &str) -> ApiResult<()>;
}
