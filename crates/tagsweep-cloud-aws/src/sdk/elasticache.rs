use super::api_error;
use crate::api::*;
use async_trait::async_trait;
use aws_sdk_elasticache::Client;
use tagsweep_cloud::ApiError;

pub struct SdkElastiCache {
    client: Client,
}

impl SdkElastiCache {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl ElastiCacheApi for SdkElastiCache {
    async fn describe_cache_cluster(&self, id: &str) -> ApiResult<CacheCluster> {
        let output = self
            .client
            .describe_cache_clusters()
            .cache_cluster_id(id)
            .send()
            .await
            .map_err(api_error)?;
        output
            .cache_clusters()
            .first()
            .map(|cluster| CacheCluster {
                id: cluster.cache_cluster_id().unwrap_or(id).to_string(),
                status: cluster.cache_cluster_status().unwrap_or_default().to_string(),
                replication_group_id: cluster.replication_group_id().map(str::to_string),
                subnet_group_name: cluster.cache_subnet_group_name().map(str::to_string),
            })
            .ok_or_else(|| {
                ApiError::new(
                    "CacheClusterNotFound",
                    format!("CacheCluster {} not found", id),
                )
            })
    }

    async fn describe_replication_group(&self, id: &str) -> ApiResult<ReplicationGroup> {
        let output = self
            .client
            .describe_replication_groups()
            .replication_group_id(id)
            .send()
            .await
            .map_err(api_error)?;
        output
            .replication_groups()
            .first()
            .map(|group| ReplicationGroup {
                id: group.replication_group_id().unwrap_or(id).to_string(),
                status: group.status().unwrap_or_default().to_string(),
            })
            .ok_or_else(|| {
                ApiError::new(
                    "ReplicationGroupNotFoundFault",
                    format!("ReplicationGroup {} not found", id),
                )
            })
    }

    async fn delete_replication_group(
        &self,
        id: &str,
        retain_primary_cluster: bool,
    ) -> ApiResult<()> {
        self.client
            .delete_replication_group()
            .replication_group_id(id)
            .retain_primary_cluster(retain_primary_cluster)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn delete_cache_cluster(&self, id: &str) -> ApiResult<()> {
        self.client
            .delete_cache_cluster()
            .cache_cluster_id(id)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn describe_snapshots(&self, cache_cluster_id: &str) -> ApiResult<Vec<CacheSnapshot>> {
        let mut snapshots = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let output = self
                .client
                .describe_snapshots()
                .cache_cluster_id(cache_cluster_id)
                .set_marker(marker.take())
                .send()
                .await
                .map_err(api_error)?;
            snapshots.extend(output.snapshots().iter().map(|snapshot| CacheSnapshot {
                name: snapshot.snapshot_name().unwrap_or_default().to_string(),
                arn: snapshot.arn().map(str::to_string),
                status: snapshot.snapshot_status().unwrap_or_default().to_string(),
            }));
            match output.marker() {
                Some(next) if !next.is_empty() => marker = Some(next.to_string()),
                _ => break,
            }
        }
        Ok(snapshots)
    }

    async fn describe_snapshot(&self, name: &str) -> ApiResult<CacheSnapshot> {
        let output = self
            .client
            .describe_snapshots()
            .snapshot_name(name)
            .send()
            .await
            .map_err(api_error)?;
        output
            .snapshots()
            .first()
            .map(|snapshot| CacheSnapshot {
                name: name.to_string(),
                arn: snapshot.arn().map(str::to_string),
                status: snapshot.snapshot_status().unwrap_or_default().to_string(),
            })
            .ok_or_else(|| {
                ApiError::new(
                    "SnapshotNotFoundFault",
                    format!("Snapshot {} not found", name),
                )
            })
    }

    async fn delete_snapshot(&self, name: &str) -> ApiResult<()> {
        self.client
            .delete_snapshot()
            .snapshot_name(name)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn delete_cache_subnet_group(&self, name: &str) -> ApiResult<()> {
        self.client
            .delete_cache_subnet_group()
            .cache_subnet_group_name(name)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }
}
