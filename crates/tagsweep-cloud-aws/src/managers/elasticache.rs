use super::{ErrorCodes, find_tagged, status_after_delete};
use crate::api::{ElastiCacheApi, STATUS_DELETING};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tagsweep_cloud::{ActionStatus, ApiResultExt, ReportItem, ResourceManager, Result, TagQuery};
use tracing::{debug, info};

pub(crate) const RESOURCE_TYPE: &str = "elasticache:cluster";

const REPLICATION_GROUP_CODES: ErrorCodes = ErrorCodes {
    in_use: Some("InvalidReplicationGroupState"),
    not_found: "ReplicationGroupNotFoundFault",
};

const CACHE_CLUSTER_CODES: ErrorCodes = ErrorCodes {
    in_use: Some("InvalidCacheClusterState"),
    not_found: "CacheClusterNotFound",
};

const SUBNET_GROUP_CODES: ErrorCodes = ErrorCodes {
    in_use: Some("CacheSubnetGroupInUse"),
    not_found: "CacheSubnetGroupNotFoundFault",
};

/// Subnet group AWS creates for the default VPC; it cannot be deleted
const DEFAULT_SUBNET_GROUP: &str = "default";

#[derive(Debug)]
enum Target {
    ReplicationGroup(String),
    CacheCluster { id: String, status: String },
}

impl Target {
    fn id(&self) -> &str {
        match self {
            Target::ReplicationGroup(id) => id,
            Target::CacheCluster { id, .. } => id,
        }
    }
}

/// Deletes ElastiCache replication groups and standalone cache clusters,
/// then their cache subnet groups.
///
/// A subnet group cannot go while a cluster still uses it, and the cluster
/// may take several minutes to disappear. Subnet groups are therefore kept
/// in a pending list and retried on every call until the delete succeeds.
pub struct ElastiCacheManager {
    tagging: Arc<dyn TagQuery>,
    elasticache: Arc<dyn ElastiCacheApi>,
    cluster_tag_key: String,
    subnet_groups_to_delete: Vec<String>,
}

impl ElastiCacheManager {
    pub fn new(
        tagging: Arc<dyn TagQuery>,
        elasticache: Arc<dyn ElastiCacheApi>,
        cluster_tag_key: impl Into<String>,
    ) -> Self {
        Self {
            tagging,
            elasticache,
            cluster_tag_key: cluster_tag_key.into(),
            subnet_groups_to_delete: Vec::new(),
        }
    }

    /// Subnet groups still waiting for deletion
    pub fn pending_subnet_groups(&self) -> &[String] {
        &self.subnet_groups_to_delete
    }

    fn remember_subnet_group(&mut self, name: &str) {
        if name != DEFAULT_SUBNET_GROUP && !self.subnet_groups_to_delete.iter().any(|n| n == name)
        {
            self.subnet_groups_to_delete.push(name.to_string());
        }
    }

    async fn delete_target(&self, target: &Target) -> Result<ActionStatus> {
        match target {
            Target::ReplicationGroup(id) => {
                let group = match self.elasticache.describe_replication_group(id).await {
                    Ok(group) => group,
                    Err(e) if e.is(REPLICATION_GROUP_CODES.not_found) => {
                        return Ok(ActionStatus::Complete);
                    }
                    Err(e) => {
                        return Err(e)
                            .context("failed to describe elasticache replication group");
                    }
                };
                if group.status == STATUS_DELETING {
                    debug!(resource = %id, "deletion of replication group already in progress");
                    return Ok(ActionStatus::InProgress);
                }
                info!(resource = %id, "deleting elasticache replication group");
                status_after_delete(
                    self.elasticache.delete_replication_group(id, false).await,
                    ActionStatus::InProgress,
                    &REPLICATION_GROUP_CODES,
                    "failed to delete elasticache replication group",
                )
            }
            Target::CacheCluster { id, status } => {
                if status == STATUS_DELETING {
                    debug!(resource = %id, "deletion of cache cluster already in progress");
                    return Ok(ActionStatus::InProgress);
                }
                info!(resource = %id, "deleting elasticache cache cluster");
                status_after_delete(
                    self.elasticache.delete_cache_cluster(id).await,
                    ActionStatus::InProgress,
                    &CACHE_CLUSTER_CODES,
                    "failed to delete elasticache cache cluster",
                )
            }
        }
    }
}

#[async_trait]
impl ResourceManager for ElastiCacheManager {
    fn name(&self) -> &str {
        "AWS ElastiCache Manager"
    }

    async fn delete_resources_for_cluster(
        &mut self,
        cluster_id: &str,
        extra_tags: &BTreeMap<String, String>,
        dry_run: bool,
    ) -> Result<Vec<ReportItem>> {
        let resources = find_tagged(
            self.tagging.as_ref(),
            RESOURCE_TYPE,
            &self.cluster_tag_key,
            cluster_id,
            extra_tags,
            "elasticache clusters",
        )
        .await?;

        let mut targets: Vec<Target> = Vec::new();
        let mut seen = HashSet::new();
        let mut dry_run_subnet_groups: Vec<String> = Vec::new();

        for resource in resources {
            let cache_cluster_id = resource.resource_id()?;
            let cluster = match self
                .elasticache
                .describe_cache_cluster(cache_cluster_id)
                .await
            {
                Ok(cluster) => cluster,
                Err(e) if e.is(CACHE_CLUSTER_CODES.not_found) => {
                    debug!(resource = %cache_cluster_id, "cache cluster already gone");
                    continue;
                }
                Err(e) => return Err(e).context("failed to describe elasticache cache cluster"),
            };

            if let Some(subnet_group) = cluster.subnet_group_name.as_deref() {
                if dry_run {
                    if subnet_group != DEFAULT_SUBNET_GROUP
                        && !dry_run_subnet_groups.iter().any(|n| n == subnet_group)
                    {
                        dry_run_subnet_groups.push(subnet_group.to_string());
                    }
                } else {
                    self.remember_subnet_group(subnet_group);
                }
            }

            let target = match cluster.replication_group_id {
                Some(group_id) => Target::ReplicationGroup(group_id),
                None => Target::CacheCluster {
                    id: cluster.id,
                    status: cluster.status,
                },
            };
            if seen.insert(target.id().to_string()) {
                targets.push(target);
            } else {
                debug!(resource = %target.id(), "already scheduled for deletion");
            }
        }

        let mut items = Vec::new();
        for target in &targets {
            let name = match target {
                Target::ReplicationGroup(_) => "elasticache replication group",
                Target::CacheCluster { .. } => "elasticache cache cluster",
            };
            let mut item = ReportItem::delete(target.id(), name);
            item.action_status = if dry_run {
                ActionStatus::DryRun
            } else {
                self.delete_target(target).await?
            };
            items.push(item);
        }

        if dry_run {
            for subnet_group in self
                .subnet_groups_to_delete
                .iter()
                .chain(dry_run_subnet_groups.iter())
            {
                let id = format!("subnetgroup:{}", subnet_group);
                if items.iter().all(|item| item.id != id) {
                    items.push(
                        ReportItem::delete(id, "elasticache subnet group")
                            .with_status(ActionStatus::DryRun),
                    );
                }
            }
            return Ok(items);
        }

        let mut still_pending = Vec::new();
        for subnet_group in std::mem::take(&mut self.subnet_groups_to_delete) {
            let mut item = ReportItem::delete(
                format!("subnetgroup:{}", subnet_group),
                "elasticache subnet group",
            );
            info!(resource = %subnet_group, "deleting elasticache subnet group");
            let result = self
                .elasticache
                .delete_cache_subnet_group(&subnet_group)
                .await;
            match status_after_delete(
                result,
                ActionStatus::Complete,
                &SUBNET_GROUP_CODES,
                "failed to delete elasticache subnet group",
            ) {
                Ok(status) => {
                    if status == ActionStatus::Skipped {
                        still_pending.push(subnet_group);
                    }
                    item.action_status = status;
                    items.push(item);
                }
                Err(e) => {
                    still_pending.push(subnet_group);
                    self.subnet_groups_to_delete = still_pending;
                    return Err(e);
                }
            }
        }
        self.subnet_groups_to_delete = still_pending;

        Ok(items)
    }
}
