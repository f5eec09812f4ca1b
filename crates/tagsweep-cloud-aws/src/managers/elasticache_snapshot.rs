use super::elasticache::RESOURCE_TYPE;
use super::{ErrorCodes, find_tagged, status_after_delete};
use crate::api::{CacheSnapshot, ElastiCacheApi, STATUS_DELETING};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tagsweep_cloud::{ActionStatus, ApiResultExt, ReportItem, ResourceManager, Result, TagQuery};
use tracing::{debug, info};

const CODES: ErrorCodes = ErrorCodes {
    in_use: Some("InvalidSnapshotState"),
    not_found: "SnapshotNotFoundFault",
};

/// Deletes snapshots taken from the cluster's cache clusters.
///
/// Snapshots are found through the live cache clusters, so this manager has
/// to run before [`super::ElastiCacheManager`] removes them.
pub struct ElastiCacheSnapshotManager {
    tagging: Arc<dyn TagQuery>,
    elasticache: Arc<dyn ElastiCacheApi>,
    cluster_tag_key: String,
}

impl ElastiCacheSnapshotManager {
    pub fn new(
        tagging: Arc<dyn TagQuery>,
        elasticache: Arc<dyn ElastiCacheApi>,
        cluster_tag_key: impl Into<String>,
    ) -> Self {
        Self {
            tagging,
            elasticache,
            cluster_tag_key: cluster_tag_key.into(),
        }
    }
}

#[async_trait]
impl ResourceManager for ElastiCacheSnapshotManager {
    fn name(&self) -> &str {
        "AWS ElastiCache Snapshot Manager"
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

        let mut snapshots: Vec<CacheSnapshot> = Vec::new();
        let mut seen = HashSet::new();
        for resource in resources {
            let cache_cluster_id = resource.resource_id()?;
            let found = self
                .elasticache
                .describe_snapshots(cache_cluster_id)
                .await
                .context("failed to describe elasticache snapshots")?;
            for snapshot in found {
                if seen.insert(snapshot.name.clone()) {
                    snapshots.push(snapshot);
                }
            }
        }
        debug!(cluster_id, count = snapshots.len(), "snapshots matched");

        let mut items = Vec::with_capacity(snapshots.len());
        for snapshot in snapshots {
            let id = snapshot.arn.clone().unwrap_or_else(|| snapshot.name.clone());
            let mut item = ReportItem::delete(id, &snapshot.name);
            if dry_run {
                item.action_status = ActionStatus::DryRun;
                items.push(item);
                continue;
            }

            let live = match self.elasticache.describe_snapshot(&snapshot.name).await {
                Ok(live) => live,
                Err(e) if e.is(CODES.not_found) => {
                    item.action_status = ActionStatus::Complete;
                    items.push(item);
                    continue;
                }
                Err(e) => return Err(e).context("failed to describe elasticache snapshot"),
            };
            if live.status == STATUS_DELETING {
                debug!(resource = %snapshot.name, "deletion of snapshot already in progress");
                item.action_status = ActionStatus::InProgress;
                items.push(item);
                continue;
            }

            info!(resource = %snapshot.name, "deleting elasticache snapshot");
            item.action_status = status_after_delete(
                self.elasticache.delete_snapshot(&snapshot.name).await,
                ActionStatus::InProgress,
                &CODES,
                "failed to delete elasticache snapshot",
            )?;
            items.push(item);
        }

        Ok(items)
    }
}
