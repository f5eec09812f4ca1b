use super::{ErrorCodes, find_tagged, status_after_delete};
use crate::api::{RdsApi, STATUS_DELETING};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tagsweep_cloud::{ActionStatus, ApiResultExt, ReportItem, ResourceManager, Result, TagQuery};
use tracing::{debug, info};

const RESOURCE_TYPE: &str = "rds:snapshot";

const CODES: ErrorCodes = ErrorCodes {
    in_use: Some("InvalidDBSnapshotState"),
    not_found: "DBSnapshotNotFound",
};

/// Deletes manual RDS snapshots tagged with the cluster id
pub struct RdsSnapshotManager {
    tagging: Arc<dyn TagQuery>,
    rds: Arc<dyn RdsApi>,
    cluster_tag_key: String,
}

impl RdsSnapshotManager {
    pub fn new(
        tagging: Arc<dyn TagQuery>,
        rds: Arc<dyn RdsApi>,
        cluster_tag_key: impl Into<String>,
    ) -> Self {
        Self {
            tagging,
            rds,
            cluster_tag_key: cluster_tag_key.into(),
        }
    }
}

#[async_trait]
impl ResourceManager for RdsSnapshotManager {
    fn name(&self) -> &str {
        "AWS RDS Snapshot Manager"
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
            "rds snapshots",
        )
        .await?;

        let mut items = Vec::with_capacity(resources.len());
        for resource in resources {
            let snapshot_id = resource.resource_id()?.to_string();
            let mut item = ReportItem::delete(&resource.arn, &snapshot_id);
            if dry_run {
                item.action_status = ActionStatus::DryRun;
                items.push(item);
                continue;
            }

            let snapshot = match self.rds.describe_db_snapshot(&snapshot_id).await {
                Ok(snapshot) => snapshot,
                Err(e) if e.is(CODES.not_found) => {
                    item.action_status = ActionStatus::Complete;
                    items.push(item);
                    continue;
                }
                Err(e) => return Err(e).context("failed to describe rds snapshot"),
            };

            if snapshot.status == STATUS_DELETING {
                debug!(resource = %snapshot_id, "deletion of rds snapshot already in progress");
                item.action_status = ActionStatus::InProgress;
                items.push(item);
                continue;
            }

            info!(resource = %snapshot_id, "deleting rds snapshot");
            item.action_status = status_after_delete(
                self.rds.delete_db_snapshot(&snapshot_id).await,
                ActionStatus::InProgress,
                &CODES,
                "failed to delete rds snapshot",
            )?;
            items.push(item);
        }

        Ok(items)
    }
}
