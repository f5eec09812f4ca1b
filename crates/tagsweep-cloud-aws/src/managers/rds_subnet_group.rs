use super::{ErrorCodes, status_after_delete};
use crate::api::RdsApi;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tagsweep_cloud::{
    ActionStatus, ApiResultExt, ReportItem, ResourceManager, Result, cluster_tag_filters,
    matches_all,
};
use tracing::{debug, info};

const CODES: ErrorCodes = ErrorCodes {
    in_use: Some("InvalidDBSubnetGroupStateFault"),
    not_found: "DBSubnetGroupNotFoundFault",
};

/// Deletes RDS subnet groups once the instances using them are gone
pub struct RdsSubnetGroupManager {
    rds: Arc<dyn RdsApi>,
    cluster_tag_key: String,
}

impl RdsSubnetGroupManager {
    pub fn new(rds: Arc<dyn RdsApi>, cluster_tag_key: impl Into<String>) -> Self {
        Self {
            rds,
            cluster_tag_key: cluster_tag_key.into(),
        }
    }
}

#[async_trait]
impl ResourceManager for RdsSubnetGroupManager {
    fn name(&self) -> &str {
        "AWS RDS Subnet Group Manager"
    }

    async fn delete_resources_for_cluster(
        &mut self,
        cluster_id: &str,
        extra_tags: &BTreeMap<String, String>,
        dry_run: bool,
    ) -> Result<Vec<ReportItem>> {
        let filters = cluster_tag_filters(&self.cluster_tag_key, cluster_id, extra_tags);
        let groups = self
            .rds
            .describe_db_subnet_groups()
            .await
            .context("failed to filter rds subnet groups")?;

        let mut items = Vec::new();
        for group in groups {
            let tags = self
                .rds
                .list_tags_for_resource(&group.arn)
                .await
                .context("failed to filter rds subnet groups")?;
            if !matches_all(&tags, &filters) {
                debug!(resource = %group.name, "subnet group did not match cluster tags");
                continue;
            }

            let mut item = ReportItem::delete(&group.arn, &group.name);
            if dry_run {
                item.action_status = ActionStatus::DryRun;
                items.push(item);
                continue;
            }

            info!(resource = %group.name, "deleting rds subnet group");
            item.action_status = status_after_delete(
                self.rds.delete_db_subnet_group(&group.name).await,
                ActionStatus::Complete,
                &CODES,
                "failed to delete rds subnet group",
            )?;
            items.push(item);
        }

        Ok(items)
    }
}
