use super::{ErrorCodes, status_after_delete};
use crate::api::{DeleteDbInstance, RdsApi, STATUS_DELETING};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tagsweep_cloud::{
    ActionStatus, ApiResultExt, ReportItem, ResourceManager, Result, cluster_tag_filters,
    matches_all,
};
use tracing::{debug, info};

const CODES: ErrorCodes = ErrorCodes {
    in_use: Some("InvalidDBInstanceState"),
    not_found: "DBInstanceNotFound",
};

/// Deletes RDS database instances.
///
/// The tag index does not cover DB instances, so every instance is listed
/// and its tags checked one by one.
pub struct RdsInstanceManager {
    rds: Arc<dyn RdsApi>,
    cluster_tag_key: String,
}

impl RdsInstanceManager {
    pub fn new(rds: Arc<dyn RdsApi>, cluster_tag_key: impl Into<String>) -> Self {
        Self {
            rds,
            cluster_tag_key: cluster_tag_key.into(),
        }
    }
}

#[async_trait]
impl ResourceManager for RdsInstanceManager {
    fn name(&self) -> &str {
        "AWS RDS Instance Manager"
    }

    async fn delete_resources_for_cluster(
        &mut self,
        cluster_id: &str,
        extra_tags: &BTreeMap<String, String>,
        dry_run: bool,
    ) -> Result<Vec<ReportItem>> {
        debug!(cluster_id, dry_run, "deleting database instances for cluster");
        let filters = cluster_tag_filters(&self.cluster_tag_key, cluster_id, extra_tags);

        let instances = self
            .rds
            .describe_db_instances()
            .await
            .context("failed to filter database instances")?;

        let mut matched = Vec::new();
        for instance in instances {
            let tags = self
                .rds
                .list_tags_for_resource(&instance.arn)
                .await
                .context("failed to filter database instances")?;
            if matches_all(&tags, &filters) {
                matched.push(instance);
            } else {
                debug!(resource = %instance.identifier, "database did not match cluster tags");
            }
        }

        let mut items = Vec::with_capacity(matched.len());
        for instance in matched {
            let mut item = ReportItem::delete(&instance.arn, &instance.identifier);
            if dry_run {
                item.action_status = ActionStatus::DryRun;
                items.push(item);
                continue;
            }

            let live = match self.rds.describe_db_instance(&instance.identifier).await {
                Ok(live) => live,
                Err(e) if e.is(CODES.not_found) => {
                    item.action_status = ActionStatus::Complete;
                    items.push(item);
                    continue;
                }
                Err(e) => return Err(e).context("failed to describe database instance"),
            };

            if live.status == STATUS_DELETING {
                debug!(resource = %live.identifier, "deletion of database already in progress");
                item.action_status = ActionStatus::InProgress;
                items.push(item);
                continue;
            }

            if live.deletion_protection {
                info!(resource = %live.identifier, "removing deletion protection on database");
                self.rds
                    .disable_deletion_protection(&live.identifier)
                    .await
                    .context("failed to remove deletion protection on database")?;
            }

            info!(resource = %live.identifier, "deleting database instance");
            let request = DeleteDbInstance {
                identifier: live.identifier.clone(),
                skip_final_snapshot: true,
                delete_automated_backups: true,
            };
            item.action_status = status_after_delete(
                self.rds.delete_db_instance(&request).await,
                ActionStatus::InProgress,
                &CODES,
                "failed to delete database instance",
            )?;
            items.push(item);
        }

        Ok(items)
    }
}
