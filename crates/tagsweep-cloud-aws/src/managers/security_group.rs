use super::{ErrorCodes, find_tagged, status_after_delete};
use crate::api::Ec2Api;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tagsweep_cloud::{ActionStatus, ReportItem, ResourceManager, Result, TagQuery};
use tracing::info;

const RESOURCE_TYPE: &str = "ec2:security-group";

const CODES: ErrorCodes = ErrorCodes {
    in_use: Some("DependencyViolation"),
    not_found: "InvalidGroup.NotFound",
};

/// Deletes EC2 security groups. Runs last, after every resource that could
/// still reference a group.
pub struct SecurityGroupManager {
    tagging: Arc<dyn TagQuery>,
    ec2: Arc<dyn Ec2Api>,
    cluster_tag_key: String,
}

impl SecurityGroupManager {
    pub fn new(
        tagging: Arc<dyn TagQuery>,
        ec2: Arc<dyn Ec2Api>,
        cluster_tag_key: impl Into<String>,
    ) -> Self {
        Self {
            tagging,
            ec2,
            cluster_tag_key: cluster_tag_key.into(),
        }
    }
}

#[async_trait]
impl ResourceManager for SecurityGroupManager {
    fn name(&self) -> &str {
        "AWS Security Group Manager"
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
            "security groups",
        )
        .await?;

        let mut items = Vec::with_capacity(resources.len());
        for resource in resources {
            let group_id = resource.resource_id()?;
            let mut item = ReportItem::delete(&resource.arn, group_id);
            if dry_run {
                item.action_status = ActionStatus::DryRun;
                items.push(item);
                continue;
            }

            info!(resource = %group_id, "deleting security group");
            item.action_status = status_after_delete(
                self.ec2.delete_security_group(group_id).await,
                ActionStatus::Complete,
                &CODES,
                "failed to delete security group",
            )?;
            items.push(item);
        }

        Ok(items)
    }
}
