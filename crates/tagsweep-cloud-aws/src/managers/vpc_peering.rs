use super::{ErrorCodes, find_tagged, status_after_delete};
use crate::api::Ec2Api;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tagsweep_cloud::{ActionStatus, ReportItem, ResourceManager, Result, TagQuery};
use tracing::info;

const RESOURCE_TYPE: &str = "ec2:vpc-peering-connection";

const CODES: ErrorCodes = ErrorCodes {
    in_use: None,
    not_found: "InvalidVpcPeeringConnectionID.NotFound",
};

/// Deletes VPC peering connections
pub struct VpcPeeringManager {
    tagging: Arc<dyn TagQuery>,
    ec2: Arc<dyn Ec2Api>,
    cluster_tag_key: String,
}

impl VpcPeeringManager {
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
impl ResourceManager for VpcPeeringManager {
    fn name(&self) -> &str {
        "AWS VPC Peering Manager"
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
            "vpc peering connections",
        )
        .await?;

        let mut items = Vec::with_capacity(resources.len());
        for resource in resources {
            let connection_id = resource.resource_id()?;
            let mut item = ReportItem::delete(&resource.arn, connection_id);
            if dry_run {
                item.action_status = ActionStatus::DryRun;
                items.push(item);
                continue;
            }

            info!(resource = %connection_id, "deleting vpc peering connection");
            item.action_status = status_after_delete(
                self.ec2.delete_vpc_peering_connection(connection_id).await,
                ActionStatus::Complete,
                &CODES,
                "failed to delete vpc peering connection",
            )?;
            items.push(item);
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CLUSTER_ID, FakeEc2, FakeTagging};
    use tagsweep_cloud::{ApiError, DEFAULT_CLUSTER_TAG_KEY};

    const ARN: &str = "arn:aws:ec2:eu-west-1:123:vpc-peering-connection/pcx-0123";

    fn setup() -> (Arc<FakeEc2>, VpcPeeringManager) {
        let tagging = Arc::new(FakeTagging::with(RESOURCE_TYPE, &[ARN]));
        let ec2 = Arc::new(FakeEc2::default());
        let manager = VpcPeeringManager::new(tagging, ec2.clone(), DEFAULT_CLUSTER_TAG_KEY);
        (ec2, manager)
    }

    #[tokio::test]
    async fn test_connection_deleted() {
        let (ec2, mut manager) = setup();

        let items = manager
            .delete_resources_for_cluster(CLUSTER_ID, &BTreeMap::new(), false)
            .await
            .unwrap();

        assert_eq!(items[0].name, "pcx-0123");
        assert_eq!(items[0].action_status, ActionStatus::Complete);
        assert_eq!(ec2.log.count("delete_vpc_peering_connection"), 1);
    }

    #[tokio::test]
    async fn test_missing_connection_is_complete() {
        let (ec2, mut manager) = setup();
        ec2.log.fail(
            "delete_vpc_peering_connection",
            ApiError::new("InvalidVpcPeeringConnectionID.NotFound", "not found"),
        );

        let items = manager
            .delete_resources_for_cluster(CLUSTER_ID, &BTreeMap::new(), false)
            .await
            .unwrap();
        assert_eq!(items[0].action_status, ActionStatus::Complete);
    }

    #[tokio::test]
    async fn test_delete_failure() {
        let (ec2, mut manager) = setup();
        ec2.log.fail(
            "delete_vpc_peering_connection",
            ApiError::message("some delete error"),
        );

        let err = manager
            .delete_resources_for_cluster(CLUSTER_ID, &BTreeMap::new(), false)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to delete vpc peering connection: some delete error"
        );
    }

    #[tokio::test]
    async fn test_dry_run_and_no_match() {
        let (ec2, mut manager) = setup();

        let items = manager
            .delete_resources_for_cluster(CLUSTER_ID, &BTreeMap::new(), true)
            .await
            .unwrap();
        assert_eq!(items[0].action_status, ActionStatus::DryRun);

        let items = manager
            .delete_resources_for_cluster("otherCluster", &BTreeMap::new(), false)
            .await
            .unwrap();
        assert!(items.is_empty());
        assert!(ec2.log.mutating_calls().is_empty());
    }
}
