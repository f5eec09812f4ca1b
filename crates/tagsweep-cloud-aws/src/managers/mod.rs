//! Resource managers, one per AWS resource kind

mod elasticache;
mod elasticache_snapshot;
mod rds_instance;
mod rds_snapshot;
mod rds_subnet_group;
mod s3;
mod security_group;
mod vpc_peering;

pub use elasticache::ElastiCacheManager;
pub use elasticache_snapshot::ElastiCacheSnapshotManager;
pub use rds_instance::RdsInstanceManager;
pub use rds_snapshot::RdsSnapshotManager;
pub use rds_subnet_group::RdsSubnetGroupManager;
pub use s3::S3Manager;
pub use security_group::SecurityGroupManager;
pub use vpc_peering::VpcPeeringManager;

use std::collections::BTreeMap;
use tagsweep_cloud::{
    ActionStatus, ApiError, ApiResultExt, CloudError, Result, TagQuery, TaggedResource,
    cluster_tag_filters,
};
use tracing::debug;

/// Error codes a delete call may answer with that are not failures
pub(crate) struct ErrorCodes {
    /// A dependent still holds the resource; retried on the next run
    pub in_use: Option<&'static str>,
    /// The resource is already gone
    pub not_found: &'static str,
}

/// Turn the result of a delete call into the item's status
pub(crate) fn status_after_delete(
    result: std::result::Result<(), ApiError>,
    accepted: ActionStatus,
    codes: &ErrorCodes,
    context: &str,
) -> Result<ActionStatus> {
    match result {
        Ok(()) => Ok(accepted),
        Err(e) if codes.in_use.is_some_and(|code| e.is(code)) => {
            debug!("{} still in use, skipping: {}", context, e);
            Ok(ActionStatus::Skipped)
        }
        Err(e) if e.is(codes.not_found) => Ok(ActionStatus::Complete),
        Err(source) => Err(CloudError::Provider {
            context: context.to_string(),
            source,
        }),
    }
}

/// Resources of `resource_type` carrying the cluster tag and every extra tag
pub(crate) async fn find_tagged(
    tagging: &dyn TagQuery,
    resource_type: &str,
    cluster_tag_key: &str,
    cluster_id: &str,
    extra_tags: &BTreeMap<String, String>,
    plural: &str,
) -> Result<Vec<TaggedResource>> {
    let filters = cluster_tag_filters(cluster_tag_key, cluster_id, extra_tags);
    let resources = tagging
        .get_resources(&[resource_type], &filters)
        .await
        .context(format!("failed to filter {}", plural))?;
    debug!(
        cluster_id,
        resource_type,
        count = resources.len(),
        "filtering complete"
    );
    Ok(resources)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CODES: ErrorCodes = ErrorCodes {
        in_use: Some("DependencyViolation"),
        not_found: "InvalidGroup.NotFound",
    };

    #[test]
    fn test_status_after_delete() {
        let ok = status_after_delete(Ok(()), ActionStatus::Complete, &CODES, "ctx").unwrap();
        assert_eq!(ok, ActionStatus::Complete);

        let in_use = status_after_delete(
            Err(ApiError::new("DependencyViolation", "in use")),
            ActionStatus::Complete,
            &CODES,
            "ctx",
        )
        .unwrap();
        assert_eq!(in_use, ActionStatus::Skipped);

        let gone = status_after_delete(
            Err(ApiError::new("InvalidGroup.NotFound", "gone")),
            ActionStatus::InProgress,
            &CODES,
            "ctx",
        )
        .unwrap();
        assert_eq!(gone, ActionStatus::Complete);

        let err = status_after_delete(
            Err(ApiError::new("AccessDenied", "denied")),
            ActionStatus::Complete,
            &CODES,
            "failed to delete security group",
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "failed to delete security group: denied");
    }
}
