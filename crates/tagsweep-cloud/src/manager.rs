//! Resource manager trait and the catalogue of resource kinds

use crate::error::{CloudError, Result};
use crate::report::ReportItem;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Deletes every resource of one kind that belongs to a cluster.
///
/// Implementations follow the same sequence: find tagged resources, report
/// each one, then (unless `dry_run`) re-check its live state and delete it.
/// A manager lives across polling cycles, so it may keep state between calls
/// through `&mut self`.
#[async_trait]
pub trait ResourceManager: Send {
    /// Display name used in logs and error messages
    fn name(&self) -> &str;

    /// Delete (or, in a dry run, only report) the cluster's resources.
    ///
    /// Returns one item per distinct resource. Any fatal error discards the
    /// items of this call.
    async fn delete_resources_for_cluster(
        &mut self,
        cluster_id: &str,
        extra_tags: &BTreeMap<String, String>,
        dry_run: bool,
    ) -> Result<Vec<ReportItem>>;
}

/// Resource kinds a provider can sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    RdsInstance,
    RdsSnapshot,
    ElasticacheSnapshot,
    Elasticache,
    S3,
    RdsSubnetGroup,
    VpcPeering,
    SecurityGroup,
}

impl ResourceKind {
    /// Every kind, in the order managers run. Dependents are deleted before
    /// the resources they depend on.
    pub const ALL: [ResourceKind; 8] = [
        ResourceKind::RdsInstance,
        ResourceKind::RdsSnapshot,
        ResourceKind::ElasticacheSnapshot,
        ResourceKind::Elasticache,
        ResourceKind::S3,
        ResourceKind::RdsSubnetGroup,
        ResourceKind::VpcPeering,
        ResourceKind::SecurityGroup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::RdsInstance => "rds-instance",
            ResourceKind::RdsSnapshot => "rds-snapshot",
            ResourceKind::ElasticacheSnapshot => "elasticache-snapshot",
            ResourceKind::Elasticache => "elasticache",
            ResourceKind::S3 => "s3",
            ResourceKind::RdsSubnetGroup => "rds-subnet-group",
            ResourceKind::VpcPeering => "vpc-peering",
            ResourceKind::SecurityGroup => "security-group",
        }
    }

    /// The requested kinds in run order, without duplicates.
    /// An empty request selects every kind.
    pub fn ordered(requested: &[ResourceKind]) -> Vec<ResourceKind> {
        if requested.is_empty() {
            return Self::ALL.to_vec();
        }
        Self::ALL
            .into_iter()
            .filter(|kind| requested.contains(kind))
            .collect()
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CloudError::UnknownResourceKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip_names() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.as_str().parse::<ResourceKind>().unwrap(), kind);
        }
        assert!(matches!(
            "route-table".parse::<ResourceKind>(),
            Err(CloudError::UnknownResourceKind(_))
        ));
    }

    #[test]
    fn test_ordered_ignores_request_order() {
        let kinds = ResourceKind::ordered(&[
            ResourceKind::RdsSubnetGroup,
            ResourceKind::RdsInstance,
            ResourceKind::RdsSubnetGroup,
        ]);
        assert_eq!(
            kinds,
            vec![ResourceKind::RdsInstance, ResourceKind::RdsSubnetGroup]
        );
    }

    #[test]
    fn test_ordered_defaults_to_all() {
        assert_eq!(ResourceKind::ordered(&[]), ResourceKind::ALL.to_vec());
    }
}
