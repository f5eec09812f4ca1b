//! AWS session setup and the default manager registry

use crate::managers::*;
use crate::sdk::{SdkEc2, SdkElastiCache, SdkRds, SdkS3, SdkTagging};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::config::Credentials;
use std::sync::Arc;
use tagsweep_cloud::{ClusterClient, ResourceKind, ResourceManager};
use tracing::debug;

/// Static AWS credentials
#[derive(Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"**redacted**")
            .field("session_token", &self.session_token.as_ref().map(|_| "**redacted**"))
            .finish()
    }
}

/// Shared SDK configuration for one region
pub async fn load_sdk_config(region: &str, credentials: &AwsCredentials) -> SdkConfig {
    let provider = Credentials::new(
        &credentials.access_key_id,
        &credentials.secret_access_key,
        credentials.session_token.clone(),
        None,
        "tagsweep",
    );
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .credentials_provider(provider)
        .load()
        .await
}

/// Service handles shared by the managers
#[derive(Clone)]
pub struct AwsServices {
    pub tagging: Arc<dyn tagsweep_cloud::TagQuery>,
    pub rds: Arc<dyn crate::api::RdsApi>,
    pub elasticache: Arc<dyn crate::api::ElastiCacheApi>,
    pub s3: Arc<dyn crate::api::S3Api>,
    pub ec2: Arc<dyn crate::api::Ec2Api>,
}

impl AwsServices {
    pub fn from_config(config: &SdkConfig) -> Self {
        Self {
            tagging: Arc::new(SdkTagging::new(config)),
            rds: Arc::new(SdkRds::new(config)),
            elasticache: Arc::new(SdkElastiCache::new(config)),
            s3: Arc::new(SdkS3::new(config)),
            ec2: Arc::new(SdkEc2::new(config)),
        }
    }

    fn manager(&self, kind: ResourceKind, cluster_tag_key: &str) -> Box<dyn ResourceManager> {
        let key = cluster_tag_key.to_string();
        match kind {
            ResourceKind::RdsInstance => Box::new(RdsInstanceManager::new(self.rds.clone(), key)),
            ResourceKind::RdsSnapshot => Box::new(RdsSnapshotManager::new(
                self.tagging.clone(),
                self.rds.clone(),
                key,
            )),
            ResourceKind::ElasticacheSnapshot => Box::new(ElastiCacheSnapshotManager::new(
                self.tagging.clone(),
                self.elasticache.clone(),
                key,
            )),
            ResourceKind::Elasticache => Box::new(ElastiCacheManager::new(
                self.tagging.clone(),
                self.elasticache.clone(),
                key,
            )),
            ResourceKind::S3 => {
                Box::new(S3Manager::new(self.tagging.clone(), self.s3.clone(), key))
            }
            ResourceKind::RdsSubnetGroup => {
                Box::new(RdsSubnetGroupManager::new(self.rds.clone(), key))
            }
            ResourceKind::VpcPeering => Box::new(VpcPeeringManager::new(
                self.tagging.clone(),
                self.ec2.clone(),
                key,
            )),
            ResourceKind::SecurityGroup => Box::new(SecurityGroupManager::new(
                self.tagging.clone(),
                self.ec2.clone(),
                key,
            )),
        }
    }
}

/// Client with one manager per enabled kind, in deletion order.
/// An empty `kinds` enables every kind.
pub fn cluster_client(
    services: &AwsServices,
    kinds: &[ResourceKind],
    cluster_tag_key: &str,
) -> ClusterClient {
    let mut client = ClusterClient::default();
    for kind in ResourceKind::ordered(kinds) {
        debug!(kind = %kind, "registering manager");
        client.register(services.manager(kind, cluster_tag_key));
    }
    client
}
