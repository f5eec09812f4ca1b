use super::api_error;
use crate::api::*;
use async_trait::async_trait;
use aws_sdk_rds::Client;
use tagsweep_cloud::{ApiError, Tag};

pub struct SdkRds {
    client: Client,
}

impl SdkRds {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

fn db_instance(instance: &aws_sdk_rds::types::DbInstance) -> DbInstance {
    DbInstance {
        identifier: instance
            .db_instance_identifier()
            .unwrap_or_default()
            .to_string(),
        arn: instance.db_instance_arn().unwrap_or_default().to_string(),
        status: instance.db_instance_status().unwrap_or_default().to_string(),
        deletion_protection: instance.deletion_protection().unwrap_or_default(),
    }
}

#[async_trait]
impl RdsApi for SdkRds {
    async fn describe_db_instances(&self) -> ApiResult<Vec<DbInstance>> {
        let mut instances = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let output = self
                .client
                .describe_db_instances()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(api_error)?;
            instances.extend(output.db_instances().iter().map(db_instance));
            match output.marker() {
                Some(next) if !next.is_empty() => marker = Some(next.to_string()),
                _ => break,
            }
        }
        Ok(instances)
    }

    async fn describe_db_instance(&self, identifier: &str) -> ApiResult<DbInstance> {
        let output = self
            .client
            .describe_db_instances()
            .db_instance_identifier(identifier)
            .send()
            .await
            .map_err(api_error)?;
        output
            .db_instances()
            .first()
            .map(db_instance)
            .ok_or_else(|| {
                ApiError::new(
                    "DBInstanceNotFound",
                    format!("DBInstance {} not found", identifier),
                )
            })
    }

    async fn list_tags_for_resource(&self, arn: &str) -> ApiResult<Vec<Tag>> {
        let output = self
            .client
            .list_tags_for_resource()
            .resource_name(arn)
            .send()
            .await
            .map_err(api_error)?;
        Ok(output
            .tag_list()
            .iter()
            .map(|tag| {
                Tag::new(
                    tag.key().unwrap_or_default(),
                    tag.value().unwrap_or_default(),
                )
            })
            .collect())
    }

    async fn disable_deletion_protection(&self, identifier: &str) -> ApiResult<()> {
        self.client
            .modify_db_instance()
            .db_instance_identifier(identifier)
            .deletion_protection(false)
            .apply_immediately(true)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn delete_db_instance(&self, request: &DeleteDbInstance) -> ApiResult<()> {
        self.client
            .delete_db_instance()
            .db_instance_identifier(&request.identifier)
            .skip_final_snapshot(request.skip_final_snapshot)
            .delete_automated_backups(request.delete_automated_backups)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn describe_db_snapshot(&self, identifier: &str) -> ApiResult<DbSnapshot> {
        let output = self
            .client
            .describe_db_snapshots()
            .db_snapshot_identifier(identifier)
            .send()
            .await
            .map_err(api_error)?;
        output
            .db_snapshots()
            .first()
            .map(|snapshot| DbSnapshot {
                identifier: identifier.to_string(),
                status: snapshot.status().unwrap_or_default().to_string(),
            })
            .ok_or_else(|| {
                ApiError::new(
                    "DBSnapshotNotFound",
                    format!("DBSnapshot {} not found", identifier),
                )
            })
    }

    async fn delete_db_snapshot(&self, identifier: &str) -> ApiResult<()> {
        self.client
            .delete_db_snapshot()
            .db_snapshot_identifier(identifier)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn describe_db_subnet_groups(&self) -> ApiResult<Vec<DbSubnetGroup>> {
        let mut groups = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let output = self
                .client
                .describe_db_subnet_groups()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(api_error)?;
            groups.extend(output.db_subnet_groups().iter().map(|group| DbSubnetGroup {
                name: group.db_subnet_group_name().unwrap_or_default().to_string(),
                arn: group.db_subnet_group_arn().unwrap_or_default().to_string(),
            }));
            match output.marker() {
                Some(next) if !next.is_empty() => marker = Some(next.to_string()),
                _ => break,
            }
        }
        Ok(groups)
    }

    async fn delete_db_subnet_group(&self, name: &str) -> ApiResult<()> {
        self.client
            .delete_db_subnet_group()
            .db_subnet_group_name(name)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }
}
