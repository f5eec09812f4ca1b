use super::{ErrorCodes, find_tagged, status_after_delete};
use crate::api::S3Api;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tagsweep_cloud::{
    ActionStatus, ApiError, ApiResultExt, ReportItem, ResourceManager, Result, TagQuery,
};
use tracing::{debug, info};

const RESOURCE_TYPE: &str = "s3";

const CODES: ErrorCodes = ErrorCodes {
    in_use: Some("BucketNotEmpty"),
    not_found: "NoSuchBucket",
};

/// Empties and deletes S3 buckets
pub struct S3Manager {
    tagging: Arc<dyn TagQuery>,
    s3: Arc<dyn S3Api>,
    cluster_tag_key: String,
}

impl S3Manager {
    pub fn new(
        tagging: Arc<dyn TagQuery>,
        s3: Arc<dyn S3Api>,
        cluster_tag_key: impl Into<String>,
    ) -> Self {
        Self {
            tagging,
            s3,
            cluster_tag_key: cluster_tag_key.into(),
        }
    }

    /// Delete every object in the bucket, one listed page at a time
    async fn empty_bucket(&self, bucket: &str) -> std::result::Result<usize, ApiError> {
        let mut deleted = 0;
        let mut token: Option<String> = None;
        loop {
            let page = self.s3.list_objects(bucket, token.as_deref()).await?;
            if !page.keys.is_empty() {
                self.s3.delete_objects(bucket, &page.keys).await?;
                deleted += page.keys.len();
            }
            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        Ok(deleted)
    }
}

#[async_trait]
impl ResourceManager for S3Manager {
    fn name(&self) -> &str {
        "AWS S3 Manager"
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
            "buckets",
        )
        .await?;

        let mut items = Vec::with_capacity(resources.len());
        for resource in resources {
            let bucket = resource.resource_id()?;
            let mut item = ReportItem::delete(&resource.arn, bucket);
            if dry_run {
                item.action_status = ActionStatus::DryRun;
                items.push(item);
                continue;
            }

            match self.empty_bucket(bucket).await {
                Ok(count) => debug!(resource = %bucket, count, "bucket emptied"),
                Err(e) if e.is(CODES.not_found) => {
                    item.action_status = ActionStatus::Complete;
                    items.push(item);
                    continue;
                }
                Err(e) => return Err(e).context("failed to empty bucket contents"),
            }

            info!(resource = %bucket, "deleting bucket");
            item.action_status = status_after_delete(
                self.s3.delete_bucket(bucket).await,
                ActionStatus::Complete,
                &CODES,
                "failed to delete bucket",
            )?;
            items.push(item);
        }

        Ok(items)
    }
}
