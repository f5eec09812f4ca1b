use super::api_error;
use crate::api::ApiResult;
use async_trait::async_trait;
use aws_sdk_resourcegroupstagging::Client;
use aws_sdk_resourcegroupstagging::types::TagFilter as SdkTagFilter;
use tagsweep_cloud::{Tag, TagFilter, TagQuery, TaggedResource};

/// Tag index backed by the Resource Groups Tagging API
pub struct SdkTagging {
    client: Client,
}

impl SdkTagging {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl TagQuery for SdkTagging {
    async fn get_resources(
        &self,
        resource_types: &[&str],
        tag_filters: &[TagFilter],
    ) -> ApiResult<Vec<TaggedResource>> {
        let types: Vec<String> = resource_types.iter().map(|t| t.to_string()).collect();
        let filters: Vec<SdkTagFilter> = tag_filters
            .iter()
            .map(|filter| {
                SdkTagFilter::builder()
                    .key(&filter.key)
                    .set_values(Some(filter.values.clone()))
                    .build()
            })
            .collect();

        let mut resources = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let output = self
                .client
                .get_resources()
                .set_resource_type_filters(Some(types.clone()))
                .set_tag_filters(Some(filters.clone()))
                .set_pagination_token(token.take())
                .send()
                .await
                .map_err(api_error)?;

            for mapping in output.resource_tag_mapping_list() {
                let Some(arn) = mapping.resource_arn() else {
                    continue;
                };
                resources.push(TaggedResource {
                    arn: arn.to_string(),
                    tags: mapping
                        .tags()
                        .iter()
                        .map(|tag| Tag::new(tag.key(), tag.value()))
                        .collect(),
                });
            }

            match output.pagination_token() {
                Some(next) if !next.is_empty() => token = Some(next.to_string()),
                _ => break,
            }
        }
        Ok(resources)
    }
}
