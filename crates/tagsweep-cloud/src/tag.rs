//! Tag filter query abstraction
//!
//! Providers that keep a central tag index answer [`TagQuery::get_resources`]
//! directly. Resource kinds the index does not cover list every resource,
//! fetch its tags and apply [`matches_all`] locally.

use crate::error::{ApiError, CloudError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Tag key carrying the cluster identifier
pub const DEFAULT_CLUSTER_TAG_KEY: &str = "integreatly.org/clusterID";

/// A single key/value tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Filter matching resources whose tag `key` holds any of `values`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    pub key: String,
    pub values: Vec<String>,
}

impl TagFilter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            values: vec![value.into()],
        }
    }

    pub fn matches(&self, tags: &[Tag]) -> bool {
        tags.iter()
            .any(|tag| tag.key == self.key && self.values.iter().any(|v| *v == tag.value))
    }
}

/// A resource returned by a tag query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedResource {
    pub arn: String,
    pub tags: Vec<Tag>,
}

impl TaggedResource {
    /// Provider-native identifier taken from the ARN
    pub fn resource_id(&self) -> Result<&str> {
        resource_id_from_arn(&self.arn)
    }
}

/// Provider capability answering tag predicates from a central index
#[async_trait]
pub trait TagQuery: Send + Sync {
    /// Resources of the given provider types matching every filter
    async fn get_resources(
        &self,
        resource_types: &[&str],
        tag_filters: &[TagFilter],
    ) -> std::result::Result<Vec<TaggedResource>, ApiError>;
}

/// Filters selecting a cluster's resources: the cluster tag first, then one
/// filter per extra tag in key order
pub fn cluster_tag_filters(
    cluster_tag_key: &str,
    cluster_id: &str,
    extra_tags: &BTreeMap<String, String>,
) -> Vec<TagFilter> {
    let mut filters = Vec::with_capacity(extra_tags.len() + 1);
    filters.push(TagFilter::new(cluster_tag_key, cluster_id));
    filters.extend(
        extra_tags
            .iter()
            .map(|(key, value)| TagFilter::new(key.as_str(), value.as_str())),
    );
    filters
}

/// AND across filters, OR within a filter's values. Stops at the first
/// filter that fails.
pub fn matches_all(tags: &[Tag], filters: &[TagFilter]) -> bool {
    for filter in filters {
        if !filter.matches(tags) {
            tracing::debug!("tag filter {} did not match", filter.key);
            return false;
        }
    }
    true
}

/// Last segment of an ARN, with any `type/` prefix removed.
///
/// `arn:aws:s3:::bucket` gives `bucket`,
/// `arn:aws:ec2:eu-west-1:123:security-group/sg-1` gives `sg-1`.
pub fn resource_id_from_arn(arn: &str) -> Result<&str> {
    let last = arn.rsplit(':').next().unwrap_or_default();
    let id = last.rsplit('/').next().unwrap_or_default();
    if id.is_empty() {
        return Err(CloudError::MalformedArn(arn.to_string()));
    }
    Ok(id)
}
