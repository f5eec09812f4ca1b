//! tagsweep AWS provider
//!
//! Resource managers for the AWS resources a cluster leaves behind:
//!
//! - RDS instances, snapshots and subnet groups
//! - ElastiCache replication groups, cache clusters, snapshots and subnet groups
//! - S3 buckets
//! - EC2 security groups and VPC peering connections
//!
//! Managers talk to AWS through the traits in [`api`]; [`sdk`] implements
//! them on top of the official SDK.

pub mod api;
pub mod client;
pub mod managers;
pub mod sdk;

#[cfg(test)]
mod testing;

pub use client::{AwsCredentials, AwsServices, cluster_client, load_sdk_config};
