//! tagsweep cloud core
//!
//! Provider-independent pieces of a tag-based cluster cleanup: the resource
//! manager contract, tag filtering, the coordinating client, report merging
//! and the polling driver. Provider crates implement [`ResourceManager`] for
//! each resource kind they can delete.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  tagsweep CLI                    │
//! │              (tagsweep cleanup)                  │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                tagsweep-cloud                    │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │   poll_until_converged ─► ClusterClient   │   │
//! │  │   trait ResourceManager { ... }           │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │  Tag Filter  │  │ Report Merge │            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼───────────┐
//! │ tagsweep-cloud-aws │
//! │     managers       │
//! └────────────────────┘
//! ```

pub mod client;
pub mod error;
pub mod manager;
pub mod poll;
pub mod report;
pub mod tag;

// Re-exports
pub use client::ClusterClient;
pub use error::{ApiError, ApiResultExt, CloudError, Result};
pub use manager::{ResourceKind, ResourceManager};
pub use poll::{PollConfig, PollOutcome, poll_until_converged};
pub use report::{Action, ActionStatus, Report, ReportItem, ReportSummary, SkippedPolicy};
pub use tag::{
    DEFAULT_CLUSTER_TAG_KEY, Tag, TagFilter, TagQuery, TaggedResource, cluster_tag_filters,
    matches_all, resource_id_from_arn,
};
