//! Report model and the merge engine used across polling cycles

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Action performed on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Delete,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Delete => write!(f, "delete"),
        }
    }
}

/// Progress of an action on a single resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionStatus {
    /// Resource found, nothing decided yet
    #[default]
    Empty,
    /// Action would be performed, but dry run is enabled
    DryRun,
    /// Action was issued and the provider is still working on it
    InProgress,
    /// Action is blocked by a dependent resource and will be retried
    Skipped,
    /// Resource is gone
    Complete,
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionStatus::Empty => write!(f, ""),
            ActionStatus::DryRun => write!(f, "dry run"),
            ActionStatus::InProgress => write!(f, "in progress"),
            ActionStatus::Skipped => write!(f, "skipped"),
            ActionStatus::Complete => write!(f, "complete"),
        }
    }
}

/// How `Skipped` items count towards convergence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkippedPolicy {
    /// Keep polling until skipped items complete
    #[default]
    Wait,
    /// Treat skipped items as terminal
    Ignore,
}

impl std::str::FromStr for SkippedPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "wait" => Ok(SkippedPolicy::Wait),
            "ignore" => Ok(SkippedPolicy::Ignore),
            other => Err(format!(
                "unsupported skipped policy '{}', use wait or ignore",
                other
            )),
        }
    }
}

impl ActionStatus {
    /// Whether no further change is expected for an item in this status
    pub fn is_terminal(self, policy: SkippedPolicy) -> bool {
        match self {
            ActionStatus::Complete | ActionStatus::DryRun => true,
            ActionStatus::Skipped => policy == SkippedPolicy::Ignore,
            ActionStatus::Empty | ActionStatus::InProgress => false,
        }
    }
}

/// Information about a single resource belonging to the cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportItem {
    /// ARN or provider-native identifier, unique within a report
    pub id: String,

    /// Human readable name
    pub name: String,

    pub action: Action,

    pub action_status: ActionStatus,
}

impl ReportItem {
    /// A freshly discovered resource scheduled for deletion
    pub fn delete(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            action: Action::Delete,
            action_status: ActionStatus::Empty,
        }
    }

    pub fn with_status(mut self, status: ActionStatus) -> Self {
        self.action_status = status;
        self
    }
}

/// Resources found for a cluster and what happened to them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub items: Vec<ReportItem>,
}

impl Report {
    pub fn new(items: Vec<ReportItem>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Reconcile the report of a newer run against this one.
    ///
    /// Items keep their position from `self`. Items seen again take the
    /// newer values, except that a complete item stays complete. Items that
    /// vanished are kept; an in-progress or skipped one is no longer there to
    /// wait on and is marked complete. Newly discovered items are appended in
    /// `current` order.
    pub fn merge_forward(&self, current: &Report) -> Report {
        let latest: HashMap<&str, &ReportItem> = current
            .items
            .iter()
            .map(|item| (item.id.as_str(), item))
            .collect();

        let mut items = Vec::with_capacity(self.items.len().max(current.items.len()));
        let mut carried: HashSet<&str> = HashSet::new();

        for previous in &self.items {
            carried.insert(previous.id.as_str());
            let merged = match latest.get(previous.id.as_str()) {
                Some(&seen) => {
                    let mut merged = seen.clone();
                    if previous.action_status == ActionStatus::Complete {
                        merged.action_status = ActionStatus::Complete;
                    }
                    merged
                }
                None => {
                    let mut vanished = previous.clone();
                    if matches!(
                        vanished.action_status,
                        ActionStatus::InProgress | ActionStatus::Skipped
                    ) {
                        vanished.action_status = ActionStatus::Complete;
                    }
                    vanished
                }
            };
            items.push(merged);
        }

        for item in &current.items {
            if carried.insert(item.id.as_str()) {
                items.push(item.clone());
            }
        }

        Report { items }
    }

    /// Whether every item reached a status the polling loop can stop on
    pub fn is_converged(&self, policy: SkippedPolicy) -> bool {
        self.items
            .iter()
            .all(|item| item.action_status.is_terminal(policy))
    }

    pub fn summary(&self) -> ReportSummary {
        let count = |status: ActionStatus| {
            self.items
                .iter()
                .filter(|item| item.action_status == status)
                .count()
        };
        ReportSummary {
            in_progress: count(ActionStatus::InProgress),
            skipped: count(ActionStatus::Skipped),
            complete: count(ActionStatus::Complete),
            dry_run: count(ActionStatus::DryRun),
        }
    }
}

/// Item counts per status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    pub in_progress: usize,
    pub skipped: usize,
    pub complete: usize,
    pub dry_run: usize,
}

impl std::fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} in progress, {} skipped, {} complete, {} dry run",
            self.in_progress, self.skipped, self.complete, self.dry_run
        )
    }
}
