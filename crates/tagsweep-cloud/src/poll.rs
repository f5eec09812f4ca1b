//! Polling driver re-running the client until the report converges

use crate::client::ClusterClient;
use crate::error::Result;
use crate::report::{Report, SkippedPolicy};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

/// Polling behaviour
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Keep polling until the report converges
    pub watch: bool,

    /// Delay between cycles
    pub interval: Duration,

    /// Upper bound on the whole polling session
    pub timeout: Duration,

    pub skipped: SkippedPolicy,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            watch: false,
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(30 * 60),
            skipped: SkippedPolicy::Wait,
        }
    }
}

/// Result of a polling session
#[derive(Debug, Clone)]
pub struct PollOutcome {
    /// Accumulated report after the last cycle
    pub report: Report,
    pub cycles: u32,
    pub converged: bool,
    pub timed_out: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PollOutcome {
    /// Wall-clock time between the first scan and the last one
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Run `client` until its accumulated report converges.
///
/// `on_report` receives the merged report after every cycle. A client error
/// ends the session; reports already handed to `on_report` are unaffected.
/// Running out of time is not an error: the outcome is flagged `timed_out`.
pub async fn poll_until_converged<F>(
    client: &mut ClusterClient,
    cluster_id: &str,
    tags: &BTreeMap<String, String>,
    dry_run: bool,
    config: &PollConfig,
    mut on_report: F,
) -> Result<PollOutcome>
where
    F: FnMut(&Report),
{
    let started_at = Utc::now();
    let deadline = Instant::now() + config.timeout;
    let mut accumulated: Option<Report> = None;
    let mut cycles = 0u32;

    loop {
        cycles += 1;
        debug!(cluster_id, cycle = cycles, "starting cleanup cycle");

        let current = client
            .delete_resources_for_cluster(cluster_id, tags, dry_run)
            .await?;
        let report = match accumulated.take() {
            Some(previous) => previous.merge_forward(&current),
            None => current,
        };
        on_report(&report);

        let converged = report.is_converged(config.skipped);
        if converged || !config.watch || dry_run {
            if converged {
                info!(cluster_id, cycles, "cleanup converged");
            }
            return Ok(PollOutcome {
                report,
                cycles,
                converged,
                timed_out: false,
                started_at,
                finished_at: Utc::now(),
            });
        }

        if Instant::now() + config.interval > deadline {
            warn!(
                cluster_id,
                cycles,
                "cleanup did not converge within {}s, giving up",
                config.timeout.as_secs()
            );
            return Ok(PollOutcome {
                report,
                cycles,
                converged: false,
                timed_out: true,
                started_at,
                finished_at: Utc::now(),
            });
        }

        accumulated = Some(report);
        sleep(config.interval).await;
    }
}
