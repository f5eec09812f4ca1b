use crate::{credentials, table, utils};
use clap::{ArgAction, Args};
use colored::Colorize;
use std::time::Duration;
use tagsweep_cloud::{
    CloudError, PollConfig, PollOutcome, Report, ResourceKind, SkippedPolicy,
    poll_until_converged,
};
use tagsweep_cloud_aws::{AwsServices, cluster_client, load_sdk_config};
use tagsweep_config::Settings;
use tracing::debug;

#[derive(Args, Debug)]
pub struct CleanupArgs {
    /// Value of the cluster id tag
    pub cluster_id: String,

    /// AWS region [default: settings file, then eu-west-1]
    #[arg(short, long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Output format (table)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Only report what would be deleted; pass --dry-run=false to delete
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub dry_run: bool,

    /// Keep polling until every resource is gone
    #[arg(short, long)]
    pub watch: bool,

    /// Seconds between polls
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Give up watching after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Extra tag every resource must carry
    #[arg(long = "tag", value_name = "KEY=VALUE")]
    pub tags: Vec<String>,

    /// Only sweep these kinds (repeatable)
    #[arg(long = "resource-kind", value_name = "KIND")]
    pub resource_kinds: Vec<String>,

    /// How skipped resources count when watching (wait, ignore)
    #[arg(long)]
    pub skipped: Option<String>,

    /// Tag key holding the cluster id
    #[arg(long)]
    pub cluster_tag_key: Option<String>,
}

/// Flags merged over the settings file
#[derive(Debug)]
struct CleanupPlan {
    region: String,
    tags: std::collections::BTreeMap<String, String>,
    kinds: Vec<ResourceKind>,
    cluster_tag_key: String,
    poll: PollConfig,
}

fn resolve(args: &CleanupArgs, settings: &Settings) -> Result<CleanupPlan, CloudError> {
    let output = args.output.as_deref().unwrap_or(&settings.output);
    if output != "table" {
        return Err(CloudError::InvalidConfig(format!(
            "unsupported output format '{}', supported formats: table",
            output
        )));
    }

    let kinds = if args.resource_kinds.is_empty() {
        settings.resource_kinds.clone()
    } else {
        args.resource_kinds
            .iter()
            .map(|kind| kind.parse())
            .collect::<Result<Vec<ResourceKind>, _>>()?
    };

    let skipped = match args.skipped.as_deref() {
        Some(raw) => raw
            .parse::<SkippedPolicy>()
            .map_err(CloudError::InvalidConfig)?,
        None => settings.skipped,
    };

    let interval = args.interval.unwrap_or(settings.poll_interval_secs);
    if interval == 0 {
        return Err(CloudError::InvalidConfig(
            "--interval must be greater than zero".to_string(),
        ));
    }

    Ok(CleanupPlan {
        region: args.region.clone().unwrap_or_else(|| settings.region.clone()),
        tags: utils::parse_tags(&args.tags)?,
        kinds,
        cluster_tag_key: args
            .cluster_tag_key
            .clone()
            .unwrap_or_else(|| settings.cluster_tag_key.clone()),
        poll: PollConfig {
            watch: args.watch,
            interval: Duration::from_secs(interval),
            timeout: Duration::from_secs(args.timeout.unwrap_or(settings.poll_timeout_secs)),
            skipped,
        },
    })
}

/// Closing message after polling stops, if any
fn finish_line(outcome: &PollOutcome, dry_run: bool) -> Option<String> {
    let elapsed = outcome.elapsed().num_seconds();
    if outcome.timed_out {
        Some(
            format!(
                "⚠ Gave up after {} polls ({}s); some resources are still being deleted",
                outcome.cycles, elapsed
            )
            .yellow()
            .to_string(),
        )
    } else if outcome.converged && !dry_run {
        Some(
            format!("✓ Cleanup complete in {}s ({} polls)", elapsed, outcome.cycles)
                .green()
                .to_string(),
        )
    } else {
        None
    }
}

fn print_report(report: &Report) {
    println!();
    if report.is_empty() {
        println!("{}", "No resources found for this cluster".dimmed());
    } else {
        println!("{}", table::render(report));
    }
    println!("{}", report.summary().to_string().cyan());
}

pub async fn handle(args: CleanupArgs, settings: &Settings) -> anyhow::Result<()> {
    let plan = resolve(&args, settings)?;
    let credentials = credentials::from_env()?;
    debug!(cluster_id = %args.cluster_id, ?plan, "resolved cleanup plan");

    println!(
        "{} {} ({})",
        "Cleaning up cluster".blue(),
        args.cluster_id.cyan(),
        plan.region
    );
    if args.dry_run {
        println!(
            "{}",
            "Dry run: nothing will be deleted. Pass --dry-run=false to delete.".yellow()
        );
    }

    let sdk_config = load_sdk_config(&plan.region, &credentials).await;
    let services = AwsServices::from_config(&sdk_config);
    let mut client = cluster_client(&services, &plan.kinds, &plan.cluster_tag_key);

    let outcome = poll_until_converged(
        &mut client,
        &args.cluster_id,
        &plan.tags,
        args.dry_run,
        &plan.poll,
        print_report,
    )
    .await?;

    if let Some(line) = finish_line(&outcome, args.dry_run) {
        println!("{}", line);
    }

    Ok(())
}
