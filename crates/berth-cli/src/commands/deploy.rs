//! `berth deploy`: Apply a stack to the cluster.

use std::path::Path;
use std::time::{Duration, Instant};

use berth_common::config::DeployConfig;
use berth_common::constants::APP_NAME;
use berth_common::error::Result;
use berth_common::types::CancelFlag;
use berth_deploy::health::{check_restart_budget, is_satisfied};
use berth_deploy::{DeployOptions, DeployReport, MemoryCluster, deploy_stack};
use berth_model::Stack;
use clap::Args;

use crate::output::{
    BOLD, DIM, GREEN, RESET, YELLOW, format_duration, outcome_color, outcome_marker,
};

const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Arguments for the `deploy` command.
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Services to deploy; every service when omitted.
    pub services: Vec<String>,

    /// Path to the stack snapshot.
    #[arg(short, long, default_value = "berth.yml")]
    pub file: String,

    /// Wait until the deployed services are running.
    #[arg(long)]
    pub wait: bool,

    /// Seconds to wait before giving up.
    #[arg(long, default_value_t = 300)]
    pub timeout: u64,

    /// Rebuild images before deploying.
    #[arg(long)]
    pub build: bool,
}

/// Executes the `deploy` command.
///
/// Loads the snapshot, applies it to the cluster held in the state file,
/// and saves the state even when the deploy fails so the recorded stack
/// status survives. Ctrl+C stops the pass before its next apply.
///
/// # Errors
///
/// Returns an error if loading, deploying, saving, or waiting fails.
pub fn execute(args: DeployArgs, state_file: &str) -> anyhow::Result<()> {
    let config = DeployConfig::from_env();
    let stack = super::load(&args.file, &config)?;
    let state_path = Path::new(state_file);
    let cluster = MemoryCluster::open(state_path)?;

    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    ctrlc::set_handler(move || handler_flag.cancel())
        .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {e}"))?;

    let options = DeployOptions {
        services: args.services,
        force_build: args.build,
        wait: args.wait,
        timeout: Duration::from_secs(args.timeout),
    };

    eprintln!(
        "{BOLD}{APP_NAME}{RESET} deploying stack {BOLD}{}{RESET} to namespace {}",
        stack.name, stack.namespace
    );
    let result = deploy_stack(&cluster, &stack, &options, &config, &cancel);
    cluster.save()?;
    let report = result?;
    print_report(&report);

    if options.wait {
        eprintln!();
        eprintln!(
            "  Waiting up to {} for services to run...",
            format_duration(options.timeout)
        );
        wait_until_ready(state_path, &stack, &report.services, options.timeout, &cancel)?;
        eprintln!("  {GREEN}All services running.{RESET}");
    }

    Ok(())
}

fn print_report(report: &DeployReport) {
    eprintln!();
    for applied in &report.applied {
        let (marker, label) = outcome_marker(applied.outcome);
        let color = outcome_color(applied.outcome);
        eprintln!(
            "  {color}{marker}{RESET} {:<24} {DIM}{}{RESET}  {label}",
            applied.name, applied.kind
        );
    }
    eprintln!();
    eprintln!(
        "  {GREEN}{} object(s) applied for {} service(s).{RESET}",
        report.applied.len(),
        report.services.len()
    );
}

/// Polls the cluster state until every service is running.
///
/// The state file is re-read on every poll. A completed job counts as
/// ready. Cancellation or a crash-looping dependency aborts the wait;
/// other poll failures are retried and the last known pending services
/// are reported.
fn wait_until_ready(
    state_path: &Path,
    stack: &Stack,
    services: &[String],
    timeout: Duration,
    cancel: &CancelFlag,
) -> anyhow::Result<()> {
    let started = Instant::now();
    let mut pending = services.to_vec();
    loop {
        cancel.check()?;
        match pending_services(state_path, stack, services) {
            Ok(now) if now.is_empty() => return Ok(()),
            Ok(now) => pending = now,
            Err(e) if e.is_terminal() => return Err(e.into()),
            Err(e) => tracing::warn!(error = %e, "poll failed, retrying"),
        }
        if started.elapsed() >= timeout {
            anyhow::bail!(
                "timed out after {} waiting for: {}",
                format_duration(timeout),
                pending.join(", ")
            );
        }
        eprintln!("  {YELLOW}...{RESET} waiting for {}", pending.join(", "));
        std::thread::sleep(POLL_INTERVAL);
    }
}

fn pending_services(state_path: &Path, stack: &Stack, services: &[String]) -> Result<Vec<String>> {
    let cluster = MemoryCluster::open(state_path)?;
    let mut pending = Vec::new();
    for name in services {
        check_restart_budget(&cluster, stack, name)?;
        if !is_satisfied(&cluster, stack, name)? {
            pending.push(name.clone());
        }
    }
    Ok(pending)
}
