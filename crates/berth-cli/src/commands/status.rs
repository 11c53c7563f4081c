//! `berth status`: Show the running state of a stack.

use std::path::Path;

use berth_common::config::DeployConfig;
use berth_common::constants::{STATUS_FIELD, stack_config_map_name};
use berth_deploy::MemoryCluster;
use berth_deploy::client::fetch;
use berth_deploy::health::is_running;
use berth_resources::ConfigMap;
use berth_translate::workload_kind;
use clap::Args;

use crate::output::{BOLD, DIM, GREEN, RED, RESET};

/// Arguments for the `status` command.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Path to the stack snapshot.
    #[arg(short, long, default_value = "berth.yml")]
    pub file: String,
}

/// Executes the `status` command.
///
/// Prints the recorded stack status and whether each service runs.
///
/// # Errors
///
/// Returns an error if the snapshot or the state file cannot be read.
pub fn execute(args: StatusArgs, state_file: &str) -> anyhow::Result<()> {
    let config = DeployConfig::from_env();
    let stack = super::load(&args.file, &config)?;
    let cluster = MemoryCluster::open(Path::new(state_file))?;

    let record = fetch::<ConfigMap>(&cluster, &stack.namespace, &stack_config_map_name(&stack.name))?;
    let recorded = record
        .as_ref()
        .and_then(|cm| cm.data.get(STATUS_FIELD))
        .map_or("not deployed", String::as_str);
    eprintln!(
        "{BOLD}{}{RESET} {DIM}({}){RESET}: {recorded}",
        stack.name, stack.namespace
    );
    eprintln!();
    eprintln!("  {:<24} {:<24} STATE", "SERVICE", "KIND");
    for (name, svc) in &stack.services {
        let state = if is_running(&cluster, &stack, name)? {
            format!("{GREEN}running{RESET}")
        } else {
            format!("{RED}stopped{RESET}")
        };
        eprintln!("  {name:<24} {:<24} {state}", workload_kind(svc).as_str());
    }
    Ok(())
}
