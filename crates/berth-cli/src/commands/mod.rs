//! CLI command definitions and dispatch.

pub mod deploy;
pub mod plan;
pub mod status;

use std::path::Path;

use berth_common::config::DeployConfig;
use berth_deploy::orchestrator::apply_default_namespace;
use berth_model::Stack;
use clap::{Parser, Subcommand};

/// Berth: deploy compose stacks to a cluster.
#[derive(Parser, Debug)]
#[command(name = "berth", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Path to the cluster state file.
    #[arg(long, global = true, default_value = berth_common::constants::DEFAULT_STATE_FILE)]
    pub state_file: String,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply a stack, or some of its services, to the cluster.
    Deploy(deploy::DeployArgs),
    /// Render the objects a deploy would apply, without touching the cluster.
    Plan(plan::PlanArgs),
    /// Show whether each service of a stack is running.
    Status(status::StatusArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let state_file = cli.state_file;
    match cli.command {
        Command::Deploy(args) => deploy::execute(args, &state_file),
        Command::Plan(args) => plan::execute(args),
        Command::Status(args) => status::execute(args, &state_file),
    }
}

/// Loads a stack snapshot and settles its namespace.
fn load(file: &str, config: &DeployConfig) -> anyhow::Result<Stack> {
    let mut stack = berth_model::loader::load_stack(Path::new(file))?;
    apply_default_namespace(&mut stack, config);
    Ok(stack)
}
