//! `berth plan`: Render the objects a deploy would apply.

use std::io::Write;

use berth_common::config::DeployConfig;
use berth_deploy::resolver::{deploy_order, validate_defined_services};
use berth_deploy::scope::{endpoints_in_scope, volumes_in_scope};
use berth_model::Stack;
use berth_resources::{Object, Resource};
use berth_translate::{
    translate_ingress, translate_network_service, translate_volume_claim, translate_workload,
};
use clap::Args;

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Services to plan; every service when omitted.
    pub services: Vec<String>,

    /// Path to the stack snapshot.
    #[arg(short, long, default_value = "berth.yml")]
    pub file: String,
}

/// Executes the `plan` command.
///
/// Writes the translated objects to stdout as a multi-document YAML
/// stream, in apply order. Dependencies are not expanded since that needs
/// the cluster.
///
/// # Errors
///
/// Returns an error if loading, validation, or translation fails.
pub fn execute(args: PlanArgs) -> anyhow::Result<()> {
    let config = DeployConfig::from_env();
    let stack = super::load(&args.file, &config)?;
    let rendered = render_plan(&stack, &args.services, &config)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Translates the services in scope and renders them as YAML documents.
fn render_plan(stack: &Stack, services: &[String], config: &DeployConfig) -> anyhow::Result<String> {
    validate_defined_services(stack, services)?;
    berth_model::validator::validate(stack)?;
    let services = if services.is_empty() {
        stack.service_names()
    } else {
        services.to_vec()
    };

    let mut objects: Vec<Object> = Vec::new();
    for volume in volumes_in_scope(stack, &services) {
        objects.push(translate_volume_claim(stack, &volume)?.into_object());
    }
    for name in deploy_order(stack, &services) {
        objects.push(translate_workload(stack, &name, config)?.into_object());
        if let Some(network) = translate_network_service(stack, &name)? {
            objects.push(network.into_object());
        }
    }
    for endpoint in endpoints_in_scope(stack, &services) {
        objects.push(translate_ingress(stack, &endpoint)?.into_object());
    }

    let mut out = String::new();
    for object in &objects {
        out.push_str("---\n");
        out.push_str(&serde_yaml::to_string(object)?);
    }
    Ok(out)
}
