//! One stack deploy, end to end.
//!
//! Sequence: validate the request and the model, expand it to the
//! dependencies that need redeploying, stop early if a healthy-condition
//! dependency is crash-looping, then apply volumes, services, and
//! endpoints. Waiting for readiness is left to the caller.

use std::time::Duration;

use berth_common::config::DeployConfig;
use berth_common::constants::DEFAULT_NAMESPACE;
use berth_common::error::Result;
use berth_common::types::CancelFlag;
use berth_model::Stack;
use berth_resources::ObjectKind;
use berth_translate::{StackStatus, workload_kind};

use crate::client::ClusterClient;
use crate::deployer::{ApplyOutcome, Deployer};
use crate::health::check_restart_budget;
use crate::resolver::{add_dependent_services_if_not_present, deploy_order, validate_defined_services};
use crate::scope::{endpoints_in_scope, volumes_in_scope};

/// Caller choices for one deploy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployOptions {
    /// Services to deploy, in request order; empty means every service.
    pub services: Vec<String>,
    /// Rebuild images before deploying. Images are built upstream.
    pub force_build: bool,
    /// Wait for the deployed services to run.
    pub wait: bool,
    /// Upper bound on the wait.
    pub timeout: Duration,
}

/// One applied object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedObject {
    /// Object kind.
    pub kind: ObjectKind,
    /// Object name.
    pub name: String,
    /// What the apply did.
    pub outcome: ApplyOutcome,
}

/// Result of a successful deploy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployReport {
    /// Services deployed, in apply order.
    pub services: Vec<String>,
    /// Every applied object, in apply order.
    pub applied: Vec<AppliedObject>,
}

impl DeployReport {
    fn record(&mut self, kind: ObjectKind, name: &str, outcome: ApplyOutcome) {
        self.applied.push(AppliedObject {
            kind,
            name: name.to_string(),
            outcome,
        });
    }
}

/// Fills in the namespace of a stack that does not declare one.
pub fn apply_default_namespace(stack: &mut Stack, config: &DeployConfig) {
    if stack.namespace.is_empty() {
        stack.namespace = config
            .namespace
            .clone()
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
    }
}

/// Deploys a stack in one pass.
///
/// Nothing is written to the cluster before validation, dependency
/// expansion, and the restart budget check have passed. The stack
/// configuration record moves from `progressing` to `deployed`, or to
/// `error` when an apply fails. A pass cancelled before its first write
/// leaves the cluster untouched.
///
/// # Errors
///
/// Returns `UndefinedServices` or `InvalidStack` on validation failure,
/// `RestartLimitExceeded` when a dependency is crash-looping, `Cancelled`
/// when interrupted, or any cluster error.
pub fn deploy_stack(
    client: &dyn ClusterClient,
    stack: &Stack,
    options: &DeployOptions,
    config: &DeployConfig,
    cancel: &CancelFlag,
) -> Result<DeployReport> {
    validate_defined_services(stack, &options.services)?;
    berth_model::validator::validate(stack)?;

    let requested = if options.services.is_empty() {
        stack.service_names()
    } else {
        options.services.clone()
    };
    let services = add_dependent_services_if_not_present(client, stack, &requested)?;
    tracing::info!(
        stack = %stack.name,
        services = ?services,
        force_build = options.force_build,
        "deploying stack"
    );

    for name in &services {
        if stack.service(name)?.healthy_dependencies().next().is_some() {
            check_restart_budget(client, stack, name)?;
        }
    }

    cancel.check()?;
    let deployer = Deployer::new(client, stack, config, cancel.clone());
    deployer.record_status(StackStatus::Progressing)?;
    match apply_all(&deployer, stack, &services) {
        Ok(report) => {
            deployer.record_status(StackStatus::Deployed)?;
            tracing::info!(stack = %stack.name, objects = report.applied.len(), "stack deployed");
            Ok(report)
        }
        Err(e) => {
            if let Err(record_err) = deployer.record_status(StackStatus::Error) {
                tracing::warn!(error = %record_err, "failed to record stack error status");
            }
            Err(e)
        }
    }
}

fn apply_all(deployer: &Deployer<'_>, stack: &Stack, services: &[String]) -> Result<DeployReport> {
    let mut report = DeployReport::default();

    for volume in volumes_in_scope(stack, services) {
        let outcome = deployer.deploy_volume(&volume)?;
        report.record(ObjectKind::PersistentVolumeClaim, &volume, outcome);
    }

    for name in deploy_order(stack, services) {
        let kind = workload_kind(stack.service(&name)?);
        let outcome = deployer.deploy_workload(&name)?;
        report.record(kind, &name, outcome);
        if let Some(outcome) = deployer.deploy_network_service(&name)? {
            report.record(ObjectKind::Service, &name, outcome);
        }
        report.services.push(name);
    }

    for endpoint in endpoints_in_scope(stack, services) {
        let outcome = deployer.deploy_endpoint(&endpoint)?;
        report.record(ObjectKind::Ingress, &endpoint, outcome);
    }

    Ok(report)
}
