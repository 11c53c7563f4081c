//! Main container of a service.

use std::collections::BTreeMap;
use std::time::Duration;

use berth_common::types::Quantity;
use berth_model::{ComputeResources, HealthCheck, Service};
use berth_resources::{
    Capabilities, Container, ContainerPort, EnvVar, ExecAction, HttpGetAction, Probe,
    ResourceRequirements, SecurityContext,
};

/// Builds the main container of a service, without volume mounts.
#[must_use]
pub fn translate_container(name: &str, svc: &Service) -> Container {
    Container {
        name: name.to_string(),
        image: svc.image.clone(),
        command: svc.entrypoint.clone(),
        args: svc.command.clone(),
        env: translate_env(svc),
        ports: translate_container_ports(svc),
        resources: translate_resources(svc),
        security_context: translate_security_context(svc),
        working_dir: svc.workdir.clone(),
        readiness_probe: svc.healthcheck.as_ref().map(translate_probe),
        ..Container::default()
    }
}

/// Environment entries in declaration order; unnamed entries are dropped.
#[must_use]
pub fn translate_env(svc: &Service) -> Vec<EnvVar> {
    svc.environment
        .iter()
        .filter(|e| !e.name.is_empty())
        .map(|e| EnvVar {
            name: e.name.clone(),
            value: e.value.clone(),
        })
        .collect()
}

/// Container ports in ascending order.
#[must_use]
pub fn translate_container_ports(svc: &Service) -> Vec<ContainerPort> {
    let mut ports: Vec<i32> = svc.ports.iter().map(|p| p.container_port).collect();
    ports.sort_unstable();
    ports
        .into_iter()
        .map(|container_port| ContainerPort { container_port })
        .collect()
}

/// Compute limits and requests; non-positive amounts are omitted.
#[must_use]
pub fn translate_resources(svc: &Service) -> ResourceRequirements {
    let Some(resources) = &svc.resources else {
        return ResourceRequirements::default();
    };
    ResourceRequirements {
        limits: positive_amounts(&resources.limits),
        requests: positive_amounts(&resources.requests),
    }
}

fn positive_amounts(amounts: &ComputeResources) -> BTreeMap<String, Quantity> {
    [("cpu", &amounts.cpu), ("memory", &amounts.memory)]
        .into_iter()
        .filter(|(_, q)| q.is_positive())
        .map(|(k, q)| (k.to_string(), q.clone()))
        .collect()
}

/// Process privileges, present only when capabilities or a user are set.
#[must_use]
pub fn translate_security_context(svc: &Service) -> Option<SecurityContext> {
    if svc.cap_add.is_empty() && svc.cap_drop.is_empty() && svc.user.is_none() {
        return None;
    }
    Some(SecurityContext {
        capabilities: Some(Capabilities {
            add: svc.cap_add.clone(),
            drop: svc.cap_drop.clone(),
        }),
        run_as_user: svc.user.and_then(|u| u.run_as_user),
        run_as_group: svc.user.and_then(|u| u.run_as_group),
    })
}

/// Readiness probe from a health check.
///
/// A non-empty test command wins over the HTTP target.
#[must_use]
pub fn translate_probe(hc: &HealthCheck) -> Probe {
    let mut probe = Probe {
        timeout_seconds: whole_seconds(hc.timeout),
        period_seconds: whole_seconds(hc.interval),
        failure_threshold: hc.retries,
        initial_delay_seconds: whole_seconds(hc.start_period),
        ..Probe::default()
    };
    if hc.test.is_empty() {
        let http = hc.http.clone().unwrap_or_default();
        probe.http_get = Some(HttpGetAction {
            path: http.path,
            port: http.port,
        });
    } else {
        probe.exec = Some(ExecAction {
            command: hc.test.clone(),
        });
    }
    probe
}

fn whole_seconds(d: Duration) -> i32 {
    i32::try_from(d.as_secs()).unwrap_or(i32::MAX)
}
