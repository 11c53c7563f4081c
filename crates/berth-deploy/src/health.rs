//! Running and satisfaction predicates, and the restart budget breaker.

use berth_common::error::{BerthError, Result};
use berth_model::Stack;
use berth_resources::{Deployment, Job, ObjectKind, StatefulSet};
use berth_translate::labels::selector_labels;
use berth_translate::workload_kind;

use crate::client::{ClusterClient, fetch};

/// Observed progress of a service workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Observed {
    Absent,
    Replicas { ready: i32 },
    Job { active: i32, succeeded: i32 },
}

fn observe(client: &dyn ClusterClient, stack: &Stack, service: &str) -> Result<Observed> {
    let svc = stack.service(service)?;
    let ns = &stack.namespace;
    let observed = match workload_kind(svc) {
        ObjectKind::Job => fetch::<Job>(client, ns, service)?.map(|j| Observed::Job {
            active: j.status.active,
            succeeded: j.status.succeeded,
        }),
        ObjectKind::StatefulSet => fetch::<StatefulSet>(client, ns, service)?
            .map(|s| Observed::Replicas {
                ready: s.status.ready_replicas,
            }),
        _ => fetch::<Deployment>(client, ns, service)?.map(|d| Observed::Replicas {
            ready: d.status.ready_replicas,
        }),
    };
    Ok(observed.unwrap_or(Observed::Absent))
}

/// Returns whether a service currently has running replicas.
///
/// A job runs while it has active pods; a finished job, successful or not,
/// is not running. Other workloads run once a replica is ready.
///
/// # Errors
///
/// Returns `NotFound` for an unknown service, or any client error.
pub fn is_running(client: &dyn ClusterClient, stack: &Stack, service: &str) -> Result<bool> {
    Ok(match observe(client, stack, service)? {
        Observed::Absent => false,
        Observed::Replicas { ready } => ready > 0,
        Observed::Job { active, .. } => active > 0,
    })
}

/// Returns whether a service needs no redeploy to serve as a dependency.
///
/// Same as [`is_running`], except that a job which completed successfully
/// also satisfies its dependents.
///
/// # Errors
///
/// Returns `NotFound` for an unknown service, or any client error.
pub fn is_satisfied(client: &dyn ClusterClient, stack: &Stack, service: &str) -> Result<bool> {
    Ok(match observe(client, stack, service)? {
        Observed::Absent => false,
        Observed::Replicas { ready } => ready > 0,
        Observed::Job { active, succeeded } => active > 0 || succeeded > 0,
    })
}

/// Fails when a healthy-condition dependency is crash-looping.
///
/// For each dependency `service` waits on with the `healthy` condition, the
/// highest container restart count across its pods is compared with the
/// dependency's backoff limit.
///
/// # Errors
///
/// Returns `RestartLimitExceeded` naming the first dependency at or over
/// its limit, `NotFound` for an unknown service, or any client error.
pub fn check_restart_budget(client: &dyn ClusterClient, stack: &Stack, service: &str) -> Result<()> {
    let svc = stack.service(service)?;
    for dependency in svc.healthy_dependencies() {
        let limit = stack.service(dependency)?.backoff_limit;
        let pods = client.list_pods(&stack.namespace, &selector_labels(stack, dependency))?;
        let Some(restarts) = pods.iter().filter_map(|p| p.max_restart_count()).max() else {
            continue;
        };
        tracing::debug!(service = %dependency, restarts, limit, "checked restart budget");
        if restarts >= limit {
            return Err(BerthError::RestartLimitExceeded {
                service: dependency.to_string(),
                restarts,
            });
        }
    }
    Ok(())
}
