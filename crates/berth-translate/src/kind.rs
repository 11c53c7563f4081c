//! Workload kind selection.

use berth_model::{RestartPolicy, Service};
use berth_resources::ObjectKind;

/// Returns the workload kind representing a service.
///
/// Run-to-completion services become jobs. Continuous services mounting a
/// stack-declared volume become stateful sets; all others are deployments.
/// Only the model is consulted, so the deployer and the health evaluator
/// always agree on the kind.
#[must_use]
pub fn workload_kind(svc: &Service) -> ObjectKind {
    if svc.restart_policy == RestartPolicy::Never {
        ObjectKind::Job
    } else if svc.has_local_volumes() {
        ObjectKind::StatefulSet
    } else {
        ObjectKind::Deployment
    }
}
