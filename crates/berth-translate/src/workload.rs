//! Deployments, stateful sets, and jobs.

use berth_common::config::DeployConfig;
use berth_common::constants::STATEFULSET_REVISION_HISTORY;
use berth_common::error::Result;
use berth_model::{Service, Stack};
use berth_resources::{
    Deployment, DeploymentSpec, Job, JobSpec, LabelSelector, Object, ObjectKind, ObjectMeta,
    PodSpec, PodTemplateSpec, Resource, StatefulSet, StatefulSetSpec,
};

use crate::container::translate_container;
use crate::kind::workload_kind;
use crate::labels::{selector_labels, service_labels};
use crate::strategy::{deployment_strategy, statefulset_strategy};
use crate::volumes::{
    translate_affinity, translate_claim_templates, translate_init_containers,
    translate_pod_volumes, translate_volume_mounts,
};

/// The workload object representing one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Workload {
    /// Continuous service without stack-declared volumes.
    Deployment(Deployment),
    /// Continuous service with stack-declared volumes.
    StatefulSet(StatefulSet),
    /// Run-to-completion service.
    Job(Job),
}

impl Workload {
    /// Returns the workload kind.
    #[must_use]
    pub const fn kind(&self) -> ObjectKind {
        match self {
            Self::Deployment(_) => ObjectKind::Deployment,
            Self::StatefulSet(_) => ObjectKind::StatefulSet,
            Self::Job(_) => ObjectKind::Job,
        }
    }

    /// Returns the workload metadata.
    #[must_use]
    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::Deployment(o) => o.metadata(),
            Self::StatefulSet(o) => o.metadata(),
            Self::Job(o) => o.metadata(),
        }
    }

    /// Wraps the workload in its kind-tagged envelope.
    #[must_use]
    pub fn into_object(self) -> Object {
        match self {
            Self::Deployment(o) => o.into_object(),
            Self::StatefulSet(o) => o.into_object(),
            Self::Job(o) => o.into_object(),
        }
    }
}

/// Translates a service into the workload of its kind.
///
/// # Errors
///
/// Returns `NotFound` if the stack has no such service.
pub fn translate_workload(stack: &Stack, name: &str, config: &DeployConfig) -> Result<Workload> {
    let svc = stack.service(name)?;
    let kind = workload_kind(svc);
    tracing::debug!(service = %name, kind = %kind, "translating service");
    let override_value = config.update_strategy.as_deref();
    Ok(match kind {
        ObjectKind::StatefulSet => {
            Workload::StatefulSet(translate_statefulset(stack, name, svc, override_value))
        }
        ObjectKind::Job => Workload::Job(translate_job(stack, name, svc)),
        _ => Workload::Deployment(translate_deployment(stack, name, svc, override_value)),
    })
}

fn object_meta(stack: &Stack, name: &str, svc: &Service) -> ObjectMeta {
    ObjectMeta {
        name: name.to_string(),
        namespace: stack.namespace.clone(),
        labels: service_labels(stack, name, svc),
        annotations: svc.annotations.clone(),
        resource_version: None,
    }
}

fn selector(stack: &Stack, name: &str) -> LabelSelector {
    LabelSelector {
        match_labels: selector_labels(stack, name),
        ..LabelSelector::default()
    }
}

fn template_meta(stack: &Stack, name: &str, svc: &Service) -> ObjectMeta {
    ObjectMeta {
        labels: service_labels(stack, name, svc),
        annotations: svc.annotations.clone(),
        ..ObjectMeta::default()
    }
}

/// Pod spec shared by stateful sets and jobs: init containers, affinity, and volumes.
fn volumed_pod_spec(name: &str, svc: &Service) -> PodSpec {
    let mut container = translate_container(name, svc);
    container.volume_mounts = translate_volume_mounts(svc);
    PodSpec {
        init_containers: translate_init_containers(name, svc),
        containers: vec![container],
        volumes: translate_pod_volumes(svc),
        affinity: translate_affinity(svc),
        restart_policy: None,
        termination_grace_period_seconds: Some(svc.stop_grace_period),
    }
}

/// Translates a continuous service without stack-declared volumes.
///
/// Deployments carry no volumes.
#[must_use]
pub fn translate_deployment(
    stack: &Stack,
    name: &str,
    svc: &Service,
    override_value: Option<&str>,
) -> Deployment {
    Deployment {
        metadata: object_meta(stack, name, svc),
        spec: DeploymentSpec {
            replicas: svc.replicas,
            selector: selector(stack, name),
            strategy: deployment_strategy(svc, override_value),
            template: PodTemplateSpec {
                metadata: template_meta(stack, name, svc),
                spec: PodSpec {
                    containers: vec![translate_container(name, svc)],
                    termination_grace_period_seconds: Some(svc.stop_grace_period),
                    ..PodSpec::default()
                },
            },
        },
        ..Deployment::default()
    }
}

/// Translates a continuous service mounting stack-declared volumes.
#[must_use]
pub fn translate_statefulset(
    stack: &Stack,
    name: &str,
    svc: &Service,
    override_value: Option<&str>,
) -> StatefulSet {
    let labels = service_labels(stack, name, svc);
    StatefulSet {
        metadata: object_meta(stack, name, svc),
        spec: StatefulSetSpec {
            replicas: svc.replicas,
            revision_history_limit: STATEFULSET_REVISION_HISTORY,
            selector: selector(stack, name),
            update_strategy: statefulset_strategy(svc, override_value),
            service_name: name.to_string(),
            template: PodTemplateSpec {
                metadata: template_meta(stack, name, svc),
                spec: volumed_pod_spec(name, svc),
            },
            volume_claim_templates: translate_claim_templates(svc, &labels),
        },
        ..StatefulSet::default()
    }
}

/// Translates a run-to-completion service.
#[must_use]
pub fn translate_job(stack: &Stack, name: &str, svc: &Service) -> Job {
    let mut pod = volumed_pod_spec(name, svc);
    pod.restart_policy = Some(svc.restart_policy.to_string());
    Job {
        metadata: object_meta(stack, name, svc),
        spec: JobSpec {
            completions: svc.replicas,
            parallelism: 1,
            backoff_limit: svc.backoff_limit,
            template: PodTemplateSpec {
                metadata: template_meta(stack, name, svc),
                spec: pod,
            },
        },
        ..Job::default()
    }
}
