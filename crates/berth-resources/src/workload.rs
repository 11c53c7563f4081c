//! Workload objects: deployments, stateful sets, and jobs.

use serde::{Deserialize, Serialize};

use crate::meta::{LabelSelector, ObjectMeta};
use crate::pod::PodTemplateSpec;
use crate::storage::PersistentVolumeClaim;

/// Stateless, continuously running replicas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deployment {
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Desired state.
    pub spec: DeploymentSpec,
    /// Observed state, owned by the cluster.
    pub status: DeploymentStatus,
}

/// Desired state of a deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentSpec {
    /// Desired replica count.
    pub replicas: i32,
    /// Pods managed by this deployment.
    pub selector: LabelSelector,
    /// How pods are replaced on update.
    pub strategy: DeploymentStrategy,
    /// Pod template.
    pub template: PodTemplateSpec,
}

/// Replacement strategy of a deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentStrategy {
    /// `RollingUpdate` or `Recreate`.
    #[serde(rename = "type")]
    pub strategy_type: String,
}

/// Observed state of a deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentStatus {
    /// Pods created.
    pub replicas: i32,
    /// Pods passing their readiness probe.
    pub ready_replicas: i32,
}

/// Replicas with stable identity and per-replica storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatefulSet {
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Desired state.
    pub spec: StatefulSetSpec,
    /// Observed state, owned by the cluster.
    pub status: StatefulSetStatus,
}

/// Desired state of a stateful set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatefulSetSpec {
    /// Desired replica count.
    pub replicas: i32,
    /// Revisions retained for rollback.
    pub revision_history_limit: i32,
    /// Pods managed by this stateful set.
    pub selector: LabelSelector,
    /// How pods are replaced on update.
    pub update_strategy: StatefulSetUpdateStrategy,
    /// Governing network service.
    pub service_name: String,
    /// Pod template.
    pub template: PodTemplateSpec,
    /// Claims created once per replica.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volume_claim_templates: Vec<PersistentVolumeClaim>,
}

/// Replacement strategy of a stateful set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatefulSetUpdateStrategy {
    /// `RollingUpdate` or `OnDelete`.
    #[serde(rename = "type")]
    pub strategy_type: String,
}

/// Observed state of a stateful set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatefulSetStatus {
    /// Pods created.
    pub replicas: i32,
    /// Pods passing their readiness probe.
    pub ready_replicas: i32,
}

/// Pods that run to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Job {
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Desired state.
    pub spec: JobSpec,
    /// Observed state, owned by the cluster.
    pub status: JobStatus,
}

/// Desired state of a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobSpec {
    /// Successful pods required.
    pub completions: i32,
    /// Pods run at the same time.
    pub parallelism: i32,
    /// Retries before the job is marked failed.
    pub backoff_limit: i32,
    /// Pod template.
    pub template: PodTemplateSpec,
}

/// Observed state of a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobStatus {
    /// Pods currently running.
    pub active: i32,
    /// Pods that completed successfully.
    pub succeeded: i32,
    /// Pods that failed.
    pub failed: i32,
}
