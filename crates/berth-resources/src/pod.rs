//! Pod templates, containers, and pod status.

use std::collections::BTreeMap;

use berth_common::types::Quantity;
use serde::{Deserialize, Serialize};

use crate::meta::{LabelSelector, ObjectMeta};

/// Template from which a workload creates its pods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PodTemplateSpec {
    /// Labels and annotations stamped on every pod.
    pub metadata: ObjectMeta,
    /// Pod specification.
    pub spec: PodSpec,
}

/// Desired state of a pod.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PodSpec {
    /// Containers run to completion, in order, before the main containers.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub init_containers: Vec<Container>,
    /// Main containers.
    pub containers: Vec<Container>,
    /// Volumes available to the containers.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
    /// Scheduling constraints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affinity: Option<Affinity>,
    /// Container restart policy (`Always`, `OnFailure`, `Never`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<String>,
    /// Seconds granted for graceful termination.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination_grace_period_seconds: Option<i64>,
}

/// A single container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Container {
    /// Container name, unique within the pod.
    pub name: String,
    /// Image reference.
    pub image: String,
    /// When to pull the image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_pull_policy: Option<String>,
    /// Entrypoint override.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    /// Entrypoint arguments.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Environment variables.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,
    /// Exposed ports.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ContainerPort>,
    /// Volume mounts.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,
    /// Compute limits and requests.
    pub resources: ResourceRequirements,
    /// Process privileges; absent means the cluster default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_context: Option<SecurityContext>,
    /// Working directory.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub working_dir: String,
    /// Readiness probe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness_probe: Option<Probe>,
}

/// An environment variable of a container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvVar {
    /// Variable name.
    pub name: String,
    /// Variable value.
    pub value: String,
}

/// A port exposed by a container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerPort {
    /// Port number.
    pub container_port: i32,
}

/// A volume mounted into a container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolumeMount {
    /// Name of the pod volume.
    pub name: String,
    /// Mount target.
    pub mount_path: String,
    /// Sub-directory of the volume to mount.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sub_path: String,
}

/// Compute resource limits and requests, keyed by resource name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceRequirements {
    /// Upper bounds.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub limits: BTreeMap<String, Quantity>,
    /// Guaranteed amounts.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub requests: BTreeMap<String, Quantity>,
}

/// Process privileges of a container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityContext {
    /// Capability changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Capabilities>,
    /// UID of the process.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_as_user: Option<i64>,
    /// GID of the process.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_as_group: Option<i64>,
}

/// Linux capabilities added to or dropped from a container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Added capabilities.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub add: Vec<String>,
    /// Dropped capabilities.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub drop: Vec<String>,
}

/// A periodic container check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Probe {
    /// Command-based check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exec: Option<ExecAction>,
    /// HTTP-based check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_get: Option<HttpGetAction>,
    /// Seconds before a check times out.
    pub timeout_seconds: i32,
    /// Seconds between checks.
    pub period_seconds: i32,
    /// Consecutive failures tolerated.
    pub failure_threshold: i32,
    /// Seconds before the first check.
    pub initial_delay_seconds: i32,
}

/// Runs a command inside the container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecAction {
    /// Command line.
    pub command: Vec<String>,
}

/// Issues an HTTP GET against the container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpGetAction {
    /// Request path.
    pub path: String,
    /// Container port.
    pub port: i32,
}

/// Scheduling constraints of a pod.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Affinity {
    /// Co-location constraints with other pods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod_affinity: Option<PodAffinity>,
}

/// Co-location constraints with other pods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PodAffinity {
    /// Hard constraints evaluated at scheduling time.
    pub required_during_scheduling_ignored_during_execution: Vec<PodAffinityTerm>,
}

/// Requires landing in the same topology domain as the selected pods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PodAffinityTerm {
    /// Pods to co-locate with.
    pub label_selector: LabelSelector,
    /// Node label defining the topology domain.
    pub topology_key: String,
}

/// A pod volume backed by a persistent volume claim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Volume {
    /// Volume name referenced by mounts.
    pub name: String,
    /// Name of the backing claim.
    pub claim_name: String,
}

/// A running pod, as observed through the cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pod {
    /// Pod metadata.
    pub metadata: ObjectMeta,
    /// Observed state.
    pub status: PodStatus,
}

impl Pod {
    /// Returns the highest restart count among the pod's containers.
    #[must_use]
    pub fn max_restart_count(&self) -> Option<i32> {
        self.status
            .container_statuses
            .iter()
            .map(|c| c.restart_count)
            .max()
    }
}

/// Observed state of a pod.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PodStatus {
    /// Per-container status.
    pub container_statuses: Vec<ContainerStatus>,
}

/// Observed state of one container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerStatus {
    /// Container name.
    pub name: String,
    /// Whether the readiness probe passes.
    pub ready: bool,
    /// Number of restarts since the pod was created.
    pub restart_count: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_restart_count_spans_all_containers() {
        let pod = Pod {
            status: PodStatus {
                container_statuses: vec![
                    ContainerStatus {
                        restart_count: 2,
                        ..ContainerStatus::default()
                    },
                    ContainerStatus {
                        restart_count: 7,
                        ..ContainerStatus::default()
                    },
                ],
            },
            ..Pod::default()
        };
        assert_eq!(pod.max_restart_count(), Some(7));
        assert_eq!(Pod::default().max_restart_count(), None);
    }

    #[test]
    fn probe_serializes_in_camel_case() {
        let probe = Probe {
            http_get: Some(HttpGetAction {
                path: "/healthz".into(),
                port: 8080,
            }),
            period_seconds: 10,
            ..Probe::default()
        };
        let json = serde_json::to_value(&probe).expect("serialize");
        assert_eq!(json["httpGet"]["path"], "/healthz");
        assert_eq!(json["periodSeconds"], 10);
        assert!(json.get("exec").is_none());
    }
}
