//! Service definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use berth_common::types::Quantity;
use serde::{Deserialize, Serialize};

use crate::volume::StackVolume;

/// Default number of tolerated container restarts.
pub const DEFAULT_BACKOFF_LIMIT: i32 = 5;

/// One deployable workload definition inside a stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    /// Container image reference.
    pub image: String,
    /// Overrides the image entrypoint.
    pub entrypoint: Vec<String>,
    /// Arguments passed to the entrypoint.
    pub command: Vec<String>,
    /// Environment variables, in declaration order.
    pub environment: Vec<EnvVar>,
    /// Published ports.
    pub ports: Vec<Port>,
    /// Volume mounts, in declaration order.
    pub volumes: Vec<StackVolume>,
    /// Compute and storage requirements.
    pub resources: Option<ServiceResources>,
    /// Readiness check.
    pub healthcheck: Option<HealthCheck>,
    /// Whether the workload runs continuously or to completion.
    pub restart_policy: RestartPolicy,
    /// Desired replica count (job completions for run-to-completion services).
    pub replicas: i32,
    /// Maximum tolerated container restarts.
    pub backoff_limit: i32,
    /// Dependencies and the state each must reach first.
    pub depends_on: BTreeMap<String, DependsOnCondition>,
    /// User-defined labels, overlaid on the computed ones.
    pub labels: BTreeMap<String, String>,
    /// User-defined annotations.
    pub annotations: BTreeMap<String, String>,
    /// Linux capabilities to add.
    pub cap_add: Vec<String>,
    /// Linux capabilities to drop.
    pub cap_drop: Vec<String>,
    /// Identity the container process runs as.
    pub user: Option<SecurityUser>,
    /// Working directory of the container process.
    pub workdir: String,
    /// Seconds granted for graceful termination.
    pub stop_grace_period: i64,
}

impl Default for Service {
    fn default() -> Self {
        Self {
            image: String::new(),
            entrypoint: Vec::new(),
            command: Vec::new(),
            environment: Vec::new(),
            ports: Vec::new(),
            volumes: Vec::new(),
            resources: None,
            healthcheck: None,
            restart_policy: RestartPolicy::default(),
            replicas: 1,
            backoff_limit: DEFAULT_BACKOFF_LIMIT,
            depends_on: BTreeMap::new(),
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
            cap_add: Vec::new(),
            cap_drop: Vec::new(),
            user: None,
            workdir: String::new(),
            stop_grace_period: 30,
        }
    }
}

impl Service {
    /// Returns whether any mount references a stack-declared (local-path) volume.
    #[must_use]
    pub fn has_local_volumes(&self) -> bool {
        self.volumes.iter().any(StackVolume::is_named)
    }

    /// Iterates over the dependencies declared with the `healthy` condition.
    pub fn healthy_dependencies(&self) -> impl Iterator<Item = &str> {
        self.depends_on
            .iter()
            .filter(|(_, condition)| **condition == DependsOnCondition::Healthy)
            .map(|(name, _)| name.as_str())
    }
}

/// A single environment variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    /// Variable name; entries with an empty name are dropped on translation.
    pub name: String,
    /// Variable value.
    #[serde(default)]
    pub value: String,
}

/// A published port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Port {
    /// Port the container listens on.
    pub container_port: i32,
    /// Port exposed by the network service; zero when unset.
    pub host_port: i32,
    /// Transport protocol.
    pub protocol: Protocol,
}

/// Transport protocol of a port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    /// Transmission Control Protocol.
    #[default]
    Tcp,
    /// User Datagram Protocol.
    Udp,
    /// Stream Control Transmission Protocol.
    Sctp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "TCP"),
            Self::Udp => write!(f, "UDP"),
            Self::Sctp => write!(f, "SCTP"),
        }
    }
}

/// Whether the workload runs continuously or to completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum RestartPolicy {
    /// Restart forever.
    #[default]
    #[serde(alias = "always")]
    Always,
    /// Restart only after a failed exit.
    #[serde(alias = "on-failure")]
    OnFailure,
    /// Run once to completion.
    #[serde(alias = "never", alias = "no")]
    Never,
}

impl fmt::Display for RestartPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "Always"),
            Self::OnFailure => write!(f, "OnFailure"),
            Self::Never => write!(f, "Never"),
        }
    }
}

/// The state a dependency must reach before its dependent is satisfied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependsOnCondition {
    /// The dependency has been started.
    #[default]
    #[serde(alias = "service_started")]
    Started,
    /// The dependency reports ready.
    #[serde(alias = "service_healthy")]
    Healthy,
    /// The dependency ran to successful completion.
    #[serde(alias = "service_completed_successfully")]
    Completed,
}

/// Compute and storage requirements of a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceResources {
    /// Upper bounds.
    pub limits: ComputeResources,
    /// Guaranteed amounts.
    pub requests: ComputeResources,
    /// Size and class of the per-replica claim for ephemeral volumes.
    pub storage: StorageRequest,
}

/// CPU and memory amounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputeResources {
    /// CPU amount (`500m`, `2`).
    pub cpu: Quantity,
    /// Memory amount (`256Mi`).
    pub memory: Quantity,
}

/// Storage request backing ephemeral per-replica volumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageRequest {
    /// Requested size.
    pub size: Quantity,
    /// Storage class; the cluster default when empty.
    pub class: String,
}

/// Readiness check of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheck {
    /// Command executed inside the container; takes precedence over `http`.
    pub test: Vec<String>,
    /// HTTP GET target used when `test` is empty.
    pub http: Option<HttpHealthCheck>,
    /// Time between checks.
    #[serde(with = "crate::duration_secs")]
    pub interval: Duration,
    /// Time before a check is considered failed.
    #[serde(with = "crate::duration_secs")]
    pub timeout: Duration,
    /// Consecutive failures before the service is unready.
    pub retries: i32,
    /// Grace period before the first check.
    #[serde(with = "crate::duration_secs")]
    pub start_period: Duration,
}

impl Default for HealthCheck {
    fn default() -> Self {
        Self {
            test: Vec::new(),
            http: None,
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(1),
            retries: 3,
            start_period: Duration::ZERO,
        }
    }
}

/// HTTP GET readiness target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpHealthCheck {
    /// Request path.
    pub path: String,
    /// Container port.
    pub port: i32,
}

/// Process identity of a container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityUser {
    /// UID of the container process.
    pub run_as_user: Option<i64>,
    /// GID of the container process.
    pub run_as_group: Option<i64>,
}
