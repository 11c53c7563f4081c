//! Network objects: services and ingresses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::meta::ObjectMeta;

/// A stable network endpoint in front of a set of pods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkService {
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Desired state.
    pub spec: ServiceSpec,
}

/// Desired state of a network service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSpec {
    /// Pods receiving the traffic.
    pub selector: BTreeMap<String, String>,
    /// Exposure type, `ClusterIP` for stack services.
    #[serde(rename = "type")]
    pub service_type: String,
    /// Exposed ports.
    pub ports: Vec<ServicePort>,
}

/// A port exposed by a network service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServicePort {
    /// Port name, unique within the service.
    pub name: String,
    /// Exposed port.
    pub port: i32,
    /// Container port receiving the traffic.
    pub target_port: i32,
    /// Transport protocol (`TCP`, `UDP`, `SCTP`).
    pub protocol: String,
}

/// Routes external HTTP traffic to network services.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ingress {
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Desired state.
    pub spec: IngressSpec,
}

/// Desired state of an ingress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngressSpec {
    /// Routing rules.
    pub rules: Vec<IngressRule>,
}

/// Routes a path prefix to a service port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngressRule {
    /// Path prefix.
    pub path: String,
    /// Target network service.
    pub service: String,
    /// Target port.
    pub port: i32,
}
