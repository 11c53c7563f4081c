//! # berth-resources
//!
//! Cluster object specifications.
//!
//! Handles:
//! - **Meta**: object metadata and label selectors.
//! - **Pod**: pod templates, containers, probes, affinity, and pod status.
//! - **Workload**: deployments, stateful sets, and jobs.
//! - **Network**: network services and ingresses.
//! - **Storage**: persistent volume claims and config maps.
//! - **Object**: the kind-tagged envelope exchanged with a cluster client.
//!
//! Field names serialize in the cluster's camelCase convention so rendered
//! objects read like the manifests users already know.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod meta;
pub mod network;
pub mod object;
pub mod pod;
pub mod storage;
pub mod workload;

pub use meta::{LabelSelector, LabelSelectorRequirement, ObjectMeta, SelectorOperator};
pub use network::{Ingress, IngressRule, IngressSpec, NetworkService, ServicePort, ServiceSpec};
pub use object::{Object, ObjectKind, Resource};
pub use pod::{
    Affinity, Capabilities, Container, ContainerPort, ContainerStatus, EnvVar, ExecAction,
    HttpGetAction, Pod, PodAffinity, PodAffinityTerm, PodSpec, PodStatus, PodTemplateSpec, Probe,
    ResourceRequirements, SecurityContext, Volume, VolumeMount,
};
pub use storage::{ConfigMap, PersistentVolumeClaim, PersistentVolumeClaimSpec};
pub use workload::{
    Deployment, DeploymentSpec, DeploymentStatus, DeploymentStrategy, Job, JobSpec, JobStatus,
    StatefulSet, StatefulSetSpec, StatefulSetStatus, StatefulSetUpdateStrategy,
};
