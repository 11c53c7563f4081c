//! # berth-model
//!
//! In-memory model of a deployable stack.
//!
//! - **Stack**: the deployable unit, holding services, volumes, and endpoints.
//! - **Service**: one workload definition with its ports, volumes, and dependencies.
//! - **Volume**: stack-declared persistent volumes and per-service mounts.
//! - **Endpoint**: ingress rules routing paths to services.
//! - **Validator**: structural checks run before any cluster mutation.
//! - **Loader**: reads a serialized stack snapshot from disk.
//!
//! The model is read-only input for one orchestration pass.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod endpoint;
pub mod loader;
pub mod service;
pub mod stack;
pub mod validator;
pub mod volume;

mod duration_secs;

pub use endpoint::{Endpoint, EndpointRule};
pub use service::{
    ComputeResources, DependsOnCondition, EnvVar, HealthCheck, HttpHealthCheck, Port, Protocol,
    RestartPolicy, SecurityUser, Service, ServiceResources, StorageRequest,
};
pub use stack::Stack;
pub use volume::{StackVolume, VolumeSpec};
