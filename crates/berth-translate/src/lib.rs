//! # berth-translate
//!
//! Pure mapping from the stack model to cluster objects.
//!
//! Handles:
//! - **Kind**: which workload kind represents a service.
//! - **Labels**: ownership, identity, and co-location marker labels.
//! - **Container**: the main container of a service.
//! - **Volumes**: mounts, init containers, claim templates, and affinity.
//! - **Strategy**: update strategy resolution per workload kind.
//! - **Workload**: deployments, stateful sets, and jobs.
//! - **Network**: network services and ingresses.
//! - **Storage**: stack volume claims and the stack configuration record.
//!
//! Nothing here reads the environment or talks to a cluster; process-wide
//! settings arrive through [`berth_common::config::DeployConfig`].

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod container;
pub mod kind;
pub mod labels;
pub mod network;
pub mod storage;
pub mod strategy;
pub mod volumes;
pub mod workload;

pub use kind::workload_kind;
pub use network::{translate_ingress, translate_network_service};
pub use storage::{StackStatus, translate_config_map, translate_volume_claim};
pub use workload::{Workload, translate_workload};
