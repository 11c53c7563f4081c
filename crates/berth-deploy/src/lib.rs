//! # berth-deploy
//!
//! Applies a translated stack to a cluster in one orchestration pass.
//!
//! Handles:
//! - **Client**: the cluster API seam and typed lookups.
//! - **Memory**: an in-process cluster persisted to a JSON state file.
//! - **Deployer**: idempotent create-or-update with cross-stack ownership isolation.
//! - **Resolver**: requested-name validation, dependency closure, and apply order.
//! - **Health**: running/satisfied predicates and the restart budget breaker.
//! - **Scope**: volumes and endpoints referenced by the services in scope.
//! - **Orchestrator**: sequences the above for one stack deploy.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod client;
pub mod deployer;
pub mod health;
pub mod memory;
pub mod orchestrator;
pub mod resolver;
pub mod scope;

pub use client::ClusterClient;
pub use deployer::{ApplyOutcome, Deployer};
pub use memory::MemoryCluster;
pub use orchestrator::{DeployOptions, DeployReport, deploy_stack};
