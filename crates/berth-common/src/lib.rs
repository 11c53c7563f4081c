//! # berth-common
//!
//! Shared types, error definitions, configuration models, and constants
//! used across the entire Berth workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and holds the label vocabulary every other crate agrees on.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
