//! Structural validation of a stack.
//!
//! Runs before any cluster mutation. Every problem found is reported in a
//! single error instead of stopping at the first one.

use berth_common::error::{BerthError, Result};

use crate::stack::Stack;

/// Validates a stack for structural correctness.
///
/// # Checks performed
///
/// 1. Every `depends_on` key references a service of the same stack.
/// 2. Every non-empty volume `local_path` is declared in `Stack::volumes`.
///
/// # Errors
///
/// Returns `InvalidStack` listing every violation.
pub fn validate(stack: &Stack) -> Result<()> {
    tracing::debug!(stack = %stack.name, "validating stack");
    let mut problems = Vec::new();
    check_dependency_references(stack, &mut problems);
    check_volume_references(stack, &mut problems);
    if problems.is_empty() {
        return Ok(());
    }
    Err(BerthError::InvalidStack {
        stack: stack.name.clone(),
        problems,
    })
}

fn check_dependency_references(stack: &Stack, problems: &mut Vec<String>) {
    for (name, svc) in &stack.services {
        for dependency in svc.depends_on.keys() {
            if !stack.services.contains_key(dependency) {
                problems.push(format!(
                    "service '{name}' depends on undefined service '{dependency}'"
                ));
            }
        }
    }
}

fn check_volume_references(stack: &Stack, problems: &mut Vec<String>) {
    for (name, svc) in &stack.services {
        for volume in svc.volumes.iter().filter(|v| v.is_named()) {
            if !stack.volumes.contains_key(&volume.local_path) {
                problems.push(format!(
                    "service '{name}' mounts undeclared volume '{}'",
                    volume.local_path
                ));
            }
        }
    }
}
