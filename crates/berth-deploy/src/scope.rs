//! Volumes and endpoints referenced by the services in scope.

use std::collections::BTreeSet;

use berth_model::Stack;

/// Returns the stack-declared volumes mounted by the given services.
///
/// Local paths the stack does not declare are left out.
#[must_use]
pub fn volumes_in_scope(stack: &Stack, services: &[String]) -> Vec<String> {
    let volumes: BTreeSet<&str> = services
        .iter()
        .filter_map(|name| stack.services.get(name))
        .flat_map(|svc| svc.volumes.iter())
        .filter(|v| v.is_named() && stack.volumes.contains_key(&v.local_path))
        .map(|v| v.local_path.as_str())
        .collect();
    volumes.into_iter().map(str::to_string).collect()
}

/// Returns the endpoints with at least one rule targeting a given service.
#[must_use]
pub fn endpoints_in_scope(stack: &Stack, services: &[String]) -> Vec<String> {
    stack
        .endpoints
        .iter()
        .filter(|(_, endpoint)| services.iter().any(|s| endpoint.targets(s)))
        .map(|(name, _)| name.clone())
        .collect()
}
