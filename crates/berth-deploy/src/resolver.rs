//! Requested-name validation, dependency closure, and apply order.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use berth_common::error::{BerthError, Result};
use berth_model::Stack;
use petgraph::graph::NodeIndex;

use crate::client::ClusterClient;
use crate::health::is_satisfied;

/// Fails unless every requested service is defined in the stack.
///
/// # Errors
///
/// Returns `UndefinedServices` listing every unknown name in request order.
pub fn validate_defined_services(stack: &Stack, requested: &[String]) -> Result<()> {
    let names: Vec<String> = requested
        .iter()
        .filter(|name| !stack.services.contains_key(name.as_str()))
        .cloned()
        .collect();
    if names.is_empty() {
        return Ok(());
    }
    Err(BerthError::UndefinedServices { names })
}

/// Expands a deploy request with the dependencies it needs redeployed.
///
/// Scans the `depends_on` of every service in the result set, starting
/// with the requested ones. A dependency is appended, in discovery order
/// and at most once, when it is neither in the result nor satisfied in the
/// cluster; its own dependencies are scanned in turn. A satisfied
/// dependency is not scanned further.
///
/// # Errors
///
/// Returns `NotFound` for an unknown service, or any client error.
pub fn add_dependent_services_if_not_present(
    client: &dyn ClusterClient,
    stack: &Stack,
    requested: &[String],
) -> Result<Vec<String>> {
    let mut result: Vec<String> = requested.to_vec();
    let mut visited: BTreeSet<String> = requested.iter().cloned().collect();
    let mut worklist: VecDeque<String> = requested.iter().cloned().collect();

    while let Some(current) = worklist.pop_front() {
        for dependency in stack.service(&current)?.depends_on.keys() {
            if !visited.insert(dependency.clone()) {
                continue;
            }
            if !is_satisfied(client, stack, dependency)? {
                tracing::info!(
                    service = %current,
                    dependency = %dependency,
                    "adding dependency to the deploy"
                );
                result.push(dependency.clone());
                worklist.push_back(dependency.clone());
            }
        }
    }
    Ok(result)
}

/// A dependency graph of services.
#[derive(Debug)]
pub struct DependencyGraph {
    /// Internal petgraph representation.
    graph: petgraph::Graph<String, ()>,
    /// Node of each service.
    nodes: BTreeMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: petgraph::Graph::new(),
            nodes: BTreeMap::new(),
        }
    }

    /// Builds the graph of the given services and the dependencies among them.
    ///
    /// Dependencies outside `services` are left out.
    #[must_use]
    pub fn for_services(stack: &Stack, services: &[String]) -> Self {
        let mut graph = Self::new();
        for name in services {
            let _ = graph.add_service(name);
        }
        for name in services {
            let Some(svc) = stack.services.get(name) else {
                continue;
            };
            for dependency in svc.depends_on.keys() {
                graph.add_dependency(name, dependency);
            }
        }
        graph
    }

    /// Adds a service node, returning the existing node if already present.
    pub fn add_service(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        let _ = self.nodes.insert(name.to_string(), idx);
        idx
    }

    /// Adds a dependency edge: `dependent` depends on `dependency`.
    ///
    /// The edge points from `dependency` to `dependent` so that the
    /// topological sort yields dependencies first. Unknown names are ignored.
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str) {
        let (Some(&from), Some(&to)) = (self.nodes.get(dependency), self.nodes.get(dependent))
        else {
            return;
        };
        let _ = self.graph.add_edge(from, to, ());
    }

    /// Returns the services with dependencies before their dependents.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the graph contains a cycle.
    pub fn resolve_order(&self) -> Result<Vec<String>> {
        match petgraph::algo::toposort(&self.graph, None) {
            Ok(indices) => Ok(indices
                .iter()
                .filter_map(|&idx| self.graph.node_weight(idx).cloned())
                .collect()),
            Err(cycle) => Err(BerthError::Config {
                message: format!(
                    "cyclic dependency detected involving service '{}'",
                    self.graph
                        .node_weight(cycle.node_id())
                        .map_or("?", String::as_str)
                ),
            }),
        }
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Orders services so dependencies are applied before their dependents.
///
/// Falls back to the given order when the dependencies form a cycle.
#[must_use]
pub fn deploy_order(stack: &Stack, services: &[String]) -> Vec<String> {
    match DependencyGraph::for_services(stack, services).resolve_order() {
        Ok(order) => order,
        Err(e) => {
            tracing::warn!(error = %e, "applying services in request order");
            services.to_vec()
        }
    }
}
