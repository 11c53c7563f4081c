//! Endpoint definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A public entry point routing request paths to services.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoint {
    /// User-defined labels.
    pub labels: BTreeMap<String, String>,
    /// User-defined annotations.
    pub annotations: BTreeMap<String, String>,
    /// Routing rules.
    pub rules: Vec<EndpointRule>,
}

impl Endpoint {
    /// Returns whether any rule routes to the given service.
    #[must_use]
    pub fn targets(&self, service: &str) -> bool {
        self.rules.iter().any(|r| r.service == service)
    }
}

/// Routes one path prefix to a service port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointRule {
    /// Path prefix.
    pub path: String,
    /// Target service name.
    pub service: String,
    /// Target service port.
    pub port: i32,
}
