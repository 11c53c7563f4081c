//! Stack definition.

use std::collections::BTreeMap;

use berth_common::error::{BerthError, Result};
use serde::{Deserialize, Serialize};

use crate::endpoint::Endpoint;
use crate::service::Service;
use crate::volume::VolumeSpec;

/// The deployable unit: a named set of services, volumes, and endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stack {
    /// Stack name; written to the ownership label of every managed object.
    pub name: String,
    /// Target namespace.
    pub namespace: String,
    /// Services keyed by name.
    pub services: BTreeMap<String, Service>,
    /// Stack-declared persistent volumes keyed by name.
    pub volumes: BTreeMap<String, VolumeSpec>,
    /// Endpoints keyed by name.
    pub endpoints: BTreeMap<String, Endpoint>,
    /// Raw manifest bytes the stack was loaded from.
    #[serde(skip)]
    pub manifest: Vec<u8>,
    /// Whether the manifest is in compose format.
    pub is_compose: bool,
}

impl Stack {
    /// Looks up a service by name.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the stack has no such service.
    pub fn service(&self, name: &str) -> Result<&Service> {
        self.services.get(name).ok_or_else(|| BerthError::NotFound {
            kind: "service",
            id: name.to_string(),
        })
    }

    /// Returns every service name in stable order.
    #[must_use]
    pub fn service_names(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_service_is_not_found() {
        let stack = Stack::default();
        let err = stack.service("api").unwrap_err();
        assert!(err.to_string().contains("service not found: api"));
    }

    #[test]
    fn service_names_are_sorted() {
        let stack = Stack {
            services: BTreeMap::from([
                ("web".to_string(), Service::default()),
                ("api".to_string(), Service::default()),
            ]),
            ..Stack::default()
        };
        assert_eq!(stack.service_names(), vec!["api", "web"]);
    }
}
