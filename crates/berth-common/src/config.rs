//! Process-wide deployment configuration.
//!
//! Read once at the invocation boundary and handed to the orchestrator, so
//! the translation layer never touches the environment.

use serde::{Deserialize, Serialize};

use crate::constants::{NAMESPACE_ENV_VAR, UPDATE_STRATEGY_ENV_VAR};

/// Settings shared by every service of one orchestration pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Namespace applied to stacks that do not declare one.
    pub namespace: Option<String>,
    /// Update strategy override, consulted after the per-service annotation.
    pub update_strategy: Option<String>,
}

impl DeployConfig {
    /// Builds the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            namespace: non_empty(NAMESPACE_ENV_VAR),
            update_strategy: non_empty(UPDATE_STRATEGY_ENV_VAR),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn lookup_reads_both_variables() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (UPDATE_STRATEGY_ENV_VAR, "rolling"),
            (NAMESPACE_ENV_VAR, "team-a"),
        ]);
        let config = DeployConfig::from_lookup(|k| vars.get(k).map(|v| (*v).to_string()));
        assert_eq!(config.update_strategy.as_deref(), Some("rolling"));
        assert_eq!(config.namespace.as_deref(), Some("team-a"));
    }

    #[test]
    fn empty_values_are_unset() {
        let config = DeployConfig::from_lookup(|_| Some("  ".to_string()));
        assert_eq!(config, DeployConfig::default());
    }
}
