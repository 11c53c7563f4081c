//! Update strategy resolution.
//!
//! Sources are consulted in order: the per-service annotation, then the
//! process-wide override, then the kind default. A value a kind does not
//! accept is logged and the next source is tried.

use std::fmt;

use berth_common::constants::UPDATE_STRATEGY_ANNOTATION;
use berth_model::Service;
use berth_resources::{DeploymentStrategy, StatefulSetUpdateStrategy};

/// Update strategies understood across workload kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStrategy {
    /// Replace pods progressively.
    Rolling,
    /// Stop every pod before starting new ones.
    Recreate,
    /// Replace pods only when they are deleted.
    OnDelete,
}

impl UpdateStrategy {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "rolling" => Some(Self::Rolling),
            "recreate" => Some(Self::Recreate),
            "on-delete" => Some(Self::OnDelete),
            _ => None,
        }
    }
}

impl fmt::Display for UpdateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rolling => write!(f, "rolling"),
            Self::Recreate => write!(f, "recreate"),
            Self::OnDelete => write!(f, "on-delete"),
        }
    }
}

/// Strategies a workload kind accepts and the one it falls back to.
#[derive(Debug, Clone, Copy)]
struct StrategyRules {
    kind: &'static str,
    allowed: &'static [UpdateStrategy],
    default: UpdateStrategy,
}

const DEPLOYMENT_RULES: StrategyRules = StrategyRules {
    kind: "deployment",
    allowed: &[UpdateStrategy::Rolling, UpdateStrategy::Recreate],
    default: UpdateStrategy::Recreate,
};

const STATEFULSET_RULES: StrategyRules = StrategyRules {
    kind: "statefulset",
    allowed: &[UpdateStrategy::Rolling, UpdateStrategy::OnDelete],
    default: UpdateStrategy::Rolling,
};

fn resolve(svc: &Service, override_value: Option<&str>, rules: StrategyRules) -> UpdateStrategy {
    let sources = [
        svc.annotations
            .get(UPDATE_STRATEGY_ANNOTATION)
            .map(String::as_str),
        override_value,
    ];
    for value in sources.into_iter().flatten() {
        match UpdateStrategy::parse(value).filter(|s| rules.allowed.contains(s)) {
            Some(strategy) => return strategy,
            None => tracing::debug!(kind = rules.kind, value, "invalid update strategy"),
        }
    }
    rules.default
}

/// Resolves the strategy of a deployment.
#[must_use]
pub fn deployment_strategy(svc: &Service, override_value: Option<&str>) -> DeploymentStrategy {
    let strategy_type = match resolve(svc, override_value, DEPLOYMENT_RULES) {
        UpdateStrategy::Rolling => "RollingUpdate",
        UpdateStrategy::Recreate | UpdateStrategy::OnDelete => "Recreate",
    };
    DeploymentStrategy {
        strategy_type: strategy_type.to_string(),
    }
}

/// Resolves the strategy of a stateful set.
#[must_use]
pub fn statefulset_strategy(
    svc: &Service,
    override_value: Option<&str>,
) -> StatefulSetUpdateStrategy {
    let strategy_type = match resolve(svc, override_value, STATEFULSET_RULES) {
        UpdateStrategy::Rolling => "RollingUpdate",
        UpdateStrategy::Recreate | UpdateStrategy::OnDelete => "OnDelete",
    };
    StatefulSetUpdateStrategy {
        strategy_type: strategy_type.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn annotated(value: &str) -> Service {
        Service {
            annotations: BTreeMap::from([(
                UPDATE_STRATEGY_ANNOTATION.to_string(),
                value.to_string(),
            )]),
            ..Service::default()
        }
    }

    #[test]
    fn kind_defaults_apply_without_sources() {
        let svc = Service::default();
        assert_eq!(deployment_strategy(&svc, None).strategy_type, "Recreate");
        assert_eq!(statefulset_strategy(&svc, None).strategy_type, "RollingUpdate");
    }

    #[test]
    fn annotation_beats_override() {
        let svc = annotated("rolling");
        assert_eq!(
            deployment_strategy(&svc, Some("recreate")).strategy_type,
            "RollingUpdate"
        );
    }

    #[test]
    fn override_applies_when_annotation_missing() {
        let svc = Service::default();
        assert_eq!(
            deployment_strategy(&svc, Some("rolling")).strategy_type,
            "RollingUpdate"
        );
        assert_eq!(
            statefulset_strategy(&svc, Some("on-delete")).strategy_type,
            "OnDelete"
        );
    }

    #[test]
    fn invalid_annotation_falls_through_to_override() {
        let svc = annotated("on-delete");
        assert_eq!(
            deployment_strategy(&svc, Some("rolling")).strategy_type,
            "RollingUpdate"
        );
    }

    #[test]
    fn invalid_values_fall_back_to_default() {
        let svc = annotated("recreate");
        assert_eq!(
            statefulset_strategy(&svc, Some("bogus")).strategy_type,
            "RollingUpdate"
        );
        assert_eq!(
            deployment_strategy(&annotated("sideways"), None).strategy_type,
            "Recreate"
        );
    }
}
