//! Stack volume claims and the stack configuration record.

use std::collections::BTreeMap;
use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use berth_common::constants::{
    COMPOSE_FIELD, NAME_FIELD, STACK_LABEL, STATUS_FIELD, YAML_FIELD, stack_config_map_name,
};
use berth_common::error::{BerthError, Result};
use berth_model::Stack;
use berth_resources::{ConfigMap, ObjectMeta, PersistentVolumeClaim, PersistentVolumeClaimSpec};

use crate::labels::volume_labels;
use crate::volumes::{READ_WRITE_ONCE, non_empty};

/// Outcome of the last orchestration pass, stored in the configuration record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackStatus {
    /// A pass is in flight.
    Progressing,
    /// The last pass applied every object.
    Deployed,
    /// The last pass failed.
    Error,
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Progressing => write!(f, "progressing"),
            Self::Deployed => write!(f, "deployed"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Translates a stack-declared volume into its persistent claim.
///
/// # Errors
///
/// Returns `NotFound` if the stack declares no such volume.
pub fn translate_volume_claim(stack: &Stack, name: &str) -> Result<PersistentVolumeClaim> {
    let spec = stack.volumes.get(name).ok_or_else(|| BerthError::NotFound {
        kind: "volume",
        id: name.to_string(),
    })?;
    Ok(PersistentVolumeClaim {
        metadata: ObjectMeta {
            name: name.to_string(),
            namespace: stack.namespace.clone(),
            labels: volume_labels(stack, name, &spec.labels),
            annotations: spec.annotations.clone(),
            resource_version: None,
        },
        spec: PersistentVolumeClaimSpec {
            access_modes: vec![READ_WRITE_ONCE.to_string()],
            storage: spec.size.clone(),
            storage_class_name: non_empty(spec.class.clone()),
        },
    })
}

/// Builds the configuration record other tooling reads to redeploy a stack.
#[must_use]
pub fn translate_config_map(stack: &Stack, status: StackStatus) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta {
            name: stack_config_map_name(&stack.name),
            namespace: stack.namespace.clone(),
            labels: BTreeMap::from([(STACK_LABEL.to_string(), "true".to_string())]),
            ..ObjectMeta::default()
        },
        data: BTreeMap::from([
            (NAME_FIELD.to_string(), stack.name.clone()),
            (YAML_FIELD.to_string(), STANDARD.encode(&stack.manifest)),
            (COMPOSE_FIELD.to_string(), stack.is_compose.to_string()),
            (STATUS_FIELD.to_string(), status.to_string()),
        ]),
    }
}

#[cfg(test)]
mod tests {
    use berth_common::constants::{STACK_NAME_LABEL, STACK_VOLUME_NAME_LABEL};
    use berth_common::types::Quantity;
    use berth_model::VolumeSpec;

    use super::*;

    fn stack() -> Stack {
        Stack {
            name: "shop".into(),
            namespace: "dev".into(),
            manifest: b"services: {}".to_vec(),
            is_compose: true,
            volumes: BTreeMap::from([(
                "pgdata".to_string(),
                VolumeSpec {
                    size: Quantity::new("10Gi"),
                    annotations: BTreeMap::from([("backup".to_string(), "daily".to_string())]),
                    ..VolumeSpec::default()
                },
            )]),
            ..Stack::default()
        }
    }

    #[test]
    fn volume_claim_is_read_write_once() {
        let pvc = translate_volume_claim(&stack(), "pgdata").expect("translate");
        assert_eq!(pvc.metadata.namespace, "dev");
        assert_eq!(pvc.metadata.labels[STACK_NAME_LABEL], "shop");
        assert_eq!(pvc.metadata.labels[STACK_VOLUME_NAME_LABEL], "pgdata");
        assert_eq!(pvc.metadata.annotations["backup"], "daily");
        assert_eq!(pvc.spec.access_modes, vec![READ_WRITE_ONCE]);
        assert_eq!(pvc.spec.storage.as_str(), "10Gi");
        assert!(pvc.spec.storage_class_name.is_none());
    }

    #[test]
    fn undeclared_volume_is_not_found() {
        assert!(translate_volume_claim(&stack(), "ghost").is_err());
    }

    #[test]
    fn config_map_encodes_manifest() {
        let cm = translate_config_map(&stack(), StackStatus::Progressing);
        assert_eq!(cm.metadata.name, "berth-stack-shop");
        assert_eq!(cm.metadata.labels[STACK_LABEL], "true");
        assert_eq!(cm.data[NAME_FIELD], "shop");
        assert_eq!(cm.data[COMPOSE_FIELD], "true");
        assert_eq!(cm.data[STATUS_FIELD], "progressing");
        let decoded = STANDARD.decode(&cm.data[YAML_FIELD]).expect("base64");
        assert_eq!(decoded, b"services: {}");
    }
}
