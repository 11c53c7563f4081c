//! Label vocabulary, default names, and well-known keys.
//!
//! Other tooling discovers "which objects belong to which stack" through the
//! labels defined here, so their values are a stable contract.

/// Marks the configuration record of a stack.
pub const STACK_LABEL: &str = "stack.berth.dev";

/// Ownership label: the name of the stack that manages an object.
pub const STACK_NAME_LABEL: &str = "stack.berth.dev/name";

/// Identity label of workloads, pods, and network services.
pub const STACK_SERVICE_NAME_LABEL: &str = "stack.berth.dev/service-name";

/// Identity label of volume claims; also the prefix of co-location markers.
pub const STACK_VOLUME_NAME_LABEL: &str = "stack.berth.dev/volume-name";

/// Identity label of ingress objects generated from endpoints.
pub const STACK_ENDPOINT_NAME_LABEL: &str = "stack.berth.dev/endpoint-name";

/// Records who last applied an object.
pub const DEPLOYED_BY_LABEL: &str = "berth.dev/deployed-by";

/// Per-service annotation selecting the workload update strategy.
pub const UPDATE_STRATEGY_ANNOTATION: &str = "berth.dev/compose-update-strategy";

/// Pod-template annotation touched on every apply so identical specs still roll.
pub const REVISION_ANNOTATION: &str = "berth.dev/deployed-at";

/// Process-wide override of the workload update strategy.
pub const UPDATE_STRATEGY_ENV_VAR: &str = "BERTH_COMPOSE_UPDATE_STRATEGY";

/// Namespace used when a stack does not declare one.
pub const NAMESPACE_ENV_VAR: &str = "BERTH_NAMESPACE";

/// Claim name shared by every ephemeral (non local-path) volume of a service.
pub const DEFAULT_CLAIM_NAME: &str = "pvc";

/// Mount point of the default claim inside the permission-fix container.
pub const DEFAULT_DATA_MOUNT: &str = "/data";

/// Parent directory of named volume mounts inside the permission-fix container.
pub const NAMED_VOLUMES_MOUNT: &str = "/volumes";

/// Image of the permission-fix init container.
pub const PERMISSIONS_IMAGE: &str = "busybox";

/// Topology key used for volume co-location affinity.
pub const HOSTNAME_TOPOLOGY_KEY: &str = "kubernetes.io/hostname";

/// Revision history kept for stateful sets.
pub const STATEFULSET_REVISION_HISTORY: i32 = 2;

/// Configuration record field holding the stack name.
pub const NAME_FIELD: &str = "name";
/// Configuration record field holding the base64-encoded manifest.
pub const YAML_FIELD: &str = "yaml";
/// Configuration record field holding the compose-mode flag.
pub const COMPOSE_FIELD: &str = "compose";
/// Configuration record field holding the last pass status.
pub const STATUS_FIELD: &str = "status";

/// Application name used in CLI output.
pub const APP_NAME: &str = "berth";

/// Default location of the local cluster state file.
pub const DEFAULT_STATE_FILE: &str = ".berth/cluster.json";

/// Default namespace when neither the stack nor the environment sets one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Returns the name of the configuration record stored for a stack.
#[must_use]
pub fn stack_config_map_name(stack_name: &str) -> String {
    format!("berth-stack-{stack_name}")
}

/// Returns the co-location marker label for a local-path volume.
#[must_use]
pub fn volume_marker_label(local_path: &str) -> String {
    format!("{STACK_VOLUME_NAME_LABEL}-{local_path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_label_is_prefixed_with_volume_label() {
        assert_eq!(volume_marker_label("data"), "stack.berth.dev/volume-name-data");
    }

    #[test]
    fn config_map_name_embeds_stack_name() {
        assert_eq!(stack_config_map_name("shop"), "berth-stack-shop");
    }
}
