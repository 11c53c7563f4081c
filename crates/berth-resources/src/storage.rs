//! Storage and configuration objects.

use std::collections::BTreeMap;

use berth_common::types::Quantity;
use serde::{Deserialize, Serialize};

use crate::meta::ObjectMeta;

/// A request for persistent storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistentVolumeClaim {
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Desired state.
    pub spec: PersistentVolumeClaimSpec,
}

/// Desired state of a persistent volume claim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistentVolumeClaimSpec {
    /// Access modes, `ReadWriteOnce` for stack volumes.
    pub access_modes: Vec<String>,
    /// Requested size.
    pub storage: Quantity,
    /// Storage class; the cluster default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class_name: Option<String>,
}

/// String key/value data stored in the cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigMap {
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Stored entries.
    pub data: BTreeMap<String, String>,
}
