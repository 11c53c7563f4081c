//! Volume definitions.

use std::collections::BTreeMap;

use berth_common::types::Quantity;
use serde::{Deserialize, Serialize};

/// A mount of a service.
///
/// A non-empty `local_path` names a stack-declared persistent volume shared
/// across replicas and redeploys. An empty one requests ephemeral storage
/// private to each replica.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackVolume {
    /// Name of the stack volume, or empty for ephemeral storage.
    pub local_path: String,
    /// Mount target inside the container.
    pub remote_path: String,
}

impl StackVolume {
    /// Creates a mount from a local/remote path pair.
    #[must_use]
    pub fn new(local_path: impl Into<String>, remote_path: impl Into<String>) -> Self {
        Self {
            local_path: local_path.into(),
            remote_path: remote_path.into(),
        }
    }

    /// Returns whether the mount references a stack-declared volume.
    #[must_use]
    pub fn is_named(&self) -> bool {
        !self.local_path.is_empty()
    }
}

/// A persistent volume declared at stack level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeSpec {
    /// Requested size.
    pub size: Quantity,
    /// Storage class; the cluster default when empty.
    pub class: String,
    /// User-defined labels.
    pub labels: BTreeMap<String, String>,
    /// User-defined annotations.
    pub annotations: BTreeMap<String, String>,
}
