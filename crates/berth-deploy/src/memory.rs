//! In-process cluster.
//!
//! Keeps objects and pods behind a mutex and optionally persists them to a
//! JSON state file, so successive CLI invocations observe earlier passes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use berth_common::error::{BerthError, Result};
use berth_resources::{Object, ObjectKind, Pod};
use serde::{Deserialize, Serialize};

use crate::client::ClusterClient;

/// Serialized form of the cluster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct ClusterState {
    /// Monotonic counter stamped as `resource_version` on every write.
    revision: u64,
    /// Objects keyed by `kind/namespace/name`.
    objects: BTreeMap<String, Object>,
    /// Pods, as reported by the nodes.
    pods: Vec<Pod>,
}

fn key(kind: ObjectKind, namespace: &str, name: &str) -> String {
    format!("{kind}/{namespace}/{name}")
}

fn object_key(object: &Object) -> String {
    let meta = object.metadata();
    key(object.kind(), &meta.namespace, &meta.name)
}

/// A thread-safe cluster kept in memory.
#[derive(Debug, Default)]
pub struct MemoryCluster {
    state: Mutex<ClusterState>,
    path: Option<PathBuf>,
}

impl MemoryCluster {
    /// Creates an empty cluster that is never persisted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a cluster backed by a state file, starting empty if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: &Path) -> Result<Self> {
        let state = if path.exists() {
            tracing::debug!(path = %path.display(), "loading cluster state");
            let content = std::fs::read_to_string(path).map_err(|e| BerthError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
            serde_json::from_str(&content)?
        } else {
            ClusterState::default()
        };
        Ok(Self {
            state: Mutex::new(state),
            path: Some(path.to_path_buf()),
        })
    }

    /// Writes the cluster to its state file; a no-op for unpersisted clusters.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&*self.lock()?)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| BerthError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(path, json).map_err(|e| BerthError::Io {
            path: path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), "saved cluster state");
        Ok(())
    }

    /// Stores an object as-is, replacing any object with the same identity.
    ///
    /// Used to seed state, including observed status.
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned.
    pub fn insert(&self, object: Object) -> Result<()> {
        let mut state = self.lock()?;
        let _ = state.objects.insert(object_key(&object), object);
        Ok(())
    }

    /// Records a pod.
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned.
    pub fn add_pod(&self, pod: Pod) -> Result<()> {
        self.lock()?.pods.push(pod);
        Ok(())
    }

    /// Returns every stored object in key order.
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned.
    pub fn objects(&self) -> Result<Vec<Object>> {
        Ok(self.lock()?.objects.values().cloned().collect())
    }

    fn lock(&self) -> Result<MutexGuard<'_, ClusterState>> {
        self.state.lock().map_err(|_| BerthError::Cluster {
            message: "cluster state lock poisoned".into(),
        })
    }
}

impl ClusterClient for MemoryCluster {
    fn get(&self, kind: ObjectKind, namespace: &str, name: &str) -> Result<Option<Object>> {
        Ok(self.lock()?.objects.get(&key(kind, namespace, name)).cloned())
    }

    fn create(&self, mut object: Object) -> Result<Object> {
        let mut state = self.lock()?;
        let id = object_key(&object);
        if state.objects.contains_key(&id) {
            let meta = object.metadata();
            return Err(BerthError::Conflict {
                kind: object.kind().as_str(),
                namespace: meta.namespace.clone(),
                name: meta.name.clone(),
            });
        }
        state.revision += 1;
        object.metadata_mut().resource_version = Some(state.revision.to_string());
        let _ = state.objects.insert(id, object.clone());
        Ok(object)
    }

    fn update(&self, mut object: Object) -> Result<Object> {
        let mut state = self.lock()?;
        let id = object_key(&object);
        if !state.objects.contains_key(&id) {
            return Err(BerthError::NotFound {
                kind: object.kind().as_str(),
                id,
            });
        }
        state.revision += 1;
        object.metadata_mut().resource_version = Some(state.revision.to_string());
        let _ = state.objects.insert(id, object.clone());
        Ok(object)
    }

    fn list_pods(&self, namespace: &str, selector: &BTreeMap<String, String>) -> Result<Vec<Pod>> {
        Ok(self
            .lock()?
            .pods
            .iter()
            .filter(|p| p.metadata.namespace == namespace && p.metadata.matches_labels(selector))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use berth_resources::{ConfigMap, ObjectMeta, Resource};

    use super::*;

    fn config_map(name: &str) -> Object {
        ConfigMap {
            metadata: ObjectMeta::new(name, "dev"),
            ..ConfigMap::default()
        }
        .into_object()
    }

    #[test]
    fn create_then_get_assigns_resource_version() {
        let cluster = MemoryCluster::new();
        let stored = cluster.create(config_map("a")).expect("create");
        assert_eq!(stored.metadata().resource_version.as_deref(), Some("1"));
        let fetched = cluster
            .get(ObjectKind::ConfigMap, "dev", "a")
            .expect("get")
            .expect("present");
        assert_eq!(fetched, stored);
        assert!(cluster.get(ObjectKind::Job, "dev", "a").expect("get").is_none());
    }

    #[test]
    fn duplicate_create_conflicts() {
        let cluster = MemoryCluster::new();
        let _ = cluster.create(config_map("a")).expect("create");
        let err = cluster.create(config_map("a")).unwrap_err();
        assert!(matches!(err, BerthError::Conflict { .. }));
    }

    #[test]
    fn update_of_missing_object_is_not_found() {
        let cluster = MemoryCluster::new();
        let err = cluster.update(config_map("a")).unwrap_err();
        assert!(matches!(err, BerthError::NotFound { .. }));
    }

    #[test]
    fn pods_are_filtered_by_namespace_and_labels() {
        let cluster = MemoryCluster::new();
        let mut pod = Pod::default();
        pod.metadata.namespace = "dev".into();
        let _ = pod.metadata.labels.insert("app".into(), "db".into());
        cluster.add_pod(pod).expect("add");

        let selector = BTreeMap::from([("app".to_string(), "db".to_string())]);
        assert_eq!(cluster.list_pods("dev", &selector).expect("list").len(), 1);
        assert!(cluster.list_pods("prod", &selector).expect("list").is_empty());
        let other = BTreeMap::from([("app".to_string(), "web".to_string())]);
        assert!(cluster.list_pods("dev", &other).expect("list").is_empty());
    }

    #[test]
    fn state_file_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("cluster.json");

        let cluster = MemoryCluster::open(&path).expect("open");
        let _ = cluster.create(config_map("a")).expect("create");
        cluster.save().expect("save");

        let reopened = MemoryCluster::open(&path).expect("reopen");
        assert_eq!(reopened.objects().expect("objects").len(), 1);
        let next = reopened.create(config_map("b")).expect("create");
        assert_eq!(next.metadata().resource_version.as_deref(), Some("2"));
    }
}
