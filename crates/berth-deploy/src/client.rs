//! Cluster API abstraction.

use std::collections::BTreeMap;

use berth_common::error::{BerthError, Result};
use berth_resources::{Object, ObjectKind, Pod, Resource};

/// Control-plane operations used by one orchestration pass.
///
/// Implementations surface API failures unmodified; nothing in this crate
/// retries them.
pub trait ClusterClient: Send + Sync {
    /// Fetches an object by kind, namespace, and name.
    ///
    /// # Errors
    ///
    /// Returns an error if the cluster cannot be queried. An absent object
    /// is `Ok(None)`.
    fn get(&self, kind: ObjectKind, namespace: &str, name: &str) -> Result<Option<Object>>;

    /// Creates an object, returning it as stored.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if an object with the same identity exists.
    fn create(&self, object: Object) -> Result<Object>;

    /// Replaces an existing object, returning it as stored.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the object does not exist.
    fn update(&self, object: Object) -> Result<Object>;

    /// Lists the pods of a namespace carrying every selector label.
    ///
    /// # Errors
    ///
    /// Returns an error if the cluster cannot be queried.
    fn list_pods(&self, namespace: &str, selector: &BTreeMap<String, String>) -> Result<Vec<Pod>>;
}

/// Fetches an object as its concrete type.
///
/// # Errors
///
/// Returns `Cluster` if the stored object has another kind, or any error
/// reported by the client.
pub fn fetch<R: Resource>(
    client: &dyn ClusterClient,
    namespace: &str,
    name: &str,
) -> Result<Option<R>> {
    let Some(object) = client.get(R::KIND, namespace, name)? else {
        return Ok(None);
    };
    let found = object.kind();
    R::from_object(object).map(Some).ok_or_else(|| BerthError::Cluster {
        message: format!("expected {} '{name}', found {found}", R::KIND),
    })
}
