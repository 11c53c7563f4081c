//! Kind-tagged envelope exchanged with a cluster client.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::meta::ObjectMeta;
use crate::network::{Ingress, NetworkService};
use crate::pod::PodTemplateSpec;
use crate::storage::{ConfigMap, PersistentVolumeClaim};
use crate::workload::{Deployment, Job, StatefulSet};

/// Kinds of objects the orchestrator manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Continuously running, stateless workload.
    Deployment,
    /// Continuously running workload with stable storage.
    StatefulSet,
    /// Run-to-completion workload.
    Job,
    /// Network service.
    Service,
    /// Persistent volume claim.
    PersistentVolumeClaim,
    /// Configuration record.
    ConfigMap,
    /// Ingress.
    Ingress,
}

impl ObjectKind {
    /// Returns the kind name as written in manifests.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deployment => "Deployment",
            Self::StatefulSet => "StatefulSet",
            Self::Job => "Job",
            Self::Service => "Service",
            Self::PersistentVolumeClaim => "PersistentVolumeClaim",
            Self::ConfigMap => "ConfigMap",
            Self::Ingress => "Ingress",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any managed object, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Object {
    /// A deployment.
    Deployment(Deployment),
    /// A stateful set.
    StatefulSet(StatefulSet),
    /// A job.
    Job(Job),
    /// A network service.
    Service(NetworkService),
    /// A persistent volume claim.
    PersistentVolumeClaim(PersistentVolumeClaim),
    /// A configuration record.
    ConfigMap(ConfigMap),
    /// An ingress.
    Ingress(Ingress),
}

impl Object {
    /// Returns the kind of the wrapped object.
    #[must_use]
    pub const fn kind(&self) -> ObjectKind {
        match self {
            Self::Deployment(_) => ObjectKind::Deployment,
            Self::StatefulSet(_) => ObjectKind::StatefulSet,
            Self::Job(_) => ObjectKind::Job,
            Self::Service(_) => ObjectKind::Service,
            Self::PersistentVolumeClaim(_) => ObjectKind::PersistentVolumeClaim,
            Self::ConfigMap(_) => ObjectKind::ConfigMap,
            Self::Ingress(_) => ObjectKind::Ingress,
        }
    }

    /// Returns the metadata of the wrapped object.
    #[must_use]
    pub const fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::Deployment(o) => &o.metadata,
            Self::StatefulSet(o) => &o.metadata,
            Self::Job(o) => &o.metadata,
            Self::Service(o) => &o.metadata,
            Self::PersistentVolumeClaim(o) => &o.metadata,
            Self::ConfigMap(o) => &o.metadata,
            Self::Ingress(o) => &o.metadata,
        }
    }

    /// Returns the metadata of the wrapped object for modification.
    pub const fn metadata_mut(&mut self) -> &mut ObjectMeta {
        match self {
            Self::Deployment(o) => &mut o.metadata,
            Self::StatefulSet(o) => &mut o.metadata,
            Self::Job(o) => &mut o.metadata,
            Self::Service(o) => &mut o.metadata,
            Self::PersistentVolumeClaim(o) => &mut o.metadata,
            Self::ConfigMap(o) => &mut o.metadata,
            Self::Ingress(o) => &mut o.metadata,
        }
    }
}

/// A typed managed object.
///
/// Lets the deployer run one create-or-update routine for every kind.
pub trait Resource: Clone + Sized {
    /// Kind of this object type.
    const KIND: ObjectKind;

    /// Returns the object metadata.
    fn metadata(&self) -> &ObjectMeta;

    /// Returns the object metadata for modification.
    fn metadata_mut(&mut self) -> &mut ObjectMeta;

    /// Overwrites the desired state with the one of `desired`.
    ///
    /// Cluster-owned fields such as status are left untouched.
    fn replace_spec(&mut self, desired: Self);

    /// Returns the pod template of workload kinds.
    fn pod_template_mut(&mut self) -> Option<&mut PodTemplateSpec> {
        None
    }

    /// Wraps the object in its kind-tagged envelope.
    fn into_object(self) -> Object;

    /// Unwraps an envelope of the matching kind.
    fn from_object(object: Object) -> Option<Self>;
}

macro_rules! impl_resource {
    ($ty:ident => $variant:ident, state: $state:ident $(, template: $template:ident)?) => {
        impl Resource for $ty {
            const KIND: ObjectKind = ObjectKind::$variant;

            fn metadata(&self) -> &ObjectMeta {
                &self.metadata
            }

            fn metadata_mut(&mut self) -> &mut ObjectMeta {
                &mut self.metadata
            }

            fn replace_spec(&mut self, desired: Self) {
                self.$state = desired.$state;
            }

            $(
                fn pod_template_mut(&mut self) -> Option<&mut PodTemplateSpec> {
                    Some(&mut self.spec.$template)
                }
            )?

            fn into_object(self) -> Object {
                Object::$variant(self)
            }

            fn from_object(object: Object) -> Option<Self> {
                match object {
                    Object::$variant(o) => Some(o),
                    _ => None,
                }
            }
        }
    };
}

impl_resource!(Deployment => Deployment, state: spec, template: template);
impl_resource!(StatefulSet => StatefulSet, state: spec, template: template);
impl_resource!(Job => Job, state: spec, template: template);
impl_resource!(NetworkService => Service, state: spec);
impl_resource!(PersistentVolumeClaim => PersistentVolumeClaim, state: spec);
impl_resource!(ConfigMap => ConfigMap, state: data);
impl_resource!(Ingress => Ingress, state: spec);
