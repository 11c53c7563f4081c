//! Idempotent create-or-update with cross-stack ownership isolation.
//!
//! Every object carries the name of the stack that manages it. An object
//! owned by another stack is never touched, so stacks sharing a namespace
//! cannot overwrite each other.

use berth_common::config::DeployConfig;
use berth_common::constants::{DEPLOYED_BY_LABEL, REVISION_ANNOTATION, STACK_NAME_LABEL};
use berth_common::error::Result;
use berth_common::types::CancelFlag;
use berth_model::Stack;
use berth_resources::{ConfigMap, ObjectMeta, Resource};
use berth_translate::{
    StackStatus, Workload, translate_config_map, translate_ingress, translate_network_service,
    translate_volume_claim, translate_workload,
};

use crate::client::{ClusterClient, fetch};

/// What an apply did to the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The object did not exist and was created.
    Created,
    /// The object existed, belonged to this stack (or to none), and was updated.
    Updated,
    /// The object belongs to another stack and was left untouched.
    Skipped,
}

/// Applies the objects of one stack.
pub struct Deployer<'a> {
    client: &'a dyn ClusterClient,
    stack: &'a Stack,
    config: &'a DeployConfig,
    cancel: CancelFlag,
}

impl<'a> Deployer<'a> {
    /// Creates a deployer for a stack.
    #[must_use]
    pub fn new(
        client: &'a dyn ClusterClient,
        stack: &'a Stack,
        config: &'a DeployConfig,
        cancel: CancelFlag,
    ) -> Self {
        Self {
            client,
            stack,
            config,
            cancel,
        }
    }

    /// Creates or updates one object.
    ///
    /// An absent object is created with the ownership labels. An object
    /// labelled with another stack name is skipped. Otherwise the desired
    /// state replaces the stored one, ownership labels are rewritten, and
    /// the pod template revision annotation is touched so identical specs
    /// still roll.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if cancellation was requested, or any error
    /// reported by the cluster client.
    pub fn apply<R: Resource>(&self, mut desired: R) -> Result<ApplyOutcome> {
        self.cancel.check()?;
        let namespace = desired.metadata().namespace.clone();
        let name = desired.metadata().name.clone();
        let stack_name = &self.stack.name;

        let Some(mut existing) = fetch::<R>(self.client, &namespace, &name)? else {
            stamp_ownership(desired.metadata_mut(), stack_name);
            let _ = self.client.create(desired.into_object())?;
            tracing::info!(kind = %R::KIND, name = %name, namespace = %namespace, "created");
            return Ok(ApplyOutcome::Created);
        };

        if let Some(owner) = foreign_owner(existing.metadata(), stack_name) {
            tracing::info!(
                kind = %R::KIND,
                name = %name,
                owner = %owner,
                "skipping object managed by another stack"
            );
            return Ok(ApplyOutcome::Skipped);
        }

        let desired_meta = desired.metadata().clone();
        existing.replace_spec(desired);
        let meta = existing.metadata_mut();
        meta.labels.extend(desired_meta.labels);
        meta.annotations.extend(desired_meta.annotations);
        stamp_ownership(meta, stack_name);
        if let Some(template) = existing.pod_template_mut() {
            let _ = template.metadata.annotations.insert(
                REVISION_ANNOTATION.to_string(),
                chrono::Utc::now().to_rfc3339(),
            );
        }
        let _ = self.client.update(existing.into_object())?;
        tracing::info!(kind = %R::KIND, name = %name, namespace = %namespace, "updated");
        Ok(ApplyOutcome::Updated)
    }

    /// Translates and applies the workload of a service.
    ///
    /// # Errors
    ///
    /// Returns an error if translation or the apply fails.
    pub fn deploy_workload(&self, service: &str) -> Result<ApplyOutcome> {
        match translate_workload(self.stack, service, self.config)? {
            Workload::Deployment(d) => self.apply(d),
            Workload::StatefulSet(s) => self.apply(s),
            Workload::Job(j) => self.apply(j),
        }
    }

    /// Translates and applies the network service of a service.
    ///
    /// Returns `None` when the service publishes no ports.
    ///
    /// # Errors
    ///
    /// Returns an error if translation or the apply fails.
    pub fn deploy_network_service(&self, service: &str) -> Result<Option<ApplyOutcome>> {
        translate_network_service(self.stack, service)?
            .map(|svc| self.apply(svc))
            .transpose()
    }

    /// Translates and applies the claim of a stack-declared volume.
    ///
    /// # Errors
    ///
    /// Returns an error if translation or the apply fails.
    pub fn deploy_volume(&self, volume: &str) -> Result<ApplyOutcome> {
        self.apply(translate_volume_claim(self.stack, volume)?)
    }

    /// Translates and applies the ingress of an endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if translation or the apply fails.
    pub fn deploy_endpoint(&self, endpoint: &str) -> Result<ApplyOutcome> {
        self.apply(translate_ingress(self.stack, endpoint)?)
    }

    /// Writes the stack configuration record with the given status.
    ///
    /// The record is keyed by stack name, so it is always overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error reported by the cluster client.
    pub fn record_status(&self, status: StackStatus) -> Result<()> {
        let desired = translate_config_map(self.stack, status);
        let namespace = desired.metadata.namespace.clone();
        let name = desired.metadata.name.clone();
        match fetch::<ConfigMap>(self.client, &namespace, &name)? {
            None => {
                let _ = self.client.create(desired.into_object())?;
            }
            Some(mut existing) => {
                existing.metadata.labels.extend(desired.metadata.labels.clone());
                existing.replace_spec(desired);
                let _ = self.client.update(existing.into_object())?;
            }
        }
        tracing::debug!(stack = %self.stack.name, status = %status, "recorded stack status");
        Ok(())
    }
}

/// Returns the owning stack if it is set and differs from `stack_name`.
fn foreign_owner<'m>(meta: &'m ObjectMeta, stack_name: &str) -> Option<&'m str> {
    meta.label(STACK_NAME_LABEL)
        .filter(|owner| !owner.is_empty() && *owner != stack_name)
}

fn stamp_ownership(meta: &mut ObjectMeta, stack_name: &str) {
    let _ = meta
        .labels
        .insert(STACK_NAME_LABEL.to_string(), stack_name.to_string());
    let _ = meta
        .labels
        .insert(DEPLOYED_BY_LABEL.to_string(), stack_name.to_string());
}
