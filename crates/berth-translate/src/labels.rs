//! Ownership, identity, and co-location labels.

use std::collections::BTreeMap;

use berth_common::constants::{
    STACK_ENDPOINT_NAME_LABEL, STACK_NAME_LABEL, STACK_SERVICE_NAME_LABEL,
    STACK_VOLUME_NAME_LABEL, volume_marker_label,
};
use berth_model::{Service, Stack};

/// Labels of every object generated for a service.
///
/// Stack ownership and service identity come first, then one marker per
/// stack-declared volume. User labels are overlaid last.
#[must_use]
pub fn service_labels(stack: &Stack, name: &str, svc: &Service) -> BTreeMap<String, String> {
    let mut labels = selector_labels(stack, name);
    for volume in svc.volumes.iter().filter(|v| v.is_named()) {
        let _ = labels.insert(volume_marker_label(&volume.local_path), "true".to_string());
    }
    overlay(&mut labels, &svc.labels);
    labels
}

/// Labels selecting the pods of a service.
#[must_use]
pub fn selector_labels(stack: &Stack, name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (STACK_NAME_LABEL.to_string(), stack.name.clone()),
        (STACK_SERVICE_NAME_LABEL.to_string(), name.to_string()),
    ])
}

/// Labels of the claim backing a stack-declared volume.
#[must_use]
pub fn volume_labels(
    stack: &Stack,
    volume: &str,
    user: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::from([
        (STACK_NAME_LABEL.to_string(), stack.name.clone()),
        (STACK_VOLUME_NAME_LABEL.to_string(), volume.to_string()),
    ]);
    overlay(&mut labels, user);
    labels
}

/// Labels of the ingress generated for an endpoint.
#[must_use]
pub fn endpoint_labels(
    stack: &Stack,
    endpoint: &str,
    user: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::from([
        (STACK_NAME_LABEL.to_string(), stack.name.clone()),
        (STACK_ENDPOINT_NAME_LABEL.to_string(), endpoint.to_string()),
    ]);
    overlay(&mut labels, user);
    labels
}

fn overlay(labels: &mut BTreeMap<String, String>, user: &BTreeMap<String, String>) {
    labels.extend(user.iter().map(|(k, v)| (k.clone(), v.clone())));
}
