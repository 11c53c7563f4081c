//! Volume mounts, init containers, claim templates, and co-location affinity.

use std::collections::BTreeMap;

use berth_common::constants::{
    DEFAULT_CLAIM_NAME, DEFAULT_DATA_MOUNT, HOSTNAME_TOPOLOGY_KEY, NAMED_VOLUMES_MOUNT,
    PERMISSIONS_IMAGE, volume_marker_label,
};
use berth_model::{Service, StackVolume};
use berth_resources::{
    Affinity, Container, LabelSelector, LabelSelectorRequirement, ObjectMeta,
    PersistentVolumeClaim, PersistentVolumeClaimSpec, PodAffinity, PodAffinityTerm,
    SelectorOperator, Volume, VolumeMount,
};

/// Access mode of every generated claim.
pub const READ_WRITE_ONCE: &str = "ReadWriteOnce";

/// Returns the claim backing a mount: its local path, or the shared default claim.
#[must_use]
pub fn claim_name(volume: &StackVolume) -> &str {
    if volume.is_named() {
        &volume.local_path
    } else {
        DEFAULT_CLAIM_NAME
    }
}

fn sub_path(index: usize, volume: &StackVolume) -> String {
    if volume.is_named() {
        volume.local_path.clone()
    } else {
        format!("data-{index}")
    }
}

/// Mounts of the main container, one per service volume.
#[must_use]
pub fn translate_volume_mounts(svc: &Service) -> Vec<VolumeMount> {
    svc.volumes
        .iter()
        .enumerate()
        .map(|(i, v)| VolumeMount {
            name: claim_name(v).to_string(),
            mount_path: v.remote_path.clone(),
            sub_path: sub_path(i, v),
        })
        .collect()
}

/// Pod volumes, one per service volume.
#[must_use]
pub fn translate_pod_volumes(svc: &Service) -> Vec<Volume> {
    svc.volumes
        .iter()
        .map(|v| Volume {
            name: claim_name(v).to_string(),
            claim_name: v.local_path.clone(),
        })
        .collect()
}

/// Init containers of a volumed service; empty when it has no volumes.
///
/// The permission fix runs first so the seeding copy can write into the
/// freshly provisioned volumes.
#[must_use]
pub fn translate_init_containers(name: &str, svc: &Service) -> Vec<Container> {
    if svc.volumes.is_empty() {
        return Vec::new();
    }
    vec![
        permissions_container(name, svc),
        seeding_container(name, svc),
    ]
}

fn permissions_container(name: &str, svc: &Service) -> Container {
    let mut clauses: Vec<String> = Vec::new();
    let mut mounts = Vec::new();
    let mut named_added = false;
    let mut data_added = false;
    for volume in &svc.volumes {
        let claim = claim_name(volume);
        if volume.is_named() {
            mounts.push(VolumeMount {
                name: claim.to_string(),
                mount_path: format!("{NAMED_VOLUMES_MOUNT}/{claim}"),
                sub_path: String::new(),
            });
            if !named_added {
                clauses.push(format!("chmod 777 {NAMED_VOLUMES_MOUNT}/*"));
                named_added = true;
            }
        } else if !data_added {
            mounts.push(VolumeMount {
                name: claim.to_string(),
                mount_path: DEFAULT_DATA_MOUNT.to_string(),
                sub_path: String::new(),
            });
            clauses.push(format!("chmod 777 {DEFAULT_DATA_MOUNT}"));
            data_added = true;
        }
    }
    Container {
        name: format!("init-{name}"),
        image: PERMISSIONS_IMAGE.to_string(),
        command: shell(&clauses.join(" && ")),
        volume_mounts: mounts,
        ..Container::default()
    }
}

fn seeding_container(name: &str, svc: &Service) -> Container {
    let image = &svc.image;
    let mut clauses = Vec::with_capacity(svc.volumes.len());
    let mut mounts = Vec::with_capacity(svc.volumes.len());
    for (i, volume) in svc.volumes.iter().enumerate() {
        let claim = claim_name(volume);
        let target = format!("/init-volume-{i}");
        clauses.push(format!(
            "echo initializing volume {claim} with content of the image {image}... && \
             (cp -Rv {remote}/. {target} 2>&1 | sed -E 's/cp: cannot stat (.*): No such file or directory/the image '{image}' does not have any content in \\1/g' || true)",
            remote = volume.remote_path,
        ));
        mounts.push(VolumeMount {
            name: claim.to_string(),
            mount_path: target,
            sub_path: sub_path(i, volume),
        });
    }
    Container {
        name: format!("init-volume-{name}"),
        image: image.clone(),
        image_pull_policy: Some("IfNotPresent".to_string()),
        command: shell(&clauses.join(" && ")),
        volume_mounts: mounts,
        ..Container::default()
    }
}

fn shell(script: &str) -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string(), script.to_string()]
}

/// Requires co-scheduling with pods already holding each stack-declared volume.
#[must_use]
pub fn translate_affinity(svc: &Service) -> Option<Affinity> {
    let terms: Vec<PodAffinityTerm> = svc
        .volumes
        .iter()
        .filter(|v| v.is_named())
        .map(|v| PodAffinityTerm {
            label_selector: LabelSelector {
                match_expressions: vec![LabelSelectorRequirement {
                    key: volume_marker_label(&v.local_path),
                    operator: SelectorOperator::Exists,
                    values: Vec::new(),
                }],
                ..LabelSelector::default()
            },
            topology_key: HOSTNAME_TOPOLOGY_KEY.to_string(),
        })
        .collect();
    if terms.is_empty() {
        return None;
    }
    Some(Affinity {
        pod_affinity: Some(PodAffinity {
            required_during_scheduling_ignored_during_execution: terms,
        }),
    })
}

/// Per-replica claim template for ephemeral volumes.
///
/// Emitted only when at least one mount has no local path.
#[must_use]
pub fn translate_claim_templates(
    svc: &Service,
    labels: &BTreeMap<String, String>,
) -> Vec<PersistentVolumeClaim> {
    if svc.volumes.iter().all(StackVolume::is_named) {
        return Vec::new();
    }
    let storage = svc
        .resources
        .as_ref()
        .map(|r| r.storage.clone())
        .unwrap_or_default();
    vec![PersistentVolumeClaim {
        metadata: ObjectMeta {
            name: DEFAULT_CLAIM_NAME.to_string(),
            labels: labels.clone(),
            annotations: svc.annotations.clone(),
            ..ObjectMeta::default()
        },
        spec: PersistentVolumeClaimSpec {
            access_modes: vec![READ_WRITE_ONCE.to_string()],
            storage: storage.size,
            storage_class_name: non_empty(storage.class),
        },
    }]
}

pub(crate) fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
    use berth_common::types::Quantity;
    use berth_model::{ServiceResources, StorageRequest};

    use super::*;

    fn volumed() -> Service {
        Service {
            image: "postgres:16".into(),
            volumes: vec![
                StackVolume::new("pgdata", "/var/lib/postgresql/data"),
                StackVolume::new("", "/tmp/a"),
                StackVolume::new("logs", "/var/log"),
                StackVolume::new("", "/tmp/b"),
            ],
            ..Service::default()
        }
    }

    #[test]
    fn claim_name_defaults_for_ephemeral_mounts() {
        assert_eq!(claim_name(&StackVolume::new("data", "/d")), "data");
        assert_eq!(claim_name(&StackVolume::new("", "/d")), DEFAULT_CLAIM_NAME);
    }

    #[test]
    fn mounts_use_local_path_or_indexed_sub_path() {
        let mounts = translate_volume_mounts(&volumed());
        assert_eq!(mounts[0].sub_path, "pgdata");
        assert_eq!(mounts[1].name, "pvc");
        assert_eq!(mounts[1].sub_path, "data-1");
        assert_eq!(mounts[3].sub_path, "data-3");
    }

    #[test]
    fn permission_command_lists_each_mount_class_once() {
        let init = translate_init_containers("db", &volumed());
        assert_eq!(init.len(), 2);
        let fix = &init[0];
        assert_eq!(fix.name, "init-db");
        assert_eq!(fix.image, "busybox");
        assert_eq!(
            fix.command,
            vec!["sh", "-c", "chmod 777 /volumes/* && chmod 777 /data"]
        );
        let paths: Vec<_> = fix.volume_mounts.iter().map(|m| m.mount_path.as_str()).collect();
        assert_eq!(paths, vec!["/volumes/pgdata", "/data", "/volumes/logs"]);
    }

    #[test]
    fn seeding_container_copies_every_volume() {
        let init = translate_init_containers("db", &volumed());
        let seed = &init[1];
        assert_eq!(seed.name, "init-volume-db");
        assert_eq!(seed.image, "postgres:16");
        assert_eq!(seed.image_pull_policy.as_deref(), Some("IfNotPresent"));
        assert_eq!(seed.volume_mounts.len(), 4);
        assert_eq!(seed.volume_mounts[2].mount_path, "/init-volume-2");
        let script = &seed.command[2];
        assert!(script.starts_with(
            "echo initializing volume pgdata with content of the image postgres:16... && (cp -Rv /var/lib/postgresql/data/. /init-volume-0 2>&1"
        ));
        assert_eq!(script.matches("|| true)").count(), 4);
        assert_eq!(script.matches(") && echo").count(), 3);
    }

    #[test]
    fn no_init_containers_without_volumes() {
        assert!(translate_init_containers("api", &Service::default()).is_empty());
    }

    #[test]
    fn affinity_targets_local_volume_markers() {
        let affinity = translate_affinity(&volumed()).expect("affinity");
        let terms = affinity
            .pod_affinity
            .expect("pod affinity")
            .required_during_scheduling_ignored_during_execution;
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].topology_key, HOSTNAME_TOPOLOGY_KEY);
        let req = &terms[0].label_selector.match_expressions[0];
        assert_eq!(req.key, volume_marker_label("pgdata"));
        assert_eq!(req.operator, SelectorOperator::Exists);
    }

    #[test]
    fn no_affinity_without_local_volumes() {
        let svc = Service {
            volumes: vec![StackVolume::new("", "/cache")],
            ..Service::default()
        };
        assert!(translate_affinity(&svc).is_none());
    }

    #[test]
    fn claim_template_only_for_ephemeral_mounts() {
        let labels = BTreeMap::new();
        let named_only = Service {
            volumes: vec![StackVolume::new("data", "/data")],
            ..Service::default()
        };
        assert!(translate_claim_templates(&named_only, &labels).is_empty());

        let mut svc = volumed();
        svc.resources = Some(ServiceResources {
            storage: StorageRequest {
                size: Quantity::new("5Gi"),
                class: "fast".into(),
            },
            ..ServiceResources::default()
        });
        let templates = translate_claim_templates(&svc, &labels);
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].metadata.name, "pvc");
        assert_eq!(templates[0].spec.storage.as_str(), "5Gi");
        assert_eq!(templates[0].spec.storage_class_name.as_deref(), Some("fast"));
        assert_eq!(templates[0].spec.access_modes, vec![READ_WRITE_ONCE]);
    }
}
