//! End-to-end deploy passes against an in-memory cluster.
//!
//! Covers:
//! 1. Workload kind per service on first deploy
//! 2. Redeploy relabelling of objects left by a previous pass
//! 3. Idempotence of repeated passes
//! 4. Ownership isolation between stacks sharing a namespace
//! 5. Validation and restart budget failures before any mutation
//! 6. Scoped volumes and endpoints on partial deploys
//! 7. Configuration record contents
//! 8. Cancellation

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::collections::BTreeMap;

use berth_common::config::DeployConfig;
use berth_common::constants::{
    DEPLOYED_BY_LABEL, REVISION_ANNOTATION, STACK_NAME_LABEL, STACK_SERVICE_NAME_LABEL,
    STATUS_FIELD, stack_config_map_name,
};
use berth_common::error::{BerthError, Result};
use berth_common::types::CancelFlag;
use berth_deploy::client::{ClusterClient, fetch};
use berth_deploy::health::is_running;
use berth_deploy::{ApplyOutcome, DeployOptions, DeployReport, MemoryCluster, deploy_stack};
use berth_model::{
    DependsOnCondition, Endpoint, EndpointRule, Port, RestartPolicy, Service, Stack, StackVolume,
    VolumeSpec,
};
use berth_resources::{
    ConfigMap, ContainerStatus, Deployment, Ingress, Job, NetworkService, Object, ObjectKind,
    ObjectMeta, PersistentVolumeClaim, Pod, PodStatus, Resource, StatefulSet,
};

// ── Fixtures ─────────────────────────────────────────────────────────

fn service(image: &str) -> Service {
    Service {
        image: image.into(),
        ..Service::default()
    }
}

fn shop() -> Stack {
    let mut db = service("postgres:16");
    db.volumes = vec![StackVolume::new("pgdata", "/var/lib/postgresql/data")];
    db.ports = vec![Port {
        container_port: 5432,
        ..Port::default()
    }];

    let mut migrate = service("shop:1");
    migrate.restart_policy = RestartPolicy::Never;
    migrate.depends_on = BTreeMap::from([("db".to_string(), DependsOnCondition::Healthy)]);

    let mut api = service("shop:1");
    api.ports = vec![Port {
        container_port: 8080,
        host_port: 80,
        ..Port::default()
    }];
    api.depends_on = BTreeMap::from([
        ("db".to_string(), DependsOnCondition::Healthy),
        ("migrate".to_string(), DependsOnCondition::Completed),
    ]);

    let mut worker = service("shop:1");
    worker.volumes = vec![StackVolume::new("uploads", "/uploads")];

    Stack {
        name: "shop".into(),
        namespace: "dev".into(),
        services: BTreeMap::from([
            ("api".to_string(), api),
            ("db".to_string(), db),
            ("migrate".to_string(), migrate),
            ("worker".to_string(), worker),
        ]),
        volumes: BTreeMap::from([
            ("pgdata".to_string(), VolumeSpec::default()),
            ("uploads".to_string(), VolumeSpec::default()),
        ]),
        endpoints: BTreeMap::from([(
            "public".to_string(),
            Endpoint {
                rules: vec![EndpointRule {
                    path: "/".into(),
                    service: "api".into(),
                    port: 80,
                }],
                ..Endpoint::default()
            },
        )]),
        manifest: b"name: shop".to_vec(),
        is_compose: false,
    }
}

fn deploy(cluster: &MemoryCluster, stack: &Stack, services: &[&str]) -> Result<DeployReport> {
    let options = DeployOptions {
        services: services.iter().map(|s| (*s).to_string()).collect(),
        ..DeployOptions::default()
    };
    deploy_stack(
        cluster,
        stack,
        &options,
        &DeployConfig::default(),
        &CancelFlag::new(),
    )
}

fn get<R: Resource>(cluster: &MemoryCluster, name: &str) -> Option<R> {
    fetch::<R>(cluster, "dev", name).expect("fetch")
}

fn without_revision(mut objects: Vec<Object>) -> Vec<Object> {
    for object in &mut objects {
        object.metadata_mut().resource_version = None;
        let template = match object {
            Object::Deployment(d) => Some(&mut d.spec.template),
            Object::StatefulSet(s) => Some(&mut s.spec.template),
            Object::Job(j) => Some(&mut j.spec.template),
            _ => None,
        };
        if let Some(t) = template {
            let _ = t.metadata.annotations.remove(REVISION_ANNOTATION);
        }
    }
    objects
}

fn crashing_pod(service: &str, restarts: i32) -> Pod {
    let mut meta = ObjectMeta::new(format!("{service}-0"), "dev");
    let _ = meta
        .labels
        .insert(STACK_NAME_LABEL.to_string(), "shop".to_string());
    let _ = meta
        .labels
        .insert(STACK_SERVICE_NAME_LABEL.to_string(), service.to_string());
    Pod {
        metadata: meta,
        status: PodStatus {
            container_statuses: vec![ContainerStatus {
                name: service.to_string(),
                ready: false,
                restart_count: restarts,
            }],
        },
    }
}

// ── Kinds ────────────────────────────────────────────────────────────

#[test]
fn full_deploy_creates_one_workload_per_service_with_its_kind() {
    let cluster = MemoryCluster::new();
    let report = deploy(&cluster, &shop(), &[]).expect("deploy");

    assert!(get::<Deployment>(&cluster, "api").is_some());
    assert!(get::<StatefulSet>(&cluster, "db").is_some());
    assert!(get::<Job>(&cluster, "migrate").is_some());
    assert!(get::<StatefulSet>(&cluster, "worker").is_some());
    assert!(get::<Deployment>(&cluster, "db").is_none());

    assert!(get::<NetworkService>(&cluster, "api").is_some());
    assert!(get::<NetworkService>(&cluster, "db").is_some());
    assert!(get::<NetworkService>(&cluster, "worker").is_none());
    assert!(get::<PersistentVolumeClaim>(&cluster, "pgdata").is_some());
    assert!(get::<Ingress>(&cluster, "public").is_some());

    let pos = |n: &str| report.services.iter().position(|s| s == n).expect(n);
    assert!(pos("db") < pos("migrate"));
    assert!(pos("migrate") < pos("api"));
    assert!(
        report
            .applied
            .iter()
            .all(|a| a.outcome == ApplyOutcome::Created)
    );
}

#[test]
fn created_objects_carry_ownership_and_deployed_by() {
    let cluster = MemoryCluster::new();
    let _ = deploy(&cluster, &shop(), &[]).expect("deploy");
    for object in cluster.objects().expect("objects") {
        if object.kind() == ObjectKind::ConfigMap {
            continue;
        }
        let meta = object.metadata();
        assert_eq!(meta.label(STACK_NAME_LABEL), Some("shop"), "{}", meta.name);
        assert_eq!(meta.label(DEPLOYED_BY_LABEL), Some("shop"), "{}", meta.name);
    }
}

// ── Redeploy ─────────────────────────────────────────────────────────

#[test]
fn redeploy_relabels_objects_of_every_kind() {
    let cluster = MemoryCluster::new();
    let old_meta = |name: &str| {
        let mut meta = ObjectMeta::new(name, "dev");
        let _ = meta
            .labels
            .insert(STACK_NAME_LABEL.to_string(), "shop".to_string());
        let _ = meta
            .labels
            .insert(DEPLOYED_BY_LABEL.to_string(), "someone".to_string());
        meta
    };
    cluster
        .insert(
            Deployment {
                metadata: old_meta("api"),
                ..Deployment::default()
            }
            .into_object(),
        )
        .expect("seed");
    cluster
        .insert(
            StatefulSet {
                metadata: old_meta("db"),
                ..StatefulSet::default()
            }
            .into_object(),
        )
        .expect("seed");
    let mut old_job = Job {
        metadata: old_meta("migrate"),
        ..Job::default()
    };
    old_job.status.failed = 1;
    cluster.insert(old_job.into_object()).expect("seed");

    let _ = deploy(&cluster, &shop(), &["api", "db", "migrate"]).expect("deploy");

    let api: Deployment = get(&cluster, "api").expect("api");
    let db: StatefulSet = get(&cluster, "db").expect("db");
    let migrate: Job = get(&cluster, "migrate").expect("migrate");
    for meta in [&api.metadata, &db.metadata, &migrate.metadata] {
        assert_eq!(meta.label(STACK_NAME_LABEL), Some("shop"));
        assert_eq!(meta.label(DEPLOYED_BY_LABEL), Some("shop"));
    }
    assert_eq!(api.spec.template.spec.containers[0].image, "shop:1");
    assert_eq!(migrate.status.failed, 1);
}

#[test]
fn repeated_passes_converge_to_the_same_state() {
    let cluster = MemoryCluster::new();
    let stack = shop();
    let _ = deploy(&cluster, &stack, &[]).expect("first");
    let first = without_revision(cluster.objects().expect("objects"));

    let report = deploy(&cluster, &stack, &[]).expect("second");
    let second = without_revision(cluster.objects().expect("objects"));

    assert_eq!(first, second);
    assert!(
        report
            .applied
            .iter()
            .all(|a| a.outcome == ApplyOutcome::Updated)
    );
    let api: Deployment = get(&cluster, "api").expect("api");
    assert!(
        api.spec
            .template
            .metadata
            .annotations
            .contains_key(REVISION_ANNOTATION)
    );
}

// ── Ownership ────────────────────────────────────────────────────────

#[test]
fn objects_of_another_stack_are_never_modified() {
    let cluster = MemoryCluster::new();
    let mut meta = ObjectMeta::new("api", "dev");
    let _ = meta
        .labels
        .insert(STACK_NAME_LABEL.to_string(), "blog".to_string());
    let foreign = Deployment {
        metadata: meta,
        ..Deployment::default()
    };
    let stored = cluster.create(foreign.into_object()).expect("seed");

    let report = deploy(&cluster, &shop(), &["api"]).expect("deploy");

    let after = cluster
        .get(ObjectKind::Deployment, "dev", "api")
        .expect("get")
        .expect("present");
    assert_eq!(after, stored);
    assert!(report.applied.iter().any(|a| a.kind == ObjectKind::Deployment
        && a.name == "api"
        && a.outcome == ApplyOutcome::Skipped));
}

// ── Failures before mutation ─────────────────────────────────────────

#[test]
fn undefined_services_fail_before_any_write() {
    let cluster = MemoryCluster::new();
    let err = deploy(&cluster, &shop(), &["api", "cache", "queue"]).unwrap_err();
    let BerthError::UndefinedServices { names } = err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(names, vec!["cache", "queue"]);
    assert!(cluster.objects().expect("objects").is_empty());
}

#[test]
fn invalid_model_fails_before_any_write() {
    let cluster = MemoryCluster::new();
    let mut stack = shop();
    let _ = stack.volumes.remove("uploads");
    let err = deploy(&cluster, &stack, &[]).unwrap_err();
    assert!(matches!(err, BerthError::InvalidStack { .. }), "{err}");
    assert!(cluster.objects().expect("objects").is_empty());
}

#[test]
fn crash_looping_dependency_aborts_the_pass() {
    let cluster = MemoryCluster::new();
    cluster.add_pod(crashing_pod("db", 5)).expect("seed");
    let err = deploy(&cluster, &shop(), &["api"]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Service 'db' has been restarted 5 times. Please check the logs and try again"
    );
    assert!(cluster.objects().expect("objects").is_empty());
}

#[test]
fn restarts_below_the_backoff_limit_do_not_abort() {
    let cluster = MemoryCluster::new();
    cluster.add_pod(crashing_pod("db", 4)).expect("seed");
    assert!(deploy(&cluster, &shop(), &["api"]).is_ok());
}

// ── Scope ────────────────────────────────────────────────────────────

#[test]
fn partial_deploy_touches_only_scoped_volumes_and_endpoints() {
    let cluster = MemoryCluster::new();
    let report = deploy(&cluster, &shop(), &["worker"]).expect("deploy");

    assert_eq!(report.services, vec!["worker"]);
    assert!(get::<PersistentVolumeClaim>(&cluster, "uploads").is_some());
    assert!(get::<PersistentVolumeClaim>(&cluster, "pgdata").is_none());
    assert!(get::<Ingress>(&cluster, "public").is_none());
    assert!(get::<Deployment>(&cluster, "api").is_none());
}

#[test]
fn partial_deploy_pulls_in_unsatisfied_dependencies() {
    let cluster = MemoryCluster::new();
    let report = deploy(&cluster, &shop(), &["api"]).expect("deploy");
    let mut services = report.services.clone();
    services.sort();
    assert_eq!(services, vec!["api", "db", "migrate"]);
    assert!(get::<PersistentVolumeClaim>(&cluster, "pgdata").is_some());
    assert!(get::<Ingress>(&cluster, "public").is_some());
}

#[test]
fn satisfied_dependencies_are_left_alone() {
    let cluster = MemoryCluster::new();
    let _ = deploy(&cluster, &shop(), &["db", "migrate"]).expect("seed deploy");

    let mut db: StatefulSet = get(&cluster, "db").expect("db");
    db.status.ready_replicas = 1;
    cluster.insert(db.into_object()).expect("mark ready");
    let mut migrate: Job = get(&cluster, "migrate").expect("migrate");
    migrate.status.succeeded = 1;
    cluster.insert(migrate.into_object()).expect("mark done");

    let report = deploy(&cluster, &shop(), &["api"]).expect("deploy");
    assert_eq!(report.services, vec!["api"]);
    assert!(is_running(&cluster, &shop(), "db").expect("db"));
    assert!(!is_running(&cluster, &shop(), "migrate").expect("migrate"));
}

// ── Configuration record ─────────────────────────────────────────────

#[test]
fn configuration_record_reports_deployed() {
    let cluster = MemoryCluster::new();
    let _ = deploy(&cluster, &shop(), &[]).expect("deploy");
    let record: ConfigMap = get(&cluster, &stack_config_map_name("shop")).expect("record");
    assert_eq!(record.data["name"], "shop");
    assert_eq!(record.data["compose"], "false");
    assert_eq!(record.data["yaml"], "bmFtZTogc2hvcA==");
    assert_eq!(record.data[STATUS_FIELD], "deployed");
}

// ── Cancellation ─────────────────────────────────────────────────────

#[test]
fn pass_cancelled_before_start_writes_nothing() {
    let cluster = MemoryCluster::new();
    let cancel = CancelFlag::new();
    cancel.cancel();
    let err = deploy_stack(
        &cluster,
        &shop(),
        &DeployOptions::default(),
        &DeployConfig::default(),
        &cancel,
    )
    .unwrap_err();
    assert!(matches!(err, BerthError::Cancelled));
    assert!(cluster.objects().expect("objects").is_empty());
}
