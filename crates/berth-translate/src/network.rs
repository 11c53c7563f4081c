//! Network services and ingresses.

use berth_common::error::{BerthError, Result};
use berth_model::{Port, Service, Stack};
use berth_resources::{
    Ingress, IngressRule, IngressSpec, NetworkService, ObjectMeta, ServicePort, ServiceSpec,
};

use crate::labels::{endpoint_labels, selector_labels, service_labels};

/// Exposure type of every generated network service.
pub const CLUSTER_IP: &str = "ClusterIP";

/// Translates the network service of a service.
///
/// Returns `None` when the service publishes no ports.
///
/// # Errors
///
/// Returns `NotFound` if the stack has no such service.
pub fn translate_network_service(stack: &Stack, name: &str) -> Result<Option<NetworkService>> {
    let svc = stack.service(name)?;
    if svc.ports.is_empty() {
        return Ok(None);
    }
    Ok(Some(NetworkService {
        metadata: ObjectMeta {
            name: name.to_string(),
            namespace: stack.namespace.clone(),
            labels: service_labels(stack, name, svc),
            annotations: svc.annotations.clone(),
            resource_version: None,
        },
        spec: ServiceSpec {
            selector: selector_labels(stack, name),
            service_type: CLUSTER_IP.to_string(),
            ports: translate_service_ports(svc),
        },
    }))
}

/// Service ports, unique by exposed port.
///
/// Every container port is exposed as itself; a differing host port adds a
/// second entry forwarding to the same container port.
#[must_use]
pub fn translate_service_ports(svc: &Service) -> Vec<ServicePort> {
    let mut result: Vec<ServicePort> = Vec::new();
    for p in &svc.ports {
        push_port(&mut result, p.container_port, p);
        if p.host_port != 0 && p.host_port != p.container_port {
            push_port(&mut result, p.host_port, p);
        }
    }
    result
}

fn push_port(ports: &mut Vec<ServicePort>, exposed: i32, p: &Port) {
    if ports.iter().any(|existing| existing.port == exposed) {
        return;
    }
    let protocol = p.protocol.to_string();
    ports.push(ServicePort {
        name: format!(
            "p-{exposed}-{}-{}",
            p.container_port,
            protocol.to_lowercase()
        ),
        port: exposed,
        target_port: p.container_port,
        protocol,
    });
}

/// Translates an endpoint into an ingress with one rule per endpoint rule.
///
/// # Errors
///
/// Returns `NotFound` if the stack has no such endpoint.
pub fn translate_ingress(stack: &Stack, name: &str) -> Result<Ingress> {
    let endpoint = stack
        .endpoints
        .get(name)
        .ok_or_else(|| BerthError::NotFound {
            kind: "endpoint",
            id: name.to_string(),
        })?;
    Ok(Ingress {
        metadata: ObjectMeta {
            name: name.to_string(),
            namespace: stack.namespace.clone(),
            labels: endpoint_labels(stack, name, &endpoint.labels),
            annotations: endpoint.annotations.clone(),
            resource_version: None,
        },
        spec: IngressSpec {
            rules: endpoint
                .rules
                .iter()
                .map(|r| IngressRule {
                    path: r.path.clone(),
                    service: r.service.clone(),
                    port: r.port,
                })
                .collect(),
        },
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use berth_common::constants::STACK_ENDPOINT_NAME_LABEL;
    use berth_model::{Endpoint, EndpointRule, Protocol};

    use super::*;

    fn port(container_port: i32, host_port: i32, protocol: Protocol) -> Port {
        Port {
            container_port,
            host_port,
            protocol,
        }
    }

    fn stack_with(svc: Service) -> Stack {
        Stack {
            name: "shop".into(),
            namespace: "dev".into(),
            services: BTreeMap::from([("api".to_string(), svc)]),
            ..Stack::default()
        }
    }

    #[test]
    fn differing_host_port_adds_an_entry() {
        let svc = Service {
            ports: vec![port(8080, 80, Protocol::Tcp)],
            ..Service::default()
        };
        let ports = translate_service_ports(&svc);
        assert_eq!(ports.len(), 2);
        assert_eq!(ports[0].name, "p-8080-8080-tcp");
        assert_eq!(ports[1].name, "p-80-8080-tcp");
        assert_eq!(ports[1].target_port, 8080);
        assert_eq!(ports[1].protocol, "TCP");
    }

    #[test]
    fn ports_are_unique_by_number() {
        let svc = Service {
            ports: vec![
                port(80, 80, Protocol::Tcp),
                port(80, 0, Protocol::Udp),
                port(9000, 80, Protocol::Udp),
            ],
            ..Service::default()
        };
        let ports = translate_service_ports(&svc);
        let numbers: Vec<_> = ports.iter().map(|p| p.port).collect();
        assert_eq!(numbers, vec![80, 9000]);
        assert_eq!(ports[1].name, "p-9000-9000-udp");
    }

    #[test]
    fn no_network_service_without_ports() {
        let s = stack_with(Service::default());
        assert!(translate_network_service(&s, "api").expect("translate").is_none());
    }

    #[test]
    fn network_service_is_cluster_ip() {
        let s = stack_with(Service {
            ports: vec![port(8080, 0, Protocol::Tcp)],
            ..Service::default()
        });
        let svc = translate_network_service(&s, "api")
            .expect("translate")
            .expect("service");
        assert_eq!(svc.spec.service_type, CLUSTER_IP);
        assert_eq!(svc.spec.selector.len(), 2);
        assert_eq!(svc.metadata.namespace, "dev");
    }

    #[test]
    fn ingress_copies_rules() {
        let mut s = stack_with(Service::default());
        let _ = s.endpoints.insert(
            "public".into(),
            Endpoint {
                rules: vec![EndpointRule {
                    path: "/api".into(),
                    service: "api".into(),
                    port: 8080,
                }],
                ..Endpoint::default()
            },
        );
        let ingress = translate_ingress(&s, "public").expect("translate");
        assert_eq!(ingress.spec.rules.len(), 1);
        assert_eq!(ingress.spec.rules[0].path, "/api");
        assert_eq!(ingress.metadata.labels[STACK_ENDPOINT_NAME_LABEL], "public");
        assert!(translate_ingress(&s, "private").is_err());
    }
}
