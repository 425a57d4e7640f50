//! Shared fixtures for integration tests
//!
//! Builds small clusters out of realistic objects: a coredns Deployment with
//! its ReplicaSet and Pods, plus assorted cluster-scoped and namespaced objects.

#![allow(dead_code)]

use std::path::Path;

use kubedump::InMemoryCluster;
use kubedump::models::ResourceTypeDescriptor;
use serde_json::{Value, json};

pub const NAMESPACE: &str = "kube-system";

pub fn core(plural: &str, kind: &str, namespaced: bool) -> ResourceTypeDescriptor {
    ResourceTypeDescriptor::new("", "v1", plural, kind, namespaced)
}

pub fn apps(plural: &str, kind: &str) -> ResourceTypeDescriptor {
    ResourceTypeDescriptor::new("apps", "v1", plural, kind, true)
}

/// The resource types a small cluster serves, including one subresource
pub fn standard_types() -> Vec<ResourceTypeDescriptor> {
    vec![
        core("namespaces", "Namespace", false),
        core("nodes", "Node", false),
        core("configmaps", "ConfigMap", true),
        core("events", "Event", true),
        core("pods", "Pod", true),
        core("pods/log", "Pod", true).with_verbs(&["get"]),
        apps("deployments", "Deployment"),
        apps("replicasets", "ReplicaSet"),
    ]
}

pub fn cluster_with(objects: Vec<Value>) -> InMemoryCluster {
    let cluster = standard_types()
        .into_iter()
        .fold(InMemoryCluster::new(), InMemoryCluster::with_type);
    objects.into_iter().fold(cluster, InMemoryCluster::with_object)
}

fn owner_refs(owner_kind: &str, owners: &[(&str, &str)]) -> Value {
    owners
        .iter()
        .map(|(name, uid)| {
            json!({
                "apiVersion": "apps/v1",
                "kind": owner_kind,
                "name": name,
                "uid": uid,
                "controller": true,
                "blockOwnerDeletion": true
            })
        })
        .collect()
}

pub fn namespace(name: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {"name": name, "uid": format!("ns-{name}"), "resourceVersion": "4"},
        "spec": {"finalizers": ["kubernetes"]},
        "status": {"phase": "Active"}
    })
}

pub fn node(name: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Node",
        "metadata": {"name": name, "uid": format!("node-{name}"), "labels": {"kubernetes.io/hostname": name}},
        "spec": {"podCIDR": "10.244.0.0/24"},
        "status": {"nodeInfo": {"kubeletVersion": "v1.31.0"}}
    })
}

pub fn config_map(name: &str, namespace: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": format!("cm-{name}"),
            "resourceVersion": "231",
            "creationTimestamp": "2024-05-01T10:00:00Z",
            "labels": {"app": name}
        },
        "data": {"zone": "cluster.local"}
    })
}

pub fn event(name: &str, namespace: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Event",
        "metadata": {"name": name, "namespace": namespace, "uid": format!("ev-{name}")},
        "reason": "Scheduled",
        "type": "Normal"
    })
}

pub fn deployment(name: &str, namespace: &str, uid: &str) -> Value {
    json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": uid,
            "generation": 3,
            "resourceVersion": "1200",
            "labels": {"k8s-app": "kube-dns"},
            "annotations": {"deployment.kubernetes.io/revision": "1"}
        },
        "spec": {
            "replicas": 2,
            "selector": {"matchLabels": {"k8s-app": "kube-dns"}},
            "template": {
                "metadata": {"labels": {"k8s-app": "kube-dns"}, "creationTimestamp": null},
                "spec": {
                    "dnsPolicy": "Default",
                    "serviceAccountName": "coredns",
                    "terminationGracePeriodSeconds": 30,
                    "containers": [{
                        "name": "coredns",
                        "image": "registry.k8s.io/coredns/coredns:v1.11.1",
                        "terminationMessagePath": "/dev/termination-log"
                    }]
                }
            }
        },
        "status": {"readyReplicas": 2, "replicas": 2}
    })
}

pub fn replica_set(name: &str, namespace: &str, uid: &str, owners: &[(&str, &str)]) -> Value {
    json!({
        "apiVersion": "apps/v1",
        "kind": "ReplicaSet",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": uid,
            "resourceVersion": "1199",
            "labels": {"k8s-app": "kube-dns", "pod-template-hash": "5d78"},
            "ownerReferences": owner_refs("Deployment", owners)
        },
        "spec": {
            "replicas": 2,
            "template": {
                "metadata": {"labels": {"k8s-app": "kube-dns"}},
                "spec": {
                    "dnsPolicy": "Default",
                    "containers": [{"name": "coredns", "image": "registry.k8s.io/coredns/coredns:v1.11.1"}]
                }
            }
        },
        "status": {"availableReplicas": 2}
    })
}

pub fn pod(name: &str, namespace: &str, uid: &str, owners: &[(&str, &str)]) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": uid,
            "resourceVersion": "1300",
            "generateName": "coredns-5d78-",
            "labels": {"k8s-app": "kube-dns"},
            "ownerReferences": owner_refs("ReplicaSet", owners)
        },
        "spec": {
            "dnsPolicy": "ClusterFirst",
            "nodeName": "worker-1",
            "serviceAccountName": "default",
            "terminationGracePeriodSeconds": 30,
            "restartPolicy": "Always",
            "containers": [{
                "name": "coredns",
                "image": "registry.k8s.io/coredns/coredns:v1.11.1",
                "terminationMessagePath": "/dev/termination-log"
            }]
        },
        "status": {"phase": "Running", "podIP": "10.244.0.5"}
    })
}

/// The coredns chain: Deployment -> ReplicaSet -> two Pods
pub fn coredns_chain() -> Vec<Value> {
    vec![
        deployment("coredns", NAMESPACE, "uid-deploy"),
        replica_set("coredns-5d78", NAMESPACE, "uid-rs", &[("coredns", "uid-deploy")]),
        pod("coredns-5d78-a", NAMESPACE, "uid-pod-a", &[("coredns-5d78", "uid-rs")]),
        pod("coredns-5d78-b", NAMESPACE, "uid-pod-b", &[("coredns-5d78", "uid-rs")]),
    ]
}

/// Parse a written manifest back into a JSON value
pub fn parse_manifest(content: &str) -> Value {
    serde_yaml::from_str(content).expect("manifest is valid YAML")
}

/// Number of `<Kind>/<Name>` segments between `base` and the file's directory
pub fn ownership_depth(base: &Path, file: &Path) -> usize {
    let relative = file.strip_prefix(base).expect("file lies under the data dir");
    (relative.components().count() - 1) / 2
}
