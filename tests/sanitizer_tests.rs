//! Sanitizer pipeline tests
//!
//! Idempotence and status removal across every sanitizer variant, using the
//! same objects the dump tests use.

mod common;

use common::*;
use kubedump::dump::render_manifest;
use kubedump::models::object_kind;
use kubedump::sanitize::{STRIPPED_METADATA_FIELDS, Sanitizer, WORKLOAD_KINDS};
use serde_json::{Value, json};

fn fixtures() -> Vec<Value> {
    let mut objects = coredns_chain();
    objects.extend([
        namespace(NAMESPACE),
        node("worker-1"),
        config_map("coredns", NAMESPACE),
        event("coredns.17a", NAMESPACE),
        json!({
            "apiVersion": "batch/v1",
            "kind": "Job",
            "metadata": {"name": "backup-28512", "uid": "job-1", "generation": 1},
            "spec": {
                "template": {
                    "spec": {
                        "restartPolicy": "Never",
                        "nodeName": "worker-2",
                        "initContainers": [{"name": "init", "terminationMessagePath": "/dev/termination-log"}],
                        "containers": [{"name": "backup", "image": "restic"}]
                    }
                }
            },
            "status": {"succeeded": 1}
        }),
    ]);
    objects
}

#[test]
fn test_sanitize_is_idempotent() {
    for obj in fixtures() {
        let kind = object_kind(&obj).unwrap_or_default().to_string();
        let sanitizer = Sanitizer::for_kind(&kind);

        let once = sanitizer.sanitize_value(obj).unwrap();
        let twice = sanitizer.sanitize_value(once.clone()).unwrap();
        assert_eq!(once, twice, "{kind} changed on second pass");
    }
}

#[test]
fn test_rendered_manifests_never_contain_status() {
    for obj in fixtures() {
        let kind = object_kind(&obj).unwrap_or_default().to_string();
        let name = obj["metadata"]["name"].as_str().unwrap_or_default().to_string();

        let yaml = render_manifest(obj, &kind, &name, true).unwrap();
        let rendered: Value = serde_yaml::from_str(&yaml).unwrap();

        assert!(rendered.get("status").is_none(), "{kind} {name} kept status");
        for field in STRIPPED_METADATA_FIELDS {
            assert!(rendered["metadata"].get(*field).is_none(), "{kind} {name} kept {field}");
        }
    }
}

#[test]
fn test_every_workload_kind_sanitizes_template() {
    for kind in WORKLOAD_KINDS {
        let obj = json!({
            "kind": kind,
            "metadata": {"name": "w", "uid": "1"},
            "spec": {"template": {"spec": {"dnsPolicy": "ClusterFirst", "containers": []}}}
        });

        let sanitized = Sanitizer::for_kind(kind).sanitize_value(obj).unwrap();
        assert_eq!(sanitized["spec"]["template"]["spec"], json!({"containers": []}), "{kind}");
    }
}

#[test]
fn test_unknown_fields_untouched() {
    let obj = json!({
        "apiVersion": "example.com/v1",
        "kind": "Widget",
        "metadata": {"name": "w", "uid": "1", "finalizers": ["example.com/cleanup"]},
        "spec": {"nodeName": "kept", "dnsPolicy": "kept"},
        "status": {"ready": true}
    });

    let sanitized = Sanitizer::for_kind("Widget").sanitize_value(obj).unwrap();
    assert_eq!(sanitized["spec"], json!({"nodeName": "kept", "dnsPolicy": "kept"}));
    assert_eq!(sanitized["metadata"]["finalizers"], json!(["example.com/cleanup"]));
    // status is removed by the dump, not by the sanitizer
    assert_eq!(sanitized["status"]["ready"], true);
}
