//! Object metadata cleanup

use serde_json::{Map, Value};

/// Metadata fields assigned by the API server
pub const STRIPPED_METADATA_FIELDS: &[&str] = &[
    "creationTimestamp",
    "resourceVersion",
    "uid",
    "generateName",
    "generation",
    "managedFields",
];

/// Annotations written by controllers for their own bookkeeping
pub const STRIPPED_ANNOTATIONS: &[&str] = &[
    "controller-uid",
    "deployment.kubernetes.io/desired-replicas",
    "deployment.kubernetes.io/max-replicas",
    "deployment.kubernetes.io/revision",
    "pod-template-hash",
    "pv.kubernetes.io/bind-completed",
    "pv.kubernetes.io/bound-by-controller",
];

/// Clean `metadata` in place; objects without metadata are left alone
pub(super) fn sanitize_metadata(obj: &mut Map<String, Value>) {
    let Some(Value::Object(meta)) = obj.get_mut("metadata") else {
        return;
    };

    for field in STRIPPED_METADATA_FIELDS {
        meta.remove(*field);
    }

    if let Some(Value::Object(annotations)) = meta.get_mut("annotations") {
        for key in STRIPPED_ANNOTATIONS {
            annotations.remove(*key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strips_server_fields() {
        let mut obj = json!({
            "metadata": {
                "name": "coredns",
                "uid": "8c3a",
                "resourceVersion": "412",
                "generation": 3,
                "generateName": "coredns-",
                "creationTimestamp": "2024-01-01T00:00:00Z",
                "managedFields": [{"manager": "kubectl"}],
                "labels": {"k8s-app": "kube-dns"},
                "annotations": {
                    "deployment.kubernetes.io/revision": "1",
                    "pod-template-hash": "5d78c9869d",
                    "owner": "platform"
                }
            }
        })
        .as_object()
        .cloned()
        .unwrap();

        sanitize_metadata(&mut obj);

        assert_eq!(
            Value::Object(obj),
            json!({
                "metadata": {
                    "name": "coredns",
                    "labels": {"k8s-app": "kube-dns"},
                    "annotations": {"owner": "platform"}
                }
            })
        );
    }

    #[test]
    fn test_missing_metadata_is_noop() {
        let mut obj = json!({"kind": "List", "items": []}).as_object().cloned().unwrap();
        let before = obj.clone();
        sanitize_metadata(&mut obj);
        assert_eq!(obj, before);
    }
}
