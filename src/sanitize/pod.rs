//! Pod spec cleanup

use serde_json::{Map, Value};

use super::SanitizeError;
use super::metadata::sanitize_metadata;

/// Pod spec fields filled in by the scheduler or by API defaulting
const CLUSTER_ASSIGNED_SPEC_FIELDS: &[&str] =
    &["dnsPolicy", "nodeName", "terminationGracePeriodSeconds"];

const DEFAULT_SERVICE_ACCOUNT: &str = "default";

/// Sanitize a Pod, or the pod template embedded in a workload
pub(super) fn sanitize_pod(obj: &mut Map<String, Value>) -> Result<(), SanitizeError> {
    sanitize_metadata(obj);

    let Some(Value::Object(spec)) = obj.get_mut("spec") else {
        return Err(SanitizeError::MissingField("spec"));
    };
    sanitize_pod_spec(spec);
    Ok(())
}

fn sanitize_pod_spec(spec: &mut Map<String, Value>) {
    for field in CLUSTER_ASSIGNED_SPEC_FIELDS {
        spec.remove(*field);
    }

    if spec.get("serviceAccountName").and_then(|v| v.as_str()) == Some(DEFAULT_SERVICE_ACCOUNT) {
        spec.remove("serviceAccountName");
    }

    for list in ["containers", "initContainers"] {
        if let Some(Value::Array(containers)) = spec.get_mut(list) {
            for container in containers.iter_mut().filter_map(Value::as_object_mut) {
                container.remove("terminationMessagePath");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pod(service_account: &str) -> Map<String, Value> {
        json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {"name": "web-0", "uid": "1234"},
            "spec": {
                "dnsPolicy": "ClusterFirst",
                "nodeName": "worker-1",
                "serviceAccountName": service_account,
                "terminationGracePeriodSeconds": 30,
                "restartPolicy": "Always",
                "initContainers": [{"name": "init", "terminationMessagePath": "/dev/termination-log"}],
                "containers": [{
                    "name": "web",
                    "image": "nginx",
                    "terminationMessagePath": "/dev/termination-log",
                    "terminationMessagePolicy": "File"
                }]
            }
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_clears_cluster_assigned_fields() {
        let mut obj = pod("default");
        sanitize_pod(&mut obj).unwrap();

        assert_eq!(
            obj["spec"],
            json!({
                "restartPolicy": "Always",
                "initContainers": [{"name": "init"}],
                "containers": [{
                    "name": "web",
                    "image": "nginx",
                    "terminationMessagePolicy": "File"
                }]
            })
        );
        assert_eq!(obj["metadata"], json!({"name": "web-0"}));
    }

    #[test]
    fn test_keeps_custom_service_account() {
        let mut obj = pod("coredns");
        sanitize_pod(&mut obj).unwrap();
        assert_eq!(obj["spec"]["serviceAccountName"], "coredns");
    }

    #[test]
    fn test_missing_spec_is_structural_error() {
        let mut obj = json!({"kind": "Pod", "metadata": {"name": "x"}})
            .as_object()
            .cloned()
            .unwrap();
        let err = sanitize_pod(&mut obj).unwrap_err();
        assert!(matches!(err, SanitizeError::MissingField("spec")));
    }
}
