//! Sanitizer pipeline
//!
//! Strips fields the cluster injects into stored objects (bookkeeping
//! metadata, scheduler decisions, defaulted pod settings) so a dumped
//! manifest can be re-applied elsewhere. The sanitizer is chosen from the
//! object's kind:
//!
//! - `Pod` - metadata plus the pod spec
//! - workloads carrying a pod template - metadata plus `spec.template`
//! - everything else - metadata only
//!
//! Every sanitizer is idempotent and leaves fields it does not know about untouched.

mod metadata;
mod pod;
mod workload;

pub use metadata::{STRIPPED_ANNOTATIONS, STRIPPED_METADATA_FIELDS};

use serde_json::{Map, Value};

/// Errors raised when an object does not have the shape its kind implies
#[derive(Debug, thiserror::Error)]
pub enum SanitizeError {
    #[error("object is not a field map")]
    NotAnObject,

    #[error("`{0}` is missing or is not a field map")]
    MissingField(&'static str),
}

/// Kinds whose spec embeds a pod template at `spec.template`
pub const WORKLOAD_KINDS: &[&str] = &[
    "StatefulSet",
    "Deployment",
    "ReplicaSet",
    "DaemonSet",
    "ReplicationController",
    "Job",
];

/// Sanitizer variants, selected by kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sanitizer {
    Default,
    Workload,
    Pod,
}

impl Sanitizer {
    /// Pick the sanitizer for a kind; unknown kinds get `Default`
    pub fn for_kind(kind: &str) -> Self {
        match kind {
            "Pod" => Sanitizer::Pod,
            k if WORKLOAD_KINDS.contains(&k) => Sanitizer::Workload,
            _ => Sanitizer::Default,
        }
    }

    pub fn sanitize(&self, mut obj: Map<String, Value>) -> Result<Map<String, Value>, SanitizeError> {
        match self {
            Sanitizer::Default => metadata::sanitize_metadata(&mut obj),
            Sanitizer::Pod => pod::sanitize_pod(&mut obj)?,
            Sanitizer::Workload => workload::sanitize_workload(&mut obj)?,
        }
        Ok(obj)
    }

    /// Sanitize a whole object given as a JSON value
    pub fn sanitize_value(&self, obj: Value) -> Result<Value, SanitizeError> {
        match obj {
            Value::Object(map) => self.sanitize(map).map(Value::Object),
            _ => Err(SanitizeError::NotAnObject),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_for_kind() {
        assert_eq!(Sanitizer::for_kind("Pod"), Sanitizer::Pod);
        assert_eq!(Sanitizer::for_kind("Deployment"), Sanitizer::Workload);
        assert_eq!(Sanitizer::for_kind("ReplicationController"), Sanitizer::Workload);
        assert_eq!(Sanitizer::for_kind("Job"), Sanitizer::Workload);
        assert_eq!(Sanitizer::for_kind("CronJob"), Sanitizer::Default);
        assert_eq!(Sanitizer::for_kind("ConfigMap"), Sanitizer::Default);
        assert_eq!(Sanitizer::for_kind(""), Sanitizer::Default);
    }

    #[test]
    fn test_sanitize_value_rejects_scalars() {
        let err = Sanitizer::Default.sanitize_value(json!("nope")).unwrap_err();
        assert!(matches!(err, SanitizeError::NotAnObject));
    }
}
