//! Workload cleanup: metadata plus the embedded pod template

use serde_json::{Map, Value};

use super::SanitizeError;
use super::metadata::sanitize_metadata;
use super::pod::sanitize_pod;

pub(super) fn sanitize_workload(obj: &mut Map<String, Value>) -> Result<(), SanitizeError> {
    sanitize_metadata(obj);

    let Some(Value::Object(spec)) = obj.get_mut("spec") else {
        return Err(SanitizeError::MissingField("spec"));
    };
    let Some(Value::Object(template)) = spec.get_mut("template") else {
        return Err(SanitizeError::MissingField("spec.template"));
    };
    sanitize_pod(template)
}
