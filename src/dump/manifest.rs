//! Rendering and storing one object's manifest

use std::path::Path;

use serde_json::Value;

use super::DumpError;
use crate::sanitize::{SanitizeError, Sanitizer};
use crate::storage::StorageWriter;

/// Sanitize (when enabled) and serialize an object to YAML
///
/// `status` is always dropped from sanitized output, whatever the sanitizer did.
pub fn render_manifest(obj: Value, kind: &str, name: &str, sanitize: bool) -> Result<String, DumpError> {
    let obj = if sanitize {
        let Value::Object(map) = obj else {
            return Err(sanitize_error(kind, name, SanitizeError::NotAnObject));
        };
        let mut map = Sanitizer::for_kind(kind)
            .sanitize(map)
            .map_err(|source| sanitize_error(kind, name, source))?;
        map.remove("status");
        Value::Object(map)
    } else {
        obj
    };

    serde_yaml::to_string(&obj).map_err(|source| DumpError::Serialize {
        kind: kind.to_string(),
        name: name.to_string(),
        source,
    })
}

/// Render an object and hand it to the writer at `path`
pub fn store_manifest(
    storage: &dyn StorageWriter,
    path: &Path,
    obj: Value,
    kind: &str,
    name: &str,
    sanitize: bool,
) -> Result<(), DumpError> {
    let content = render_manifest(obj, kind, name, sanitize)?;
    storage
        .write(path, content.as_bytes())
        .map_err(|source| DumpError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

fn sanitize_error(kind: &str, name: &str, source: SanitizeError) -> DumpError {
    DumpError::Sanitize {
        kind: kind.to_string(),
        name: name.to_string(),
        source,
    }
}
