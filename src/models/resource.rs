//! Resource type and identity definitions
//!
//! A `ResourceTypeDescriptor` is one entry of the cluster's API catalogue,
//! a `ResourceIdentity` addresses exactly one live object of such a type.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// One API resource type as reported by cluster discovery
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceTypeDescriptor {
    /// API group ("" for the core group)
    pub group: String,
    pub version: String,
    /// Plural resource name used in request paths (e.g. "deployments")
    pub plural: String,
    pub kind: String,
    pub namespaced: bool,
    /// Verbs the server supports for this type
    pub verbs: Vec<String>,
}

impl ResourceTypeDescriptor {
    /// Build a descriptor that supports the usual read/write verbs
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        plural: impl Into<String>,
        kind: impl Into<String>,
        namespaced: bool,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            plural: plural.into(),
            kind: kind.into(),
            namespaced,
            verbs: ["get", "list", "watch", "create", "update", "patch", "delete"]
                .iter()
                .map(|v| v.to_string())
                .collect(),
        }
    }

    /// Replace the supported verbs
    pub fn with_verbs(mut self, verbs: &[&str]) -> Self {
        self.verbs = verbs.iter().map(|v| v.to_string()).collect();
        self
    }

    /// `group/version`, or just `version` for the core group
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    pub fn group_kind(&self) -> GroupKind {
        GroupKind::new(&self.group, &self.kind)
    }

    /// Sub-resources are reported as `parent/sub` (e.g. `pods/status`)
    pub fn is_subresource(&self) -> bool {
        self.plural.contains('/')
    }

    pub fn supports(&self, verb: &str) -> bool {
        self.verbs.iter().any(|v| v == verb)
    }

    /// Only types that can be both listed and fetched are dumped
    pub fn is_dumpable(&self) -> bool {
        !self.is_subresource() && self.supports("get") && self.supports("list")
    }
}

impl fmt::Display for ResourceTypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}/{}", self.version, self.plural)
        } else {
            write!(f, "{}/{}/{}", self.group, self.version, self.plural)
        }
    }
}

/// A (group, kind) pair, used for ignore lists and type resolution
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct GroupKind {
    pub group: String,
    pub kind: String,
}

impl GroupKind {
    pub fn new(group: &str, kind: &str) -> Self {
        Self {
            group: group.to_string(),
            kind: kind.to_string(),
        }
    }

    /// Parse the `Kind.group` notation used by kubectl
    ///
    /// Everything after the first dot is the group, so `Deployment.apps`
    /// and `Certificate.cert-manager.io` both parse, and a bare `ConfigMap`
    /// lands in the core group.
    pub fn parse(s: &str) -> Self {
        match s.trim().split_once('.') {
            Some((kind, group)) => Self::new(group, kind),
            None => Self::new("", s.trim()),
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}.{}", self.kind, self.group)
        }
    }
}

/// Address of one live object, enough for a single `get` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceIdentity {
    pub resource: Arc<ResourceTypeDescriptor>,
    pub name: String,
    /// `None` for cluster-scoped objects
    pub namespace: Option<String>,
    pub kind: String,
}

impl ResourceIdentity {
    pub fn new(
        resource: Arc<ResourceTypeDescriptor>,
        name: impl Into<String>,
        namespace: Option<String>,
    ) -> Self {
        let kind = resource.kind.clone();
        Self {
            resource,
            name: name.into(),
            namespace: namespace.filter(|ns| !ns.is_empty()),
            kind,
        }
    }

    /// Build an identity from a listed object, falling back to the type's kind
    pub fn from_object(resource: &Arc<ResourceTypeDescriptor>, obj: &Value) -> Option<Self> {
        let name = object_name(obj)?;
        let mut identity = Self::new(resource.clone(), name, object_namespace(obj));
        if let Some(kind) = object_kind(obj) {
            identity.kind = kind.to_string();
        }
        Some(identity)
    }

    /// Namespace to use for requests, honouring the type's scope
    pub fn request_namespace(&self) -> Option<&str> {
        if self.resource.namespaced {
            self.namespace.as_deref()
        } else {
            None
        }
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{} {}/{}", self.kind, ns, self.name),
            None => write!(f, "{} {}", self.kind, self.name),
        }
    }
}

pub fn object_name(obj: &Value) -> Option<&str> {
    obj.get("metadata")?.get("name")?.as_str()
}

pub fn object_namespace(obj: &Value) -> Option<String> {
    obj.get("metadata")
        .and_then(|m| m.get("namespace"))
        .and_then(|ns| ns.as_str())
        .filter(|ns| !ns.is_empty())
        .map(str::to_string)
}

pub fn object_kind(obj: &Value) -> Option<&str> {
    obj.get("kind")?.as_str().filter(|k| !k.is_empty())
}

pub fn object_uid(obj: &Value) -> Option<&str> {
    obj.get("metadata")?.get("uid")?.as_str()
}

/// UIDs of every owner reference on the object
pub fn owner_uids(obj: &Value) -> Vec<String> {
    obj.get("metadata")
        .and_then(|m| m.get("ownerReferences"))
        .and_then(|o| o.as_array())
        .map(|refs| {
            refs.iter()
                .filter_map(|r| r.get("uid").and_then(|u| u.as_str()))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
