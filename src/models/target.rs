//! Dump targets and owner keys

use std::fmt;

use super::GroupKind;

/// Kind string that selects namespace-wide dumps
pub const KIND_NAMESPACE: &str = "Namespace";

/// The object (or scope) a dump is rooted at
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TargetSpec {
    pub api_version: String,
    /// Empty for a whole-cluster dump
    pub kind: String,
    pub name: String,
    pub namespace: Option<String>,
}

impl TargetSpec {
    /// Target covering the whole cluster
    pub fn cluster() -> Self {
        Self::default()
    }

    /// Target covering every namespaced object in one namespace
    pub fn namespace(name: impl Into<String>) -> Self {
        Self {
            api_version: "v1".to_string(),
            kind: KIND_NAMESPACE.to_string(),
            name: name.into(),
            namespace: None,
        }
    }

    /// Target rooted at a single object
    pub fn object(
        api_version: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
        namespace: Option<String>,
    ) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            name: name.into(),
            namespace: namespace.filter(|ns| !ns.is_empty()),
        }
    }

    /// Split `apiVersion` into (group, version)
    pub fn group_version(&self) -> (&str, &str) {
        match self.api_version.split_once('/') {
            Some((group, version)) => (group, version),
            None => ("", self.api_version.as_str()),
        }
    }

    pub fn group_kind(&self) -> GroupKind {
        GroupKind::new(self.group_version().0, &self.kind)
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.is_empty() {
            return write!(f, "cluster");
        }
        match &self.namespace {
            Some(ns) => write!(f, "{} {}/{}", self.kind, ns, self.name),
            None => write!(f, "{} {}", self.kind, self.name),
        }
    }
}

/// Key of the dependency graph: an owner's UID, or the traversal root
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OwnerKey {
    Root,
    Uid(String),
}

impl OwnerKey {
    pub fn uid(uid: impl Into<String>) -> Self {
        OwnerKey::Uid(uid.into())
    }

    pub fn is_root(&self) -> bool {
        matches!(self, OwnerKey::Root)
    }
}
