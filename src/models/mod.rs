//! Data model shared by discovery, graph building and materialization
//!
//! Structure:
//! - `resource.rs` - API resource types, group-kinds and object identities
//! - `target.rs` - dump targets and dependency-graph owner keys

pub mod resource;
pub mod target;

pub use resource::{
    GroupKind, ResourceIdentity, ResourceTypeDescriptor, object_kind, object_name,
    object_namespace, object_uid, owner_uids,
};
pub use target::{KIND_NAMESPACE, OwnerKey, TargetSpec};
