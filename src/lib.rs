//! kubedump library
//!
//! Dumps Kubernetes objects as sanitized YAML manifests. The binary drives a
//! live cluster through `kube::KubeCluster`; tests run the same pipeline
//! against `cluster::InMemoryCluster`.

pub mod cluster;
pub mod config;
pub mod dump;
pub mod kube;
pub mod models;
pub mod sanitize;
pub mod storage;

// Re-export commonly used types for convenience
pub use cluster::{ClusterApi, ClusterError, InMemoryCluster};
pub use dump::{DumpError, DumpOptions, DumpReport, Dumper, MissingObjectPolicy};
pub use models::TargetSpec;
pub use storage::{FileWriter, MemoryWriter, StorageWriter};
