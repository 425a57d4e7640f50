//! Configuration schema definitions
//!
//! Defines the structure of the configuration file using serde for serialization.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::dump::{DEFAULT_PAGE_SIZE, DumpOptions, MissingObjectPolicy};
use crate::models::GroupKind;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Directory manifests are written into
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Strip cluster-assigned fields and `status` before writing
    #[serde(default = "default_true")]
    pub sanitize: bool,

    /// In single-object mode, also dump everything the object owns
    #[serde(default)]
    pub include_dependants: bool,

    /// Label selector applied to every list call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<String>,

    /// Resource types never dumped, as `Kind.group` (`Kind` for the core group)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore_group_kinds: Vec<String>,

    /// Objects requested per list call
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Behaviour when an object disappears mid-dump
    #[serde(default)]
    pub missing_objects: MissingObjectPolicy,

    /// Abort the dump after this many seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,

    /// Empty the data directory before dumping
    #[serde(default)]
    pub clean_data_dir: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            sanitize: true,
            include_dependants: false,
            label_selector: None,
            ignore_group_kinds: Vec::new(),
            page_size: default_page_size(),
            missing_objects: MissingObjectPolicy::default(),
            timeout_seconds: None,
            clean_data_dir: false,
        }
    }
}

impl Config {
    /// Parsed ignore list
    pub fn group_kinds(&self) -> Result<Vec<GroupKind>> {
        self.ignore_group_kinds
            .iter()
            .map(|entry| {
                let entry = entry.trim();
                let group_kind = GroupKind::parse(entry);
                if group_kind.kind.is_empty() {
                    bail!("invalid entry in ignoreGroupKinds: {:?}", entry);
                }
                Ok(group_kind)
            })
            .collect()
    }

    /// Check the values serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            bail!("pageSize must be greater than 0");
        }
        if self.timeout_seconds == Some(0) {
            bail!("timeoutSeconds must be greater than 0");
        }
        if self.data_dir.as_os_str().is_empty() {
            bail!("dataDir must not be empty");
        }
        self.group_kinds()?;
        Ok(())
    }

    pub fn to_dump_options(&self) -> Result<DumpOptions> {
        self.validate()?;
        Ok(DumpOptions {
            data_dir: self.data_dir.clone(),
            sanitize: self.sanitize,
            label_selector: self.label_selector.clone().filter(|s| !s.is_empty()),
            include_dependants: self.include_dependants,
            ignore_group_kinds: self.group_kinds()?,
            page_size: self.page_size,
            missing_objects: self.missing_objects,
            timeout: self.timeout_seconds.map(Duration::from_secs),
        })
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    PathBuf::from("./kubedump")
}

fn default_true() -> bool {
    true
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}
