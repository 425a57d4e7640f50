//! Configuration file location
//!
//! `KUBEDUMP_CONFIG_DIR` wins. Otherwise the file lives in the platform's
//! user configuration directory: `$XDG_CONFIG_HOME/kubedump` or
//! `~/.config/kubedump` on Unix, `%APPDATA%\kubedump` on Windows.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

/// Environment variable that overrides the configuration directory
pub const CONFIG_DIR_ENV: &str = "KUBEDUMP_CONFIG_DIR";

const APP_DIR: &str = "kubedump";
const CONFIG_FILE: &str = "config.yaml";

pub fn config_dir() -> PathBuf {
    let base_dirs = BaseDirs::new();
    resolve_config_dir(
        std::env::var_os(CONFIG_DIR_ENV).map(PathBuf::from),
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        base_dirs.as_ref(),
    )
}

pub fn root_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

fn resolve_config_dir(
    override_dir: Option<PathBuf>,
    xdg_config_home: Option<PathBuf>,
    base_dirs: Option<&BaseDirs>,
) -> PathBuf {
    if let Some(dir) = override_dir.filter(|dir| !dir.as_os_str().is_empty()) {
        return dir;
    }
    user_config_root(xdg_config_home, base_dirs).join(APP_DIR)
}

/// Unix keeps `~/.config` even on macOS, where `BaseDirs::config_dir` points
/// at `Library/Application Support`
fn user_config_root(xdg_config_home: Option<PathBuf>, base_dirs: Option<&BaseDirs>) -> PathBuf {
    if cfg!(windows) {
        return base_dirs
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| Path::new(".").to_path_buf());
    }
    xdg_config_home
        .filter(|dir| dir.is_absolute())
        .or_else(|| base_dirs.map(|dirs| dirs.home_dir().join(".config")))
        .unwrap_or_else(|| Path::new(".").join(".config"))
}
