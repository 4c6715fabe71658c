//! Persistent state, kept under XDG_STATE_HOME separately from configuration.
//!
//! The only durable entity is the user's chosen location (see [`location`]).

pub mod ipc;
pub mod location;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub use location::LocationStore;

/// Get the state directory for a given configuration directory.
///
/// State is stored in XDG_STATE_HOME/geodark/{namespace} where namespace is:
/// - "default" for the default config directory
/// - "custom_<hash>" for custom config directories (via --config)
pub fn get_state_dir(config_dir: Option<&Path>) -> Result<PathBuf> {
    let state_home = std::env::var("XDG_STATE_HOME")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join(".local/state")
        });

    let namespace = match config_dir {
        None => "default".to_string(),
        Some(path) => {
            let default_config = dirs::config_dir()
                .context("Could not determine config directory")?
                .join("geodark");
            if path == default_config {
                "default".to_string()
            } else {
                state_namespace(path)
            }
        }
    };

    Ok(state_home.join("geodark").join(namespace))
}

/// Stable namespace for a custom config directory.
fn state_namespace(config_path: &Path) -> String {
    let canonical = config_path
        .canonicalize()
        .unwrap_or_else(|_| config_path.to_path_buf());

    let hash = sha256::digest(canonical.to_string_lossy().as_bytes());
    format!("custom_{}", &hash[..16])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    #[serial]
    fn test_state_dir_honours_xdg_state_home() {
        let temp = tempdir().unwrap();
        let previous = std::env::var_os("XDG_STATE_HOME");
        unsafe { std::env::set_var("XDG_STATE_HOME", temp.path()) };

        let dir = get_state_dir(None).unwrap();
        assert_eq!(dir, temp.path().join("geodark").join("default"));

        unsafe {
            match previous {
                Some(v) => std::env::set_var("XDG_STATE_HOME", v),
                None => std::env::remove_var("XDG_STATE_HOME"),
            }
        }
    }

    #[test]
    #[serial]
    fn test_custom_config_dirs_get_distinct_namespaces() {
        let a = tempdir().unwrap();
        let b = tempdir().unwrap();

        let dir_a = get_state_dir(Some(a.path())).unwrap();
        let dir_b = get_state_dir(Some(b.path())).unwrap();

        assert_ne!(dir_a, dir_b);
        let name = dir_a.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("custom_"));
        assert_eq!(name.len(), "custom_".len() + 16);
        assert_eq!(get_state_dir(Some(a.path())).unwrap(), dir_a);
    }
}
