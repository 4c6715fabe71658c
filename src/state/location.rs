//! The persisted location record.
//!
//! A tiny TOML document:
//!
//! ```toml
//! latitude = 51.5074
//! longitude = -0.1278
//! ```
//!
//! It is overwritten on every successful location change and read at startup.
//! Anything unusable in it (missing file, missing key, garbage, out-of-range
//! values) is treated the same as "no location yet".

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::constants::LOCATION_FILE_NAME;
use crate::common::utils::private_path;
use crate::geo::Coordinate;

#[derive(Debug, Serialize, Deserialize)]
struct LocationRecord {
    latitude: f64,
    longitude: f64,
}

/// Reads and writes the location record at a fixed path.
#[derive(Debug, Clone)]
pub struct LocationStore {
    path: PathBuf,
}

impl LocationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the standard state location for the active config directory.
    pub fn default_location() -> Result<Self> {
        let config_dir = crate::config::get_custom_config_dir();
        let state_dir = super::get_state_dir(config_dir.as_deref())?;
        Ok(Self::new(state_dir.join(LOCATION_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `coordinate`, replacing any previous record.
    pub fn save(&self, coordinate: &Coordinate) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create state directory {}", private_path(parent))
            })?;
        }

        let record = LocationRecord {
            latitude: coordinate.latitude(),
            longitude: coordinate.longitude(),
        };
        let content = toml::to_string(&record).context("Failed to serialize location")?;

        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", private_path(&self.path)))?;

        log_debug!("Saved location to {}", private_path(&self.path));
        Ok(())
    }

    /// Read the stored coordinate, if there is a usable one.
    pub fn load(&self) -> Option<Coordinate> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log_debug!("Could not read {}: {}", private_path(&self.path), e);
                }
                return None;
            }
        };

        let record: LocationRecord = match toml::from_str(&content) {
            Ok(record) => record,
            Err(e) => {
                log_debug!("Ignoring unparsable location record: {}", e);
                return None;
            }
        };

        match Coordinate::new(record.latitude, record.longitude) {
            Ok(coordinate) => Some(coordinate),
            Err(e) => {
                log_debug!("Ignoring stored location: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_then_load_on_fresh_store() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join(LOCATION_FILE_NAME);
        let coord = Coordinate::new(51.5074, -0.1278).unwrap();

        LocationStore::new(&path).save(&coord).unwrap();

        let loaded = LocationStore::new(&path).load().unwrap();
        assert_eq!(loaded, coord);
    }

    #[test]
    fn test_missing_file_is_none() {
        let temp = tempdir().unwrap();
        let store = LocationStore::new(temp.path().join(LOCATION_FILE_NAME));
        assert!(store.load().is_none());
    }

    #[test]
    fn test_missing_key_is_none() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(LOCATION_FILE_NAME);
        fs::write(&path, "latitude = 10.0\n").unwrap();
        assert!(LocationStore::new(&path).load().is_none());
    }

    #[test]
    fn test_garbage_is_none() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(LOCATION_FILE_NAME);
        fs::write(&path, "this is { not toml").unwrap();
        assert!(LocationStore::new(&path).load().is_none());
    }

    #[test]
    fn test_out_of_range_is_none() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(LOCATION_FILE_NAME);
        fs::write(&path, "latitude = 120.0\nlongitude = 0.0\n").unwrap();
        assert!(LocationStore::new(&path).load().is_none());
    }

    #[test]
    fn test_save_overwrites_previous_record() {
        let temp = tempdir().unwrap();
        let store = LocationStore::new(temp.path().join(LOCATION_FILE_NAME));

        store.save(&Coordinate::new(1.0, 2.0).unwrap()).unwrap();
        store.save(&Coordinate::new(-3.0, 4.0).unwrap()).unwrap();

        assert_eq!(store.load(), Some(Coordinate::new(-3.0, 4.0).unwrap()));
    }

    #[test]
    fn test_record_uses_plain_keys() {
        let temp = tempdir().unwrap();
        let store = LocationStore::new(temp.path().join(LOCATION_FILE_NAME));
        store.save(&Coordinate::new(0.5, -0.25).unwrap()).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("latitude = 0.5"));
        assert!(content.contains("longitude = -0.25"));
    }
}
