//! JSON configuration helpers for the marker detector.

use std::{fs, path::Path};

use crate::params::MarkerDetectorParams;

#[derive(thiserror::Error, Debug)]
pub enum MarkerIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl MarkerDetectorParams {
    /// Load parameters from a JSON file. Missing sections keep their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, MarkerIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write these parameters to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), MarkerIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_survive_a_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detector.json");

        let mut params = MarkerDetectorParams::default();
        params.shape.mask_left_columns = 640;
        params.ring.bright_threshold = 170;
        params.write_json(&path).unwrap();

        let loaded = MarkerDetectorParams::load_json(&path).unwrap();
        assert_eq!(loaded, params);
    }

    #[test]
    fn malformed_json_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ shape: ").unwrap();
        assert!(matches!(
            MarkerDetectorParams::load_json(&path),
            Err(MarkerIoError::Json(_))
        ));
        assert!(matches!(
            MarkerDetectorParams::load_json(dir.path().join("missing.json")),
            Err(MarkerIoError::Io(_))
        ));
    }
}
