//! Snapshot envelope for a saved reactor

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{KineticaError, Result};
use crate::solver::{ReactionSystem, Reactor};

/// Current schema version for snapshot files.
pub const CURRENT_SCHEMA_VERSION: &str = "1.0.0";

const SUPPORTED_SCHEMA_VERSIONS: &[&str] = &["1.0.0"];

/// Versioned, checksummed reactor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactorSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    pub saved_at: DateTime<Utc>,
    /// SHA-256 of the compact JSON of `reactor`
    pub checksum: String,
    pub reactor: Value,
}

fn default_schema_version() -> String {
    CURRENT_SCHEMA_VERSION.to_string()
}

fn checksum(reactor: &Value) -> Result<String> {
    let canonical = serde_json::to_string(reactor)?;
    Ok(format!("{:x}", Sha256::digest(canonical.as_bytes())))
}

impl ReactorSnapshot {
    /// Capture a reactor's persistent state
    ///
    /// Listeners, index arrays and the current integration state are not
    /// part of the snapshot.
    pub fn capture(reactor: &Reactor) -> Result<Self> {
        let reactor = serde_json::to_value(reactor)?;
        Ok(Self {
            schema_version: CURRENT_SCHEMA_VERSION.to_string(),
            saved_at: Utc::now(),
            checksum: checksum(&reactor)?,
            reactor,
        })
    }

    /// Check the schema version and checksum
    pub fn verify(&self) -> Result<()> {
        if !SUPPORTED_SCHEMA_VERSIONS.contains(&self.schema_version.as_str()) {
            return Err(KineticaError::UnsupportedSchemaVersion {
                version: self.schema_version.clone(),
            });
        }
        let actual = checksum(&self.reactor)?;
        if actual != self.checksum {
            return Err(KineticaError::ChecksumMismatch {
                expected: self.checksum.clone(),
                actual,
            });
        }
        Ok(())
    }

    /// Rebuild the reactor, including its index arrays
    pub fn restore(self) -> Result<Reactor> {
        self.verify()?;
        let mut reactor: Reactor = serde_json::from_value(self.reactor)?;
        let state = reactor.state_mut();
        if !state.network().core_species.is_empty() {
            state.restore_indices()?;
        }
        debug!("Restored {} saved at {}", reactor.kind(), self.saved_at);
        Ok(reactor)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_json()?;
        fs::write(path, content).map_err(|e| KineticaError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
        info!("Saved reactor snapshot to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(KineticaError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path).map_err(|e| KineticaError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }
}

/// Save a reactor to a snapshot file
pub fn save_reactor(reactor: &Reactor, path: &Path) -> Result<()> {
    ReactorSnapshot::capture(reactor)?.save(path)
}

/// Load and verify a reactor from a snapshot file
pub fn load_reactor(path: &Path) -> Result<Reactor> {
    ReactorSnapshot::load(path)?.restore()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::Quantity;
    use crate::solver::{LiquidReactor, ReactorKind};
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn reactor() -> Reactor {
        LiquidReactor::new(Quantity::kelvin(298.15), BTreeMap::new(), vec![], vec![]).into()
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reactor.json");

        save_reactor(&reactor(), &path).unwrap();
        let loaded = load_reactor(&path).unwrap();

        assert_eq!(loaded.kind(), ReactorKind::Liquid);
        assert_eq!(loaded.as_liquid().unwrap().temperature().value(), 298.15);
    }

    #[test]
    fn test_tampered_snapshot_rejected() {
        let mut snapshot = ReactorSnapshot::capture(&reactor()).unwrap();
        snapshot.reactor["temperature"]["value"] = serde_json::json!(400.0);
        let err = snapshot.restore().unwrap_err();
        assert_eq!(err.error_code(), "CHECKSUM_MISMATCH");
    }

    #[test]
    fn test_unknown_schema_version_rejected() {
        let mut snapshot = ReactorSnapshot::capture(&reactor()).unwrap();
        snapshot.schema_version = "9.0.0".to_string();
        let err = snapshot.verify().unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_SCHEMA_VERSION");
    }
}
