use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::elevator::Timing;
use crate::error::ConfigError;
use crate::scheduler::PolicyKind;

/// Building and fleet settings, read from `elevator.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BuildingConfig {
    /// Number of cars in the fleet.
    pub elevators: usize,
    /// Highest served floor; the ground floor is 0.
    pub top_floor: u32,
    /// Hall call dispatch policy.
    pub policy: PolicyKind,
    /// Time to cross one floor, in milliseconds.
    pub floor_travel_ms: u64,
    /// How long the door stays open on arrival, in milliseconds.
    pub door_dwell_ms: u64,
    pub log_level: Option<String>,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            elevators: 3,
            top_floor: 15,
            policy: PolicyKind::default(),
            floor_travel_ms: 500,
            door_dwell_ms: 2000,
            log_level: None,
        }
    }
}

/// Default search paths for `elevator.toml` (current directory, then XDG).
fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("elevator.toml")];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("elevator").join("elevator.toml"));
    }
    paths
}

impl BuildingConfig {
    pub fn with_elevators(elevators: usize) -> Self {
        Self {
            elevators,
            ..Self::default()
        }
    }

    pub fn timing(&self) -> Timing {
        Timing {
            floor_travel: Duration::from_millis(self.floor_travel_ms),
            door_dwell: Duration::from_millis(self.door_dwell_ms),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.elevators == 0 {
            return Err(ConfigError::Invalid(
                "a fleet needs at least one elevator".to_string(),
            ));
        }
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e.to_string()))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the first config file found on the default search paths, or the
    /// defaults when there is none.
    pub fn load_from_default_paths() -> Result<(Self, Option<PathBuf>), ConfigError> {
        for path in config_search_paths() {
            if path.exists() {
                let config = Self::load_from_file(&path)?;
                return Ok((config, Some(path)));
            }
        }
        Ok((Self::default(), None))
    }
}
