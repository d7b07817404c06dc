//! Dungeon configuration
//!
//! Loaded from a RON file, with every field falling back to the built-in
//! defaults. An explicitly requested file must load; the implicit per-user
//! file is optional and a broken one only produces a warning.

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dungeon::generation::SpawnChances;
use crate::dungeon::grid::OccupancyGrid;
use crate::dungeon::transform::{GridMapping, WorldTransform};

/// File name of the per-user config
pub const CONFIG_FILE_NAME: &str = "dungeon.ron";

/// Largest grid accepted, in cells (64 MiB of occupancy)
pub const MAX_GRID_CELLS: i64 = 8192 * 8192;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
    #[error("{0}")]
    Invalid(String),
}

/// Occupancy grid dimensions and resolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: i32,
    pub height: i32,
    pub cells_per_unit: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1000,
            cells_per_unit: 10.0,
        }
    }
}

impl GridConfig {
    /// Fresh, empty grid with these dimensions
    pub fn build(&self) -> OccupancyGrid {
        OccupancyGrid::new(self.width, self.height, self.cells_per_unit)
    }

    pub fn mapping(&self) -> GridMapping {
        GridMapping::centered(self.cells_per_unit, self.width, self.height)
    }
}

/// Placement search parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Deepest level a piece may be placed at; the entrance is level 0
    pub max_depth: u32,
    /// Tries per open exit before it is left closed
    pub max_attempts: u32,
    pub chances: SpawnChances,
    /// Levels up to and including this one use `early_exit_limit`
    pub early_depth: u32,
    pub early_exit_limit: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            max_attempts: 100,
            chances: SpawnChances::default(),
            early_depth: 1,
            early_exit_limit: 4,
        }
    }
}

/// Dungeon-to-world render transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub scale: f32,
    pub translation: [f32; 3],
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            scale: 20.0,
            translation: [10.0, 10.0, 10.0],
        }
    }
}

/// Everything needed to generate and navigate a dungeon
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    pub grid: GridConfig,
    pub generation: GenerationConfig,
    pub transform: TransformConfig,
    /// Fixed seed; a fresh one is drawn when unset
    pub seed: Option<u64>,
}

impl DungeonConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: DungeonConfig = ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::info!("Dungeon config loaded from {:?}", path);
        Ok(config)
    }

    /// Load `path` if given, otherwise the per-user config if one exists
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let path = default_path();
        if !path.exists() {
            log::info!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        match Self::load(&path) {
            Ok(config) => Ok(config),
            Err(e) => {
                log::warn!("Ignoring config: {}. Using defaults.", e);
                Ok(Self::default())
            }
        }
    }

    /// Write the default config as RON, creating parent directories
    pub fn export_default(path: &Path) -> Result<(), ConfigError> {
        let pretty = ron::ser::PrettyConfig::new().depth_limit(3);
        let text = ron::ser::to_string_pretty(&Self::default(), pretty)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Default config written to {:?}", path);
        Ok(())
    }

    /// Reject values generation cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = &self.grid;
        if grid.width <= 0 || grid.height <= 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must be at least 1x1, got {}x{}",
                grid.width, grid.height
            )));
        }
        let cells = grid.width.checked_mul(grid.height).map(i64::from);
        if !cells.is_some_and(|cells| cells <= MAX_GRID_CELLS) {
            return Err(ConfigError::Invalid(format!(
                "grid {}x{} exceeds {} cells",
                grid.width, grid.height, MAX_GRID_CELLS
            )));
        }
        if !(grid.cells_per_unit.is_finite() && grid.cells_per_unit > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "cells_per_unit must be positive, got {}",
                grid.cells_per_unit
            )));
        }
        let generation = &self.generation;
        if generation.max_attempts == 0 {
            return Err(ConfigError::Invalid("max_attempts must be at least 1".into()));
        }
        let chances = &generation.chances;
        let pairs = [
            ("room", chances.corridor_after_room, chances.room_after_room),
            ("corridor", chances.corridor_after_corridor, chances.room_after_corridor),
        ];
        for (after, corridor, room) in pairs {
            match corridor.checked_add(room) {
                Some(0) => {
                    return Err(ConfigError::Invalid(format!("chances after a {} are both zero", after)));
                }
                None => {
                    return Err(ConfigError::Invalid(format!(
                        "chances after a {} sum past {}",
                        after,
                        u32::MAX
                    )));
                }
                Some(_) => {}
            }
        }
        for limit in [chances.room_exit_limit, generation.early_exit_limit] {
            if !(1..=4).contains(&limit) {
                return Err(ConfigError::Invalid(format!(
                    "room exit limit must be within 1..=4, got {}",
                    limit
                )));
            }
        }
        let transform = &self.transform;
        if !(transform.scale.is_finite() && transform.scale > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "transform scale must be positive, got {}",
                transform.scale
            )));
        }
        if transform.translation.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::Invalid("transform translation must be finite".into()));
        }
        Ok(())
    }

    pub fn world_transform(&self) -> WorldTransform {
        WorldTransform::new(
            self.transform.scale,
            Vec3::from_array(self.transform.translation),
            self.grid.mapping(),
        )
    }
}

/// Per-user config location
pub fn default_path() -> PathBuf {
    use directories::ProjectDirs;

    if let Some(proj_dirs) = ProjectDirs::from("com", "deepcrawl", "Deepcrawl") {
        let mut path = proj_dirs.config_dir().to_path_buf();
        path.push(CONFIG_FILE_NAME);
        path
    } else {
        PathBuf::from(format!("./{}", CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("deepcrawl-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = DungeonConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.generation.max_depth, 5);
        assert_eq!(config.grid.width, 1000);
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let config: DungeonConfig =
            ron::from_str("(generation: (max_depth: 2), seed: Some(9))").unwrap();
        assert_eq!(config.generation.max_depth, 2);
        assert_eq!(config.generation.max_attempts, 100);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.grid, GridConfig::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = DungeonConfig::default();
        config.grid.width = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = DungeonConfig::default();
        config.transform.scale = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = DungeonConfig::default();
        config.generation.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = DungeonConfig::default();
        config.generation.chances.corridor_after_corridor = 0;
        config.generation.chances.room_after_corridor = 0;
        assert!(config.validate().is_err());

        let mut config = DungeonConfig::default();
        config.generation.chances.room_exit_limit = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_grid_is_rejected() {
        let mut config = DungeonConfig::default();
        config.grid.width = 50_000;
        config.grid.height = 50_000;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.grid.width = 8192;
        config.grid.height = 8193;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.grid.height = 8192;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overflowing_chances_are_rejected() {
        let config: DungeonConfig =
            ron::from_str("(generation: (chances: (corridor_after_room: 4294967295)))").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = DungeonConfig::default();
        config.generation.chances.corridor_after_corridor = u32::MAX;
        config.generation.chances.room_after_corridor = 0;
        assert!(config.validate().is_ok());
        config.generation.chances.room_after_corridor = 1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_export_then_load() {
        let path = scratch_path("export.ron");
        DungeonConfig::export_default(&path).unwrap();
        let loaded = DungeonConfig::load(&path).unwrap();
        assert_eq!(loaded, DungeonConfig::default());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let path = scratch_path("does-not-exist.ron");
        let result = DungeonConfig::load_or_default(Some(&path));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_broken_file_is_a_parse_error() {
        let path = scratch_path("broken.ron");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "(grid: (width: \"wide\"))").unwrap();
        assert!(matches!(DungeonConfig::load(&path), Err(ConfigError::Parse { .. })));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_world_transform_uses_config() {
        let t = DungeonConfig::default().world_transform();
        assert_eq!(t.scale, 20.0);
        assert_eq!(t.translation, Vec3::splat(10.0));
        assert_eq!(t.grid.offset, glam::IVec2::new(500, 500));
    }
}
