//! Shared configuration for Cartman
//!
//! This crate provides the single source of truth for arena capacities,
//! lighting slider defaults and brush settings shared by the mesh core and
//! whatever front end drives it.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default vertex arena capacity (enough for a 128x128 grid of 16-vertex tiles)
pub const DEFAULT_VERTEX_CAPACITY: usize = 262_144;

/// Default maximum number of vertices in one selection list
pub const DEFAULT_SELECTION_CAPACITY: usize = 2560;

/// Default maximum number of placed lights
pub const DEFAULT_LIGHT_CAPACITY: usize = 100;

/// Default vertical mesh bound in world units
pub const DEFAULT_EDGE_Z: f32 = 2880.0;

/// Default global ambient added to every baked vertex
pub const DEFAULT_GLOBAL_AMBIENT: i32 = 22;

/// Default floor for the combined light term (negated)
pub const DEFAULT_AMBIENT_CUT: i32 = 1;

/// Default strength of the directional (curvature) term
pub const DEFAULT_DIRECTIONAL: i32 = 16;

/// Default raise/lower brush radius in world units
pub const DEFAULT_BRUSH_SIZE: f32 = 384.0;

/// Default raise/lower brush amount in world units
pub const DEFAULT_BRUSH_AMOUNT: f32 = 50.0;

/// Default seed for the editor's shared random generator
pub const DEFAULT_RNG_SEED: u64 = 0x0C4A_27A4;

/// Errors raised while loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Tuning parameters for the baked vertex lighting pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Brightness added to every vertex after the light terms
    pub global_ambient: i32,
    /// The light terms are never allowed below `-ambient_cut`
    pub ambient_cut: i32,
    /// Scale of the curvature term (divided by 256)
    pub directional: i32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            global_ambient: DEFAULT_GLOBAL_AMBIENT,
            ambient_cut: DEFAULT_AMBIENT_CUT,
            directional: DEFAULT_DIRECTIONAL,
        }
    }
}

/// Raise/lower brush settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    /// Radius over which the brush falls off to zero
    pub size: f32,
    /// Height change at the brush center (negative lowers)
    pub amount: f32,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_BRUSH_SIZE,
            amount: DEFAULT_BRUSH_AMOUNT,
        }
    }
}

/// Editor session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Capacity of the vertex arena
    pub vertex_capacity: usize,
    /// Maximum vertices per selection list
    pub selection_capacity: usize,
    /// Maximum number of placed lights
    pub light_capacity: usize,
    /// Vertical mesh bound
    pub edge_z: f32,
    /// Seed for texture variant picking and jitter
    pub rng_seed: u64,
    pub lighting: LightingConfig,
    pub brush: BrushConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            vertex_capacity: DEFAULT_VERTEX_CAPACITY,
            selection_capacity: DEFAULT_SELECTION_CAPACITY,
            light_capacity: DEFAULT_LIGHT_CAPACITY,
            edge_z: DEFAULT_EDGE_Z,
            rng_seed: DEFAULT_RNG_SEED,
            lighting: LightingConfig::default(),
            brush: BrushConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file on disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty JSON
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the editor cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vertex_capacity == 0 {
            return Err(ConfigError::Invalid("vertex_capacity must be non-zero".into()));
        }
        if self.vertex_capacity >= u32::MAX as usize {
            return Err(ConfigError::Invalid(format!(
                "vertex_capacity {} does not fit a vertex index",
                self.vertex_capacity
            )));
        }
        if !(self.edge_z > 0.0) {
            return Err(ConfigError::Invalid(format!("edge_z must be positive, got {}", self.edge_z)));
        }
        if self.brush.size < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "brush.size must not be negative, got {}",
                self.brush.size
            )));
        }
        Ok(())
    }
}
