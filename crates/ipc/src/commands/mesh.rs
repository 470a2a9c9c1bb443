//! Whole-mesh and terrain command types.

use serde::{Deserialize, Serialize};

use crate::types::ViewMode;

/// Commands that rebuild or repair the whole mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MeshCommand {
    /// Replace the mesh with a flat grid
    CreateBlank { tiles_x: u32, tiles_y: u32 },
    /// Remove every tile
    Clear,
    /// Weld corners, then seal edges of every tile
    FixMesh,
    FixCorners,
    /// Taper wall tiles toward floor neighbors
    FixWalls,
    /// Recompute every tile's slope code
    FixTwist,
}

/// Height editing commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TerrainCommand {
    /// Apply the brush at a screen point of a top-down view
    Raise { view: ViewMode, screen: [f32; 2], lower: bool },
    /// Flatten at the height under a side-view screen row
    FlattenBelow { screen_y: f32 },
    FlattenToHeight { height: f32 },
    LevelAllToZero,
    /// Roughen every vertex
    JitterMesh,
}
