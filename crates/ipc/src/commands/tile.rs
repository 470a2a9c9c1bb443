//! Per-tile paint, fx and stitch command types.

use serde::{Deserialize, Serialize};

/// Commands addressing tiles by grid position or texture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TileCommand {
    /// Paint one tile with the current paint settings
    Retype { x: i32, y: i32 },
    /// Paint every tile with the current paint settings
    ClearAll,
    SetFx { x: i32, y: i32, fx: u8 },
    /// Flip the current fx mask on one tile
    ToggleFx { x: i32, y: i32 },
    /// Set fx on every tile whose masked texture matches
    SetFxByTexture { texture_bits: u16, mask: u16, fx: u8 },
    /// Auto-trim a texture group
    TrimAutoTile { texture_bits: u16, mask: u16 },
    WeldCorner { x: i32, y: i32 },
    FixEdgeVertices { x: i32, y: i32 },
    SmoothWallBarrier { x: i32, y: i32 },
}
