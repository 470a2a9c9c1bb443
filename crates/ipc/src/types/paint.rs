//! Tile paint tool settings.

use serde::{Deserialize, Serialize};

/// How many low texture bits a paint stroke randomizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VariantSetting {
    /// Paint the picked image exactly
    #[default]
    Exact,
    /// Random pick of 2 images
    Pair,
    /// Random pick of 4 images
    Quad,
    /// Random pick of 8 images
    Octet,
}

/// Settings of the tile paint tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilePaintSettings {
    /// Texture image (low byte of the tile's texture bits)
    pub texture_bits: u8,
    /// Texture set (high byte)
    pub upper_bits: u8,
    /// Fx flags given to painted tiles
    pub fx: u8,
    /// Tile shape id
    pub tile_type: u8,
    pub variant: VariantSetting,
    /// Keep geometry, change only the texture
    pub texture_only: bool,
    /// Keep the four corner heights when the shape changes
    pub preserve_heights: bool,
}

impl Default for TilePaintSettings {
    fn default() -> Self {
        Self {
            texture_bits: 0,
            upper_bits: 0,
            fx: 0,
            tile_type: 0,
            variant: VariantSetting::Exact,
            texture_only: false,
            preserve_heights: true,
        }
    }
}
