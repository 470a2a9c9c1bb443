//! State summaries sent back to the UI after commands.

use serde::{Deserialize, Serialize};

/// Grid size and vertex pool usage.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshSummary {
    pub tiles_x: u32,
    pub tiles_y: u32,
    pub edge_z: f32,
    pub used_vertices: usize,
    pub free_vertices: usize,
}

/// One placed light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightInfo {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub level: f32,
}

/// Ambient bake parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightingSettings {
    /// Floor added to every vertex (0-255)
    pub global_ambient: i32,
    /// How far the directional term may darken below the floor
    pub ambient_cut: i32,
    /// Directional term strength, in 1/256 units
    pub directional: i32,
}

/// Placed lights and the settings of the last bake.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LightingSummary {
    pub lights: Vec<LightInfo>,
    pub vertices_baked: usize,
}

/// Current tool parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolState {
    pub brush_size: f32,
    pub brush_amount: f32,
    pub paint: super::TilePaintSettings,
    pub fx_mask: u8,
}
