//! Command types for IPC messages.

mod mesh;
mod selection;
mod tile;

pub use mesh::*;
pub use selection::*;
pub use tile::*;

use serde::{Deserialize, Serialize};

use crate::types::{LightingSettings, TilePaintSettings, ViewMode};

/// Point lights and the ambient bake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LightCommand {
    /// Add a light
    Place { x: f32, y: f32, radius: f32, level: f32 },
    /// Replace the light being dragged
    AlterLast { x: f32, y: f32, radius: f32, level: f32 },
    /// Remove every light
    Clear,
    /// Change the bake parameters
    SetLighting(LightingSettings),
    /// Rebake every vertex
    Recompute,
}

/// Tool parameter changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ToolCommand {
    /// Raise/lower brush radius and strength
    SetBrush { size: f32, amount: f32 },
    SetPaint(TilePaintSettings),
    /// Fx flags applied by fx painting
    SetFxMask { fx: u8 },
}

/// Editor window navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViewCommand {
    Resize { view: ViewMode, width: f32, height: f32 },
    Pan { view: ViewMode, delta: [f32; 2] },
    /// Zoom keeping the point under `anchor` fixed
    Zoom { view: ViewMode, anchor: [f32; 2], zoom: f32 },
}
