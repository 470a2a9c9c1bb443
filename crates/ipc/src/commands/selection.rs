//! Vertex selection command types.

use serde::{Deserialize, Serialize};

use crate::types::ViewMode;

/// Commands on the current vertex selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectionCommand {
    /// Select vertices inside a screen rectangle of a view
    AddRectangle { view: ViewMode, corner0: [f32; 2], corner1: [f32; 2] },
    /// Deselect vertices inside a screen rectangle of a view
    RemoveRectangle { view: ViewMode, corner0: [f32; 2], corner1: [f32; 2] },
    /// Select every vertex of a tile
    AddTile { x: i32, y: i32 },
    /// Add vertices sharing a position with a selected one
    AddConnected,
    Clear,
    /// Weld the selection to its mean
    Weld,
    /// Move the selection rigidly
    Move { delta: [f32; 3] },
    /// Roughen the selection
    Jitter,
}
