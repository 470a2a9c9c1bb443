//! Editor window kinds.

use serde::{Deserialize, Serialize};

/// Which editor window a screen-space command came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ViewMode {
    /// Top-down vertex editing
    #[default]
    Vertex,
    /// Top-down tile painting
    Tile,
    /// Side elevation (screen y is height)
    Side,
    /// Top-down fx flag painting
    Fx,
}

/// Position and zoom of one editor window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub view: ViewMode,
    pub origin: [f32; 2],
    pub zoom: f32,
    pub size_px: [f32; 2],
}
