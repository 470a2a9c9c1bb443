//! The four editor view kinds and their screen/world mapping.
//!
//! Top-down views (`Vertex`, `Tile`, `Fx`) map screen x/y to world x/y.
//! The `Side` view looks along +y: screen x is world x and screen y is
//! world z, with z growing upward.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::constants::TILE_SIZE;
use crate::mesh::Mesh;
use crate::selection::SelectAxes;
use crate::types::TileId;

pub const MIN_ZOOM: f32 = 0.125;
pub const MAX_ZOOM: f32 = 8.0;

/// What a viewport shows and edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewKind {
    /// Vertex editing, top-down
    Vertex,
    /// Tile painting, top-down
    Tile,
    /// Height editing, side elevation
    Side,
    /// Fx flag painting, top-down
    Fx,
}

impl ViewKind {
    pub const ALL: [ViewKind; 4] = [ViewKind::Vertex, ViewKind::Tile, ViewKind::Side, ViewKind::Fx];

    #[inline]
    pub fn is_top_down(self) -> bool {
        !matches!(self, ViewKind::Side)
    }
}

/// One editor window onto the shared mesh
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub kind: ViewKind,
    /// World position under the screen's top-left corner. For the side
    /// view `origin.y` is the height at the bottom edge instead.
    pub origin: Vec2,
    /// Screen pixels per world unit
    pub zoom: f32,
    pub width_px: f32,
    pub height_px: f32,
}

impl Viewport {
    pub fn new(kind: ViewKind, width_px: f32, height_px: f32) -> Self {
        Self {
            kind,
            origin: Vec2::ZERO,
            zoom: 1.0,
            width_px,
            height_px,
        }
    }

    /// World point under a screen position. The axis a view cannot see
    /// is zero.
    pub fn screen_to_world(&self, screen: Vec2) -> Vec3 {
        let x = self.origin.x + screen.x / self.zoom;
        match self.kind {
            ViewKind::Side => Vec3::new(x, 0.0, self.height_at_screen_y(screen.y)),
            _ => Vec3::new(x, self.origin.y + screen.y / self.zoom, 0.0),
        }
    }

    pub fn world_to_screen(&self, world: Vec3) -> Vec2 {
        let sx = (world.x - self.origin.x) * self.zoom;
        match self.kind {
            ViewKind::Side => Vec2::new(sx, self.height_px - (world.z - self.origin.y) * self.zoom),
            _ => Vec2::new(sx, (world.y - self.origin.y) * self.zoom),
        }
    }

    /// World height under a screen row of the side view
    #[inline]
    pub fn height_at_screen_y(&self, screen_y: f32) -> f32 {
        self.origin.y + (self.height_px - screen_y) / self.zoom
    }

    /// Axes a rectangle drag in this view selects on
    #[inline]
    pub fn selection_axes(&self) -> SelectAxes {
        match self.kind {
            ViewKind::Side => SelectAxes::Xz,
            _ => SelectAxes::Xy,
        }
    }

    /// Scroll by a screen-space delta
    pub fn pan(&mut self, screen_delta: Vec2) {
        let world = screen_delta / self.zoom;
        match self.kind {
            ViewKind::Side => self.origin += Vec2::new(-world.x, world.y),
            _ => self.origin -= world,
        }
    }

    /// Change zoom, keeping the world point under `anchor` fixed
    pub fn zoom_at(&mut self, anchor: Vec2, zoom: f32) {
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        let before = self.screen_to_world(anchor);
        self.zoom = zoom;
        let after = self.screen_to_world(anchor);
        self.origin.x += before.x - after.x;
        match self.kind {
            ViewKind::Side => self.origin.y += before.z - after.z,
            _ => self.origin.y += before.y - after.y,
        }
    }

    pub fn resize(&mut self, width_px: f32, height_px: f32) {
        self.width_px = width_px.max(1.0);
        self.height_px = height_px.max(1.0);
    }

    /// Tiles touched by the visible area, in row-major order. The side
    /// view sees every row of the visible columns.
    pub fn visible_tiles(&self, mesh: &Mesh) -> Vec<TileId> {
        let to_cell = |w: f32| (w / TILE_SIZE).floor() as i32;
        let x0 = to_cell(self.origin.x);
        let x1 = to_cell(self.origin.x + self.width_px / self.zoom);
        let (y0, y1) = match self.kind {
            ViewKind::Side => (0, mesh.tiles_y() as i32 - 1),
            _ => (
                to_cell(self.origin.y),
                to_cell(self.origin.y + self.height_px / self.zoom),
            ),
        };
        mesh.tiles_in_rect((x0, y0), (x1, y1)).map(|(_, _, id, _)| id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::TileDictionary;
    use std::sync::Arc;

    fn blank(x: u32, y: u32) -> Mesh {
        Mesh::blank(Arc::new(TileDictionary::builtin()), 4096, x, y).unwrap()
    }

    #[test]
    fn test_top_down_mapping() {
        let mut view = Viewport::new(ViewKind::Tile, 640.0, 480.0);
        view.origin = Vec2::new(100.0, 50.0);
        view.zoom = 2.0;
        assert_eq!(view.screen_to_world(Vec2::new(20.0, 40.0)), Vec3::new(110.0, 70.0, 0.0));
        assert_eq!(view.world_to_screen(Vec3::new(110.0, 70.0, 0.0)), Vec2::new(20.0, 40.0));
        assert_eq!(view.selection_axes(), SelectAxes::Xy);
    }

    #[test]
    fn test_side_view_inverts_height() {
        let view = Viewport::new(ViewKind::Side, 640.0, 480.0);
        assert_eq!(view.height_at_screen_y(480.0), 0.0);
        assert_eq!(view.height_at_screen_y(380.0), 100.0);
        assert_eq!(view.screen_to_world(Vec2::new(30.0, 0.0)), Vec3::new(30.0, 0.0, 480.0));
        assert_eq!(view.world_to_screen(Vec3::new(30.0, 999.0, 100.0)), Vec2::new(30.0, 380.0));
        assert_eq!(view.selection_axes(), SelectAxes::Xz);
        assert!(!ViewKind::Side.is_top_down());
    }

    #[test]
    fn test_zoom_at_keeps_anchor() {
        let mut view = Viewport::new(ViewKind::Vertex, 640.0, 480.0);
        let anchor = Vec2::new(320.0, 240.0);
        let before = view.screen_to_world(anchor);
        view.zoom_at(anchor, 2.0);
        assert_eq!(view.zoom, 2.0);
        assert_eq!(view.screen_to_world(anchor), before);

        view.zoom_at(anchor, 1000.0);
        assert_eq!(view.zoom, MAX_ZOOM);
    }

    #[test]
    fn test_pan_moves_content_with_the_cursor() {
        let mut view = Viewport::new(ViewKind::Tile, 640.0, 480.0);
        let world = view.screen_to_world(Vec2::new(100.0, 100.0));
        view.pan(Vec2::new(10.0, -20.0));
        assert_eq!(view.screen_to_world(Vec2::new(110.0, 80.0)), world);

        let mut side = Viewport::new(ViewKind::Side, 640.0, 480.0);
        let world = side.screen_to_world(Vec2::new(100.0, 100.0));
        side.pan(Vec2::new(10.0, -20.0));
        assert_eq!(side.screen_to_world(Vec2::new(110.0, 80.0)), world);
    }

    #[test]
    fn test_visible_tiles() {
        let mesh = blank(8, 8);
        let mut view = Viewport::new(ViewKind::Tile, 256.0, 128.0);
        view.origin = Vec2::new(128.0, 0.0);
        // Columns 1..=3, rows 0..=1 (the far edges touch the next cell)
        let tiles = view.visible_tiles(&mesh);
        assert_eq!(tiles.len(), 6);
        assert_eq!(tiles[0], mesh.tile_index_at(1, 0).unwrap());

        let side = Viewport::new(ViewKind::Side, 100.0, 480.0);
        assert_eq!(side.visible_tiles(&mesh).len(), 8);

        view.origin = Vec2::new(-5000.0, -5000.0);
        assert!(view.visible_tiles(&mesh).is_empty());
    }
}
