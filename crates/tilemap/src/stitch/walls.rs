//! Wall height tapering toward neighboring floor tiles.

use tracing::{debug, trace};

use crate::constants::{CORNER_BL, CORNER_BR, CORNER_TL, CORNER_TR};
use crate::mesh::Mesh;
use crate::types::VertexId;

const NEIGHBORS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Normalized distance of a grid point from the edge (or corner) shared
/// with the neighbor at offset (dx, dy)
fn distance_toward(dx: i32, dy: i32, u: f32, v: f32) -> f32 {
    let across = |d: i32, t: f32| match d {
        -1 => Some(t),
        1 => Some(1.0 - t),
        _ => None,
    };
    match (across(dx, u), across(dy, v)) {
        (Some(a), Some(b)) => a.max(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => 1.0,
    }
    .clamp(0.0, 1.0)
}

impl Mesh {
    fn mean_corner_height(&self, x: i32, y: i32) -> Option<f32> {
        let mut sum = 0.0;
        for corner in [CORNER_TL, CORNER_TR, CORNER_BR, CORNER_BL] {
            sum += self.vertex_position(self.vertex_index_at(x, y, corner)?)?.z;
        }
        Some(sum / 4.0)
    }

    /// Taper a wall tile's heights down to the floor tiles around it.
    ///
    /// Each floor neighbor (8-connected) pulls the wall's vertices toward its
    /// mean corner height with influence `(1 - d)^3`, `d` being the
    /// normalized distance from the shared edge or corner. The strongest
    /// pull wins; vertices out of reach stay at the wall's highest point.
    /// Floor tiles and walls enclosed on all sides are left alone.
    pub fn smooth_wall_barrier(&mut self, x: i32, y: i32) -> bool {
        let Some(tile_id) = self.tile_index_at(x, y) else {
            return false;
        };
        let tile = self.tiles[tile_id.index()];
        if tile.vrtstart().is_none() || !tile.fx.is_barrier() {
            return false;
        }

        let floors: Vec<(i32, i32, f32)> = NEIGHBORS
            .iter()
            .filter_map(|&(dx, dy)| {
                let neighbor = self.tile_at(x + dx, y + dy)?;
                if neighbor.is_fanoff() || neighbor.fx.is_barrier() {
                    return None;
                }
                Some((dx, dy, self.mean_corner_height(x + dx, y + dy)?))
            })
            .collect();
        if floors.is_empty() {
            trace!("smooth_wall_barrier: ({}, {}) has no floor neighbor", x, y);
            return false;
        }

        let ids: Vec<VertexId> = self.tile_vertices(tile_id).collect();
        let wall_top = ids
            .iter()
            .filter_map(|id| self.vertex_position(*id))
            .map(|p| p.z)
            .fold(f32::MIN, f32::max);

        for (index, id) in ids.into_iter().enumerate() {
            let Some(grid) = self.dictionary.grid_offset(tile.tile_type, index) else {
                continue;
            };
            let (influence, floor) = floors
                .iter()
                .map(|&(dx, dy, level)| {
                    let d = distance_toward(dx, dy, grid.x, grid.y);
                    ((1.0 - d).powi(3), level)
                })
                .fold((0.0f32, wall_top), |best, candidate| {
                    if candidate.0 > best.0 { candidate } else { best }
                });

            if let Some(vertex) = self.pool.vertex_mut(id) {
                vertex.position.z = wall_top + (floor - wall_top) * influence;
            }
        }
        self.update_twist(tile_id);
        true
    }

    /// Seal corners, then taper every wall tile toward its floor neighbors
    pub fn fix_walls(&mut self) {
        self.fix_corners();
        let mut smoothed = 0;
        for y in 0..self.tiles_y as i32 {
            for x in 0..self.tiles_x as i32 {
                if self.smooth_wall_barrier(x, y) {
                    smoothed += 1;
                }
            }
        }
        debug!("fix_walls: {} wall tiles smoothed", smoothed);
    }
}
