//! Vertex welding and corner sealing.

use glam::Vec3;
use tracing::{debug, trace, warn};

use crate::constants::{CORNER_BL, CORNER_BR, CORNER_TL, CORNER_TR, MAX_AMBIENT_LEVEL, VERTEX_FRESH};
use crate::mesh::Mesh;
use crate::selection::SelectionList;
use crate::types::VertexId;

/// For each corner of a tile: the neighbor offsets that share the point and
/// which of their corners lands on it
const CORNER_PARTNERS: [(usize, [(i32, i32, usize); 3]); 4] = [
    (CORNER_TL, [(-1, 0, CORNER_TR), (0, -1, CORNER_BL), (-1, -1, CORNER_BR)]),
    (CORNER_TR, [(1, 0, CORNER_TL), (0, -1, CORNER_BR), (1, -1, CORNER_BL)]),
    (CORNER_BR, [(1, 0, CORNER_BL), (0, 1, CORNER_TR), (1, 1, CORNER_TL)]),
    (CORNER_BL, [(-1, 0, CORNER_BR), (0, 1, CORNER_TL), (-1, 1, CORNER_TR)]),
];

impl Mesh {
    /// Weld every vertex of a selection to their common mean.
    ///
    /// A selection bound to another mesh layout is refused.
    pub fn weld(&mut self, selection: &SelectionList) -> usize {
        if !selection.is_bound_to(self) {
            warn!("weld: selection is bound to a different mesh, ignoring");
            return 0;
        }
        self.weld_vertices(selection.as_slice())
    }

    /// Replace each vertex with the mean position and ambient of the set.
    ///
    /// Free slots are skipped. Returns the number of vertices written (0 when
    /// fewer than two live vertices were given). The averaged ambient is
    /// clamped into `1..=255`.
    pub fn weld_vertices(&mut self, ids: &[VertexId]) -> usize {
        // ===== PHASE 1: GATHER =====
        let mut sum = [0.0f64; 4];
        let mut live = Vec::with_capacity(ids.len());
        for &id in ids {
            let Some(vertex) = self.pool.vertex(id) else {
                continue;
            };
            if vertex.is_unused() {
                continue;
            }
            sum[0] += vertex.position.x as f64;
            sum[1] += vertex.position.y as f64;
            sum[2] += vertex.position.z as f64;
            sum[3] += vertex.ambient as f64;
            live.push(id);
        }
        if live.len() < 2 {
            return 0;
        }

        let n = live.len() as f64;
        let mean = Vec3::new((sum[0] / n) as f32, (sum[1] / n) as f32, (sum[2] / n) as f32);
        let ambient = (sum[3] / n)
            .round()
            .clamp(VERTEX_FRESH as f64, MAX_AMBIENT_LEVEL as f64) as u8;

        // ===== PHASE 2: WRITE =====
        for &id in &live {
            if let Some(vertex) = self.pool.vertex_mut(id) {
                vertex.position = mean;
                vertex.ambient = ambient;
            }
        }
        trace!("weld: {} vertices -> {:?}", live.len(), mean);
        live.len()
    }

    /// Seal the four corners of the tile at (x, y) with the matching corners
    /// of its neighbors
    pub fn weld_corner(&mut self, x: i32, y: i32) {
        if self.tile_index_at(x, y).is_none() {
            return;
        }
        let mut group: Vec<VertexId> = Vec::with_capacity(4);
        for (corner, partners) in CORNER_PARTNERS {
            group.clear();
            let Some(own) = self.vertex_index_at(x, y, corner) else {
                continue;
            };
            group.push(own);
            group.extend(
                partners
                    .iter()
                    .filter_map(|&(dx, dy, c)| self.vertex_index_at(x + dx, y + dy, c)),
            );
            self.weld_vertices(&group);
        }
    }

    /// Seal the corners of every tile, row by row
    pub fn fix_corners(&mut self) {
        for y in 0..self.tiles_y as i32 {
            for x in 0..self.tiles_x as i32 {
                self.weld_corner(x, y);
            }
        }
        debug!("fix_corners: {}x{} tiles", self.tiles_x, self.tiles_y);
    }
}
