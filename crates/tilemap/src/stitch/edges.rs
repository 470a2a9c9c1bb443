//! Sealing of mid-edge vertices between neighboring tiles.

use glam::{Vec2, Vec3};
use tracing::{debug, trace, warn};

use crate::constants::{TILE_SIZE, VERTEX_FRESH};
use crate::mesh::Mesh;
use crate::types::{TileId, VertexId};

/// Distance in world units under which a vertex counts as lying on a tile
/// edge, and two grid points count as the same point
pub const EDGE_TOLERANCE: f32 = 1.0;

/// The tile edge a vertex lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    /// Edge of a normalized grid point; `None` for corners and interior points
    fn classify(grid: Vec2) -> Option<Self> {
        let offset = grid * TILE_SIZE;
        let left = offset.x < EDGE_TOLERANCE;
        let right = offset.x > TILE_SIZE - EDGE_TOLERANCE;
        let top = offset.y < EDGE_TOLERANCE;
        let bottom = offset.y > TILE_SIZE - EDGE_TOLERANCE;

        match (left || right, top || bottom) {
            (true, true) | (false, false) => None,
            (true, false) => Some(if left { Self::Left } else { Self::Right }),
            (false, true) => Some(if top { Self::Top } else { Self::Bottom }),
        }
    }

    fn neighbor_offset(self) -> (i32, i32) {
        match self {
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::Top => (0, -1),
            Self::Bottom => (0, 1),
        }
    }

    /// Where a point on this edge sits in the neighbor's grid
    fn mirrored(self, grid: Vec2) -> Vec2 {
        match self {
            Self::Left => Vec2::new(1.0, grid.y),
            Self::Right => Vec2::new(0.0, grid.y),
            Self::Top => Vec2::new(grid.x, 1.0),
            Self::Bottom => Vec2::new(grid.x, 0.0),
        }
    }

    /// Coordinate along the shared edge
    fn along(self, grid: Vec2) -> f32 {
        match self {
            Self::Left | Self::Right => grid.y,
            Self::Top | Self::Bottom => grid.x,
        }
    }

    /// Coordinate across the shared edge
    fn across(self, grid: Vec2) -> f32 {
        match self {
            Self::Left | Self::Right => grid.x,
            Self::Top | Self::Bottom => grid.y,
        }
    }
}

/// A neighbor vertex with its normalized grid coordinate
#[derive(Debug, Clone, Copy)]
struct GridVertex {
    grid: Vec2,
    position: Vec3,
    ambient: f32,
}

#[inline]
fn same_point(a: Vec2, b: Vec2) -> bool {
    ((a - b) * TILE_SIZE).abs().max_element() < EDGE_TOLERANCE
}

/// Interpolate the neighbor surface at `target` along the shared edge.
///
/// Uses the two nearest edge vertices bracketing the point; falls back to a
/// Gaussian-weighted blend over every neighbor vertex (distance measured in
/// sub-grid cells) when the edge has no bracketing pair.
fn interpolate(side: Side, target: Vec2, neighbor: &[GridVertex]) -> (Vec3, f32) {
    let t = side.along(target);
    let mut below: Option<(f32, &GridVertex)> = None;
    let mut above: Option<(f32, &GridVertex)> = None;

    for v in neighbor {
        if ((side.across(v.grid) - side.across(target)) * TILE_SIZE).abs() >= EDGE_TOLERANCE {
            continue;
        }
        let s = side.along(v.grid);
        if s <= t && below.is_none_or(|(b, _)| s > b) {
            below = Some((s, v));
        }
        if s >= t && above.is_none_or(|(a, _)| s < a) {
            above = Some((s, v));
        }
    }

    if let (Some((s0, v0)), Some((s1, v1))) = (below, above) {
        if s1 - s0 <= f32::EPSILON {
            return (v0.position, v0.ambient);
        }
        let f = (t - s0) / (s1 - s0);
        let position = v0.position + (v1.position - v0.position) * f;
        return (position, v0.ambient + (v1.ambient - v0.ambient) * f);
    }

    let mut weight_sum = 0.0f32;
    let mut position = Vec3::ZERO;
    let mut ambient = 0.0f32;
    for v in neighbor {
        let d = (v.grid - target) * 3.0;
        let w = (-d.x * d.x - d.y * d.y).exp();
        weight_sum += w;
        position += v.position * w;
        ambient += v.ambient * w;
    }
    if weight_sum <= f32::EPSILON {
        return (Vec3::ZERO, VERTEX_FRESH as f32);
    }
    (position / weight_sum, ambient / weight_sum)
}

impl Mesh {
    fn grid_vertices(&self, tile: TileId) -> Vec<(VertexId, GridVertex)> {
        let Some(t) = self.tile(tile) else {
            return Vec::new();
        };
        let tile_type = t.tile_type;
        self.tile_vertices(tile)
            .enumerate()
            .filter_map(|(i, id)| {
                let grid = self.dictionary.grid_offset(tile_type, i)?;
                let vertex = self.vertex(id)?;
                Some((
                    id,
                    GridVertex {
                        grid,
                        position: vertex.position,
                        ambient: vertex.ambient as f32,
                    },
                ))
            })
            .collect()
    }

    /// Seal the non-corner edge vertices of the tile at (x, y) against the
    /// neighbor across each edge.
    ///
    /// A matching neighbor vertex is welded directly. When the neighbor's
    /// shape has no vertex there, a scratch vertex is allocated at the
    /// interpolated neighbor surface, welded with the real vertex and then
    /// released again. Returns how many vertices were welded.
    pub fn fix_edge_vertices(&mut self, x: i32, y: i32) -> usize {
        let Some(tile) = self.tile_index_at(x, y) else {
            return 0;
        };
        if self.tiles[tile.index()].vrtstart().is_none() {
            return 0;
        }
        let own = self.grid_vertices(tile);
        let mut welded = 0;

        for (index, (id, vertex)) in own.iter().enumerate().skip(4) {
            let Some(side) = Side::classify(vertex.grid) else {
                continue;
            };
            let (dx, dy) = side.neighbor_offset();
            let Some(other) = self.tile_index_at(x + dx, y + dy) else {
                continue;
            };
            if self.tiles[other.index()].vrtstart().is_none() {
                continue;
            }

            let target = side.mirrored(vertex.grid);
            let neighbor = self.grid_vertices(other);
            if let Some((nid, _)) = neighbor.iter().find(|(_, v)| same_point(v.grid, target)) {
                if self.weld_vertices(&[*id, *nid]) > 0 {
                    welded += 1;
                }
                continue;
            }

            let (position, ambient) = interpolate(
                side,
                target,
                &neighbor.iter().map(|(_, v)| *v).collect::<Vec<_>>(),
            );
            let scratch = match self.pool.allocate_chain(1) {
                Ok(scratch) => scratch,
                Err(e) => {
                    warn!("fix_edge_vertices: no scratch vertex for tile ({}, {}) vertex {}: {}", x, y, index, e);
                    continue;
                }
            };
            if let Some(v) = self.pool.vertex_mut(scratch) {
                v.position = position;
                v.ambient = ambient.round().clamp(VERTEX_FRESH as f32, 255.0) as u8;
            }
            if self.weld_vertices(&[*id, scratch]) > 0 {
                welded += 1;
            }
            self.pool.release(scratch, 1);
            trace!(
                "fix_edge_vertices: tile ({}, {}) vertex {} sealed against type {} via scratch",
                x,
                y,
                index,
                self.tiles[other.index()].tile_type
            );
        }
        welded
    }

    /// Seal the whole level: every corner, then every edge vertex, row by row
    pub fn fix_mesh(&mut self) {
        self.fix_corners();
        let mut welded = 0;
        for y in 0..self.tiles_y as i32 {
            for x in 0..self.tiles_x as i32 {
                welded += self.fix_edge_vertices(x, y);
            }
        }
        debug!("fix_mesh: {} edge vertices welded", welded);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::TileDictionary;
    use std::sync::Arc;

    fn mesh_with_types(types: &[u8]) -> Mesh {
        let mut mesh = Mesh::blank(Arc::new(TileDictionary::builtin()), 4096, types.len() as u32, 1).unwrap();
        for (x, &tile_type) in types.iter().enumerate() {
            mesh.tiles[x].tile_type = tile_type;
            mesh.instantiate_tile(TileId(x as u32), Mesh::tile_origin(x as u32, 0)).unwrap();
        }
        mesh
    }

    fn set_z(mesh: &mut Mesh, x: i32, corner: usize, z: f32) -> VertexId {
        let id = mesh.vertex_index_at(x, 0, corner).unwrap();
        let mut p = mesh.vertex_position(id).unwrap();
        p.z = z;
        mesh.set_vertex_position(id, p);
        id
    }

    #[test]
    fn test_classify() {
        assert_eq!(Side::classify(Vec2::new(0.0, 1.0 / 3.0)), Some(Side::Left));
        assert_eq!(Side::classify(Vec2::new(1.0, 2.0 / 3.0)), Some(Side::Right));
        assert_eq!(Side::classify(Vec2::new(1.0 / 3.0, 0.0)), Some(Side::Top));
        assert_eq!(Side::classify(Vec2::new(2.0 / 3.0, 1.0)), Some(Side::Bottom));
        assert_eq!(Side::classify(Vec2::new(1.0, 1.0)), None);
        assert_eq!(Side::classify(Vec2::new(0.5, 0.5)), None);
    }

    #[test]
    fn test_matching_edge_vertices_weld() {
        // Type 4 splits every edge in thirds
        let mut mesh = mesh_with_types(&[4, 4]);
        // Left edge (0, 1/3) of tile 1 meets right edge (1, 1/3) of tile 0
        let right = set_z(&mut mesh, 1, 11, 40.0);
        let left = mesh.vertex_index_at(0, 0, 6).unwrap();

        assert_eq!(mesh.fix_edge_vertices(1, 0), 2);
        assert_eq!(mesh.vertex_position(right), mesh.vertex_position(left));
        assert_eq!(mesh.vertex_position(left).unwrap().z, 20.0);
    }

    #[test]
    fn test_mismatched_shapes_use_scratch_vertex() {
        let mut mesh = mesh_with_types(&[0, 4]);
        set_z(&mut mesh, 0, 2, 90.0);
        let free = mesh.free_vertices();

        mesh.fix_edge_vertices(1, 0);
        let lower = mesh.vertex_index_at(1, 0, 10).unwrap();
        let upper = mesh.vertex_index_at(1, 0, 11).unwrap();
        assert!((mesh.vertex_position(lower).unwrap().z - 30.0).abs() < 1e-3);
        assert!((mesh.vertex_position(upper).unwrap().z - 15.0).abs() < 1e-3);

        assert_eq!(mesh.free_vertices(), free);
        assert!(mesh.pool().validate_free_count().is_ok());
    }

    #[test]
    fn test_scratch_skipped_when_pool_full() {
        let dictionary = Arc::new(TileDictionary::builtin());
        let mut mesh = Mesh::blank(dictionary, 20, 2, 1).unwrap();
        mesh.tiles[1].tile_type = 4;
        mesh.instantiate_tile(TileId(1), Mesh::tile_origin(1, 0)).unwrap();
        let rest = mesh.free_vertices();
        mesh.pool.allocate_chain(rest).unwrap();
        assert_eq!(mesh.free_vertices(), 0);
        assert_eq!(mesh.fix_edge_vertices(1, 0), 0);
    }

    #[test]
    fn test_interpolate_gaussian_fallback() {
        let neighbor = [
            GridVertex { grid: Vec2::new(0.0, 0.0), position: Vec3::new(0.0, 0.0, 10.0), ambient: 10.0 },
            GridVertex { grid: Vec2::new(1.0, 1.0), position: Vec3::new(0.0, 0.0, 10.0), ambient: 10.0 },
        ];
        // Nothing lies on the right edge, so the Gaussian blend is used
        let (p, a) = interpolate(Side::Right, Vec2::new(0.5, 0.5), &neighbor);
        assert!((p.z - 10.0).abs() < 1e-4);
        assert!((a - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_fix_mesh_seals_flat_mesh_unchanged() {
        let mut mesh = mesh_with_types(&[4, 5, 0]);
        let before = mesh.to_raw();
        mesh.fix_mesh();
        assert_eq!(mesh.to_raw(), before);
    }
}
