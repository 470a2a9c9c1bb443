//! Grid lookups, geometric queries and read-only iteration for Mesh.

use glam::{Vec2, Vec3};

use super::Mesh;
use crate::constants::{
    CHAINEND, CORNER_BL, CORNER_BR, CORNER_TL, CORNER_TR, TILE_SIZE, TWIST_FLAT, TWIST_SLOPE,
};
use crate::pool::ChainIter;
use crate::types::{Tile, TileId, Vertex, VertexId};

impl Mesh {
    /// Tile at grid position (x, y), or `None` outside the grid
    #[inline]
    pub fn tile_index_at(&self, x: i32, y: i32) -> Option<TileId> {
        if x < 0 || y < 0 || x >= self.tiles_x as i32 || y >= self.tiles_y as i32 {
            return None;
        }
        Some(TileId(self.fanstart[y as usize] + x as u32))
    }

    #[inline]
    pub fn tile_at(&self, x: i32, y: i32) -> Option<&Tile> {
        self.tile_index_at(x, y).and_then(|id| self.tile(id))
    }

    /// Grid position of a tile index
    #[inline]
    pub fn tile_coords(&self, tile: TileId) -> (u32, u32) {
        if self.tiles_x == 0 {
            return (0, 0);
        }
        (tile.0 % self.tiles_x, tile.0 / self.tiles_x)
    }

    /// Number of vertices a tile's chain holds (0 for fan-off tiles)
    pub fn tile_vertex_count(&self, tile: TileId) -> usize {
        match self.tile(tile) {
            Some(t) if !t.is_fanoff() => self.dictionary.vertex_count(t.tile_type),
            _ => 0,
        }
    }

    /// Walk a tile's vertex chain. Empty for fan-off or unknown tiles.
    pub fn tile_vertices(&self, tile: TileId) -> ChainIter<'_> {
        match self.tile(tile).and_then(Tile::vrtstart) {
            Some(first) => self.pool.chain(first, self.tile_vertex_count(tile)),
            None => self.pool.chain(VertexId(CHAINEND), 0),
        }
    }

    /// The `corner`-th vertex of the tile at (x, y).
    ///
    /// `None` when the tile is outside the grid, has no geometry or its
    /// shape has fewer vertices.
    pub fn vertex_index_at(&self, x: i32, y: i32, corner: usize) -> Option<VertexId> {
        let tile = self.tile_index_at(x, y)?;
        let first = self.tile(tile)?.vrtstart()?;
        self.pool.chain_nth(first, self.tile_vertex_count(tile), corner)
    }

    #[inline]
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.pool.vertex(id)
    }

    #[inline]
    pub fn vertex_position(&self, id: VertexId) -> Option<Vec3> {
        self.pool.vertex(id).map(|v| v.position)
    }

    /// Overwrite a vertex position without clamping
    pub fn set_vertex_position(&mut self, id: VertexId, position: Vec3) {
        if let Some(vertex) = self.pool.vertex_mut(id) {
            vertex.position = position;
        }
    }

    /// Clamp a point into the mesh bounds
    #[inline]
    pub fn clamp_to_bounds(&self, position: Vec3) -> Vec3 {
        position.clamp(Vec3::ZERO, self.bounds())
    }

    /// Upper corner of the mesh bounding box
    #[inline]
    pub fn bounds(&self) -> Vec3 {
        Vec3::new(self.edge_x, self.edge_y, self.edge_z)
    }

    /// Bilinear height of the tile under a world point.
    ///
    /// Returns 0 outside the mesh or over a fan-off tile.
    pub fn elevation_at(&self, x: f32, y: f32) -> f32 {
        if x < 0.0 || y < 0.0 {
            return 0.0;
        }
        let tx = (x / TILE_SIZE).floor() as i32;
        let ty = (y / TILE_SIZE).floor() as i32;

        let corner_z = |corner| {
            self.vertex_index_at(tx, ty, corner)
                .and_then(|id| self.vertex_position(id))
                .map(|p| p.z)
        };
        let (Some(tl), Some(tr), Some(br), Some(bl)) = (
            corner_z(CORNER_TL),
            corner_z(CORNER_TR),
            corner_z(CORNER_BR),
            corner_z(CORNER_BL),
        ) else {
            return 0.0;
        };

        let u = (x - tx as f32 * TILE_SIZE) / TILE_SIZE;
        let v = (y - ty as f32 * TILE_SIZE) / TILE_SIZE;
        let top = tl + (tr - tl) * u;
        let bottom = bl + (br - bl) * u;
        top + (bottom - top) * v
    }

    /// Tiles whose grid cell lies in the inclusive range, clipped to the grid.
    ///
    /// Yields `(x, y, id, tile)` in row-major order; fan-off tiles are
    /// included so callers can draw or skip them.
    pub fn tiles_in_rect(
        &self,
        min: (i32, i32),
        max: (i32, i32),
    ) -> impl Iterator<Item = (u32, u32, TileId, &Tile)> + '_ {
        let x0 = min.0.max(0);
        let y0 = min.1.max(0);
        let x1 = max.0.min(self.tiles_x as i32 - 1);
        let y1 = max.1.min(self.tiles_y as i32 - 1);

        (y0..=y1)
            .flat_map(move |y| (x0..=x1).map(move |x| (x, y)))
            .filter_map(move |(x, y)| {
                let id = self.tile_index_at(x, y)?;
                Some((x as u32, y as u32, id, &self.tiles[id.index()]))
            })
    }

    /// Every live vertex of every tile, in row-major tile order
    pub fn live_vertex_ids(&self) -> Vec<VertexId> {
        (0..self.tiles.len() as u32)
            .flat_map(|t| self.tile_vertices(TileId(t)))
            .collect()
    }

    /// Whether some tile's chain reaches `id`
    pub fn is_reachable(&self, id: VertexId) -> bool {
        (0..self.tiles.len() as u32).any(|t| self.tile_vertices(TileId(t)).any(|v| v == id))
    }

    /// Live vertices whose planar position falls inside the inclusive box
    pub fn vertices_in_rect(&self, min: Vec2, max: Vec2) -> Vec<VertexId> {
        let lo = min.min(max);
        let hi = min.max(max);
        self.live_vertex_ids()
            .into_iter()
            .filter(|id| {
                self.vertex_position(*id).is_some_and(|p| {
                    p.x >= lo.x && p.x <= hi.x && p.y >= lo.y && p.y <= hi.y
                })
            })
            .collect()
    }

    /// Slope code from the four corner heights.
    ///
    /// `zx` is left minus right, `zy` is bottom minus top, each in steps of
    /// `TWIST_SLOPE` and packed as `zy << 4 | zx` around the flat value.
    pub fn compute_twist(&self, tile: TileId) -> u8 {
        let ids: Vec<VertexId> = self.tile_vertices(tile).take(4).collect();
        if ids.len() < 4 {
            return TWIST_FLAT;
        }
        let z = |corner: usize| self.vertex_position(ids[corner]).map_or(0.0, |p| p.z);

        let zx = (z(CORNER_TL) + z(CORNER_BL) - z(CORNER_TR) - z(CORNER_BR)) / TWIST_SLOPE;
        let zy = (z(CORNER_BR) + z(CORNER_BL) - z(CORNER_TL) - z(CORNER_TR)) / TWIST_SLOPE;

        let pack = |value: f32| (value as i32 + 7).clamp(0, 15) as u8;
        (pack(zy) << 4) | pack(zx)
    }

    /// Recompute the stored twist of one tile
    pub fn update_twist(&mut self, tile: TileId) {
        let twist = self.compute_twist(tile);
        if let Some(t) = self.tiles.get_mut(tile.index()) {
            t.twist = twist;
        }
    }

    /// Recompute every tile's twist
    pub fn fix_twist(&mut self) {
        for index in 0..self.tiles.len() as u32 {
            self.update_twist(TileId(index));
        }
    }
}
