//! Construction and per-tile geometry allocation for Mesh.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use tracing::{debug, warn};

use cartman_config::{DEFAULT_EDGE_Z, EditorConfig};

use super::{Mesh, MeshError};
use crate::constants::{
    BLANK_TEXTURE_BASE, CHAINEND, FANOFF, MAX_FAN_VERTICES, MAX_MESH_TILES, TILE_SIZE, TWIST_FLAT,
};
use crate::dictionary::TileDictionary;
use crate::pool::{PoolError, VertexPool};
use crate::types::{MeshId, Tile, TileFx, TileId, VertexId};

impl Mesh {
    /// Create an empty (0x0) mesh backed by a pool of `vertex_capacity` slots
    pub fn new(dictionary: Arc<TileDictionary>, vertex_capacity: usize) -> Self {
        Self {
            id: MeshId::next(),
            tiles_x: 0,
            tiles_y: 0,
            edge_x: 0.0,
            edge_y: 0.0,
            edge_z: DEFAULT_EDGE_Z,
            tiles: Vec::new(),
            fanstart: Vec::new(),
            pool: VertexPool::new(vertex_capacity),
            dictionary,
        }
    }

    /// Create an empty mesh sized by an editor config
    pub fn with_config(dictionary: Arc<TileDictionary>, config: &EditorConfig) -> Self {
        let mut mesh = Self::new(dictionary, config.vertex_capacity);
        mesh.edge_z = config.edge_z;
        mesh
    }

    /// Convenience: a new mesh already filled with a blank grid
    pub fn blank(
        dictionary: Arc<TileDictionary>,
        vertex_capacity: usize,
        tiles_x: u32,
        tiles_y: u32,
    ) -> Result<Self, MeshError> {
        let mut mesh = Self::new(dictionary, vertex_capacity);
        mesh.create_blank(tiles_x, tiles_y)?;
        Ok(mesh)
    }

    /// Reset the grid to `tiles_x` x `tiles_y` blank wall tiles.
    ///
    /// Tiles get shape 0, wall+impassable fx and a checkerboard of the two
    /// blank textures. A zero-sized request is a no-op. The previous grid is
    /// kept if the new one cannot be allocated.
    pub fn create_blank(&mut self, tiles_x: u32, tiles_y: u32) -> Result<(), MeshError> {
        if tiles_x == 0 || tiles_y == 0 {
            debug!("create_blank: {}x{} is empty, nothing to do", tiles_x, tiles_y);
            return Ok(());
        }
        if tiles_x > MAX_MESH_TILES || tiles_y > MAX_MESH_TILES {
            return Err(MeshError::TooLarge {
                tiles_x,
                tiles_y,
                max: MAX_MESH_TILES,
            });
        }

        let per_tile = self.usable_vertex_count(0)?;
        let tile_count = tiles_x as usize * tiles_y as usize;
        let required = tile_count * per_tile;
        if required > self.pool.capacity() {
            warn!(
                "create_blank: {}x{} needs {} vertices, pool holds {}",
                tiles_x,
                tiles_y,
                required,
                self.pool.capacity()
            );
            return Err(PoolError::Exhausted {
                requested: required,
                available: self.pool.capacity(),
            }
            .into());
        }

        self.id = MeshId::next();
        self.pool = VertexPool::new(self.pool.capacity());
        self.reset_grid(tiles_x, tiles_y);

        for y in 0..tiles_y {
            for x in 0..tiles_x {
                let index = (y * tiles_x + x) as usize;
                let tile = &mut self.tiles[index];
                tile.tile_type = 0;
                tile.texture_bits = BLANK_TEXTURE_BASE + ((x + y) & 1) as u16;
                tile.fx = TileFx::DEFAULT_WALL;
                self.instantiate_tile(TileId(index as u32), Self::tile_origin(x, y))?;
            }
        }

        debug!(
            "create_blank: {}x{} tiles, {} vertices in use",
            tiles_x,
            tiles_y,
            self.pool.used_count()
        );
        Ok(())
    }

    /// Size the tile array, row table and edges; every tile starts fan-off
    pub(crate) fn reset_grid(&mut self, tiles_x: u32, tiles_y: u32) {
        self.tiles_x = tiles_x;
        self.tiles_y = tiles_y;
        self.edge_x = tiles_x as f32 * TILE_SIZE;
        self.edge_y = tiles_y as f32 * TILE_SIZE;
        self.tiles = vec![Tile::default(); tiles_x as usize * tiles_y as usize];
        self.fanstart = (0..tiles_y).map(|y| y * tiles_x).collect();
    }

    /// World position of a tile's top-left corner
    #[inline]
    pub fn tile_origin(x: u32, y: u32) -> Vec2 {
        Vec2::new(x as f32 * TILE_SIZE, y as f32 * TILE_SIZE)
    }

    /// Vertex count of a shape the mesh can build, or an error for
    /// undefined and malformed shapes
    pub(crate) fn usable_vertex_count(&self, tile_type: u8) -> Result<usize, MeshError> {
        match self.dictionary.shape(tile_type) {
            Some(shape) if shape.is_valid() => Ok(shape.vertex_count()),
            shape => {
                warn!(
                    "tile type {} has {} vertices; refusing to build it",
                    tile_type,
                    shape.map_or(0, |s| s.vertex_count())
                );
                Err(MeshError::UndefinedTileType(tile_type))
            }
        }
    }

    /// Allocate and position a fresh chain for `tile_type` at `world`
    pub(crate) fn allocate_shape(&mut self, tile_type: u8, world: Vec2) -> Result<VertexId, MeshError> {
        let count = self.usable_vertex_count(tile_type)?;
        let first = self.pool.allocate_chain(count)?;

        let ids: Vec<VertexId> = self.pool.chain(first, count).collect();
        for (corner, id) in ids.into_iter().enumerate() {
            let offset = self
                .dictionary
                .grid_offset(tile_type, corner)
                .unwrap_or(Vec2::ZERO);
            let xy = world + offset * TILE_SIZE;
            if let Some(vertex) = self.pool.vertex_mut(id) {
                vertex.position = Vec3::new(xy.x, xy.y, 0.0);
            }
        }
        Ok(first)
    }

    /// Give a tile a new chain, releasing whatever chain it held before
    pub(crate) fn attach_chain(&mut self, tile: TileId, first: VertexId) {
        let old = self.tiles[tile.index()].vrtstart;
        if old != CHAINEND {
            self.pool.release(VertexId(old), MAX_FAN_VERTICES);
        }
        self.tiles[tile.index()].vrtstart = first.0;
    }

    /// Build the vertex chain for a tile's current type at `world`.
    ///
    /// The new chain is allocated before any previous chain is released, so
    /// a failure leaves the tile as it was.
    pub fn instantiate_tile(&mut self, tile: TileId, world: Vec2) -> Result<(), MeshError> {
        let Some(current) = self.tiles.get(tile.index()) else {
            return Err(MeshError::TileOutOfRange(tile));
        };
        let tile_type = current.tile_type;

        let first = self.allocate_shape(tile_type, world)?;
        self.attach_chain(tile, first);
        self.update_twist(tile);
        Ok(())
    }

    /// Release a tile's chain and turn it into an undrawn wall cell
    pub fn remove_tile(&mut self, tile: TileId) {
        let Some(current) = self.tiles.get(tile.index()) else {
            return;
        };
        if current.vrtstart != CHAINEND {
            self.pool
                .release(VertexId(current.vrtstart), MAX_FAN_VERTICES);
        }

        let current = &mut self.tiles[tile.index()];
        current.tile_type = 0;
        current.fx = TileFx::DEFAULT_WALL;
        current.texture_bits = FANOFF;
        current.twist = TWIST_FLAT;
        current.vrtstart = CHAINEND;
    }
}
