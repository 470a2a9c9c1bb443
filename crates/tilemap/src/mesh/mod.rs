//! Tile grid with a shared vertex arena.
//!
//! Each grid cell ("fan") references a chain of vertices in the
//! [`VertexPool`]; adjacent tiles keep separate copies of their shared
//! corners, which the stitch passes keep coincident.

mod construction;
mod queries;
mod raw;

use std::sync::Arc;

pub use raw::{RawMesh, RawTile, RawVertex};

use crate::dictionary::TileDictionary;
use crate::pool::{PoolError, VertexPool};
use crate::types::{MeshId, Tile, TileId};

/// Errors that can occur while building or retyping tiles
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("Tile type {0} has no usable shape")]
    UndefinedTileType(u8),
    #[error("Tile {0:?} is outside the grid")]
    TileOutOfRange(TileId),
    #[error("Mesh size {tiles_x}x{tiles_y} exceeds {max} tiles per axis")]
    TooLarge { tiles_x: u32, tiles_y: u32, max: u32 },
    #[error("Raw mesh has {actual} tiles, expected {expected}")]
    RawTileCount { expected: usize, actual: usize },
    #[error("Tile {tile} needs vertices {start}..{end} but only {available} were loaded")]
    RawVertexRange {
        tile: usize,
        start: usize,
        end: usize,
        available: usize,
    },
}

/// The level's terrain grid
#[derive(Debug, Clone)]
pub struct Mesh {
    pub(crate) id: MeshId,
    pub(crate) tiles_x: u32,
    pub(crate) tiles_y: u32,
    pub(crate) edge_x: f32,
    pub(crate) edge_y: f32,
    pub(crate) edge_z: f32,
    pub(crate) tiles: Vec<Tile>,
    /// Index of the first tile of each row
    pub(crate) fanstart: Vec<u32>,
    pub(crate) pool: VertexPool,
    pub(crate) dictionary: Arc<TileDictionary>,
}

impl Mesh {
    #[inline]
    pub fn id(&self) -> MeshId {
        self.id
    }

    #[inline]
    pub fn tiles_x(&self) -> u32 {
        self.tiles_x
    }

    #[inline]
    pub fn tiles_y(&self) -> u32 {
        self.tiles_y
    }

    #[inline]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn edge_x(&self) -> f32 {
        self.edge_x
    }

    #[inline]
    pub fn edge_y(&self) -> f32 {
        self.edge_y
    }

    #[inline]
    pub fn edge_z(&self) -> f32 {
        self.edge_z
    }

    /// Row start table: `fanstart[y] == y * tiles_x`
    #[inline]
    pub fn fanstart(&self) -> &[u32] {
        &self.fanstart
    }

    #[inline]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    #[inline]
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.index())
    }

    #[inline]
    pub fn pool(&self) -> &VertexPool {
        &self.pool
    }

    #[inline]
    pub fn dictionary(&self) -> &TileDictionary {
        &self.dictionary
    }

    /// Vertices still available in the arena
    #[inline]
    pub fn free_vertices(&self) -> usize {
        self.pool.free_count()
    }
}
