//! Flat tile/vertex arrays exchanged with the persistence layer.
//!
//! The byte-level file format lives elsewhere; this module only converts
//! between the in-memory chained representation and flat arrays.

use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Mesh, MeshError};
use crate::constants::{CHAINEND, MAX_MESH_TILES, VERTEX_FRESH, VERTEX_UNUSED};
use crate::dictionary::TileDictionary;
use crate::pool::VertexPool;
use crate::types::{MeshId, TileFx, TileId};

/// One vertex as stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct RawVertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub ambient: u8,
    /// Padding for 4-byte alignment
    pub _padding: [u8; 3],
}

impl RawVertex {
    pub fn new(position: Vec3, ambient: u8) -> Self {
        Self {
            x: position.x,
            y: position.y,
            z: position.z,
            ambient,
            _padding: [0; 3],
        }
    }
}

/// One tile as stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTile {
    pub tile_type: u8,
    pub texture_bits: u16,
    pub fx: u8,
    pub twist: u8,
    /// Offset of the tile's first vertex in [`RawMesh::vertices`]
    pub vrtstart: u32,
}

/// A whole mesh as flat arrays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMesh {
    pub tiles_x: u32,
    pub tiles_y: u32,
    pub edge_z: f32,
    pub tiles: Vec<RawTile>,
    pub vertices: Vec<RawVertex>,
}

impl Mesh {
    /// Build a mesh from loaded arrays.
    ///
    /// Tiles whose shape cannot be built are loaded as fan-off with a
    /// warning rather than failing the whole load.
    pub fn from_raw(
        raw: &RawMesh,
        dictionary: Arc<TileDictionary>,
        vertex_capacity: usize,
    ) -> Result<Self, MeshError> {
        if raw.tiles_x > MAX_MESH_TILES || raw.tiles_y > MAX_MESH_TILES {
            return Err(MeshError::TooLarge {
                tiles_x: raw.tiles_x,
                tiles_y: raw.tiles_y,
                max: MAX_MESH_TILES,
            });
        }
        let expected = raw.tiles_x as usize * raw.tiles_y as usize;
        if raw.tiles.len() != expected {
            return Err(MeshError::RawTileCount {
                expected,
                actual: raw.tiles.len(),
            });
        }

        let mut mesh = Self::new(dictionary, vertex_capacity);
        mesh.edge_z = raw.edge_z;
        mesh.reset_grid(raw.tiles_x, raw.tiles_y);

        for (index, raw_tile) in raw.tiles.iter().enumerate() {
            let tile = &mut mesh.tiles[index];
            tile.tile_type = raw_tile.tile_type;
            tile.texture_bits = raw_tile.texture_bits;
            tile.fx = TileFx(raw_tile.fx);
            tile.twist = raw_tile.twist;
            tile.vrtstart = CHAINEND;
            if tile.is_fanoff() {
                continue;
            }

            let count = match mesh.usable_vertex_count(raw_tile.tile_type) {
                Ok(count) => count,
                Err(_) => {
                    warn!("from_raw: tile {} has unusable type {}, loading as fan-off", index, raw_tile.tile_type);
                    mesh.remove_tile(TileId(index as u32));
                    continue;
                }
            };

            let start = raw_tile.vrtstart as usize;
            let end = start + count;
            let Some(source) = raw.vertices.get(start..end) else {
                return Err(MeshError::RawVertexRange {
                    tile: index,
                    start,
                    end,
                    available: raw.vertices.len(),
                });
            };

            let first = mesh.pool.allocate_chain(count)?;
            let ids: Vec<_> = mesh.pool.chain(first, count).collect();
            for (id, src) in ids.into_iter().zip(source) {
                if let Some(vertex) = mesh.pool.vertex_mut(id) {
                    vertex.position = Vec3::new(src.x, src.y, src.z);
                    vertex.ambient = if src.ambient == VERTEX_UNUSED {
                        VERTEX_FRESH
                    } else {
                        src.ambient
                    };
                }
            }
            mesh.tiles[index].vrtstart = first.0;
        }

        debug!(
            "from_raw: {}x{} tiles, {} vertices",
            raw.tiles_x,
            raw.tiles_y,
            mesh.pool.used_count()
        );
        Ok(mesh)
    }

    /// Flatten the mesh, writing vertices tile by tile in row-major order
    pub fn to_raw(&self) -> RawMesh {
        let mut vertices = Vec::with_capacity(self.pool.used_count());
        let mut tiles = Vec::with_capacity(self.tiles.len());

        for (index, tile) in self.tiles.iter().enumerate() {
            let vrtstart = vertices.len() as u32;
            for id in self.tile_vertices(TileId(index as u32)) {
                if let Some(vertex) = self.pool.vertex(id) {
                    vertices.push(RawVertex::new(vertex.position, vertex.ambient));
                }
            }
            tiles.push(RawTile {
                tile_type: tile.tile_type,
                texture_bits: tile.texture_bits,
                fx: tile.fx.bits(),
                twist: tile.twist,
                vrtstart,
            });
        }

        RawMesh {
            tiles_x: self.tiles_x,
            tiles_y: self.tiles_y,
            edge_z: self.edge_z,
            tiles,
            vertices,
        }
    }

    /// Replace this mesh's contents with loaded arrays, keeping the
    /// dictionary and pool capacity
    pub fn load_raw(&mut self, raw: &RawMesh) -> Result<(), MeshError> {
        let loaded = Self::from_raw(raw, Arc::clone(&self.dictionary), self.pool.capacity())?;
        *self = loaded;
        Ok(())
    }

    /// Drop every tile and vertex, leaving a 0x0 grid
    pub fn clear(&mut self) {
        self.id = MeshId::next();
        self.pool = VertexPool::new(self.pool.capacity());
        self.reset_grid(0, 0);
    }
}
