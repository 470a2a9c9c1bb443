//! Tile painting: retyping, texture variants and fx flags.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::{CORNER_BL, CORNER_BR, CORNER_TL, CORNER_TR, FANOFF};
use crate::mesh::{Mesh, MeshError};
use crate::pool::PoolError;
use crate::types::{TileFx, TileId};

/// How many random low bits are ORed into a painted texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextureVariant {
    /// Use the texture as given
    #[default]
    Exact,
    /// Pick one of 2 variants
    Pair,
    /// Pick one of 4 variants
    Quad,
    /// Pick one of an aligned block of 8
    Octet,
}

impl TextureVariant {
    /// Number of random low bits
    #[inline]
    pub fn random_bits(self) -> u32 {
        match self {
            Self::Exact => 0,
            Self::Pair => 1,
            Self::Quad => 2,
            Self::Octet => 3,
        }
    }

    /// Replace the variant bits of `bits` with a random pick
    pub fn apply(self, bits: u16, rng: &mut impl Rng) -> u16 {
        let k = self.random_bits();
        if k == 0 {
            return bits;
        }
        let mask: u16 = (1 << k) - 1;
        (bits & !mask) | rng.gen_range(0..=mask)
    }
}

/// Parameters of one paint stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilePaint {
    /// Texture image and variant (low byte)
    pub texture_bits: u8,
    /// Texture set / animation bank (high byte)
    pub upper_bits: u8,
    pub fx: TileFx,
    pub tile_type: u8,
    pub variant: TextureVariant,
    /// Change only the texture, keeping the geometry
    pub texture_only: bool,
    /// Carry the four corner heights over to the new shape
    pub preserve_heights: bool,
}

impl Default for TilePaint {
    fn default() -> Self {
        Self {
            texture_bits: 0,
            upper_bits: 0,
            fx: TileFx::NONE,
            tile_type: 0,
            variant: TextureVariant::Exact,
            texture_only: false,
            preserve_heights: true,
        }
    }
}

impl TilePaint {
    /// The 16-bit texture value before any variant is picked
    #[inline]
    pub fn combined_bits(&self) -> u16 {
        ((self.upper_bits as u16) << 8) | self.texture_bits as u16
    }

    /// Painting these bits would hide the tile
    #[inline]
    pub fn is_fanoff(&self) -> bool {
        self.combined_bits() == FANOFF
    }
}

/// Randomize the plain quad shapes so a cleared level does not show one
/// diagonal orientation everywhere
fn scatter_default_type(tile_type: u8, rng: &mut impl Rng) -> u8 {
    match tile_type {
        0 | 1 => rng.gen_range(0..=1),
        32 | 33 => rng.gen_range(32..=33),
        other => other,
    }
}

impl Mesh {
    /// Paint the tile at (x, y).
    ///
    /// Returns `Ok(false)` when nothing happened: the tile is outside the
    /// grid or the paint would turn it invisible. A full retype allocates the
    /// new vertex chain before releasing the old one, so allocation failure
    /// leaves the tile untouched. A texture-only paint of a fan-off tile is
    /// promoted to a full retype, since there is no geometry to texture.
    pub fn retype(&mut self, x: i32, y: i32, paint: &TilePaint, rng: &mut impl Rng) -> Result<bool, MeshError> {
        let Some(tile_id) = self.tile_index_at(x, y) else {
            return Ok(false);
        };
        if paint.is_fanoff() {
            warn!("retype: refusing to paint ({}, {}) with fan-off bits", x, y);
            return Ok(false);
        }

        let base = paint.combined_bits();
        let mut bits = paint.variant.apply(base, rng);
        if bits == FANOFF {
            bits = base;
        }

        let current = self.tiles[tile_id.index()];
        if paint.texture_only && !current.is_fanoff() {
            self.tiles[tile_id.index()].texture_bits = bits;
            return Ok(true);
        }
        if paint.texture_only {
            debug!("retype: ({}, {}) has no geometry, building type {}", x, y, paint.tile_type);
        }

        // ===== PHASE 1: GATHER =====
        let heights: Option<Vec<Option<f32>>> = (paint.preserve_heights && !current.is_fanoff()).then(|| {
            [CORNER_TL, CORNER_TR, CORNER_BR, CORNER_BL]
                .iter()
                .map(|&c| self.vertex_index_at(x, y, c).and_then(|id| self.vertex_position(id)).map(|p| p.z))
                .collect()
        });

        // ===== PHASE 2: ALLOCATE (fail early) =====
        let first = self.allocate_shape(paint.tile_type, Self::tile_origin(x as u32, y as u32))?;

        // ===== PHASE 3: COMMIT =====
        self.attach_chain(tile_id, first);
        let tile = &mut self.tiles[tile_id.index()];
        tile.tile_type = paint.tile_type;
        tile.texture_bits = bits;
        tile.fx = paint.fx;

        if let Some(heights) = heights {
            let ids: Vec<_> = self.tile_vertices(tile_id).take(heights.len()).collect();
            for (id, z) in ids.into_iter().zip(heights) {
                if let (Some(z), Some(vertex)) = (z, self.pool.vertex_mut(id)) {
                    vertex.position.z = z;
                }
            }
        }
        self.update_twist(tile_id);
        Ok(true)
    }

    /// Retype every tile to one texture and shape.
    ///
    /// Refused entirely for fan-off bits. Plain quad shapes (0/1 and 32/33)
    /// get a random orientation per tile. The whole grid is checked against
    /// the pool first, so an exhausted pool leaves every tile untouched.
    /// Returns the number of tiles painted.
    pub fn clear_all(&mut self, paint: &TilePaint, rng: &mut impl Rng) -> Result<usize, MeshError> {
        if paint.is_fanoff() {
            warn!("clear_all: refusing to clear the level to fan-off");
            return Ok(0);
        }

        // ===== PHASE 1: PICK SHAPES =====
        let types: Vec<u8> = (0..self.tiles.len())
            .map(|_| scatter_default_type(paint.tile_type, rng))
            .collect();

        // ===== PHASE 2: BUDGET (fail early) =====
        // Each tile holds its old chain while the new one is allocated
        let mut free = self.free_vertices();
        for (index, &tile_type) in types.iter().enumerate() {
            let needed = self.usable_vertex_count(tile_type)?;
            if needed > free {
                warn!(
                    "clear_all: pool exhausted at tile {} ({} needed, {} free); nothing changed",
                    index, needed, free
                );
                return Err(PoolError::Exhausted {
                    requested: needed,
                    available: free,
                }
                .into());
            }
            free = free - needed + self.tile_vertex_count(TileId(index as u32));
        }

        // ===== PHASE 3: COMMIT =====
        let mut painted = 0;
        for y in 0..self.tiles_y as i32 {
            for x in 0..self.tiles_x as i32 {
                let tile_paint = TilePaint {
                    tile_type: types[(y as u32 * self.tiles_x + x as u32) as usize],
                    texture_only: false,
                    preserve_heights: false,
                    ..*paint
                };
                if self.retype(x, y, &tile_paint, rng)? {
                    painted += 1;
                }
            }
        }
        debug!("clear_all: {} tiles painted", painted);
        Ok(painted)
    }

    /// Set `fx` on every drawn tile whose masked texture bits match
    pub fn set_fx_by_texture(&mut self, texture_bits: u16, mask: u16, fx: TileFx) -> usize {
        let wanted = texture_bits & mask;
        let mut changed = 0;
        for tile in self.tiles.iter_mut().filter(|t| !t.is_fanoff()) {
            if tile.texture_bits & mask == wanted {
                tile.fx = fx;
                changed += 1;
            }
        }
        debug!("set_fx_by_texture: {:#06x}/{:#06x} -> {:?} on {} tiles", texture_bits, mask, fx, changed);
        changed
    }

    /// Overwrite one tile's fx flags
    pub fn set_tile_fx(&mut self, x: i32, y: i32, fx: TileFx) -> bool {
        let Some(tile) = self.tile_index_at(x, y) else {
            return false;
        };
        self.tiles[tile.index()].fx = fx;
        true
    }

    /// Flip the given fx flags on one tile
    pub fn toggle_tile_fx(&mut self, x: i32, y: i32, flags: TileFx) -> bool {
        let Some(tile) = self.tile_index_at(x, y) else {
            return false;
        };
        self.tiles[tile.index()].fx ^= flags;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::TileDictionary;
    use glam::Vec3;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Arc;

    fn blank(x: u32, y: u32, capacity: usize) -> Mesh {
        Mesh::blank(Arc::new(TileDictionary::builtin()), capacity, x, y).unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0xC0FFEE)
    }

    #[test]
    fn test_variant_bits() {
        let mut rng = rng();
        assert_eq!(TextureVariant::Exact.apply(0x0123, &mut rng), 0x0123);
        for _ in 0..32 {
            let bits = TextureVariant::Quad.apply(0x0123, &mut rng);
            assert_eq!(bits & !0x3, 0x0120);
            let bits = TextureVariant::Octet.apply(0x01FF, &mut rng);
            assert_eq!(bits & !0x7, 0x01F8);
        }
    }

    #[test]
    fn test_retype_changes_shape_and_keeps_heights() {
        let mut mesh = blank(2, 2, 256);
        let tr = mesh.vertex_index_at(1, 0, CORNER_TR).unwrap();
        mesh.set_vertex_position(tr, Vec3::new(256.0, 0.0, 77.0));
        let free = mesh.free_vertices();

        let paint = TilePaint {
            texture_bits: 0x12,
            upper_bits: 0x01,
            fx: TileFx::WATER,
            tile_type: 5,
            ..TilePaint::default()
        };
        assert!(mesh.retype(1, 0, &paint, &mut rng()).unwrap());

        let tile = *mesh.tile(TileId(1)).unwrap();
        assert_eq!(tile.tile_type, 5);
        assert_eq!(tile.texture_bits, 0x0112);
        assert_eq!(tile.fx, TileFx::WATER);
        assert_eq!(mesh.tile_vertex_count(TileId(1)), 16);
        assert_eq!(mesh.free_vertices(), free - 12);

        let tr = mesh.vertex_index_at(1, 0, CORNER_TR).unwrap();
        assert_eq!(mesh.vertex_position(tr).unwrap(), Vec3::new(256.0, 0.0, 77.0));
        assert!(mesh.pool().validate_free_count().is_ok());
    }

    #[test]
    fn test_retype_without_preserve_resets_heights() {
        let mut mesh = blank(1, 1, 64);
        let tl = mesh.vertex_index_at(0, 0, CORNER_TL).unwrap();
        mesh.set_vertex_position(tl, Vec3::new(0.0, 0.0, 40.0));
        let paint = TilePaint {
            preserve_heights: false,
            ..TilePaint::default()
        };
        mesh.retype(0, 0, &paint, &mut rng()).unwrap();
        let tl = mesh.vertex_index_at(0, 0, CORNER_TL).unwrap();
        assert_eq!(mesh.vertex_position(tl).unwrap().z, 0.0);
    }

    #[test]
    fn test_retype_texture_only() {
        let mut mesh = blank(2, 1, 64);
        let before = mesh.tile(TileId(0)).unwrap().vrtstart();
        let paint = TilePaint {
            texture_bits: 0x22,
            tile_type: 5,
            texture_only: true,
            ..TilePaint::default()
        };
        assert!(mesh.retype(0, 0, &paint, &mut rng()).unwrap());
        let tile = mesh.tile(TileId(0)).unwrap();
        assert_eq!(tile.texture_bits, 0x22);
        assert_eq!(tile.tile_type, 0);
        assert_eq!(tile.vrtstart(), before);
    }

    #[test]
    fn test_texture_only_on_fanoff_is_promoted() {
        let mut mesh = blank(2, 1, 64);
        mesh.remove_tile(TileId(1));
        let paint = TilePaint {
            texture_bits: 0x22,
            texture_only: true,
            ..TilePaint::default()
        };
        assert!(mesh.retype(1, 0, &paint, &mut rng()).unwrap());
        assert_eq!(mesh.tile_vertices(TileId(1)).count(), 4);
    }

    #[test]
    fn test_retype_refuses_fanoff_and_out_of_grid() {
        let mut mesh = blank(2, 1, 64);
        let before = mesh.to_raw();
        let paint = TilePaint {
            texture_bits: 0xFF,
            upper_bits: 0xFF,
            ..TilePaint::default()
        };
        assert!(!mesh.retype(0, 0, &paint, &mut rng()).unwrap());
        assert!(!mesh.retype(5, 0, &TilePaint::default(), &mut rng()).unwrap());
        assert_eq!(mesh.clear_all(&paint, &mut rng()).unwrap(), 0);
        assert_eq!(mesh.to_raw(), before);
    }

    #[test]
    fn test_retype_failure_leaves_tile_intact() {
        // 2 tiles x 4 vertices leave 4 free; shape 5 needs 16
        let mut mesh = blank(2, 1, 12);
        let before = mesh.to_raw();
        let free = mesh.free_vertices();
        let paint = TilePaint {
            tile_type: 5,
            ..TilePaint::default()
        };
        let err = mesh.retype(0, 0, &paint, &mut rng()).unwrap_err();
        assert!(matches!(err, MeshError::Pool(_)));
        assert_eq!(mesh.free_vertices(), free);
        assert_eq!(mesh.to_raw(), before);
    }

    #[test]
    fn test_clear_all_scatters_quads() {
        let mut mesh = blank(8, 8, 1024);
        let paint = TilePaint {
            texture_bits: 0x05,
            fx: TileFx::NONE,
            ..TilePaint::default()
        };
        assert_eq!(mesh.clear_all(&paint, &mut rng()).unwrap(), 64);
        assert!(mesh.tiles().iter().all(|t| t.tile_type <= 1 && t.texture_bits == 0x05));
        assert!(mesh.tiles().iter().any(|t| t.tile_type == 0));
        assert!(mesh.tiles().iter().any(|t| t.tile_type == 1));
        assert_eq!(mesh.free_vertices(), 1024 - 256);
    }

    #[test]
    fn test_clear_all_pool_shortfall_changes_nothing() {
        // 2x2 quads use 16 of 40 slots; the first 16-vertex tile fits, the second does not
        let mut mesh = blank(2, 2, 40);
        let before = mesh.to_raw();
        let paint = TilePaint {
            tile_type: 5,
            ..TilePaint::default()
        };
        let err = mesh.clear_all(&paint, &mut rng()).unwrap_err();
        assert!(matches!(
            err,
            MeshError::Pool(PoolError::Exhausted {
                requested: 16,
                available: 12
            })
        ));
        assert_eq!(mesh.to_raw(), before);
        assert_eq!(mesh.free_vertices(), 24);
        assert!(mesh.tiles().iter().all(|t| t.tile_type == 0));
        assert!(mesh.pool().validate_free_count().is_ok());
    }

    #[test]
    fn test_fx_editing() {
        let mut mesh = blank(3, 1, 64);
        mesh.tiles[1].texture_bits = 0x0147;
        assert_eq!(mesh.set_fx_by_texture(0x0140, 0xFFF0, TileFx::DAMAGE), 1);
        assert_eq!(mesh.tile(TileId(1)).unwrap().fx, TileFx::DAMAGE);

        assert!(mesh.toggle_tile_fx(1, 0, TileFx::SLIPPY));
        assert_eq!(mesh.tile(TileId(1)).unwrap().fx, TileFx::DAMAGE | TileFx::SLIPPY);
        assert!(mesh.toggle_tile_fx(1, 0, TileFx::DAMAGE));
        assert_eq!(mesh.tile(TileId(1)).unwrap().fx, TileFx::SLIPPY);

        assert!(mesh.set_tile_fx(0, 0, TileFx::NONE));
        assert!(!mesh.set_tile_fx(3, 0, TileFx::NONE));
    }
}
