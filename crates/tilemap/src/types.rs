//! Core identifiers and per-element records shared by every module.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, BitXorAssign, Not};
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::{BIG_TILE_TYPE_START, CHAINEND, FANOFF, TWIST_FLAT, VERTEX_UNUSED};

/// Type-safe vertex arena index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub u32);

impl VertexId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Type-safe tile grid index (row-major)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub u32);

impl TileId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identity of one mesh layout.
///
/// A fresh id is issued whenever vertex indices get repurposed wholesale
/// (new mesh, blank grid, load), so selections can detect that they are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(u64);

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(1);

impl MeshId {
    pub(crate) fn next() -> Self {
        Self(NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// One mesh corner point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    /// Baked brightness; `VERTEX_UNUSED` marks a free slot
    pub ambient: u8,
    /// Next vertex in the owning tile's chain, or `CHAINEND`
    pub(crate) next: u32,
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            ambient: VERTEX_UNUSED,
            next: CHAINEND,
        }
    }
}

impl Vertex {
    #[inline]
    pub fn is_unused(&self) -> bool {
        self.ambient == VERTEX_UNUSED
    }

    /// Next vertex in the chain, if any
    #[inline]
    pub fn next(&self) -> Option<VertexId> {
        (self.next != CHAINEND).then_some(VertexId(self.next))
    }
}

/// Per-tile gameplay and render flags
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileFx(pub u8);

impl TileFx {
    pub const NONE: Self = Self(0x00);
    /// Reflective; drawn in the first pass
    pub const SHA: Self = Self(0x01);
    /// Draws reflections of characters
    pub const DRAWREF: Self = Self(0x02);
    /// Four-frame animated texture
    pub const ANIM: Self = Self(0x04);
    /// Water surface rendered above the tile
    pub const WATER: Self = Self(0x08);
    /// Wall: blocks walkers, passable by ghosts and particles
    pub const WALL: Self = Self(0x10);
    pub const IMPASS: Self = Self(0x20);
    pub const DAMAGE: Self = Self(0x40);
    pub const SLIPPY: Self = Self(0x80);

    /// Flags of a freshly removed or blank tile
    pub const DEFAULT_WALL: Self = Self(0x10 | 0x20);

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// True for tiles that block walkers (wall or impassable)
    #[inline]
    pub fn is_barrier(self) -> bool {
        self.intersects(Self::DEFAULT_WALL)
    }
}

impl fmt::Debug for TileFx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TileFx({:#04x})", self.0)
    }
}

impl BitOr for TileFx {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TileFx {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for TileFx {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitXorAssign for TileFx {
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

impl Not for TileFx {
    type Output = Self;
    fn not(self) -> Self {
        Self(!self.0)
    }
}

/// One grid cell of the mesh (a "fan")
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    /// Shape id into the tile dictionary
    pub tile_type: u8,
    /// Texture image, variant and bank; `FANOFF` means no geometry
    pub texture_bits: u16,
    pub fx: TileFx,
    /// Slope code derived from the corner heights
    pub twist: u8,
    pub(crate) vrtstart: u32,
}

impl Default for Tile {
    fn default() -> Self {
        Self {
            tile_type: 0,
            texture_bits: FANOFF,
            fx: TileFx::DEFAULT_WALL,
            twist: TWIST_FLAT,
            vrtstart: CHAINEND,
        }
    }
}

impl Tile {
    #[inline]
    pub fn is_fanoff(&self) -> bool {
        self.texture_bits == FANOFF
    }

    /// Shapes in the upper half of the id range use the big texture scale
    #[inline]
    pub fn is_big(&self) -> bool {
        self.tile_type >= BIG_TILE_TYPE_START
    }

    /// First vertex of the chain; `None` for tiles without geometry
    #[inline]
    pub fn vrtstart(&self) -> Option<VertexId> {
        if self.is_fanoff() || self.vrtstart == CHAINEND {
            None
        } else {
            Some(VertexId(self.vrtstart))
        }
    }
}
