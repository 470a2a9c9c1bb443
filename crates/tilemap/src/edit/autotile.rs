//! Automatic edge trimming of textured regions.
//!
//! Every tile of a texture group looks at its 8 neighbors and gets a trim
//! code ORed into its low texture bits that selects the matching edge,
//! outer corner or inner corner image of the atlas.

use rand::Rng;
use tracing::debug;

use crate::mesh::Mesh;

/// Texture mask that selects the wall trim table
pub const WALL_TRIM_MASK: u16 = 0xC0;

/// Under the wall mask, neighbors at or above this value already look like
/// wall and never form an edge
const WALL_LIKE_BITS: u16 = 0x30;

const N: u8 = 1;
const E: u8 = 2;
const S: u8 = 4;
const W: u8 = 8;
const NE: u8 = 16;
const SE: u8 = 32;
const SW: u8 = 64;
const NW: u8 = 128;

/// Outer corners, checked before single edges: (edges, general code, wall code)
const OUTER: [(u8, u16, u16); 4] = [(N | E, 5, 24), (E | S, 6, 25), (S | W, 7, 26), (W | N, 8, 27)];

/// Single edges: (edge, general code, first of two wall codes)
const EDGES: [(u8, u16, u16); 4] = [(N, 1, 16), (E, 2, 18), (S, 3, 20), (W, 4, 22)];

/// Inner corners, only when no edge differs: (diagonal, general code, wall code)
const INNER: [(u8, u16, u16); 4] = [(NE, 9, 28), (SE, 10, 29), (SW, 11, 30), (NW, 12, 31)];

/// Trim code for a set of differing-neighbor bits; `None` for a tile
/// surrounded by its own group
fn trim_code(diff: u8, wall: bool, rng: &mut impl Rng) -> Option<u16> {
    let pick = |general: u16, wall_code: u16| if wall { wall_code } else { general };

    if let Some(&(_, g, w)) = OUTER.iter().find(|(bits, _, _)| diff & bits == *bits) {
        return Some(pick(g, w));
    }
    if let Some(&(_, g, w)) = EDGES.iter().find(|(bit, _, _)| diff & bit != 0) {
        return Some(if wall { w + rng.gen_range(0..=1) } else { g });
    }
    INNER
        .iter()
        .find(|(bit, _, _)| diff & bit != 0)
        .map(|&(_, g, w)| pick(g, w))
}

impl Mesh {
    /// Differing-neighbor bits of the tile at (x, y) against a snapshot of
    /// all texture bits
    fn trim_neighbors(&self, snapshot: &[u16], x: i32, y: i32, wanted: u16, mask: u16) -> u8 {
        let differs = |dx: i32, dy: i32| -> bool {
            let Some(id) = self.tile_index_at(x + dx, y + dy) else {
                return false;
            };
            let bits = snapshot[id.index()];
            if mask == WALL_TRIM_MASK && bits >= WALL_LIKE_BITS {
                return false;
            }
            bits & mask != wanted
        };

        let mut diff = 0;
        for (bit, dx, dy) in [(N, 0, -1), (E, 1, 0), (S, 0, 1), (W, -1, 0)] {
            if differs(dx, dy) {
                diff |= bit;
            }
        }
        for (bit, sides, dx, dy) in [(NE, N | E, 1, -1), (SE, S | E, 1, 1), (SW, S | W, -1, 1), (NW, N | W, -1, -1)] {
            if diff & sides == 0 && differs(dx, dy) {
                diff |= bit;
            }
        }
        diff
    }

    /// Auto-trim every drawn tile whose masked texture matches.
    ///
    /// The trim code replaces the bits outside `mask` in the low byte; a
    /// tile with no differing neighbor is reset to its untrimmed texture.
    /// Returns the number of tiles visited.
    pub fn trim_auto_tile(&mut self, texture_bits: u16, mask: u16, rng: &mut impl Rng) -> usize {
        let wanted = texture_bits & mask;
        let wall = mask == WALL_TRIM_MASK;
        let snapshot: Vec<u16> = self.tiles.iter().map(|t| t.texture_bits).collect();
        let keep = mask | 0xFF00;
        let mut trimmed = 0;

        for y in 0..self.tiles_y as i32 {
            for x in 0..self.tiles_x as i32 {
                let Some(id) = self.tile_index_at(x, y) else {
                    continue;
                };
                let tile = self.tiles[id.index()];
                if tile.is_fanoff() || tile.texture_bits & mask != wanted {
                    continue;
                }
                let diff = self.trim_neighbors(&snapshot, x, y, wanted, mask);
                let code = trim_code(diff, wall, rng).unwrap_or(0);
                self.tiles[id.index()].texture_bits = (tile.texture_bits & keep) | code;
                trimmed += 1;
            }
        }
        debug!("trim_auto_tile: {:#06x}/{:#06x} on {} tiles", texture_bits, mask, trimmed);
        trimmed
    }
}
