//! Tile shape dictionary.
//!
//! Maps a tile shape id to its vertex count, the normalized grid position of
//! every vertex and the wireframe line list. Shapes are normally loaded from
//! the module's shape definitions; [`TileDictionary::builtin`] provides the
//! standard set used by blank meshes and tests.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::{MAX_FAN_VERTICES, MAX_TILE_TYPES};

/// Errors that can occur while loading a dictionary
#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("Failed to parse tile dictionary: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Tile type {0} is out of range (max {max})", max = MAX_TILE_TYPES - 1)]
    TypeOutOfRange(u8),
}

/// One tile shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TileShape {
    /// Normalized (0..1) position of each vertex inside the tile footprint.
    /// The first four are the corners in TL, TR, BR, BL order.
    pub grid: Vec<Vec2>,
    /// Vertex index pairs of the wireframe schematic (renderer only)
    #[serde(default)]
    pub lines: Vec<[u8; 2]>,
}

impl TileShape {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.grid.len()
    }

    /// A shape the mesh can instantiate: at least the 4 corners and at most
    /// `MAX_FAN_VERTICES` vertices
    #[inline]
    pub fn is_valid(&self) -> bool {
        (4..=MAX_FAN_VERTICES).contains(&self.grid.len())
    }

    /// Build a shape from sub-grid cells (0..=3 on each axis)
    fn from_cells(cells: &[(u8, u8)]) -> Self {
        let grid = cells
            .iter()
            .map(|&(ix, iy)| Vec2::new(ix as f32 / 3.0, iy as f32 / 3.0))
            .collect();
        let lines = (0..cells.len().min(4))
            .map(|i| [i as u8, ((i + 1) % 4) as u8])
            .collect();
        Self { grid, lines }
    }
}

#[derive(Debug, Deserialize)]
struct ShapeEntry {
    tile_type: u8,
    #[serde(flatten)]
    shape: TileShape,
}

#[derive(Debug, Deserialize)]
struct DictionaryFile {
    shapes: Vec<ShapeEntry>,
}

/// Lookup table from tile shape id to shape
#[derive(Debug, Clone, PartialEq)]
pub struct TileDictionary {
    shapes: Vec<TileShape>,
}

impl Default for TileDictionary {
    fn default() -> Self {
        Self {
            shapes: vec![TileShape::default(); MAX_TILE_TYPES],
        }
    }
}

const CORNERS: [(u8, u8); 4] = [(0, 0), (3, 0), (3, 3), (0, 3)];
const EDGE_TOP: [(u8, u8); 2] = [(1, 0), (2, 0)];
const EDGE_RIGHT: [(u8, u8); 2] = [(3, 1), (3, 2)];
const EDGE_BOTTOM: [(u8, u8); 2] = [(2, 3), (1, 3)];
const EDGE_LEFT: [(u8, u8); 2] = [(0, 2), (0, 1)];
const INTERIOR: [(u8, u8); 4] = [(1, 1), (2, 1), (2, 2), (1, 2)];

impl TileDictionary {
    /// An empty dictionary (every shape undefined)
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard shape set.
    ///
    /// | id | shape |
    /// |----|-------|
    /// | 0, 1 | plain quad (two diagonals) |
    /// | 2 | quad split along the top edge |
    /// | 3 | quad split along the left edge |
    /// | 4 | all edges split |
    /// | 5 | full 4x4 sub-grid |
    /// | 6 | quad with an interior ring |
    ///
    /// Ids 32..=38 repeat the same geometry for big-texture tiles.
    pub fn builtin() -> Self {
        let quad: Vec<(u8, u8)> = CORNERS.to_vec();
        let top: Vec<(u8, u8)> = CORNERS.iter().chain(&EDGE_TOP).copied().collect();
        let left: Vec<(u8, u8)> = CORNERS.iter().chain(&EDGE_LEFT).copied().collect();
        let edges: Vec<(u8, u8)> = CORNERS
            .iter()
            .chain(&EDGE_TOP)
            .chain(&EDGE_RIGHT)
            .chain(&EDGE_BOTTOM)
            .chain(&EDGE_LEFT)
            .copied()
            .collect();
        let full: Vec<(u8, u8)> = edges.iter().chain(&INTERIOR).copied().collect();
        let ring: Vec<(u8, u8)> = CORNERS.iter().chain(&INTERIOR).copied().collect();

        let small = [&quad, &quad, &top, &left, &edges, &full, &ring];

        let mut dictionary = Self::new();
        for (id, cells) in small.iter().enumerate() {
            let shape = TileShape::from_cells(cells);
            dictionary.shapes[id] = shape.clone();
            dictionary.shapes[id + 32] = shape;
        }
        dictionary
    }

    /// Load shapes from JSON: `{ "shapes": [ { "tile_type": 0, "grid": [[0,0], ...], "lines": [[0,1], ...] } ] }`.
    ///
    /// Malformed shapes (no corners, too many vertices) are kept but logged;
    /// the mesh refuses to instantiate them.
    pub fn from_json_str(json: &str) -> Result<Self, DictionaryError> {
        let file: DictionaryFile = serde_json::from_str(json)?;
        let mut dictionary = Self::new();

        for entry in file.shapes {
            if entry.tile_type as usize >= MAX_TILE_TYPES {
                return Err(DictionaryError::TypeOutOfRange(entry.tile_type));
            }
            if !entry.shape.is_valid() {
                warn!(
                    "tile type {} has {} vertices (expected 4..={}); it will be skipped",
                    entry.tile_type,
                    entry.shape.vertex_count(),
                    MAX_FAN_VERTICES
                );
            }
            dictionary.shapes[entry.tile_type as usize] = entry.shape;
        }

        debug!("loaded tile dictionary with {} defined shapes", dictionary.defined_count());
        Ok(dictionary)
    }

    /// Replace one shape
    pub fn set_shape(&mut self, tile_type: u8, shape: TileShape) -> Result<(), DictionaryError> {
        let slot = self
            .shapes
            .get_mut(tile_type as usize)
            .ok_or(DictionaryError::TypeOutOfRange(tile_type))?;
        *slot = shape;
        Ok(())
    }

    #[inline]
    pub fn shape(&self, tile_type: u8) -> Option<&TileShape> {
        self.shapes.get(tile_type as usize)
    }

    /// Vertex count of a shape; 0 for undefined or out-of-range ids
    #[inline]
    pub fn vertex_count(&self, tile_type: u8) -> usize {
        self.shape(tile_type).map_or(0, TileShape::vertex_count)
    }

    /// Normalized grid position of one vertex of a shape
    #[inline]
    pub fn grid_offset(&self, tile_type: u8, vertex: usize) -> Option<Vec2> {
        self.shape(tile_type)?.grid.get(vertex).copied()
    }

    /// Number of shapes that can be instantiated
    pub fn defined_count(&self) -> usize {
        self.shapes.iter().filter(|s| s.is_valid()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_corner_order() {
        let dictionary = TileDictionary::builtin();
        for tile_type in [0u8, 1, 2, 5, 32, 38] {
            assert_eq!(dictionary.grid_offset(tile_type, 0), Some(Vec2::new(0.0, 0.0)));
            assert_eq!(dictionary.grid_offset(tile_type, 1), Some(Vec2::new(1.0, 0.0)));
            assert_eq!(dictionary.grid_offset(tile_type, 2), Some(Vec2::new(1.0, 1.0)));
            assert_eq!(dictionary.grid_offset(tile_type, 3), Some(Vec2::new(0.0, 1.0)));
        }
    }

    #[test]
    fn test_builtin_vertex_counts() {
        let dictionary = TileDictionary::builtin();
        assert_eq!(dictionary.vertex_count(0), 4);
        assert_eq!(dictionary.vertex_count(2), 6);
        assert_eq!(dictionary.vertex_count(4), 12);
        assert_eq!(dictionary.vertex_count(5), 16);
        assert_eq!(dictionary.vertex_count(6), 8);
        assert_eq!(dictionary.vertex_count(7), 0);
        assert_eq!(dictionary.vertex_count(200), 0);
        assert_eq!(dictionary.defined_count(), 14);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{ "shapes": [
            { "tile_type": 3, "grid": [[0,0],[1,0],[1,1],[0,1]], "lines": [[0,1],[1,2]] },
            { "tile_type": 9, "grid": [[0,0]] }
        ] }"#;
        let dictionary = TileDictionary::from_json_str(json).unwrap();
        assert_eq!(dictionary.vertex_count(3), 4);
        assert_eq!(dictionary.shape(3).unwrap().lines.len(), 2);
        assert!(!dictionary.shape(9).unwrap().is_valid());
        assert_eq!(dictionary.defined_count(), 1);
    }

    #[test]
    fn test_from_json_rejects_bad_type() {
        let json = r#"{ "shapes": [ { "tile_type": 64, "grid": [] } ] }"#;
        assert!(matches!(
            TileDictionary::from_json_str(json),
            Err(DictionaryError::TypeOutOfRange(64))
        ));
    }
}
