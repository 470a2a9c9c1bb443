//! Cartman tile mesh core - terrain model and editing algorithms
//!
//! This crate provides the data model and editing operations of the level editor:
//! - [`pool::VertexPool`] - Fixed arena of vertices handed out as tile chains
//! - [`dictionary::TileDictionary`] - Tile shape lookup (vertex count and grid offsets)
//! - [`mesh::Mesh`] - The tile grid, lookups, geometry queries and raw array conversion
//! - [`selection::SelectionList`] - Vertex selection used by every editing command
//! - [`stitch`] - Welding and wall smoothing that keep adjacent tiles seamless
//! - [`edit`] - Terrain, texture, fx and auto-tile editing operations
//! - [`lighting`] - Baked per-vertex ambient from a directional term and point lights
//! - [`viewport`] - The four editor view kinds and their screen/world mapping
//! - [`session`] - `EditorSession`, the command surface driven by `cartman-ipc`

pub mod constants;
pub mod dictionary;
pub mod edit;
pub mod lighting;
pub mod mesh;
pub mod pool;
pub mod selection;
pub mod session;
pub mod stitch;
pub mod types;
pub mod viewport;

pub use constants::*;
pub use dictionary::*;
pub use edit::*;
pub use lighting::*;
pub use mesh::*;
pub use pool::*;
pub use selection::*;
pub use session::*;
pub use types::*;
pub use viewport::*;
