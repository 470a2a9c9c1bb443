//! Editing operations on the mesh.
//!
//! - [`terrain`] - moving, raising, jittering and flattening vertices
//! - [`paint`] - retyping tiles, clearing the level and fx flags
//! - [`autotile`] - automatic edge trim of texture groups
//!
//! Out-of-grid coordinates are silent no-ops. Randomized operations take
//! the caller's RNG so results are reproducible from a seed.

pub mod autotile;
pub mod paint;
pub mod terrain;

pub use autotile::WALL_TRIM_MASK;
pub use paint::{TextureVariant, TilePaint};
pub use terrain::{FLATTEN_TOLERANCE, JITTER_XY, JITTER_Z};
