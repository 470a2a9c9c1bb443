//! Stitching passes that keep adjacent tiles seamless.
//!
//! Neighboring tiles never share vertex slots; each keeps its own copy of
//! the shared corners and edge points. These passes force those copies to
//! one averaged position:
//! - [`Mesh::weld`] / [`Mesh::weld_vertices`] - average a set of vertices
//! - [`Mesh::weld_corner`] / [`Mesh::fix_corners`] - seal the 4-way corner points
//! - [`Mesh::fix_edge_vertices`] / [`Mesh::fix_mesh`] - seal mid-edge points,
//!   even between tiles of different subdivision
//! - [`Mesh::smooth_wall_barrier`] / [`Mesh::fix_walls`] - taper wall heights
//!   down to the floor around them

mod edges;
mod walls;
mod weld;

pub use edges::EDGE_TOLERANCE;
