//! Ordered, duplicate-free vertex selection bound to one mesh.
//!
//! Every editing command takes its vertices from a `SelectionList`. The
//! list remembers which mesh layout it was filled against; operations
//! refuse lists bound to a different layout instead of touching vertex
//! slots that may have been repurposed.

use std::collections::HashSet;

use glam::Vec3;
use tracing::{debug, trace};

use cartman_config::DEFAULT_SELECTION_CAPACITY;

use crate::mesh::Mesh;
use crate::types::{MeshId, VertexId};

/// Which two axes a rectangle selection compares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectAxes {
    /// Top-down views: X and Y
    #[default]
    Xy,
    /// Side elevation view: X and Z
    Xz,
}

impl SelectAxes {
    #[inline]
    fn project(self, p: Vec3) -> (f32, f32) {
        match self {
            SelectAxes::Xy => (p.x, p.y),
            SelectAxes::Xz => (p.x, p.z),
        }
    }
}

/// Vertex selection
#[derive(Debug, Clone)]
pub struct SelectionList {
    mesh: MeshId,
    vertices: Vec<VertexId>,
    members: HashSet<VertexId>,
    capacity: usize,
}

impl SelectionList {
    /// Empty selection bound to `mesh` with the default capacity
    pub fn new(mesh: &Mesh) -> Self {
        Self::with_capacity(mesh, DEFAULT_SELECTION_CAPACITY)
    }

    pub fn with_capacity(mesh: &Mesh, capacity: usize) -> Self {
        Self {
            mesh: mesh.id(),
            vertices: Vec::new(),
            members: HashSet::new(),
            capacity,
        }
    }

    #[inline]
    pub fn is_bound_to(&self, mesh: &Mesh) -> bool {
        self.mesh == mesh.id()
    }

    /// Rebind to `mesh`, clearing the list if it belonged to another layout
    pub fn synch(&mut self, mesh: &Mesh) {
        if self.mesh != mesh.id() {
            debug!("selection rebound to new mesh, dropping {} vertices", self.vertices.len());
            self.clear();
            self.mesh = mesh.id();
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.vertices.len() >= self.capacity
    }

    /// The `i`-th selected vertex, in insertion order
    #[inline]
    pub fn at(&self, i: usize) -> Option<VertexId> {
        self.vertices.get(i).copied()
    }

    #[inline]
    pub fn contains(&self, vertex: VertexId) -> bool {
        self.members.contains(&vertex)
    }

    #[inline]
    pub fn as_slice(&self) -> &[VertexId] {
        &self.vertices
    }

    pub fn iter(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.iter().copied()
    }

    /// Insert a vertex. False if it was already selected or the list is full.
    pub fn add(&mut self, vertex: VertexId) -> bool {
        if self.is_full() {
            trace!("selection full at {}, ignoring {:?}", self.capacity, vertex);
            return false;
        }
        if !self.members.insert(vertex) {
            return false;
        }
        self.vertices.push(vertex);
        true
    }

    /// Remove a vertex, keeping the order of the rest
    pub fn remove(&mut self, vertex: VertexId) -> bool {
        if !self.members.remove(&vertex) {
            return false;
        }
        self.vertices.retain(|v| *v != vertex);
        true
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.members.clear();
    }

    /// Live vertices whose projected position lies in the inclusive box
    fn vertices_in_box(mesh: &Mesh, corner0: Vec3, corner1: Vec3, axes: SelectAxes) -> Vec<VertexId> {
        let (a0, b0) = axes.project(corner0);
        let (a1, b1) = axes.project(corner1);
        if a0 == a1 || b0 == b1 {
            return Vec::new();
        }
        let (amin, amax) = (a0.min(a1), a0.max(a1));
        let (bmin, bmax) = (b0.min(b1), b0.max(b1));

        mesh.live_vertex_ids()
            .into_iter()
            .filter(|id| {
                mesh.vertex_position(*id).is_some_and(|p| {
                    let (a, b) = axes.project(p);
                    a >= amin && a <= amax && b >= bmin && b <= bmax
                })
            })
            .collect()
    }

    /// Add every vertex inside the box spanned by two corners.
    ///
    /// A box with zero extent on either axis selects nothing. Returns the
    /// number of newly added vertices.
    pub fn add_rectangle(&mut self, mesh: &Mesh, corner0: Vec3, corner1: Vec3, axes: SelectAxes) -> usize {
        if !self.is_bound_to(mesh) {
            return 0;
        }
        Self::vertices_in_box(mesh, corner0, corner1, axes)
            .into_iter()
            .filter(|id| self.add(*id))
            .count()
    }

    /// Remove every vertex inside the box spanned by two corners
    pub fn remove_rectangle(&mut self, mesh: &Mesh, corner0: Vec3, corner1: Vec3, axes: SelectAxes) -> usize {
        if !self.is_bound_to(mesh) {
            return 0;
        }
        Self::vertices_in_box(mesh, corner0, corner1, axes)
            .into_iter()
            .filter(|id| self.remove(*id))
            .count()
    }

    /// Add all vertices of the tile at (x, y)
    pub fn add_tile(&mut self, mesh: &Mesh, x: i32, y: i32) -> usize {
        let Some(tile) = mesh.tile_index_at(x, y) else {
            return 0;
        };
        if !self.is_bound_to(mesh) {
            return 0;
        }
        mesh.tile_vertices(tile).filter(|id| self.add(*id)).count()
    }

    /// Add every live vertex sharing a planar position with a selected one
    pub fn add_connected(&mut self, mesh: &Mesh) -> usize {
        if !self.is_bound_to(mesh) || self.is_empty() {
            return 0;
        }
        let anchors: Vec<(f32, f32)> = self
            .vertices
            .iter()
            .filter_map(|id| mesh.vertex_position(*id))
            .map(|p| (p.x, p.y))
            .collect();

        mesh.live_vertex_ids()
            .into_iter()
            .filter(|id| {
                mesh.vertex_position(*id)
                    .is_some_and(|p| anchors.iter().any(|&(x, y)| p.x == x && p.y == y))
            })
            .filter(|id| self.add(*id))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::TileDictionary;
    use std::sync::Arc;

    fn blank(x: u32, y: u32) -> Mesh {
        Mesh::blank(Arc::new(TileDictionary::builtin()), 4096, x, y).unwrap()
    }

    #[test]
    fn test_add_remove_contains() {
        let mesh = blank(1, 1);
        let mut selection = SelectionList::new(&mesh);
        assert!(selection.add(VertexId(3)));
        assert!(!selection.add(VertexId(3)));
        assert!(selection.add(VertexId(1)));
        assert_eq!(selection.count(), 2);
        assert_eq!(selection.at(0), Some(VertexId(3)));
        assert_eq!(selection.at(2), None);

        assert!(selection.remove(VertexId(3)));
        assert!(!selection.remove(VertexId(3)));
        assert!(!selection.contains(VertexId(3)));
        assert_eq!(selection.at(0), Some(VertexId(1)));
    }

    #[test]
    fn test_capacity_truncates() {
        let mesh = blank(1, 1);
        let mut selection = SelectionList::with_capacity(&mesh, 2);
        assert!(selection.add(VertexId(0)));
        assert!(selection.add(VertexId(1)));
        assert!(!selection.add(VertexId(2)));
        assert_eq!(selection.count(), 2);
    }

    #[test]
    fn test_rectangle_selects_inclusive() {
        let mesh = blank(2, 2);
        let mut selection = SelectionList::new(&mesh);
        let added = selection.add_rectangle(
            &mesh,
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(128.0, 128.0, 0.0),
            SelectAxes::Xy,
        );
        // Tile (0,0) fully, plus the shared edge/center copies of the others
        assert_eq!(added, 4 + 2 + 2 + 1);
    }

    #[test]
    fn test_degenerate_rectangle_is_noop() {
        let mesh = blank(2, 2);
        let mut selection = SelectionList::new(&mesh);
        let added = selection.add_rectangle(
            &mesh,
            Vec3::new(10.0, 10.0, 0.0),
            Vec3::new(10.0, 500.0, 0.0),
            SelectAxes::Xy,
        );
        assert_eq!(added, 0);
        // Flat mesh: zero extent on Z in the side view
        let added = selection.add_rectangle(
            &mesh,
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(256.0, 0.0, 0.0),
            SelectAxes::Xz,
        );
        assert_eq!(added, 0);
    }

    #[test]
    fn test_rectangle_inverse() {
        let mesh = blank(3, 3);
        let mut selection = SelectionList::new(&mesh);
        selection.add(VertexId(1000));
        let before: Vec<_> = selection.iter().collect();

        let c0 = Vec3::new(100.0, 100.0, -1.0);
        let c1 = Vec3::new(300.0, 260.0, 1.0);
        assert!(selection.add_rectangle(&mesh, c0, c1, SelectAxes::Xy) > 0);
        selection.remove_rectangle(&mesh, c0, c1, SelectAxes::Xy);
        assert_eq!(selection.iter().collect::<Vec<_>>(), before);
    }

    #[test]
    fn test_side_view_rectangle() {
        let mut mesh = blank(2, 1);
        let id = mesh.vertex_index_at(0, 0, 0).unwrap();
        mesh.set_vertex_position(id, Vec3::new(0.0, 0.0, 300.0));
        let mut selection = SelectionList::new(&mesh);
        let added = selection.add_rectangle(
            &mesh,
            Vec3::new(-10.0, 0.0, 200.0),
            Vec3::new(10.0, 0.0, 400.0),
            SelectAxes::Xz,
        );
        assert_eq!(added, 1);
        assert!(selection.contains(id));
    }

    #[test]
    fn test_add_connected() {
        let mesh = blank(2, 2);
        let mut selection = SelectionList::new(&mesh);
        selection.add(mesh.vertex_index_at(0, 0, 2).unwrap());
        assert_eq!(selection.add_connected(&mesh), 3);
        assert_eq!(selection.count(), 4);
    }

    #[test]
    fn test_synch_clears_on_new_mesh() {
        let mesh = blank(1, 1);
        let other = blank(1, 1);
        let mut selection = SelectionList::new(&mesh);
        selection.add_tile(&mesh, 0, 0);
        assert_eq!(selection.count(), 4);
        assert!(!selection.is_bound_to(&other));
        assert_eq!(selection.add_tile(&other, 0, 0), 0);

        selection.synch(&other);
        assert!(selection.is_empty());
        assert!(selection.is_bound_to(&other));
    }
}
