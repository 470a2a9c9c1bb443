//! Height and position editing: moving, raising, jittering and flattening.

use glam::{Vec2, Vec3};
use rand::Rng;
use tracing::{debug, warn};

use crate::mesh::Mesh;
use crate::selection::SelectionList;
use crate::types::VertexId;
use crate::viewport::{ViewKind, Viewport};

/// Vertices within this height of the flatten target snap onto it
pub const FLATTEN_TOLERANCE: f32 = 50.0;

/// Largest random offset of the jitter tools, per axis
pub const JITTER_XY: i32 = 3;
pub const JITTER_Z: i32 = 8;

impl Mesh {
    /// Offset one vertex, clamping each axis into the mesh bounds.
    ///
    /// Free slots are left alone.
    pub fn move_vertex(&mut self, id: VertexId, delta: Vec3) -> bool {
        let bounds = self.bounds();
        match self.pool.vertex_mut(id) {
            Some(vertex) if !vertex.is_unused() => {
                vertex.position = (vertex.position + delta).clamp(Vec3::ZERO, bounds);
                true
            }
            _ => false,
        }
    }

    /// Move a selection rigidly.
    ///
    /// The delta is first reduced so that no member would leave the bounds,
    /// then applied to every member with a per-vertex clamp on top. Returns
    /// the delta actually applied.
    pub fn move_selection(&mut self, selection: &SelectionList, delta: Vec3) -> Vec3 {
        if !selection.is_bound_to(self) {
            warn!("move_selection: selection is bound to a different mesh, ignoring");
            return Vec3::ZERO;
        }

        // ===== PHASE 1: CLAMP THE DELTA =====
        let bounds = self.bounds();
        let mut applied = delta;
        for id in selection.iter() {
            if !self.pool.is_live(id) {
                continue;
            }
            let Some(p) = self.vertex_position(id) else {
                continue;
            };
            for axis in 0..3 {
                if applied[axis] > 0.0 {
                    applied[axis] = applied[axis].min((bounds[axis] - p[axis]).max(0.0));
                } else if applied[axis] < 0.0 {
                    applied[axis] = applied[axis].max((-p[axis]).min(0.0));
                }
            }
        }

        // ===== PHASE 2: APPLY =====
        for id in selection.iter() {
            self.move_vertex(id, applied);
        }
        applied
    }

    /// Raise (positive `amount`) or lower the vertices around a point.
    ///
    /// Strength falls off linearly from `|amount|` at the center to zero at
    /// `brush_size`, so a bigger brush gives a gentler slope.
    pub fn raise_around_point(&mut self, ids: &[VertexId], center: Vec2, amount: f32, brush_size: f32) -> usize {
        if brush_size <= 0.0 || amount == 0.0 {
            return 0;
        }
        let mut moved = 0;
        for &id in ids {
            let Some(p) = self.vertex_position(id) else {
                continue;
            };
            let distance = p.truncate().distance(center);
            let strength = amount.abs() * (1.0 - distance / brush_size).max(0.0);
            if strength <= 0.0 {
                continue;
            }
            if self.move_vertex(id, Vec3::Z * strength.copysign(amount)) {
                moved += 1;
            }
        }
        moved
    }

    fn jitter_vertex(&mut self, id: VertexId, rng: &mut impl Rng) -> bool {
        let offset = Vec3::new(
            rng.gen_range(-JITTER_XY..=JITTER_XY) as f32,
            rng.gen_range(-JITTER_XY..=JITTER_XY) as f32,
            rng.gen_range(-JITTER_Z..=JITTER_Z) as f32,
        );
        self.move_vertex(id, offset)
    }

    /// Roughen every live vertex with small random offsets
    pub fn jitter_mesh(&mut self, rng: &mut impl Rng) -> usize {
        let moved = self
            .live_vertex_ids()
            .into_iter()
            .filter(|id| self.jitter_vertex(*id, rng))
            .count();
        self.fix_twist();
        debug!("jitter_mesh: {} vertices", moved);
        moved
    }

    /// Roughen the selected vertices
    pub fn jitter_selection(&mut self, selection: &SelectionList, rng: &mut impl Rng) -> usize {
        if !selection.is_bound_to(self) {
            warn!("jitter_selection: selection is bound to a different mesh, ignoring");
            return 0;
        }
        selection.iter().filter(|id| self.jitter_vertex(*id, rng)).count()
    }

    /// Snap every vertex within `FLATTEN_TOLERANCE` of `height` onto it
    pub fn flatten_to_height(&mut self, height: f32) -> usize {
        let height = height.clamp(0.0, self.edge_z);
        let mut snapped = 0;
        for id in self.live_vertex_ids() {
            if let Some(vertex) = self.pool.vertex_mut(id) {
                if (vertex.position.z - height).abs() <= FLATTEN_TOLERANCE {
                    vertex.position.z = height;
                    snapped += 1;
                }
            }
        }
        self.fix_twist();
        debug!("flatten_to_height: {} vertices snapped to {}", snapped, height);
        snapped
    }

    /// Flatten at the height under a screen row of the side view
    pub fn flatten_below(&mut self, viewport: &Viewport, screen_y: f32) -> usize {
        if viewport.kind != ViewKind::Side {
            debug!("flatten_below: {:?} view has no height axis", viewport.kind);
            return 0;
        }
        self.flatten_to_height(viewport.height_at_screen_y(screen_y))
    }

    /// Set every vertex height to zero
    pub fn level_all_to_zero(&mut self) -> usize {
        let ids = self.live_vertex_ids();
        for id in &ids {
            if let Some(vertex) = self.pool.vertex_mut(*id) {
                vertex.position.z = 0.0;
            }
        }
        self.fix_twist();
        ids.len()
    }
}
