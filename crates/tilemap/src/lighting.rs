//! Baked per-vertex ambient lighting.
//!
//! The ambient value of a vertex combines a directional term (how much the
//! vertex sits above the terrain just south-east of it) with linear-falloff
//! point lights, plus a global ambient floor. Lights are an editing aid only;
//! they are not stored with the mesh.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use cartman_config::{DEFAULT_LIGHT_CAPACITY, LightingConfig};

use crate::constants::{MAX_AMBIENT_LEVEL, VERTEX_FRESH, VERTEX_UNUSED};
use crate::mesh::Mesh;
use crate::types::VertexId;

/// Probe offsets for the directional term
const PROBES: [Vec2; 3] = [Vec2::new(64.0, 0.0), Vec2::new(0.0, 64.0), Vec2::new(46.0, 46.0)];

/// Lowest vertex height the directional term sees
const MIN_PROBE_Z: f32 = -128.0;

/// Lowest probe sum the directional term sees
const MIN_PROBE_SUM: f32 = -384.0;

/// A point light used for baking
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub x: f32,
    pub y: f32,
    /// Distance at which the contribution reaches zero
    pub radius: f32,
    /// Contribution at the light's center
    pub level: f32,
}

impl Light {
    pub fn new(x: f32, y: f32, radius: f32, level: f32) -> Self {
        Self {
            x,
            y,
            radius: if radius > 0.0 { radius } else { 1.0 },
            level: level.clamp(0.0, MAX_AMBIENT_LEVEL as f32),
        }
    }

    /// Contribution at planar distance `distance`
    #[inline]
    pub fn contribution(&self, distance: f32) -> f32 {
        if distance >= self.radius {
            return 0.0;
        }
        self.level * (self.radius - distance) / self.radius
    }
}

/// Bounded list of placed lights
#[derive(Debug, Clone, PartialEq)]
pub struct LightList {
    lights: Vec<Light>,
    capacity: usize,
}

impl Default for LightList {
    fn default() -> Self {
        Self::new(DEFAULT_LIGHT_CAPACITY)
    }
}

impl LightList {
    pub fn new(capacity: usize) -> Self {
        Self {
            lights: Vec::new(),
            capacity,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn as_slice(&self) -> &[Light] {
        &self.lights
    }

    pub fn iter(&self) -> impl Iterator<Item = &Light> {
        self.lights.iter()
    }

    /// Append a light. False when the list is full.
    pub fn place(&mut self, light: Light) -> bool {
        if self.lights.len() >= self.capacity {
            return false;
        }
        self.lights.push(light);
        true
    }

    /// Replace the most recently placed light (the light being dragged).
    /// Places it when the list is empty.
    pub fn alter_last(&mut self, light: Light) -> bool {
        match self.lights.last_mut() {
            Some(last) => {
                *last = light;
                true
            }
            None => self.place(light),
        }
    }

    pub fn clear(&mut self) {
        self.lights.clear();
    }
}

/// Baked ambient of one vertex.
///
/// Returns `VERTEX_UNUSED` for free slots and for slots no tile chain
/// reaches (scratch vertices, broken chains); otherwise a value in `1..=255`.
pub fn vertex_ambient(mesh: &Mesh, lights: &[Light], config: &LightingConfig, id: VertexId) -> u8 {
    match mesh.vertex(id) {
        Some(vertex) if !vertex.is_unused() && mesh.is_reachable(id) => bake(mesh, lights, config, vertex.position),
        _ => VERTEX_UNUSED,
    }
}

fn bake(mesh: &Mesh, lights: &[Light], config: &LightingConfig, p: Vec3) -> u8 {
    let planar = p.truncate();

    let probe_sum: f32 = PROBES
        .iter()
        .map(|offset| {
            let q = planar + *offset;
            mesh.elevation_at(q.x, q.y)
        })
        .sum();
    let delta_z = 3.0 * p.z.max(MIN_PROBE_Z) - probe_sum.max(MIN_PROBE_SUM);
    let directional = delta_z * config.directional as f32 / 256.0;

    let point: f32 = lights
        .iter()
        .map(|light| light.contribution(planar.distance(Vec2::new(light.x, light.y))))
        .sum();

    let total = (directional + point).max(-(config.ambient_cut as f32)) + config.global_ambient as f32;
    total.round().clamp(VERTEX_FRESH as f32, MAX_AMBIENT_LEVEL as f32) as u8
}

/// Rebake every live vertex, in row-major tile order
pub fn recompute_mesh(mesh: &mut Mesh, lights: &[Light], config: &LightingConfig) -> usize {
    // ===== PHASE 1: COMPUTE =====
    let view: &Mesh = mesh;
    // Ids come from the tile chains, so only the unused check applies
    let baked: Vec<(VertexId, u8)> = view
        .live_vertex_ids()
        .into_iter()
        .map(|id| {
            let ambient = match view.vertex(id) {
                Some(vertex) if !vertex.is_unused() => bake(view, lights, config, vertex.position),
                _ => VERTEX_UNUSED,
            };
            (id, ambient)
        })
        .collect();

    // ===== PHASE 2: WRITE =====
    for &(id, ambient) in &baked {
        if ambient == VERTEX_UNUSED {
            continue;
        }
        if let Some(vertex) = mesh.pool.vertex_mut(id) {
            vertex.ambient = ambient;
        }
    }
    debug!(
        "recompute_mesh: {} vertices, {} lights, ambient {} cut {} directional {}",
        baked.len(),
        lights.len(),
        config.global_ambient,
        config.ambient_cut,
        config.directional
    );
    baked.len()
}
