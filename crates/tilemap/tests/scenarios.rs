//! End-to-end editing scenarios and whole-mesh invariants.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cartman_config::LightingConfig;
use tilemap::{
    CORNER_BL, CORNER_BR, CORNER_TL, CORNER_TR, FANOFF, Light, LightList, Mesh, PoolError, SelectAxes,
    SelectionList, TileDictionary, TileId, TilePaint, VERTEX_FRESH, VERTEX_UNUSED, VertexId, VertexPool,
    recompute_mesh, vertex_ambient,
};

fn blank(tiles_x: u32, tiles_y: u32) -> Mesh {
    Mesh::blank(Arc::new(TileDictionary::builtin()), 16_384, tiles_x, tiles_y).unwrap()
}

fn position(mesh: &Mesh, x: i32, y: i32, corner: usize) -> Vec3 {
    let id = mesh.vertex_index_at(x, y, corner).unwrap();
    mesh.vertex_position(id).unwrap()
}

fn live_ambients(mesh: &Mesh) -> Vec<u8> {
    mesh.live_vertex_ids()
        .into_iter()
        .map(|id| mesh.vertex(id).unwrap().ambient)
        .collect()
}

#[test]
fn scenario_blank_grid_lookup() {
    let mesh = blank(4, 4);
    assert_eq!(mesh.tile_index_at(2, 2), Some(TileId(10)));
    assert_eq!(mesh.fanstart()[2], 8);
    assert_eq!(mesh.tile_index_at(4, 0), None);
    assert_eq!(mesh.tile_index_at(-1, 2), None);
}

#[test]
fn scenario_instantiate_quad_tile() {
    let mut mesh = blank(4, 4);
    let tile = mesh.tile_index_at(1, 1).unwrap();
    mesh.instantiate_tile(tile, Vec2::new(128.0, 128.0)).unwrap();

    let vertices: Vec<_> = mesh.tile_vertices(tile).map(|id| *mesh.vertex(id).unwrap()).collect();
    assert_eq!(vertices.len(), 4);
    let expected = [(128.0, 128.0), (256.0, 128.0), (256.0, 256.0), (128.0, 256.0)];
    for (vertex, (x, y)) in vertices.iter().zip(expected) {
        assert_eq!(vertex.position, Vec3::new(x, y, 0.0));
        assert_eq!(vertex.ambient, VERTEX_FRESH);
    }
}

#[test]
fn scenario_adjacent_corner_weld() {
    let mut mesh = blank(4, 4);
    for (x, y) in [(1, 1), (2, 1)] {
        let tile = mesh.tile_index_at(x, y).unwrap();
        mesh.instantiate_tile(tile, Mesh::tile_origin(x as u32, y as u32)).unwrap();
    }
    let tr = mesh.vertex_index_at(1, 1, CORNER_TR).unwrap();
    mesh.set_vertex_position(tr, Vec3::new(256.0, 128.0, 10.0));
    let tl = mesh.vertex_index_at(2, 1, CORNER_TL).unwrap();
    mesh.set_vertex_position(tl, Vec3::new(258.0, 128.0, 30.0));

    mesh.weld_corner(1, 1);
    mesh.weld_corner(2, 1);

    assert_eq!(position(&mesh, 1, 1, CORNER_TR), position(&mesh, 2, 1, CORNER_TL));
    assert_eq!(position(&mesh, 1, 1, CORNER_BR), position(&mesh, 2, 1, CORNER_BL));
    // The shared corner also meets the row above
    assert_eq!(position(&mesh, 1, 1, CORNER_TR), position(&mesh, 1, 0, CORNER_BR));
}

#[test]
fn scenario_light_drag_golden_value() {
    let mut mesh = blank(2, 2);
    let id = mesh.vertex_index_at(0, 0, CORNER_TL).unwrap();
    mesh.set_vertex_position(id, Vec3::new(50.0, 0.0, 0.0));

    let mut lights = LightList::default();
    lights.place(Light::new(0.0, 0.0, 200.0, 200.0));
    lights.alter_last(Light::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(lights.len(), 1);

    // Flat ground: no directional term; 100 * (100 - 50) / 100 + 22
    let config = LightingConfig::default();
    assert_eq!(vertex_ambient(&mesh, lights.as_slice(), &config, id), 72);
}

#[test]
fn scenario_fanoff_paint_is_refused() {
    let mut mesh = blank(3, 3);
    let before = mesh.to_raw();
    let paint = TilePaint {
        texture_bits: 0xFF,
        upper_bits: 0xFF,
        ..Default::default()
    };
    assert_eq!(paint.combined_bits(), FANOFF);

    let mut rng = StdRng::seed_from_u64(5);
    assert!(!mesh.retype(1, 1, &paint, &mut rng).unwrap());
    assert_eq!(mesh.clear_all(&paint, &mut rng).unwrap(), 0);
    assert_eq!(mesh.to_raw(), before);
}

#[test]
fn scenario_failed_allocation_rolls_back() {
    let mut pool = VertexPool::new(10);
    pool.allocate_chain(7).unwrap();
    assert_eq!(pool.free_count(), 3);

    let slots = pool.vertices().to_vec();
    let cursor = pool.cursor();
    assert_eq!(
        pool.allocate_chain(4),
        Err(PoolError::Exhausted {
            requested: 4,
            available: 3
        })
    );
    assert_eq!(pool.free_count(), 3);
    assert_eq!(pool.cursor(), cursor);
    assert_eq!(pool.vertices(), &slots[..]);
    assert_eq!(
        pool.vertices().iter().filter(|v| v.ambient == VERTEX_UNUSED).count(),
        3
    );
}

#[test]
fn property_pool_conservation() {
    let capacity = 200;
    let mut pool = VertexPool::new(capacity);
    let mut rng = StdRng::seed_from_u64(11);
    let mut chains: Vec<(VertexId, usize)> = Vec::new();

    for _ in 0..500 {
        if chains.is_empty() || rng.gen_bool(0.6) {
            let count = rng.gen_range(1..=16);
            if let Ok(first) = pool.allocate_chain(count) {
                chains.push((first, count));
            }
        } else {
            let (first, count) = chains.swap_remove(rng.gen_range(0..chains.len()));
            assert_eq!(pool.release(first, count), count);
        }
        let live: usize = chains.iter().map(|(_, n)| n).sum();
        assert_eq!(pool.free_count() + live, capacity);
        assert!(pool.validate_free_count().is_ok());
    }
}

#[test]
fn property_weld_converges_to_mean() {
    let mut mesh = blank(4, 4);
    let mut rng = StdRng::seed_from_u64(23);
    let ids: Vec<_> = mesh.live_vertex_ids().into_iter().step_by(5).collect();
    for &id in &ids {
        let p = Vec3::new(rng.gen_range(0.0..512.0), rng.gen_range(0.0..512.0), rng.gen_range(0.0..900.0));
        mesh.set_vertex_position(id, p);
    }
    let mean = ids.iter().map(|id| mesh.vertex_position(*id).unwrap()).sum::<Vec3>() / ids.len() as f32;

    let mut selection = SelectionList::new(&mesh);
    for &id in &ids {
        selection.add(id);
    }
    assert_eq!(mesh.weld(&selection), ids.len());

    let first = mesh.vertex_position(ids[0]).unwrap();
    assert!(first.abs_diff_eq(mean, 1e-2));
    for &id in &ids {
        let vertex = mesh.vertex(id).unwrap();
        assert_eq!(vertex.position, first);
        assert!(vertex.ambient >= 1);
    }
}

#[test]
fn property_fix_mesh_is_idempotent() {
    let mut mesh = blank(5, 4);
    mesh.jitter_mesh(&mut StdRng::seed_from_u64(3));

    mesh.fix_mesh();
    let once = mesh.to_raw();
    mesh.fix_mesh();
    assert_eq!(mesh.to_raw(), once);

    // Sealed: every interior corner is shared exactly
    for y in 0..3 {
        for x in 0..4 {
            assert_eq!(position(&mesh, x, y, CORNER_BR), position(&mesh, x + 1, y + 1, CORNER_TL));
        }
    }
}

#[test]
fn property_rectangle_add_then_remove_restores() {
    let mesh = blank(4, 4);
    let mut selection = SelectionList::new(&mesh);
    selection.add_tile(&mesh, 3, 3);
    let before = selection.as_slice().to_vec();

    let lo = Vec3::new(0.0, 0.0, -10.0);
    let hi = Vec3::new(260.0, 300.0, 10.0);
    assert!(selection.add_rectangle(&mesh, lo, hi, SelectAxes::Xy) > 0);
    selection.remove_rectangle(&mesh, lo, hi, SelectAxes::Xy);
    assert_eq!(selection.as_slice(), &before[..]);
}

#[test]
fn property_move_selection_stays_in_bounds() {
    let mut mesh = blank(3, 3);
    let mut rng = StdRng::seed_from_u64(99);
    let mut selection = SelectionList::new(&mesh);
    selection.add_tile(&mesh, 0, 0);
    selection.add_tile(&mesh, 2, 1);

    for _ in 0..50 {
        let delta = Vec3::new(
            rng.gen_range(-1.0e5..1.0e5),
            rng.gen_range(-1.0e5..1.0e5),
            rng.gen_range(-1.0e5..1.0e5),
        );
        mesh.move_selection(&selection, delta);
        for id in selection.iter() {
            let p = mesh.vertex_position(id).unwrap();
            assert!(p.cmpge(Vec3::ZERO).all(), "{p:?} below bounds");
            assert!(p.cmple(mesh.bounds()).all(), "{p:?} above bounds");
        }
    }
}

#[test]
fn property_live_vertices_never_get_the_unused_ambient() {
    let mut mesh = blank(4, 4);
    let mut rng = StdRng::seed_from_u64(8);
    let dark = LightingConfig {
        global_ambient: 0,
        ambient_cut: 255,
        directional: 64,
    };

    mesh.jitter_mesh(&mut rng);
    recompute_mesh(&mut mesh, &[], &dark);
    assert!(live_ambients(&mesh).iter().all(|&a| a != VERTEX_UNUSED));

    let paint = TilePaint {
        tile_type: 5,
        ..Default::default()
    };
    mesh.retype(1, 1, &paint, &mut rng).unwrap();
    mesh.fix_mesh();
    mesh.fix_walls();
    let mut selection = SelectionList::new(&mesh);
    selection.add_tile(&mesh, 2, 2);
    mesh.weld(&selection);
    assert!(live_ambients(&mesh).iter().all(|&a| a != VERTEX_UNUSED));

    recompute_mesh(&mut mesh, &[], &dark);
    assert!(live_ambients(&mesh).iter().all(|&a| a != VERTEX_UNUSED));
}
