//! Property-based tests for the CPU-side invariants
//!
//! - Grid mesh counts and index bounds for any positive quad count
//! - Reflection matrices are involutions
//! - Ripple ageing and capacity eviction
//! - Pick pixel decoding

use glam::{Mat4, Vec2, Vec3};
use proptest::prelude::*;

use watersurface::mesh::{build_grid, grid_length, SourceQuad};
use watersurface::picking::{apply_pick, PickOutcome};
use watersurface::reflection::{reflection_matrix, Plane};
use watersurface::ripples::RippleStore;

const RIPPLE_CAPACITY: usize = 100;
const RIPPLE_HORIZON: f32 = 30.0;

/// Strategy for unit normals (rejects near-zero draws)
fn unit_normal() -> impl Strategy<Value = Vec3> {
    (-1.0f32..1.0, -1.0f32..1.0, -1.0f32..1.0)
        .prop_filter("normal too short", |(x, y, z)| {
            Vec3::new(*x, *y, *z).length() > 0.1
        })
        .prop_map(|(x, y, z)| Vec3::new(x, y, z).normalize())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_grid_counts_and_indices(quad_count in 1i32..5000) {
        let grid = build_grid(quad_count, &SourceQuad::water_patch(100.0)).unwrap();
        let side = (quad_count as f64).sqrt().ceil() as usize;
        let quads = side * side;

        prop_assert_eq!(grid_length(quad_count).unwrap() as usize, side);
        prop_assert_eq!(grid.quad_count(), quads);
        prop_assert_eq!(grid.mesh.vertex_count(), 4 * quads);
        prop_assert_eq!(grid.mesh.indices.len(), 6 * quads);

        let vertex_count = grid.mesh.vertex_count() as u32;
        prop_assert!(grid.mesh.indices.iter().all(|&i| i < vertex_count));
    }

    #[test]
    fn prop_non_positive_quad_count_rejected(quad_count in i32::MIN..=0) {
        prop_assert!(build_grid(quad_count, &SourceQuad::water_patch(1.0)).is_err());
    }

    #[test]
    fn prop_reflection_is_involution(
        normal in unit_normal(),
        point in (-50.0f32..50.0, -50.0f32..50.0, -50.0f32..50.0),
    ) {
        let plane = Plane::new(Vec3::new(point.0, point.1, point.2), normal).unwrap();
        let r = reflection_matrix(&plane);
        let product = r * r;
        for (a, b) in product.to_cols_array().iter().zip(Mat4::IDENTITY.to_cols_array()) {
            prop_assert!((a - b).abs() < 1e-3, "R*R = {:?}", product);
        }
    }

    #[test]
    fn prop_age_out_leaves_nothing_older_than_horizon(
        times in prop::collection::vec(0.0f32..200.0, 1..150),
        now in 0.0f32..250.0,
    ) {
        let mut store = RippleStore::new(RIPPLE_CAPACITY, RIPPLE_HORIZON);
        for t in &times {
            store.add_ripple(*t, Vec2::new(0.5, 0.5)).unwrap();
        }
        store.age_out(now);
        prop_assert!(store.iter().all(|r| now - r.time <= RIPPLE_HORIZON));
    }

    #[test]
    fn prop_capacity_keeps_most_recent(
        start in 0.0f32..100.0,
        extra in 1usize..100,
    ) {
        let total = RIPPLE_CAPACITY + extra;
        let mut store = RippleStore::new(RIPPLE_CAPACITY, f32::MAX);
        for i in 0..total {
            store.add_ripple(start + i as f32, Vec2::ZERO).unwrap();
        }

        prop_assert_eq!(store.len(), RIPPLE_CAPACITY);
        let kept: Vec<f32> = store.iter().map(|r| r.time).collect();
        let expected: Vec<f32> = (extra..total).map(|i| start + i as f32).collect();
        prop_assert_eq!(kept, expected);
    }

    #[test]
    fn prop_pick_decode(r in 0.0f32..=1.0, g in 0.0f32..=1.0, b in 0.0f32..0.99) {
        let mut store = RippleStore::new(RIPPLE_CAPACITY, RIPPLE_HORIZON);

        let miss = apply_pick(&mut store, [r, g, 1.0, 1.0], 1.0).unwrap();
        prop_assert_eq!(miss, PickOutcome::Miss);
        prop_assert!(store.is_empty());

        let hit = apply_pick(&mut store, [r, g, b, 1.0], 1.0).unwrap();
        prop_assert_eq!(hit, PickOutcome::Hit(Vec2::new(r, g)));
        let ripple = store.iter().next().unwrap();
        prop_assert_eq!(ripple.position, Vec2::new(r, g));
        prop_assert_eq!(ripple.time, 1.0);
    }
}

#[test]
fn test_default_grid_sizes() {
    let grid = build_grid(1600, &SourceQuad::water_patch(100.0)).unwrap();
    assert_eq!(grid.grid_length, 40);
    assert_eq!(grid.quad_count(), 1600);
    assert_eq!(grid.mesh.vertex_count(), 6400);
    assert_eq!(grid.mesh.indices.len(), 9600);
}
