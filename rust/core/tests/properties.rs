// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Area and winding invariants over randomly generated star-shaped lots.

use cga_lite_core::{
    classify_winding, compute_polygon_area, ensure_clockwise, ensure_counter_clockwise, validate_geometry_for_rules,
    Crs, Point2, Winding,
};
use proptest::prelude::*;
use std::f64::consts::TAU;

/// Simple star-shaped ring: one vertex per angular sector around a center.
fn star_polygon() -> impl Strategy<Value = Vec<Point2<f64>>> {
    (3usize..12, -1000.0f64..1000.0, -1000.0f64..1000.0).prop_flat_map(|(n, cx, cy)| {
        (
            prop::collection::vec(1.0f64..100.0, n),
            prop::collection::vec(0.0f64..0.9, n),
            any::<bool>(),
        )
            .prop_map(move |(radii, jitter, reverse)| {
                let sector = TAU / n as f64;
                let mut ring: Vec<Point2<f64>> = radii
                    .iter()
                    .zip(&jitter)
                    .enumerate()
                    .map(|(i, (r, j))| {
                        let angle = sector * (i as f64 + j);
                        Point2::new(cx + r * angle.cos(), cy + r * angle.sin())
                    })
                    .collect();
                if reverse {
                    ring.reverse();
                }
                ring
            })
    })
}

/// Zero-area ring: every vertex on one coordinate axis.
fn collinear_ring() -> impl Strategy<Value = Vec<Point2<f64>>> {
    (any::<bool>(), prop::collection::vec(-500.0f64..500.0, 2..9)).prop_map(|(on_x, ts)| {
        ts.into_iter()
            .map(|t| if on_x { Point2::new(t, 0.0) } else { Point2::new(0.0, t) })
            .collect()
    })
}

proptest! {
    #[test]
    fn area_is_non_negative_and_reverse_invariant(ring in star_polygon()) {
        let area = compute_polygon_area(&ring);
        prop_assert!(area >= 0.0);

        let reversed: Vec<_> = ring.iter().rev().cloned().collect();
        prop_assert!((compute_polygon_area(&reversed) - area).abs() <= 1e-9 * area.max(1.0));
    }

    #[test]
    fn ensure_counter_clockwise_is_idempotent(ring in star_polygon()) {
        let once = ensure_counter_clockwise(&ring);
        let twice = ensure_counter_clockwise(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn orientation_is_stable_for_degenerate_rings(ring in collinear_ring()) {
        let once = ensure_counter_clockwise(&ring);
        prop_assert_eq!(&once, &ensure_counter_clockwise(&once));
        let once = ensure_clockwise(&ring);
        prop_assert_eq!(&once, &ensure_clockwise(&once));
    }

    #[test]
    fn normalized_rings_are_counter_clockwise(ring in star_polygon()) {
        let normalized = ensure_counter_clockwise(&ring);
        prop_assert_eq!(classify_winding(&normalized).unwrap(), Winding::Ccw);
    }

    #[test]
    fn star_lots_pass_validation(ring in star_polygon()) {
        let report = validate_geometry_for_rules(&ring, &Crs::web_mercator());
        prop_assert!(report.valid, "{:?}", report.errors);
    }
}
