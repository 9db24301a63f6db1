// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use cga_lite_core::{
    compute_polygon_area, ensure_counter_clockwise, Axis, CgaGeometry, Point2, Polygon,
};
use cga_lite_geometry::{
    boolean_op, extrude, extrude_geometry, offset, roof_geometry, setback_geometry,
    split_geometry, BooleanOp, RoofKind, SplitSize,
};
use proptest::prelude::*;

fn pts(coords: &[[f64; 2]]) -> Vec<Point2<f64>> {
    coords.iter().map(|c| Point2::new(c[0], c[1])).collect()
}

fn l_shape() -> Vec<Point2<f64>> {
    pts(&[
        [0.0, 0.0],
        [10.0, 0.0],
        [10.0, 6.0],
        [4.0, 6.0],
        [4.0, 10.0],
        [0.0, 10.0],
    ])
}

#[test]
fn offset_square_brackets_original_area() {
    let square = pts(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]);
    let inset = offset(&square, -2.0).unwrap();
    let outset = offset(&square, 2.0).unwrap();
    let inset_area = inset.attributes["area"].as_f64().unwrap();
    let outset_area = outset.attributes["area"].as_f64().unwrap();
    assert!(inset_area < 100.0 && 100.0 < outset_area);
}

#[test]
fn l_shape_union_with_notch_fills_to_square() {
    let notch = Polygon::from_footprint(&pts(&[[4.0, 6.0], [10.0, 6.0], [10.0, 10.0], [4.0, 10.0]]), 0.0);
    let lot = Polygon::from_footprint(&l_shape(), 0.0);
    let out = boolean_op(&lot, &notch, BooleanOp::Union).unwrap();
    assert_eq!(out.geometry.polygons.len(), 1);
    assert_relative_eq!(out.attributes["area"].as_f64().unwrap(), 100.0, epsilon = 1e-9);
}

#[test]
fn split_of_l_shape_at_notch_height() {
    let lot = CgaGeometry::surface(&l_shape());
    let out = split_geometry(&lot, Axis::Y, &[SplitSize::Fixed(6.0), SplitSize::FILL]).unwrap();
    assert_eq!(out.attributes["partCount"].as_f64(), Some(2.0));
    let areas: Vec<f64> = out
        .geometry
        .polygons
        .iter()
        .map(|p| compute_polygon_area(&p.footprint()))
        .collect();
    assert_relative_eq!(areas[0], 60.0, epsilon = 1e-9);
    assert_relative_eq!(areas[1], 16.0, epsilon = 1e-9);
}

#[test]
fn setback_extrude_roof_chain() {
    let lot = CgaGeometry::surface(&ensure_counter_clockwise(&pts(&[
        [0.0, 0.0],
        [30.0, 0.0],
        [30.0, 20.0],
        [0.0, 20.0],
    ])));
    let requested = vec![("front".to_string(), 5.0), ("side".to_string(), 2.0)];
    let footprint = setback_geometry(&lot, &requested).unwrap().geometry;
    let massing = extrude_geometry(&footprint, 15.0).unwrap().geometry;
    let roofed = roof_geometry(&massing, RoofKind::Gable, Some(30.0), None).unwrap();

    let bounds = roofed.geometry.bounds().unwrap();
    assert_relative_eq!(bounds.max.z, 15.0 * 1.3, epsilon = 1e-9);
    assert!(bounds.min.x > 0.0 && bounds.max.x < 30.0);
}

fn rectangle_lot() -> impl Strategy<Value = (Vec<Point2<f64>>, f64)> {
    (1.0f64..500.0, 1.0f64..500.0, -1.0e5f64..1.0e5, 0.0f64..300.0).prop_map(|(w, h, origin, height)| {
        (
            pts(&[
                [origin, origin],
                [origin + w, origin],
                [origin + w, origin + h],
                [origin, origin + h],
            ]),
            height,
        )
    })
}

proptest! {
    #[test]
    fn extrude_volume_is_base_area_times_height((ring, height) in rectangle_lot()) {
        let out = extrude(&ring, height).unwrap();
        let expected = compute_polygon_area(&ring) * height;
        let volume = out.attributes["volume"].as_f64().unwrap();
        prop_assert!((volume - expected).abs() <= 1e-9 * expected.max(1.0));
    }

    #[test]
    fn extrude_never_mutates_input((ring, height) in rectangle_lot()) {
        let before = ring.clone();
        let _ = extrude(&ring, height);
        prop_assert_eq!(ring, before);
    }
}
