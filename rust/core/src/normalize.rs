// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical winding and area queries

use crate::validation::{compute_signed_area, MIN_AREA};
use nalgebra::Point2;

/// Ensure ring has counter-clockwise winding
///
/// Returns a reversed copy of a clockwise ring and an unchanged copy
/// otherwise. Degenerate rings (|signed area| below [`MIN_AREA`]) have no
/// winding and are never reversed, so repeated calls are stable.
pub fn ensure_counter_clockwise(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    if compute_signed_area(points) > MIN_AREA {
        points.iter().rev().cloned().collect()
    } else {
        points.to_vec()
    }
}

/// Ensure ring has clockwise winding (hole orientation)
pub fn ensure_clockwise(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    if compute_signed_area(points) < -MIN_AREA {
        points.iter().rev().cloned().collect()
    } else {
        points.to_vec()
    }
}

/// Unsigned polygon area, 0 for rings with fewer than 3 vertices
#[inline]
pub fn compute_polygon_area(points: &[Point2<f64>]) -> f64 {
    compute_signed_area(points).abs()
}

/// Area of an exterior ring minus its holes, clamped at zero
pub fn compute_area_with_holes(outer: &[Point2<f64>], holes: &[Vec<Point2<f64>>]) -> f64 {
    let hole_area: f64 = holes.iter().map(|h| compute_polygon_area(h)).sum();
    (compute_polygon_area(outer) - hole_area).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{classify_winding, Winding};
    use approx::assert_abs_diff_eq;

    fn pts(coords: &[[f64; 2]]) -> Vec<Point2<f64>> {
        coords.iter().map(|c| Point2::new(c[0], c[1])).collect()
    }

    #[test]
    fn rectangle_area() {
        let rect = pts(&[[0.0, 0.0], [10.0, 0.0], [10.0, 5.0], [0.0, 5.0], [0.0, 0.0]]);
        assert_abs_diff_eq!(compute_polygon_area(&rect), 50.0);
    }

    #[test]
    fn l_shape_area() {
        let l_shape = pts(&[
            [0.0, 0.0],
            [10.0, 0.0],
            [10.0, 6.0],
            [4.0, 6.0],
            [4.0, 10.0],
            [0.0, 10.0],
            [0.0, 0.0],
        ]);
        assert_abs_diff_eq!(compute_polygon_area(&l_shape), 76.0, epsilon = 0.1);
    }

    #[test]
    fn degenerate_area_is_zero() {
        assert_eq!(compute_polygon_area(&[]), 0.0);
        assert_eq!(compute_polygon_area(&pts(&[[0.0, 0.0], [4.0, 4.0]])), 0.0);
    }

    #[test]
    fn clockwise_ring_is_reversed_without_mutating_input() {
        let cw = pts(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]);
        let snapshot = cw.clone();
        let ccw = ensure_counter_clockwise(&cw);
        assert_eq!(cw, snapshot);
        assert_eq!(ccw[0], Point2::new(0.0, 10.0));
        assert_eq!(classify_winding(&ccw).unwrap(), Winding::Ccw);
    }

    #[test]
    fn counter_clockwise_ring_is_unchanged() {
        let ccw = pts(&[[0.0, 10.0], [10.0, 10.0], [10.0, 0.0], [0.0, 0.0]]);
        assert_eq!(ensure_counter_clockwise(&ccw), ccw);
        assert_eq!(classify_winding(&ensure_clockwise(&ccw)).unwrap(), Winding::Cw);
    }

    #[test]
    fn collinear_ring_is_left_alone() {
        let line = pts(&[[0.0, 0.0], [5.0, 0.0], [10.0, 0.0]]);
        assert_eq!(ensure_counter_clockwise(&line), line);
        assert_eq!(ensure_clockwise(&line), line);
        assert_eq!(ensure_counter_clockwise(&ensure_counter_clockwise(&line)), line);
    }

    #[test]
    fn holes_are_subtracted() {
        let outer = pts(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]);
        let hole = pts(&[[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0]]);
        assert_abs_diff_eq!(compute_area_with_holes(&outer, &[hole]), 96.0);
    }
}
