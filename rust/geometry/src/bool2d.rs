// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Boolean Operations on Footprints
//!
//! Polygon clipping via the i_overlay crate. Handles non-convex inputs, holes
//! and multi-polygon results. Split slicing and offset borders are built on
//! the same routine.

use crate::operator::OperatorOutput;
use cga_lite_core::{
    compute_area_with_holes, compute_polygon_area, ensure_clockwise, ensure_counter_clockwise,
    CgaGeometry, Error, FaceKind, Point2, Polygon, Result,
};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum area threshold - regions smaller than this are considered degenerate
const MIN_AREA_THRESHOLD: f64 = 1e-10;

/// Boolean set operation between two footprints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanOp {
    Union,
    Intersection,
    Difference,
    Xor,
}

impl BooleanOp {
    fn overlay_rule(&self) -> OverlayRule {
        match self {
            BooleanOp::Union => OverlayRule::Union,
            BooleanOp::Intersection => OverlayRule::Intersect,
            BooleanOp::Difference => OverlayRule::Difference,
            BooleanOp::Xor => OverlayRule::Xor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BooleanOp::Union => "union",
            BooleanOp::Intersection => "intersection",
            BooleanOp::Difference => "difference",
            BooleanOp::Xor => "xor",
        }
    }
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One connected piece of a clipping result
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Exterior ring (counter-clockwise)
    pub outer: Vec<Point2<f64>>,
    /// Holes (clockwise)
    pub holes: Vec<Vec<Point2<f64>>>,
}

impl Region {
    pub fn area(&self) -> f64 {
        compute_area_with_holes(&self.outer, &self.holes)
    }

    /// Lift onto the plane `z = elevation`
    pub fn to_polygon(&self, elevation: f64) -> Polygon {
        let mut polygon = Polygon::from_footprint(&self.outer, elevation);
        for hole in &self.holes {
            polygon.add_hole(Polygon::from_footprint(hole, elevation).vertices);
        }
        polygon
    }
}

/// Clip two ring sets against each other
///
/// Each ring set is one exterior followed by its holes (even-odd fill).
/// Returns an empty list when nothing survives.
pub fn clip_regions(
    subject: &[Vec<Point2<f64>>],
    clip: &[Vec<Point2<f64>>],
    op: BooleanOp,
) -> Vec<Region> {
    let subject_paths: Vec<Vec<[f64; 2]>> = subject
        .iter()
        .filter(|c| c.len() >= 3)
        .map(|c| contour_to_path(c))
        .collect();
    let clip_paths: Vec<Vec<[f64; 2]>> = clip
        .iter()
        .filter(|c| c.len() >= 3)
        .map(|c| contour_to_path(c))
        .collect();

    // Result is Vec<Vec<Vec<[f64; 2]>>> - Vec of shapes, each shape is Vec of contours
    let shapes = subject_paths.overlay(&clip_paths, op.overlay_rule(), FillRule::EvenOdd);

    shapes_to_regions(&shapes)
}

/// Apply a boolean operation to the footprints of two polygons
///
/// The result lies at the elevation of `a`. Fails with
/// [`Error::BooleanOp`] when the result is empty (e.g. a disjoint
/// intersection).
pub fn boolean_op(a: &Polygon, b: &Polygon, op: BooleanOp) -> Result<OperatorOutput> {
    let elevation = a.vertices.first().map(|p| p.z).unwrap_or(0.0);
    let regions = clip_regions(&polygon_rings(a), &polygon_rings(b), op);
    if regions.is_empty() {
        return Err(Error::BooleanOp(format!("{} produced an empty result", op)));
    }

    let area: f64 = regions.iter().map(Region::area).sum();
    let count = regions.len();
    let polygons = regions
        .iter()
        .map(|r| r.to_polygon(elevation).with_face(FaceKind::Part))
        .collect();

    Ok(
        OperatorOutput::new(CgaGeometry::new(polygons), format!("{} produced {} region(s)", op, count))
            .with_attr("area", area)
            .with_attr("regionCount", count),
    )
}

/// Exterior followed by holes, as 2D rings
pub(crate) fn polygon_rings(polygon: &Polygon) -> Vec<Vec<Point2<f64>>> {
    let mut rings = Vec::with_capacity(1 + polygon.holes.len());
    rings.push(polygon.footprint());
    rings.extend(polygon.hole_footprints());
    rings
}

// ============================================================================
// Internal Helper Functions
// ============================================================================

/// Convert a Point2 contour to i_overlay path format
fn contour_to_path(contour: &[Point2<f64>]) -> Vec<[f64; 2]> {
    contour.iter().map(|p| [p.x, p.y]).collect()
}

fn path_to_contour(path: &[[f64; 2]]) -> Vec<Point2<f64>> {
    path.iter().map(|p| Point2::new(p[0], p[1])).collect()
}

/// Convert i_overlay result shapes to regions
///
/// i_overlay returns Vec<Vec<Vec<[f64; 2]>>> where:
/// - Outer Vec: list of shapes
/// - Middle Vec: list of contours per shape (first is outer, rest are holes)
/// - Inner Vec: list of points per contour
fn shapes_to_regions(shapes: &[Vec<Vec<[f64; 2]>>]) -> Vec<Region> {
    let mut regions = Vec::with_capacity(shapes.len());

    for shape in shapes {
        let Some(outer_path) = shape.first() else {
            continue;
        };
        let outer = path_to_contour(outer_path);
        if outer.len() < 3 || compute_polygon_area(&outer) <= MIN_AREA_THRESHOLD {
            continue;
        }

        let holes = shape
            .iter()
            .skip(1)
            .map(|path| path_to_contour(path))
            .filter(|hole| hole.len() >= 3 && compute_polygon_area(hole) > MIN_AREA_THRESHOLD)
            .map(|hole| ensure_clockwise(&hole))
            .collect();

        regions.push(Region {
            outer: ensure_counter_clockwise(&outer),
            holes,
        });
    }

    regions
}
