// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry validation for lot polygons
//!
//! Checks run before any rule is applied: vertex count, duplicate vertices,
//! coordinate plausibility for the attached CRS, winding order and
//! self-intersections. Clockwise input is only a warning because the
//! normalizer reorders it.

use crate::crs::{Crs, CrsUnits};
use crate::error::{Error, Result};
use crate::polygon::{open_ring, ring_bounds};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Half-width of the plausible coordinate envelope for meter-based CRS
pub const METERS_ENVELOPE: f64 = 20_000_000.0;

const FEET_PER_METER: f64 = 3.280_839_895;

/// Default distance below which consecutive vertices count as duplicates
pub const DUPLICATE_VERTEX_EPSILON: f64 = 1e-6;

/// Determinant magnitude below which two segments are treated as parallel
const PARALLEL_EPSILON: f64 = 1e-10;

/// Signed area magnitude below which a ring is degenerate
pub const MIN_AREA: f64 = 1e-10;

/// Cyclic direction of a ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winding {
    Ccw,
    Cw,
}

/// Signed shoelace area: `0.5 * Σ (x_i·y_{i+1} − x_{i+1}·y_i)`
///
/// Negative means counter-clockwise in this engine's frame. Rings with fewer
/// than three vertices have zero area.
pub fn compute_signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }

    area * 0.5
}

/// Classify the winding order of a ring
pub fn classify_winding(points: &[Point2<f64>]) -> Result<Winding> {
    if points.len() < 3 {
        return Err(Error::geometry(format!(
            "Polygon must have at least 3 vertices (got {})",
            points.len()
        )));
    }

    if compute_signed_area(points) < 0.0 {
        Ok(Winding::Ccw)
    } else {
        Ok(Winding::Cw)
    }
}

/// A crossing between two non-adjacent edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelfIntersection {
    pub first_edge: usize,
    pub second_edge: usize,
    pub point: Point2<f64>,
}

/// Intersection point of segments `a1→a2` and `b1→b2`, if any
///
/// Solves the 2×2 parametric system for `ua`, `ub`; both must lie in `[0, 1]`.
/// A near-zero determinant means parallel segments and yields `None`.
pub fn segment_intersection(
    a1: &Point2<f64>,
    a2: &Point2<f64>,
    b1: &Point2<f64>,
    b2: &Point2<f64>,
) -> Option<Point2<f64>> {
    let denom = (b2.y - b1.y) * (a2.x - a1.x) - (b2.x - b1.x) * (a2.y - a1.y);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let ua = ((b2.x - b1.x) * (a1.y - b1.y) - (b2.y - b1.y) * (a1.x - b1.x)) / denom;
    let ub = ((a2.x - a1.x) * (a1.y - b1.y) - (a2.y - a1.y) * (a1.x - b1.x)) / denom;

    if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
        Some(a1 + (a2 - a1) * ua)
    } else {
        None
    }
}

/// Find crossings between non-adjacent edges (O(n²))
///
/// Adjacent edges and the pair formed by the first and the wrap-around closing
/// edge are skipped since they always share a vertex.
pub fn detect_self_intersections(points: &[Point2<f64>]) -> Vec<SelfIntersection> {
    let ring = dedup_consecutive(open_ring(points), DUPLICATE_VERTEX_EPSILON);
    let n = ring.len();
    let mut found = Vec::new();
    if n < 4 {
        return found;
    }

    for i in 0..n {
        let a1 = &ring[i];
        let a2 = &ring[(i + 1) % n];
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let b1 = &ring[j];
            let b2 = &ring[(j + 1) % n];
            if let Some(point) = segment_intersection(a1, a2, b1, b2) {
                found.push(SelfIntersection {
                    first_edge: i,
                    second_edge: j,
                    point,
                });
            }
        }
    }

    found
}

/// Outcome of a coordinate plausibility check
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitCheck {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Check that coordinates are plausible for the CRS units
///
/// Meter and foot CRS only reject gross unit mismatches (a bounding box
/// outside a multi-million-unit envelope). Degree CRS enforce longitude
/// within [-180, 180] and latitude within [-90, 90].
pub fn validate_coordinate_units(coords: &[Point2<f64>], crs: &Crs) -> UnitCheck {
    let mut errors = Vec::new();

    if let Some((min, max)) = ring_bounds(coords) {
        match crs.units {
            CrsUnits::Degrees => {
                if min.x < -180.0 || max.x > 180.0 {
                    errors.push(format!(
                        "Longitude out of range [-180, 180] for {}: [{}, {}]",
                        crs, min.x, max.x
                    ));
                }
                if min.y < -90.0 || max.y > 90.0 {
                    errors.push(format!(
                        "Latitude out of range [-90, 90] for {}: [{}, {}]",
                        crs, min.y, max.y
                    ));
                }
            }
            CrsUnits::Meters | CrsUnits::Feet => {
                let envelope = if crs.units == CrsUnits::Feet {
                    METERS_ENVELOPE * FEET_PER_METER
                } else {
                    METERS_ENVELOPE
                };
                let largest = [min.x, min.y, max.x, max.y]
                    .iter()
                    .fold(0.0f64, |acc, v| acc.max(v.abs()));
                if largest > envelope {
                    errors.push(format!(
                        "Coordinates outside plausible envelope of ±{} for {}: bounding box ({}, {}) - ({}, {})",
                        envelope, crs, min.x, min.y, max.x, max.y
                    ));
                }
            }
        }
    }

    UnitCheck {
        valid: errors.is_empty(),
        errors,
    }
}

/// Aggregated validation outcome
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Validates lot polygons before rule execution
#[derive(Debug, Clone, Copy)]
pub struct GeometryValidator {
    /// Distance below which consecutive vertices are reported as duplicates
    pub duplicate_epsilon: f64,
}

impl Default for GeometryValidator {
    fn default() -> Self {
        Self {
            duplicate_epsilon: DUPLICATE_VERTEX_EPSILON,
        }
    }
}

impl GeometryValidator {
    pub fn new(duplicate_epsilon: f64) -> Self {
        Self { duplicate_epsilon }
    }

    /// Run every geometry check that gates rule execution
    pub fn validate_for_rules(&self, coords: &[Point2<f64>], crs: &Crs) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if coords.len() < 3 {
            errors.push(format!(
                "Polygon must have at least 3 vertices (got {})",
                coords.len()
            ));
            return ValidationReport {
                valid: false,
                errors,
                warnings,
            };
        }

        for (i, p) in coords.iter().enumerate() {
            if !p.x.is_finite() || !p.y.is_finite() {
                errors.push(format!("Vertex {} has a non-finite coordinate", i));
            }
        }
        if !errors.is_empty() {
            return ValidationReport {
                valid: false,
                errors,
                warnings,
            };
        }

        for (i, pair) in coords.windows(2).enumerate() {
            if (pair[1] - pair[0]).norm() <= self.duplicate_epsilon {
                warnings.push(format!(
                    "Duplicate consecutive vertices at index {} and {}",
                    i,
                    i + 1
                ));
            }
        }

        errors.extend(validate_coordinate_units(coords, crs).errors);

        let signed_area = compute_signed_area(coords);
        if signed_area.abs() < MIN_AREA {
            errors.push("Polygon is degenerate (zero area)".to_string());
        } else if signed_area >= 0.0 {
            warnings.push(
                "Polygon has clockwise winding; it will be normalized to counter-clockwise"
                    .to_string(),
            );
        }

        let distinct = dedup_consecutive(open_ring(coords), self.duplicate_epsilon);
        if distinct.len() >= 4 {
            for hit in detect_self_intersections(coords) {
                errors.push(format!(
                    "Polygon self-intersection detected between edges {} and {} at ({:.3}, {:.3})",
                    hit.first_edge, hit.second_edge, hit.point.x, hit.point.y
                ));
            }
        }

        ValidationReport {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Validate a lot polygon with the default tolerances
pub fn validate_geometry_for_rules(coords: &[Point2<f64>], crs: &Crs) -> ValidationReport {
    GeometryValidator::default().validate_for_rules(coords, crs)
}

fn dedup_consecutive(points: &[Point2<f64>], epsilon: f64) -> Vec<Point2<f64>> {
    let mut out: Vec<Point2<f64>> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().map_or(true, |last| (p - last).norm() > epsilon) {
            out.push(*p);
        }
    }
    out
}
