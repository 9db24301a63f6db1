// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Footprint offset and setback
//!
//! Offsetting scales every vertex radially about the vertex centroid: a
//! vertex at distance `r` from the centroid moves to distance `r + d`.
//! This is exact only for convex, roughly star-shaped footprints; a true
//! Minkowski or straight-skeleton offset is not attempted. Negative
//! distances inset, positive distances outset.
//!
//! Setback offsets inward by the largest requested distance. Per-face
//! distances are kept as metadata and are not applied per edge.

use crate::bool2d::{clip_regions, BooleanOp};
use crate::operator::{footprint_parts, require_finite, require_vertices, OperatorOutput};
use cga_lite_core::{
    centroid, compute_polygon_area, open_ring, ring_bounds, CgaGeometry, Error, FaceKind, Point2,
    Polygon, Result,
};
use serde::{Deserialize, Serialize};

/// Vertices closer than this to the centroid are left in place
const CENTROID_EPSILON: f64 = 1e-12;

/// Which part of an offset a rule keeps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetMode {
    /// The offset ring itself
    #[default]
    Inside,
    /// The band between the original and the offset ring
    Border,
}

/// Radially offset a ring about its centroid
///
/// Fails when an inward distance reaches half the smaller bounding-box
/// dimension, or when any vertex would pass through the centroid.
pub fn offset_ring(points: &[Point2<f64>], distance: f64) -> Result<Vec<Point2<f64>>> {
    let ring = open_ring(points);
    require_vertices(ring)?;
    require_finite("Offset distance", distance)?;

    let (min, max) = ring_bounds(ring).ok_or_else(|| Error::geometry("Empty polygon"))?;
    let limit = (max.x - min.x).min(max.y - min.y) / 2.0;
    if distance < 0.0 && distance.abs() >= limit {
        return Err(Error::range(format!(
            "Inward offset of {} collapses the polygon (must be smaller than {})",
            distance.abs(),
            limit
        )));
    }

    let c = centroid(ring).ok_or_else(|| Error::geometry("Empty polygon"))?;
    ring.iter()
        .map(|v| {
            let radial = v - c;
            let r = radial.norm();
            if r < CENTROID_EPSILON {
                return Ok(*v);
            }
            let scaled = r + distance;
            if scaled <= 0.0 {
                return Err(Error::range(format!(
                    "Inward offset of {} collapses vertex ({}, {}) through the centroid",
                    distance.abs(),
                    v.x,
                    v.y
                )));
            }
            Ok(c + radial * (scaled / r))
        })
        .collect()
}

/// Offset a footprint ring; the result is a flat surface at z = 0
pub fn offset(points: &[Point2<f64>], distance: f64) -> Result<OperatorOutput> {
    let shifted = offset_ring(points, distance)?;
    let area = compute_polygon_area(&shifted);
    Ok(OperatorOutput::new(
        CgaGeometry::surface(&shifted),
        format!("Offset footprint by {}", distance),
    )
    .with_attr("area", area)
    .with_attr("offsetDistance", distance))
}

/// Offset the footprint of a working geometry
///
/// Each footprint part is offset on its own and keeps its tags. The new
/// surfaces sit at the geometry's top elevation. For a volume they are placed
/// before the existing faces so later rules build on them.
pub fn offset_geometry(
    geometry: &CgaGeometry,
    distance: f64,
    mode: OffsetMode,
) -> Result<OperatorOutput> {
    let parts = footprint_parts(geometry)?;
    let is_volume = geometry.is_volume();
    let top = geometry.top_elevation();

    let mut polygons = Vec::new();
    let mut area = 0.0;
    for part in &parts {
        let elevation = if is_volume { top } else { part.elevation };
        let shifted = offset_ring(&part.ring, distance)?;
        match mode {
            OffsetMode::Inside => {
                area += compute_polygon_area(&shifted);
                let surface =
                    Polygon::from_footprint(&shifted, elevation).with_face(FaceKind::Footprint);
                polygons.push(part.carry_tags(surface));
            }
            OffsetMode::Border => {
                let (larger, smaller) = if distance < 0.0 {
                    (part.ring.clone(), shifted)
                } else {
                    (shifted, part.ring.clone())
                };
                let regions = clip_regions(&[larger], &[smaller], BooleanOp::Difference);
                if regions.is_empty() {
                    return Err(Error::BooleanOp(
                        "Offset border produced an empty result".to_string(),
                    ));
                }
                area += regions.iter().map(|r| r.area()).sum::<f64>();
                polygons.extend(regions.iter().map(|r| {
                    part.carry_tags(r.to_polygon(elevation).with_face(FaceKind::Footprint))
                }));
            }
        }
    }

    if is_volume {
        polygons.extend(
            geometry
                .polygons
                .iter()
                .filter(|p| p.face() != Some(FaceKind::Footprint))
                .cloned(),
        );
    }

    let mut out = OperatorOutput::new(
        CgaGeometry::new(polygons),
        format!("Offset footprint by {} ({:?})", distance, mode),
    )
    .with_attr("area", area)
    .with_attr("offsetDistance", distance);
    if parts.len() > 1 {
        out = out.with_attr("partCount", parts.len());
    }
    Ok(out)
}

/// Inset the working footprint by the largest requested setback
///
/// `requested` pairs a face label with its distance; a uniform setback is a
/// single entry. The requested list is recorded as `setbackFaces`.
pub fn setback_geometry(geometry: &CgaGeometry, requested: &[(String, f64)]) -> Result<OperatorOutput> {
    if requested.is_empty() {
        return Err(Error::range("Setback requires at least one distance"));
    }
    for (face, distance) in requested {
        require_finite("Setback distance", *distance)?;
        if *distance < 0.0 {
            return Err(Error::range(format!(
                "Setback distance for '{}' must be non-negative, got {}",
                face, distance
            )));
        }
    }

    let applied = requested
        .iter()
        .map(|(_, d)| *d)
        .fold(f64::NEG_INFINITY, f64::max);
    let faces = requested
        .iter()
        .map(|(face, d)| format!("{}={}", face, d))
        .collect::<Vec<_>>()
        .join(",");

    let mut out = offset_geometry(geometry, -applied, OffsetMode::Inside)?;
    out.message = format!("Setback of {} applied uniformly ({})", applied, faces);
    Ok(out
        .with_attr("setbackDistance", applied)
        .with_attr("setbackFaces", faces))
}
