// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Split and repeat along a principal axis

use crate::bool2d::{clip_regions, BooleanOp};
use crate::extrusion::prism;
use crate::operator::{
    body_bounds, footprint_parts, require_finite, roof_faces, FootprintPart, OperatorOutput,
};
use cga_lite_core::{
    AttrValue, Axis, BoundingBox, CgaGeometry, Error, FaceKind, Point2, Polygon, Result,
};
use serde::{Deserialize, Serialize};

/// Tolerance for comparing sizes against an axis extent
const SIZE_EPSILON: f64 = 1e-9;

/// Largest number of copies a single repeat may produce
pub const MAX_REPEAT_COUNT: usize = 10_000;

/// Marker for a split entry that takes a share of the remaining extent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillMarker {
    #[serde(rename = "*")]
    Remaining,
}

/// One entry of a split: a fixed size or `"*"` (fill remaining)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SplitSize {
    Fixed(f64),
    Fill(FillMarker),
}

impl SplitSize {
    pub const FILL: SplitSize = SplitSize::Fill(FillMarker::Remaining);
}

/// Resolve split entries against an axis extent
///
/// Fixed entries keep their size; the extent they leave is divided evenly
/// across wildcard entries. Fails when fixed sizes exceed the extent.
pub fn resolve_split_sizes(extent: f64, sizes: &[SplitSize]) -> Result<Vec<f64>> {
    if sizes.is_empty() {
        return Err(Error::range("Split requires at least one size"));
    }

    let mut fixed_sum = 0.0;
    let mut wildcards = 0usize;
    for size in sizes {
        match size {
            SplitSize::Fixed(s) => {
                require_finite("Split size", *s)?;
                if *s < 0.0 {
                    return Err(Error::range(format!("Split size must be non-negative, got {}", s)));
                }
                fixed_sum += s;
            }
            SplitSize::Fill(_) => wildcards += 1,
        }
    }

    if fixed_sum > extent + SIZE_EPSILON {
        return Err(Error::range(format!(
            "Split sizes sum to {} which exceeds the axis extent {}",
            fixed_sum, extent
        )));
    }

    let fill = if wildcards > 0 {
        (extent - fixed_sum).max(0.0) / wildcards as f64
    } else {
        0.0
    };

    Ok(sizes
        .iter()
        .map(|size| match size {
            SplitSize::Fixed(s) => *s,
            SplitSize::Fill(_) => fill,
        })
        .collect())
}

/// Split the working geometry along an axis
///
/// Along x or y every footprint part is clipped into slabs (extruded over the
/// volume's height when the geometry is a volume). Along z the volume is cut
/// into floor slabs tagged with `floorIndex`; with only wildcard entries every
/// floor has height `extent / count`. Extents are measured over the non-roof
/// faces, and existing roof faces are kept after the new parts.
pub fn split_geometry(geometry: &CgaGeometry, axis: Axis, sizes: &[SplitSize]) -> Result<OperatorOutput> {
    let bounds = body_bounds(geometry).ok_or_else(|| Error::geometry("Cannot split empty geometry"))?;
    if axis == Axis::Z && !geometry.is_volume() {
        return Err(Error::range("Split along z requires an extruded volume"));
    }

    let extent = bounds.extent(axis);
    let resolved = resolve_split_sizes(extent, sizes)?;
    let parts = footprint_parts(geometry)?;

    let mut out = match axis {
        Axis::Z => split_floors(&parts, &bounds, &resolved),
        Axis::X | Axis::Y => split_plan(geometry.is_volume(), &parts, &bounds, axis, &resolved),
    }?;
    out.geometry
        .polygons
        .extend(roof_faces(geometry).cloned());
    Ok(out)
}

fn split_floors(parts: &[FootprintPart], bounds: &BoundingBox, sizes: &[f64]) -> Result<OperatorOutput> {
    let mut polygons = Vec::new();
    let mut elevation = bounds.min.z;

    for (index, height) in sizes.iter().enumerate() {
        for part in parts {
            let slab = prism(&part.ring, &part.holes, elevation, *height);
            polygons.extend(slab.into_iter().map(|p| {
                part.carry_tags(
                    p.with_tag("floorIndex", index)
                        .with_tag("floorHeight", *height)
                        .with_tag("elevation", elevation),
                )
            }));
        }
        elevation += height;
    }

    let count = sizes.len();
    let mut out = OperatorOutput::new(
        CgaGeometry::new(polygons),
        format!("Split volume into {} floor(s)", count),
    )
    .with_attr("splitAxis", Axis::Z.as_str())
    .with_attr("splitCount", count)
    .with_attr("floorCount", count);

    if sizes.iter().all(|s| (s - sizes[0]).abs() <= SIZE_EPSILON) {
        out = out.with_attr("floorHeight", sizes[0]);
    }
    Ok(out)
}

fn split_plan(
    is_volume: bool,
    parts: &[FootprintPart],
    bounds: &BoundingBox,
    axis: Axis,
    sizes: &[f64],
) -> Result<OperatorOutput> {
    let subjects: Vec<Vec<Vec<Point2<f64>>>> = parts
        .iter()
        .map(|part| {
            let mut rings = Vec::with_capacity(1 + part.holes.len());
            rings.push(part.ring.clone());
            rings.extend(part.holes.iter().cloned());
            rings
        })
        .collect();
    let volume_height = bounds.extent(Axis::Z);

    let mut polygons = Vec::new();
    let mut start = bounds.min[axis.index()];
    let mut count = 0usize;

    for (index, size) in sizes.iter().enumerate() {
        let end = start + size;
        if *size > SIZE_EPSILON {
            let slab = slab_rectangle(bounds, axis, start, end);
            for (part, subject) in parts.iter().zip(&subjects) {
                for region in clip_regions(subject, &[slab.clone()], BooleanOp::Intersection) {
                    count += 1;
                    let tag = |p: Polygon| {
                        part.carry_tags(
                            p.with_tag("splitIndex", index)
                                .with_tag("splitSize", *size),
                        )
                    };
                    if is_volume {
                        polygons.extend(
                            prism(&region.outer, &region.holes, bounds.min.z, volume_height)
                                .into_iter()
                                .map(tag),
                        );
                    } else {
                        polygons.push(tag(region.to_polygon(part.elevation).with_face(FaceKind::Part)));
                    }
                }
            }
        }
        start = end;
    }

    if count == 0 {
        return Err(Error::geometry("Split produced no parts"));
    }

    Ok(OperatorOutput::new(
        CgaGeometry::new(polygons),
        format!("Split along {} into {} part(s)", axis.as_str(), count),
    )
    .with_attr("splitAxis", axis.as_str())
    .with_attr("splitCount", sizes.len())
    .with_attr("partCount", count))
}

/// Rectangle covering `[start, end]` along `axis` and the full bounds across it
fn slab_rectangle(bounds: &BoundingBox, axis: Axis, start: f64, end: f64) -> Vec<Point2<f64>> {
    // Pad across the axis so the clip never shares an edge with the footprint
    let pad = 1.0 + bounds.extent(Axis::X).max(bounds.extent(Axis::Y));
    match axis {
        Axis::X => {
            let (lo, hi) = (bounds.min.y - pad, bounds.max.y + pad);
            vec![
                Point2::new(start, lo),
                Point2::new(end, lo),
                Point2::new(end, hi),
                Point2::new(start, hi),
            ]
        }
        _ => {
            let (lo, hi) = (bounds.min.x - pad, bounds.max.x + pad);
            vec![
                Point2::new(lo, start),
                Point2::new(hi, start),
                Point2::new(hi, end),
                Point2::new(lo, end),
            ]
        }
    }
}

/// Repeat every footprint part along an axis
///
/// `count = floor(extent / step)`, capped by `limit` and by
/// [`MAX_REPEAT_COUNT`]; copy `i` is moved by
/// `i·step` and tagged with `repeatIndex` and `repeatOffset`. Along z the
/// copies start at the bottom of the volume.
pub fn repeat_geometry(
    geometry: &CgaGeometry,
    axis: Axis,
    step: f64,
    limit: Option<usize>,
) -> Result<OperatorOutput> {
    require_finite("Repeat step", step)?;
    if step <= 0.0 {
        return Err(Error::range(format!("Repeat step must be positive, got {}", step)));
    }
    if axis == Axis::Z && !geometry.is_volume() {
        return Err(Error::range("Repeat along z requires an extruded volume"));
    }

    let bounds = body_bounds(geometry).ok_or_else(|| Error::geometry("Cannot repeat empty geometry"))?;
    let extent = bounds.extent(axis);
    let mut fitted = ((extent / step) + SIZE_EPSILON).floor();
    if let Some(limit) = limit {
        fitted = fitted.min(limit as f64);
    }
    if !fitted.is_finite() || fitted > MAX_REPEAT_COUNT as f64 {
        return Err(Error::range(format!(
            "Repeat step {} yields {} copies along {}, more than the maximum of {}",
            step,
            fitted,
            axis.as_str(),
            MAX_REPEAT_COUNT
        )));
    }
    let count = fitted as usize;
    if count == 0 {
        return Err(Error::range(format!(
            "Repeat step {} leaves no copies within axis extent {}",
            step, extent
        )));
    }

    let modules: Vec<Polygon> = footprint_parts(geometry)?
        .iter()
        .map(|part| {
            let (elevation, face) = match axis {
                Axis::Z => (bounds.min.z, FaceKind::Floor),
                _ => (part.elevation, FaceKind::Part),
            };
            let mut module = Polygon::from_footprint(&part.ring, elevation).with_face(face);
            for hole in &part.holes {
                module.add_hole(Polygon::from_footprint(hole, elevation).vertices);
            }
            part.carry_tags(module)
        })
        .collect();

    let polygons = (0..count)
        .flat_map(|i| {
            let offset = i as f64 * step;
            let shift = axis.unit() * offset;
            modules.iter().map(move |module| {
                module
                    .translated(&shift)
                    .with_tag("repeatIndex", i)
                    .with_tag("repeatOffset", AttrValue::Number(offset))
            })
        })
        .collect();

    Ok(OperatorOutput::new(
        CgaGeometry::new(polygons),
        format!("Repeated footprint {} time(s) along {}", count, axis.as_str()),
    )
    .with_attr("repeatCount", count)
    .with_attr("repeatStep", step)
    .with_attr("repeatAxis", axis.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extrusion::extrude_geometry;
    use approx::assert_relative_eq;

    fn lot(w: f64, h: f64) -> CgaGeometry {
        CgaGeometry::surface(&[
            Point2::new(0.0, 0.0),
            Point2::new(w, 0.0),
            Point2::new(w, h),
            Point2::new(0.0, h),
        ])
    }

    #[test]
    fn test_resolve_fixed_and_wildcards() {
        let sizes = [SplitSize::Fixed(4.0), SplitSize::FILL, SplitSize::FILL];
        assert_eq!(resolve_split_sizes(10.0, &sizes).unwrap(), vec![4.0, 3.0, 3.0]);
    }

    #[test]
    fn test_resolve_rejects_oversized() {
        let sizes = [SplitSize::Fixed(6.0), SplitSize::Fixed(6.0)];
        let err = resolve_split_sizes(10.0, &sizes).unwrap_err();
        assert_eq!(err.kind(), "RANGE_ERROR");
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn test_split_size_json_shapes() {
        let sizes: Vec<SplitSize> = serde_json::from_str(r#"[3.5, "*"]"#).unwrap();
        assert_eq!(sizes, vec![SplitSize::Fixed(3.5), SplitSize::FILL]);
        assert_eq!(serde_json::to_string(&SplitSize::FILL).unwrap(), r#""*""#);
    }

    #[test]
    fn test_split_x_clips_footprint() {
        let out = split_geometry(&lot(10.0, 4.0), Axis::X, &[SplitSize::Fixed(2.0), SplitSize::FILL])
            .unwrap();
        assert_eq!(out.geometry.polygons.len(), 2);
        let widths: Vec<f64> = out
            .geometry
            .polygons
            .iter()
            .map(|p| {
                let b = BoundingBox::from_points(&p.vertices).unwrap();
                b.extent(Axis::X)
            })
            .collect();
        assert_relative_eq!(widths[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(widths[1], 8.0, epsilon = 1e-9);
        assert_eq!(out.geometry.polygons[1].tags["splitIndex"].as_f64(), Some(1.0));
    }

    #[test]
    fn test_split_z_requires_volume() {
        let err = split_geometry(&lot(10.0, 4.0), Axis::Z, &[SplitSize::FILL]).unwrap_err();
        assert_eq!(err.kind(), "RANGE_ERROR");
    }

    #[test]
    fn test_split_z_even_floors() {
        let volume = extrude_geometry(&lot(10.0, 4.0), 12.0).unwrap().geometry;
        let sizes = [SplitSize::FILL; 4];
        let out = split_geometry(&volume, Axis::Z, &sizes).unwrap();

        assert_eq!(out.attributes["floorCount"].as_f64(), Some(4.0));
        assert_relative_eq!(out.attributes["floorHeight"].as_f64().unwrap(), 3.0);
        // 4 floors x (bottom + top + 4 sides)
        assert_eq!(out.geometry.polygons.len(), 24);
        let top_floor = &out.geometry.polygons[18];
        assert_eq!(top_floor.tags["floorIndex"].as_f64(), Some(3.0));
        assert_relative_eq!(top_floor.vertices[0].z, 9.0);
    }

    #[test]
    fn test_split_after_roof_measures_body() {
        use crate::roof::{roof_geometry, RoofKind};

        let volume = extrude_geometry(&lot(10.0, 4.0), 12.0).unwrap().geometry;
        let roofed = roof_geometry(&volume, RoofKind::Gable, None, None).unwrap().geometry;
        let out = split_geometry(&roofed, Axis::Z, &[SplitSize::FILL; 4]).unwrap();

        // Floors divide the eave height, not the ridge
        assert_relative_eq!(out.attributes["floorHeight"].as_f64().unwrap(), 3.0);
        let roofs: Vec<&Polygon> = out
            .geometry
            .polygons
            .iter()
            .filter(|p| p.face() == Some(FaceKind::Roof))
            .collect();
        assert_eq!(roofs.len(), 4);
        assert_eq!(out.geometry.polygons.len(), 24 + 4);
        assert_relative_eq!(out.geometry.bounds().unwrap().max.z, 15.6, epsilon = 1e-9);
    }

    #[test]
    fn test_split_x_keeps_every_part() {
        let halves = split_geometry(&lot(10.0, 4.0), Axis::X, &[SplitSize::FILL, SplitSize::FILL])
            .unwrap()
            .geometry;
        let out = split_geometry(&halves, Axis::Y, &[SplitSize::FILL, SplitSize::FILL]).unwrap();
        assert_eq!(out.attributes["partCount"].as_f64(), Some(4.0));
        let area: f64 = out
            .geometry
            .polygons
            .iter()
            .map(|p| cga_lite_core::compute_polygon_area(&p.footprint()))
            .sum();
        assert_relative_eq!(area, 40.0, epsilon = 1e-9);
    }

    #[test]
    fn test_repeat_copies_every_part() {
        let halves = split_geometry(&lot(10.0, 4.0), Axis::X, &[SplitSize::FILL, SplitSize::FILL])
            .unwrap()
            .geometry;
        let out = repeat_geometry(&halves, Axis::Y, 2.0, None).unwrap();
        assert_eq!(out.attributes["repeatCount"].as_f64(), Some(2.0));
        assert_eq!(out.geometry.polygons.len(), 4);
        assert_eq!(out.geometry.polygons[3].tags["splitIndex"].as_f64(), Some(1.0));
        assert_eq!(out.geometry.polygons[3].tags["repeatIndex"].as_f64(), Some(1.0));
    }

    #[test]
    fn test_repeat_count_and_offsets() {
        let out = repeat_geometry(&lot(10.0, 4.0), Axis::X, 3.0, None).unwrap();
        assert_eq!(out.geometry.polygons.len(), 3);
        let last = &out.geometry.polygons[2];
        assert_eq!(last.tags["repeatIndex"].as_f64(), Some(2.0));
        assert_relative_eq!(last.tags["repeatOffset"].as_f64().unwrap(), 6.0);
        assert_relative_eq!(last.vertices[0].x, 6.0);
    }

    #[test]
    fn test_repeat_limit_caps_count() {
        let out = repeat_geometry(&lot(10.0, 4.0), Axis::X, 1.0, Some(4)).unwrap();
        assert_eq!(out.attributes["repeatCount"].as_f64(), Some(4.0));
    }

    #[test]
    fn test_repeat_rejects_runaway_count() {
        let err = repeat_geometry(&lot(10.0, 4.0), Axis::X, 1e-300, None).unwrap_err();
        assert_eq!(err.kind(), "RANGE_ERROR");
        assert!(err.to_string().contains("maximum"));

        let err = repeat_geometry(&lot(10.0, 4.0), Axis::X, 1e-4, None).unwrap_err();
        assert_eq!(err.kind(), "RANGE_ERROR");
    }

    #[test]
    fn test_repeat_limit_bounds_tiny_step() {
        let out = repeat_geometry(&lot(10.0, 4.0), Axis::X, 1e-300, Some(5)).unwrap();
        assert_eq!(out.geometry.polygons.len(), 5);
    }

    #[test]
    fn test_repeat_invalid_step() {
        assert!(repeat_geometry(&lot(10.0, 4.0), Axis::X, 0.0, None).is_err());
        assert!(repeat_geometry(&lot(10.0, 4.0), Axis::X, 20.0, None).is_err());
    }
}
