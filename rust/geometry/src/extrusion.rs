// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion operations - converting 2D footprints to 3D massing volumes

use crate::operator::{footprint_parts, require_finite, require_vertices, OperatorOutput};
use cga_lite_core::{
    compute_area_with_holes, compute_polygon_area, open_ring, CgaGeometry, Error, FaceKind,
    Point2, Point3, Polygon, Result,
};

/// Extrude a footprint ring along the Z axis from z = 0
///
/// The bottom ring keeps the input winding, the top ring is reversed so its
/// normal points outward, and every edge gets one quadrilateral side face.
/// Attributes: `height`, `volume = baseArea·height`, `baseArea`.
pub fn extrude(points: &[Point2<f64>], height: f64) -> Result<OperatorOutput> {
    let ring = open_ring(points);
    require_vertices(ring)?;
    validate_height(height)?;

    let base_area = compute_polygon_area(ring);
    let polygons = prism(ring, &[], 0.0, height);

    Ok(volume_output(polygons, base_area, height, 0.0))
}

/// Extrude the footprint of a working geometry
///
/// Every footprint part becomes its own block and keeps the part's tags, so
/// the pieces of a split or repeat are all extruded. A flat geometry is
/// replaced by the blocks. When the geometry is already a volume, the blocks
/// are stacked on its current top and the existing faces are kept after them.
pub fn extrude_geometry(geometry: &CgaGeometry, height: f64) -> Result<OperatorOutput> {
    let parts = footprint_parts(geometry)?;
    validate_height(height)?;

    let is_volume = geometry.is_volume();
    let top = geometry.top_elevation();
    let mut base_area = 0.0;
    let mut polygons = Vec::new();
    for part in &parts {
        let base = if is_volume { top } else { part.elevation };
        base_area += compute_area_with_holes(&part.ring, &part.holes);
        polygons.extend(
            prism(&part.ring, &part.holes, base, height)
                .into_iter()
                .map(|p| part.carry_tags(p)),
        );
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

    let base = if is_volume { top } else { parts[0].elevation };
    let mut out = volume_output(polygons, base_area, height, base);
    if parts.len() > 1 {
        out = out.with_attr("partCount", parts.len());
    }
    Ok(out)
}

/// Closed prism over a ring with holes, from `base` to `base + height`
///
/// Returned order: bottom, top, then side faces (outer ring first).
pub fn prism(
    ring: &[Point2<f64>],
    holes: &[Vec<Point2<f64>>],
    base: f64,
    height: f64,
) -> Vec<Polygon> {
    let top_z = base + height;
    let side_count = ring.len() + holes.iter().map(Vec::len).sum::<usize>();
    let mut polygons = Vec::with_capacity(2 + side_count);

    let mut bottom = Polygon::from_footprint(ring, base).with_face(FaceKind::Bottom);
    for hole in holes {
        bottom.add_hole(lift(hole, base));
    }

    let reversed: Vec<Point2<f64>> = ring.iter().rev().cloned().collect();
    let mut top = Polygon::from_footprint(&reversed, top_z).with_face(FaceKind::Top);
    for hole in holes {
        let reversed_hole: Vec<Point2<f64>> = hole.iter().rev().cloned().collect();
        top.add_hole(lift(&reversed_hole, top_z));
    }

    polygons.push(bottom);
    polygons.push(top);

    create_side_walls(ring, base, top_z, &mut polygons);
    for hole in holes {
        create_side_walls(hole, base, top_z, &mut polygons);
    }

    polygons
}

/// One quad per edge, wrapping from the last vertex to the first
fn create_side_walls(ring: &[Point2<f64>], base: f64, top: f64, polygons: &mut Vec<Polygon>) {
    let n = ring.len();
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        polygons.push(
            Polygon::new(vec![
                Point3::new(a.x, a.y, base),
                Point3::new(b.x, b.y, base),
                Point3::new(b.x, b.y, top),
                Point3::new(a.x, a.y, top),
            ])
            .with_face(FaceKind::Side),
        );
    }
}

fn lift(ring: &[Point2<f64>], z: f64) -> Vec<Point3<f64>> {
    ring.iter().map(|p| Point3::new(p.x, p.y, z)).collect()
}

fn validate_height(height: f64) -> Result<()> {
    require_finite("Extrusion height", height)?;
    if height < 0.0 {
        return Err(Error::range(format!(
            "Extrusion height must be non-negative, got {}",
            height
        )));
    }
    Ok(())
}

fn volume_output(polygons: Vec<Polygon>, base_area: f64, height: f64, base: f64) -> OperatorOutput {
    let volume = base_area * height;
    OperatorOutput::new(
        CgaGeometry::new(polygons),
        format!("Extruded footprint by {} from z={}", height, base),
    )
    .with_attr("height", height)
    .with_attr("volume", volume)
    .with_attr("baseArea", base_area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rectangle() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 5.0),
            Point2::new(0.0, 5.0),
        ]
    }

    #[test]
    fn test_extrude_face_layout() {
        let out = extrude(&rectangle(), 3.0).unwrap();
        let polygons = &out.geometry.polygons;
        // bottom + top + 4 sides
        assert_eq!(polygons.len(), 6);
        assert_eq!(polygons[0].face(), Some(FaceKind::Bottom));
        assert_eq!(polygons[1].face(), Some(FaceKind::Top));
        assert!(polygons[2..].iter().all(|p| p.face() == Some(FaceKind::Side)));

        // Top ring is the bottom ring reversed
        assert_eq!(polygons[1].vertices[0].x, 0.0);
        assert_eq!(polygons[1].vertices[0].y, 5.0);
        assert_relative_eq!(polygons[1].vertices[0].z, 3.0);
    }

    #[test]
    fn test_extrude_attributes() {
        let out = extrude(&rectangle(), 4.0).unwrap();
        assert_relative_eq!(out.attributes["baseArea"].as_f64().unwrap(), 50.0);
        assert_relative_eq!(out.attributes["volume"].as_f64().unwrap(), 200.0);
        assert_relative_eq!(out.attributes["height"].as_f64().unwrap(), 4.0);
    }

    #[test]
    fn test_extrude_closed_ring() {
        let mut closed = rectangle();
        closed.push(Point2::new(0.0, 0.0));
        let out = extrude(&closed, 1.0).unwrap();
        assert_eq!(out.geometry.polygons.len(), 6);
    }

    #[test]
    fn test_extrude_zero_height_allowed() {
        let out = extrude(&rectangle(), 0.0).unwrap();
        assert_eq!(out.attributes["volume"].as_f64(), Some(0.0));
    }

    #[test]
    fn test_extrude_negative_height_fails() {
        let err = extrude(&rectangle(), -1.0).unwrap_err();
        assert_eq!(err.kind(), "RANGE_ERROR");
    }

    #[test]
    fn test_extrude_geometry_stacks_on_volume() {
        let first = extrude_geometry(&CgaGeometry::surface(&rectangle()), 30.0).unwrap();
        let second = extrude_geometry(&first.geometry, 20.0).unwrap();

        let bounds = second.geometry.bounds().unwrap();
        assert_relative_eq!(bounds.min.z, 0.0);
        assert_relative_eq!(bounds.max.z, 50.0);
        assert_eq!(second.geometry.polygons.len(), 12);
        assert_relative_eq!(second.geometry.polygons[0].vertices[0].z, 30.0);
        assert_relative_eq!(second.attributes["volume"].as_f64().unwrap(), 1000.0);
    }

    #[test]
    fn test_extrude_every_split_part() {
        use crate::subdivide::{split_geometry, SplitSize};
        use cga_lite_core::Axis;

        let lot = CgaGeometry::surface(&[
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 4.0),
            Point2::new(0.0, 4.0),
        ]);
        let split = split_geometry(&lot, Axis::X, &[SplitSize::Fixed(2.0), SplitSize::FILL]).unwrap();
        let out = extrude_geometry(&split.geometry, 3.0).unwrap();

        assert_relative_eq!(out.attributes["volume"].as_f64().unwrap(), 120.0, epsilon = 1e-9);
        assert_relative_eq!(out.attributes["baseArea"].as_f64().unwrap(), 40.0, epsilon = 1e-9);
        assert_eq!(out.attributes["partCount"].as_f64(), Some(2.0));
        assert_eq!(out.geometry.polygons.len(), 12);

        let bounds = out.geometry.bounds().unwrap();
        assert_relative_eq!(bounds.extent(Axis::X), 10.0, epsilon = 1e-9);
        let indices: Vec<f64> = out
            .geometry
            .polygons
            .iter()
            .filter(|p| p.face() == Some(FaceKind::Bottom))
            .filter_map(|p| p.tags["splitIndex"].as_f64())
            .collect();
        assert_eq!(indices, vec![0.0, 1.0]);
    }

    #[test]
    fn test_prism_with_hole_has_hole_walls() {
        let hole = vec![
            Point2::new(4.0, 2.0),
            Point2::new(4.0, 3.0),
            Point2::new(6.0, 3.0),
            Point2::new(6.0, 2.0),
        ];
        let polygons = prism(&rectangle(), &[hole], 0.0, 3.0);
        assert_eq!(polygons.len(), 2 + 4 + 4);
        assert_eq!(polygons[0].holes.len(), 1);
        assert_eq!(polygons[1].holes.len(), 1);
    }
}
