// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared operator output type and footprint helpers

use cga_lite_core::polygon::{FACE_TAG, VERTEX_EPSILON};
use cga_lite_core::{
    open_ring, AttrValue, Attributes, BoundingBox, CgaGeometry, Error, FaceKind, Point2, Polygon,
    Result,
};

/// Successful result of an operator
///
/// Failures are reported through [`cga_lite_core::Error`]; an operator never
/// returns partial geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorOutput {
    /// Geometry replacing the working geometry
    pub geometry: CgaGeometry,
    /// Attribute delta merged into the running attribute map
    pub attributes: Attributes,
    /// Human-readable summary of what the operator did
    pub message: String,
}

impl OperatorOutput {
    pub fn new(geometry: CgaGeometry, message: impl Into<String>) -> Self {
        Self {
            geometry,
            attributes: Attributes::default(),
            message: message.into(),
        }
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }
}

/// One flat piece of the working footprint
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FootprintPart {
    /// Exterior ring without a repeated closing vertex
    pub ring: Vec<Point2<f64>>,
    pub holes: Vec<Vec<Point2<f64>>>,
    pub elevation: f64,
    /// Source polygon tags other than its face kind
    pub tags: Attributes,
}

impl FootprintPart {
    fn from_polygon(polygon: &Polygon, reverse: bool) -> Result<Self> {
        let mut ring = open_ring(&polygon.footprint()).to_vec();
        let mut holes = polygon.hole_footprints();
        if reverse {
            ring.reverse();
            holes.iter_mut().for_each(|h| h.reverse());
        }
        require_vertices(&ring)?;

        let mut tags = polygon.tags.clone();
        tags.remove(FACE_TAG);
        Ok(Self {
            ring,
            holes,
            elevation: polygon.vertices.first().map(|p| p.z).unwrap_or(0.0),
            tags,
        })
    }

    /// Carry this part's tags onto a derived polygon without overriding its own
    pub fn carry_tags(&self, mut polygon: Polygon) -> Polygon {
        for (key, value) in &self.tags {
            polygon
                .tags
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        polygon
    }
}

/// Footprint pieces a footprint-driven operator works on
///
/// Flat geometry contributes every polygon except roof faces and the walls
/// and lid of a zero-height block, so the parts of a split, repeat or border
/// offset all carry forward. A volume contributes its `Footprint` surfaces
/// when it has any (an offset placed on top), otherwise the `Top` faces at the
/// top of its body with their winding restored. A volume with neither falls
/// back to its first polygon.
pub(crate) fn footprint_parts(geometry: &CgaGeometry) -> Result<Vec<FootprintPart>> {
    if geometry.polygons.is_empty() {
        return Err(Error::geometry("Geometry has no footprint polygon"));
    }

    if !geometry.is_volume() {
        return geometry
            .polygons
            .iter()
            .filter(|p| {
                !matches!(
                    p.face(),
                    Some(FaceKind::Roof | FaceKind::Side | FaceKind::Top)
                )
            })
            .map(|p| FootprintPart::from_polygon(p, false))
            .collect::<Result<Vec<_>>>()
            .and_then(non_empty);
    }

    let surfaces: Vec<&Polygon> = geometry
        .polygons
        .iter()
        .filter(|p| p.face() == Some(FaceKind::Footprint))
        .collect();
    if !surfaces.is_empty() {
        return surfaces
            .into_iter()
            .map(|p| FootprintPart::from_polygon(p, false))
            .collect();
    }

    let top = body_bounds(geometry).map(|b| b.max.z).unwrap_or(0.0);
    let tops: Vec<&Polygon> = geometry
        .polygons
        .iter()
        .filter(|p| {
            p.face() == Some(FaceKind::Top)
                && p.vertices.iter().all(|v| (v.z - top).abs() <= VERTEX_EPSILON)
        })
        .collect();
    if !tops.is_empty() {
        return tops
            .into_iter()
            .map(|p| FootprintPart::from_polygon(p, true))
            .collect();
    }

    FootprintPart::from_polygon(&geometry.polygons[0], false).map(|part| vec![part])
}

fn non_empty(parts: Vec<FootprintPart>) -> Result<Vec<FootprintPart>> {
    if parts.is_empty() {
        return Err(Error::geometry("Geometry has no footprint polygon"));
    }
    Ok(parts)
}

/// Bounds of everything except roof faces
pub(crate) fn body_bounds(geometry: &CgaGeometry) -> Option<BoundingBox> {
    BoundingBox::from_points(
        geometry
            .polygons
            .iter()
            .filter(|p| p.face() != Some(FaceKind::Roof))
            .flat_map(|p| p.vertices.iter()),
    )
}

/// Roof faces of a geometry, in order
pub(crate) fn roof_faces(geometry: &CgaGeometry) -> impl Iterator<Item = &Polygon> {
    geometry
        .polygons
        .iter()
        .filter(|p| p.face() == Some(FaceKind::Roof))
}

pub(crate) fn require_vertices(ring: &[Point2<f64>]) -> Result<()> {
    if ring.len() < 3 {
        return Err(Error::geometry(format!(
            "Polygon must have at least 3 vertices (got {})",
            ring.len()
        )));
    }
    Ok(())
}

pub(crate) fn require_finite(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::range(format!("{} must be finite, got {}", name, value)));
    }
    Ok(())
}
