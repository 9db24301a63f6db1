// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon and CGA geometry definitions

use crate::attributes::{AttrValue, Attributes};
use nalgebra::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Distance below which two vertices are considered coincident
pub const VERTEX_EPSILON: f64 = 1e-9;

/// Tag key that records which face of a massing a polygon represents
pub const FACE_TAG: &str = "face";

/// Role of a polygon inside a massing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceKind {
    Footprint,
    Bottom,
    Top,
    Side,
    Roof,
    Floor,
    Part,
}

impl FaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaceKind::Footprint => "footprint",
            FaceKind::Bottom => "bottom",
            FaceKind::Top => "top",
            FaceKind::Side => "side",
            FaceKind::Roof => "roof",
            FaceKind::Floor => "floor",
            FaceKind::Part => "part",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "footprint" => Some(FaceKind::Footprint),
            "bottom" => Some(FaceKind::Bottom),
            "top" => Some(FaceKind::Top),
            "side" => Some(FaceKind::Side),
            "roof" => Some(FaceKind::Roof),
            "floor" => Some(FaceKind::Floor),
            "part" => Some(FaceKind::Part),
            _ => None,
        }
    }
}

/// Principal axis of the massing frame (z is vertical)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[inline]
    pub fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    #[inline]
    pub fn unit(&self) -> Vector3<f64> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

/// Planar polygon in 3D with optional holes and per-polygon tags
///
/// The exterior ring is not implicitly closed; edges wrap from the last
/// vertex back to the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub vertices: Vec<Point3<f64>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<Vec<Point3<f64>>>,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub tags: Attributes,
}

impl Polygon {
    pub fn new(vertices: Vec<Point3<f64>>) -> Self {
        Self {
            vertices,
            holes: Vec::new(),
            tags: Attributes::default(),
        }
    }

    /// Lift a 2D ring onto the plane `z = elevation`
    pub fn from_footprint(points: &[Point2<f64>], elevation: f64) -> Self {
        Self::new(points.iter().map(|p| Point3::new(p.x, p.y, elevation)).collect())
    }

    pub fn add_hole(&mut self, hole: Vec<Point3<f64>>) {
        self.holes.push(hole);
    }

    pub fn with_face(self, face: FaceKind) -> Self {
        self.with_tag(FACE_TAG, face.as_str())
    }

    pub fn with_tag(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.tags.insert(key.to_string(), value.into());
        self
    }

    pub fn face(&self) -> Option<FaceKind> {
        self.tags
            .get(FACE_TAG)
            .and_then(AttrValue::as_str)
            .and_then(FaceKind::parse)
    }

    /// XY projection of the exterior ring
    pub fn footprint(&self) -> Vec<Point2<f64>> {
        self.vertices.iter().map(|p| Point2::new(p.x, p.y)).collect()
    }

    /// XY projections of the holes
    pub fn hole_footprints(&self) -> Vec<Vec<Point2<f64>>> {
        self.holes
            .iter()
            .map(|h| h.iter().map(|p| Point2::new(p.x, p.y)).collect())
            .collect()
    }

    /// Copy of this polygon moved by `offset`
    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            vertices: self.vertices.iter().map(|p| p + offset).collect(),
            holes: self
                .holes
                .iter()
                .map(|h| h.iter().map(|p| p + offset).collect())
                .collect(),
            tags: self.tags.clone(),
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    /// Bounding box of a point set, `None` when empty
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let (min, max) = iter.fold((first, first), |(mut min, mut max), p| {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
            (min, max)
        });
        Some(Self { min, max })
    }

    #[inline]
    pub fn extent(&self, axis: Axis) -> f64 {
        let i = axis.index();
        self.max[i] - self.min[i]
    }
}

/// Result geometry of a rule program: polygons plus derived attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CgaGeometry {
    pub polygons: Vec<Polygon>,
    #[serde(default)]
    pub attributes: Attributes,
}

impl CgaGeometry {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self {
            polygons,
            attributes: Attributes::default(),
        }
    }

    /// Wrap a 2D lot polygon as a ground-level surface record
    pub fn surface(points: &[Point2<f64>]) -> Self {
        Self::new(vec![
            Polygon::from_footprint(points, 0.0).with_face(FaceKind::Footprint)
        ])
    }

    /// XY projection of the first polygon
    pub fn footprint(&self) -> Option<Vec<Point2<f64>>> {
        self.polygons.first().map(Polygon::footprint)
    }

    /// Bounds over all exterior vertices
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.polygons.iter().flat_map(|p| p.vertices.iter()))
    }

    /// True when the geometry spans a vertical range (has been extruded)
    pub fn is_volume(&self) -> bool {
        self.bounds()
            .map(|b| b.extent(Axis::Z) > VERTEX_EPSILON)
            .unwrap_or(false)
    }

    /// Highest z value, 0 for empty geometry
    pub fn top_elevation(&self) -> f64 {
        self.bounds().map(|b| b.max.z).unwrap_or(0.0)
    }
}

/// Drop a repeated closing vertex if the caller supplied one
pub fn open_ring(points: &[Point2<f64>]) -> &[Point2<f64>] {
    match (points.first(), points.last()) {
        (Some(first), Some(last))
            if points.len() > 1 && (first - last).norm() <= VERTEX_EPSILON =>
        {
            &points[..points.len() - 1]
        }
        _ => points,
    }
}

/// Vertex-average centroid of a ring (closing vertex ignored)
pub fn centroid(points: &[Point2<f64>]) -> Option<Point2<f64>> {
    let ring = open_ring(points);
    if ring.is_empty() {
        return None;
    }
    let sum = ring
        .iter()
        .fold(nalgebra::Vector2::zeros(), |acc, p| acc + p.coords);
    Some(Point2::from(sum / ring.len() as f64))
}

/// Compute bounding box of a 2D ring
pub fn ring_bounds(points: &[Point2<f64>]) -> Option<(Point2<f64>, Point2<f64>)> {
    let first = *points.first()?;
    Some(points.iter().skip(1).fold((first, first), |(mut min, mut max), p| {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
        (min, max)
    }))
}
