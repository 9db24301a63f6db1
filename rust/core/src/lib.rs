// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # CGA-Lite Core
//!
//! Data model and input validation for procedural building massing.
//!
//! Lot polygons arrive with a CRS record. The [`GeometryValidator`] checks
//! vertex count, coordinate plausibility, winding order and
//! self-intersections; the normalizer then enforces counter-clockwise
//! exterior winding. Signed areas follow this engine's frame, in which a
//! negative shoelace sum means counter-clockwise.

pub mod attributes;
pub mod crs;
pub mod error;
pub mod normalize;
pub mod polygon;
pub mod validation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use attributes::{merge_attributes, AttrValue, Attributes};
pub use crs::{validate_crs, BuiltinCrsCatalog, Crs, CrsCandidate, CrsCatalog, CrsType, CrsUnits};
pub use error::{Error, Result};
pub use normalize::{
    compute_area_with_holes, compute_polygon_area, ensure_clockwise, ensure_counter_clockwise,
};
pub use polygon::{centroid, open_ring, ring_bounds, Axis, BoundingBox, CgaGeometry, FaceKind, Polygon};
pub use validation::{
    classify_winding, compute_signed_area, detect_self_intersections, validate_coordinate_units,
    validate_geometry_for_rules, GeometryValidator, SelfIntersection, UnitCheck, ValidationReport,
    Winding, MIN_AREA,
};
