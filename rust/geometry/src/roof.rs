// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roof generation
//!
//! Pitched roofs are approximated by a single ridge point above the footprint
//! centroid at `ridgeHeight = eave + multiplier·eave` (gable 0.3, hip and
//! shed 0.2). True multi-plane roof geometry is not computed.

use crate::operator::{body_bounds, footprint_parts, require_finite, OperatorOutput};
use cga_lite_core::{centroid, CgaGeometry, Error, FaceKind, Point3, Polygon, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Roof shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoofKind {
    Flat,
    Gable,
    Hip,
    Shed,
}

impl RoofKind {
    /// Ridge rise as a fraction of the eave height
    pub fn ridge_multiplier(&self) -> f64 {
        match self {
            RoofKind::Flat => 0.0,
            RoofKind::Gable => 0.3,
            RoofKind::Hip | RoofKind::Shed => 0.2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoofKind::Flat => "flat",
            RoofKind::Gable => "gable",
            RoofKind::Hip => "hip",
            RoofKind::Shed => "shed",
        }
    }
}

impl fmt::Display for RoofKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Add a roof to the working geometry
///
/// `height` is the eave height and defaults to the top of the geometry's
/// non-roof faces. Every footprint part gets its own roof.
/// `pitch` (degrees) must lie in [0, 90] and is recorded as metadata. Roof
/// faces are appended after the existing polygons.
pub fn roof_geometry(
    geometry: &CgaGeometry,
    kind: RoofKind,
    pitch: Option<f64>,
    height: Option<f64>,
) -> Result<OperatorOutput> {
    if let Some(pitch) = pitch {
        require_finite("Roof pitch", pitch)?;
        if !(0.0..=90.0).contains(&pitch) {
            return Err(Error::range(format!(
                "Roof pitch must be within [0, 90] degrees, got {}",
                pitch
            )));
        }
    }
    if let Some(height) = height {
        require_finite("Roof height", height)?;
        if height < 0.0 {
            return Err(Error::range(format!("Roof height must be non-negative, got {}", height)));
        }
    }

    let parts = footprint_parts(geometry)?;
    let eave = height.unwrap_or_else(|| body_bounds(geometry).map(|b| b.max.z).unwrap_or(0.0));
    let ridge_height = eave + kind.ridge_multiplier() * eave;

    let mut polygons = geometry.polygons.clone();
    for part in &parts {
        let ring = &part.ring;
        match kind {
            RoofKind::Flat => {
                let mut face = Polygon::from_footprint(ring, eave).with_face(FaceKind::Roof);
                for hole in &part.holes {
                    face.add_hole(Polygon::from_footprint(hole, eave).vertices);
                }
                polygons.push(part.carry_tags(face));
            }
            RoofKind::Gable | RoofKind::Hip | RoofKind::Shed => {
                let c = centroid(ring).ok_or_else(|| Error::geometry("Empty footprint"))?;
                let ridge = Point3::new(c.x, c.y, ridge_height);
                let n = ring.len();
                for i in 0..n {
                    let a = ring[i];
                    let b = ring[(i + 1) % n];
                    let face = Polygon::new(vec![
                        Point3::new(a.x, a.y, eave),
                        Point3::new(b.x, b.y, eave),
                        ridge,
                    ])
                    .with_face(FaceKind::Roof);
                    polygons.push(part.carry_tags(face));
                }
            }
        }
    }

    let mut out = OperatorOutput::new(
        CgaGeometry::new(polygons),
        format!("Added {} roof at eave height {}", kind, eave),
    )
    .with_attr("roofType", kind.as_str())
    .with_attr("eaveHeight", eave)
    .with_attr("ridgeHeight", ridge_height)
    .with_attr("roofHeight", ridge_height - eave);
    if let Some(pitch) = pitch {
        out = out.with_attr("roofPitch", pitch);
    }
    Ok(out)
}
