// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Execution state and the per-rule transition

use crate::program::Rule;
use cga_lite_core::attributes::number;
use cga_lite_core::{
    compute_polygon_area, merge_attributes, AttrValue, Attributes, CgaGeometry, Error, Point2,
    Result,
};
use cga_lite_geometry::{
    extrude_geometry, offset_geometry, repeat_geometry, roof_geometry, setback_geometry,
    split_geometry, texture_tag, OperatorOutput,
};

/// Geometry, attributes and running metrics between two rules
///
/// [`ExecutionState::apply`] never mutates `self`; a failed rule leaves the
/// previous state intact so its attributes can be reported.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionState {
    pub geometry: CgaGeometry,
    pub attributes: Attributes,
    /// Sum of extrusion heights, `None` until the first extrude
    pub total_height: Option<f64>,
    pub total_volume: f64,
    pub operation_count: usize,
}

impl ExecutionState {
    /// Initial state over a normalized (counter-clockwise) lot footprint
    ///
    /// Attribute precedence, lowest first: lot attributes, program
    /// attributes, derived `baseArea`.
    pub fn initial(footprint: &[Point2<f64>], lot: &Attributes, program: &Attributes) -> Self {
        let mut attributes = merge_attributes(lot, program);
        attributes.insert(
            "baseArea".to_string(),
            AttrValue::Number(compute_polygon_area(footprint)),
        );
        Self {
            geometry: CgaGeometry::surface(footprint),
            attributes,
            total_height: None,
            total_volume: 0.0,
            operation_count: 0,
        }
    }

    /// Apply one rule, returning the successor state
    pub fn apply(&self, rule: &Rule) -> Result<ExecutionState> {
        let output = self.run_operator(rule)?;

        let total_height = match rule {
            Rule::Extrude { height } => Some(self.total_height.map_or(*height, |t| t + height)),
            _ => self.total_height,
        };
        let total_volume = self.total_volume + number(&output.attributes, "volume").unwrap_or(0.0);

        let mut attributes = merge_attributes(&self.attributes, &output.attributes);
        if let Some(h) = total_height {
            attributes.insert("totalHeight".to_string(), AttrValue::Number(h));
        }
        attributes.insert("totalVolume".to_string(), AttrValue::Number(total_volume));

        Ok(ExecutionState {
            geometry: output.geometry,
            attributes,
            total_height,
            total_volume,
            operation_count: self.operation_count + 1,
        })
    }

    fn run_operator(&self, rule: &Rule) -> Result<OperatorOutput> {
        let geometry = &self.geometry;
        match rule {
            Rule::Extrude { height } => extrude_geometry(geometry, *height),
            Rule::Offset { distance, mode } => offset_geometry(geometry, *distance, *mode),
            Rule::Setback { distance, faces } => {
                let requested = distance.requested(faces.as_deref())?;
                setback_geometry(geometry, &requested)
            }
            Rule::Split { axis, sizes } => split_geometry(geometry, *axis, sizes),
            Rule::Repeat { axis, step, limit } => repeat_geometry(geometry, *axis, *step, *limit),
            Rule::Roof {
                kind,
                pitch,
                height,
            } => roof_geometry(geometry, *kind, *pitch, *height),
            Rule::TextureTag { tag, faces } => texture_tag(geometry, tag, faces.as_deref()),
            Rule::Attr { name, value } => set_attribute(geometry, name, value),
        }
    }

    /// Final geometry with the running attributes attached
    pub fn into_geometry(self) -> CgaGeometry {
        let mut geometry = self.geometry;
        geometry.attributes = merge_attributes(&geometry.attributes, &self.attributes);
        geometry
    }
}

fn set_attribute(geometry: &CgaGeometry, name: &str, value: &AttrValue) -> Result<OperatorOutput> {
    if name.trim().is_empty() {
        return Err(Error::schema("Attribute name must not be empty"));
    }
    if let AttrValue::Number(n) = value {
        if !n.is_finite() {
            return Err(Error::range(format!("Attribute '{}' must be finite", name)));
        }
    }
    Ok(OperatorOutput::new(geometry.clone(), format!("Set attribute '{}'", name))
        .with_attr(name, value.clone()))
}
