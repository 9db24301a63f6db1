// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Execution input and output records

use cga_lite_core::{Attributes, BoundingBox, CgaGeometry, Crs, CrsCandidate, Error, Point2, Point3};
use serde::{Deserialize, Serialize};

/// A lot polygon and everything known about it before rules run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryContext {
    /// Lot outline in CRS units; a repeated closing vertex is allowed
    pub polygon: Vec<Point2<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default)]
    pub attributes: Attributes,
    /// Overrides the interpreter's default CRS for this lot
    ///
    /// Kept unvalidated until execution, where a malformed record fails the
    /// run with a schema error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<CrsCandidate>,
}

impl GeometryContext {
    pub fn new(polygon: Vec<Point2<f64>>) -> Self {
        let bounding_box = BoundingBox::from_points(
            polygon
                .iter()
                .map(|p| Point3::new(p.x, p.y, 0.0))
                .collect::<Vec<_>>()
                .iter(),
        );
        Self {
            polygon,
            bounding_box,
            attributes: Attributes::default(),
            crs: None,
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_crs(mut self, crs: &Crs) -> Self {
        self.crs = Some(CrsCandidate::from(crs));
        self
    }
}

/// Stage at which an execution stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionPhase {
    /// Program decoding or lot validation
    Validating,
    /// Applying rules
    Running,
}

/// Error payload of a failed execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionError {
    pub message: String,
    pub code: String,
    pub phase: ExecutionPhase,
    /// Index of the rule that failed, absent for validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_index: Option<usize>,
}

impl ExecutionError {
    pub fn new(error: &Error, phase: ExecutionPhase, rule_index: Option<usize>) -> Self {
        Self {
            message: error.to_string(),
            code: error.kind().to_string(),
            phase,
            rule_index,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionMetadata {
    pub operation_count: usize,
    pub execution_time_ms: f64,
}

/// Outcome of running one program against one lot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleExecutionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<CgaGeometry>,
    /// Final attributes on success, attributes as of the failure otherwise
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ExecutionError>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub metadata: ExecutionMetadata,
}

impl RuleExecutionResult {
    pub fn error_code(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.code.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cga_lite_core::AttrValue;

    #[test]
    fn context_computes_bounds() {
        let ctx = GeometryContext::new(vec![
            Point2::new(-2.0, 1.0),
            Point2::new(8.0, 1.0),
            Point2::new(8.0, 6.0),
        ]);
        let bbox = ctx.bounding_box.unwrap();
        assert_eq!(bbox.min, Point3::new(-2.0, 1.0, 0.0));
        assert_eq!(bbox.max, Point3::new(8.0, 6.0, 0.0));
    }

    #[test]
    fn context_deserializes_from_host_json() {
        let ctx: GeometryContext = serde_json::from_value(serde_json::json!({
            "polygon": [[0, 0], [10, 0], [10, 10]],
            "attributes": {"lotId": "A-17", "maxHeight": 30},
            "crs": {"epsg": 4326, "name": "WGS 84", "units": "degrees", "type": "geographic"}
        }))
        .unwrap();
        assert_eq!(ctx.polygon.len(), 3);
        assert_eq!(ctx.attributes.get("maxHeight"), Some(&AttrValue::Number(30.0)));
        let crs = cga_lite_core::validate_crs(&ctx.crs.unwrap()).unwrap();
        assert!(crs.is_geographic());
    }

    #[test]
    fn failure_serializes_camel_case() {
        let result = RuleExecutionResult {
            success: false,
            geometry: None,
            attributes: Attributes::default(),
            error: Some(ExecutionError::new(
                &Error::range("negative height"),
                ExecutionPhase::Running,
                Some(2),
            )),
            warnings: Vec::new(),
            metadata: ExecutionMetadata {
                operation_count: 2,
                execution_time_ms: 0.5,
            },
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["error"]["code"], "RANGE_ERROR");
        assert_eq!(json["error"]["ruleIndex"], 2);
        assert_eq!(json["error"]["phase"], "running");
        assert_eq!(json["metadata"]["operationCount"], 2);
        assert!(json.get("geometry").is_none());
        assert_eq!(result.error_code(), Some("RANGE_ERROR"));
    }
}
