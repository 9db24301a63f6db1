// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rule programs and their shape validation
//!
//! Programs usually arrive as JSON from an untrusted boundary, so
//! [`RuleProgram::from_json`] checks every rule's `type` tag before decoding
//! it; an unrecognized tag becomes [`Error::UnknownOperation`].

use cga_lite_core::{AttrValue, Attributes, Axis, Error, FaceKind, Result};
use cga_lite_geometry::{OffsetMode, RoofKind, SplitSize};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Tags of the rule language, in declaration order
pub const RULE_TAGS: [&str; 8] = [
    "extrude",
    "offset",
    "setback",
    "split",
    "repeat",
    "roof",
    "textureTag",
    "attr",
];

/// Setback distance: one value for every face, or one per named face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SetbackDistance {
    Uniform(f64),
    PerFace(BTreeMap<String, f64>),
}

impl SetbackDistance {
    /// Requested `(face, distance)` pairs, restricted to `faces` when given
    pub fn requested(&self, faces: Option<&[String]>) -> Result<Vec<(String, f64)>> {
        let pairs: Vec<(String, f64)> = match self {
            SetbackDistance::Uniform(d) => match faces {
                Some(faces) if !faces.is_empty() => {
                    faces.iter().map(|face| (face.clone(), *d)).collect()
                }
                _ => vec![("all".to_string(), *d)],
            },
            SetbackDistance::PerFace(map) => map
                .iter()
                .filter(|(face, _)| faces.map_or(true, |sel| sel.iter().any(|s| s == *face)))
                .map(|(face, d)| (face.clone(), *d))
                .collect(),
        };

        if pairs.is_empty() {
            return Err(Error::schema("Setback selects no face distances"));
        }
        Ok(pairs)
    }
}

/// One step of a rule program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Rule {
    Extrude {
        height: f64,
    },
    Offset {
        distance: f64,
        #[serde(default)]
        mode: OffsetMode,
    },
    Setback {
        distance: SetbackDistance,
        #[serde(default)]
        faces: Option<Vec<String>>,
    },
    Split {
        axis: Axis,
        sizes: Vec<SplitSize>,
    },
    Repeat {
        axis: Axis,
        step: f64,
        #[serde(default)]
        limit: Option<usize>,
    },
    Roof {
        kind: RoofKind,
        #[serde(default)]
        pitch: Option<f64>,
        #[serde(default)]
        height: Option<f64>,
    },
    TextureTag {
        tag: String,
        #[serde(default)]
        faces: Option<Vec<FaceKind>>,
    },
    Attr {
        name: String,
        value: AttrValue,
    },
}

impl Rule {
    pub fn tag(&self) -> &'static str {
        match self {
            Rule::Extrude { .. } => "extrude",
            Rule::Offset { .. } => "offset",
            Rule::Setback { .. } => "setback",
            Rule::Split { .. } => "split",
            Rule::Repeat { .. } => "repeat",
            Rule::Roof { .. } => "roof",
            Rule::TextureTag { .. } => "textureTag",
            Rule::Attr { .. } => "attr",
        }
    }
}

/// Ordered, declarative list of rules plus initial attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleProgram {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attrs: Attributes,
    pub rules: Vec<Rule>,
}

impl RuleProgram {
    pub fn new(name: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            attrs: Attributes::default(),
            rules,
        }
    }

    /// Decode and shape-check an untyped program
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::schema("Rule program must be a JSON object"))?;

        let name = object
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::schema("Rule program requires a string 'name'"))?
            .to_string();

        let description = match object.get("description") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(Error::schema("Rule program 'description' must be a string")),
        };

        let attrs = match object.get("attrs") {
            None | Some(Value::Null) => Attributes::default(),
            Some(raw) => serde_json::from_value(raw.clone())
                .map_err(|e| Error::schema(format!("Invalid program attrs: {}", e)))?,
        };

        let raw_rules = object
            .get("rules")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::schema("Rule program requires a 'rules' array"))?;

        let rules = raw_rules
            .iter()
            .enumerate()
            .map(|(index, raw)| decode_rule(index, raw))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name,
            description,
            attrs,
            rules,
        })
    }
}

fn decode_rule(index: usize, raw: &Value) -> Result<Rule> {
    let tag = raw
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::schema(format!("Rule {} requires a string 'type' tag", index)))?;

    if !RULE_TAGS.contains(&tag) {
        return Err(Error::UnknownOperation(format!("'{}' (rule {})", tag, index)));
    }

    serde_json::from_value(raw.clone())
        .map_err(|e| Error::schema(format!("Rule {} ({}): {}", index, tag, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_every_rule_kind() {
        let program = RuleProgram::from_json(&json!({
            "name": "mid-rise",
            "attrs": {"zoning": "MU-3"},
            "rules": [
                {"type": "setback", "distance": {"front": 6, "side": 3}, "faces": ["front", "side"]},
                {"type": "offset", "distance": -1.5},
                {"type": "extrude", "height": 24},
                {"type": "split", "axis": "z", "sizes": ["*", "*", 4]},
                {"type": "repeat", "axis": "x", "step": 6.0, "limit": 4},
                {"type": "roof", "kind": "hip", "pitch": 30},
                {"type": "textureTag", "tag": "brick", "faces": ["side"]},
                {"type": "attr", "name": "use", "value": "residential"}
            ]
        }))
        .unwrap();

        assert_eq!(program.rules.len(), 8);
        let tags: Vec<&str> = program.rules.iter().map(Rule::tag).collect();
        assert_eq!(tags, RULE_TAGS.to_vec());
        assert_eq!(
            program.rules[3],
            Rule::Split {
                axis: Axis::Z,
                sizes: vec![SplitSize::FILL, SplitSize::FILL, SplitSize::Fixed(4.0)],
            }
        );
        assert_eq!(
            program.rules[1],
            Rule::Offset {
                distance: -1.5,
                mode: OffsetMode::Inside
            }
        );
    }

    #[test]
    fn unknown_tag_is_unknown_operation() {
        let err = RuleProgram::from_json(&json!({
            "name": "bad",
            "rules": [{"type": "extrude", "height": 3}, {"type": "twist", "angle": 45}]
        }))
        .unwrap_err();
        assert_eq!(err.kind(), "UNKNOWN_OPERATION");
        assert!(err.to_string().contains("twist"));
    }

    #[test]
    fn malformed_known_rule_is_schema_error() {
        let err = RuleProgram::from_json(&json!({
            "name": "bad",
            "rules": [{"type": "extrude", "height": "tall"}]
        }))
        .unwrap_err();
        assert_eq!(err.kind(), "SCHEMA_ERROR");
    }

    #[test]
    fn program_shape_is_checked() {
        assert!(RuleProgram::from_json(&json!([1, 2])).is_err());
        assert!(RuleProgram::from_json(&json!({"rules": []})).is_err());
        assert!(RuleProgram::from_json(&json!({"name": "x"})).is_err());
        assert!(RuleProgram::from_json(&json!({"name": "x", "rules": [{"height": 3}]})).is_err());
    }

    #[test]
    fn per_face_setback_respects_selection() {
        let mut map = BTreeMap::new();
        map.insert("front".to_string(), 6.0);
        map.insert("rear".to_string(), 4.0);
        map.insert("side".to_string(), 2.0);
        let distance = SetbackDistance::PerFace(map);

        let all = distance.requested(None).unwrap();
        assert_eq!(all.len(), 3);

        let selected = distance
            .requested(Some(&["rear".to_string(), "side".to_string()]))
            .unwrap();
        assert_eq!(selected, vec![("rear".to_string(), 4.0), ("side".to_string(), 2.0)]);

        assert!(distance.requested(Some(&["roofline".to_string()])).is_err());
    }

    #[test]
    fn uniform_setback_labels() {
        let distance = SetbackDistance::Uniform(3.0);
        assert_eq!(distance.requested(None).unwrap(), vec![("all".to_string(), 3.0)]);
    }
}
