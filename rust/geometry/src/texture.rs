// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Texture tagging of massing faces

use crate::operator::OperatorOutput;
use cga_lite_core::{CgaGeometry, Error, FaceKind, Result};

/// Polygon tag holding the assigned texture
pub const TEXTURE_TAG: &str = "texture";

/// Tag polygons whose face kind is in `faces` (all polygons when `None`)
pub fn texture_tag(geometry: &CgaGeometry, tag: &str, faces: Option<&[FaceKind]>) -> Result<OperatorOutput> {
    if tag.trim().is_empty() {
        return Err(Error::schema("Texture tag must not be empty"));
    }

    let mut tagged = 0usize;
    let polygons = geometry
        .polygons
        .iter()
        .map(|polygon| {
            let selected = match faces {
                None => true,
                Some(faces) => polygon.face().map_or(false, |f| faces.contains(&f)),
            };
            if selected {
                tagged += 1;
                polygon.clone().with_tag(TEXTURE_TAG, tag)
            } else {
                polygon.clone()
            }
        })
        .collect();

    Ok(OperatorOutput::new(
        CgaGeometry::new(polygons),
        format!("Tagged {} face(s) with texture '{}'", tagged, tag),
    )
    .with_attr("textureTag", tag)
    .with_attr("texturedFaces", tagged))
}
