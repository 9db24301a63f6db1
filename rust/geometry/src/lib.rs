// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CGA-Lite Operator Library
//!
//! Stateless geometric operators used by rule programs: extrude, offset,
//! setback, split, repeat, roof, texture tagging and 2D boolean operations
//! (i_overlay). Every operator borrows its inputs and returns fresh geometry
//! plus an attribute delta; none of them mutate their arguments.

pub mod bool2d;
pub mod extrusion;
pub mod offset;
pub mod operator;
pub mod roof;
pub mod subdivide;
pub mod texture;

pub use bool2d::{boolean_op, clip_regions, BooleanOp, Region};
pub use extrusion::{extrude, extrude_geometry, prism};
pub use offset::{offset, offset_geometry, offset_ring, setback_geometry, OffsetMode};
pub use operator::OperatorOutput;
pub use roof::{roof_geometry, RoofKind};
pub use subdivide::{
    repeat_geometry, resolve_split_sizes, split_geometry, FillMarker, SplitSize, MAX_REPEAT_COUNT,
};
pub use texture::{texture_tag, TEXTURE_TAG};

pub use cga_lite_core::{Error, Result};
