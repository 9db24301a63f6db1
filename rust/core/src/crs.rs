// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinate Reference System records
//!
//! A [`Crs`] is the validated form of a CRS record; a [`CrsCandidate`] is the
//! untrusted shape it is parsed from. Named records come from a [`CrsCatalog`]
//! that callers pass in by value.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Linear or angular unit of a CRS axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrsUnits {
    Meters,
    Feet,
    Degrees,
}

impl CrsUnits {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "meters" => Some(CrsUnits::Meters),
            "feet" => Some(CrsUnits::Feet),
            "degrees" => Some(CrsUnits::Degrees),
            _ => None,
        }
    }
}

/// Kind of coordinate frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrsType {
    Projected,
    Geographic,
    Compound,
}

impl CrsType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "projected" => Some(CrsType::Projected),
            "geographic" => Some(CrsType::Geographic),
            "compound" => Some(CrsType::Compound),
            _ => None,
        }
    }
}

/// Validated coordinate reference system (epsg is always > 0)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crs {
    pub epsg: u32,
    pub name: String,
    pub units: CrsUnits,
    #[serde(rename = "type")]
    pub crs_type: CrsType,
}

impl Crs {
    /// WGS 84 geographic coordinates
    pub fn wgs84() -> Self {
        Self {
            epsg: 4326,
            name: "WGS 84".to_string(),
            units: CrsUnits::Degrees,
            crs_type: CrsType::Geographic,
        }
    }

    /// WGS 84 / Pseudo-Mercator
    pub fn web_mercator() -> Self {
        Self {
            epsg: 3857,
            name: "WGS 84 / Pseudo-Mercator".to_string(),
            units: CrsUnits::Meters,
            crs_type: CrsType::Projected,
        }
    }

    /// WGS 84 / UTM zone `zone` (1..=60), northern or southern hemisphere
    pub fn utm(zone: u8, north: bool) -> Option<Self> {
        if !(1..=60).contains(&zone) {
            return None;
        }
        let base = if north { 32600 } else { 32700 };
        Some(Self {
            epsg: base + zone as u32,
            name: format!("WGS 84 / UTM zone {}{}", zone, if north { 'N' } else { 'S' }),
            units: CrsUnits::Meters,
            crs_type: CrsType::Projected,
        })
    }

    #[inline]
    pub fn is_geographic(&self) -> bool {
        self.units == CrsUnits::Degrees
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{} ({})", self.epsg, self.name)
    }
}

/// Unvalidated CRS record as it arrives from a host boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrsCandidate {
    pub epsg: f64,
    #[serde(default)]
    pub name: String,
    pub units: String,
    #[serde(rename = "type")]
    pub crs_type: String,
}

impl From<&Crs> for CrsCandidate {
    fn from(crs: &Crs) -> Self {
        Self {
            epsg: crs.epsg as f64,
            name: crs.name.clone(),
            units: format!("{:?}", crs.units).to_lowercase(),
            crs_type: format!("{:?}", crs.crs_type).to_lowercase(),
        }
    }
}

/// Validate a CRS record
///
/// Fails with [`Error::Schema`] when `epsg` is not a positive integer or when
/// `units`/`type` fall outside the enumerated sets.
pub fn validate_crs(candidate: &CrsCandidate) -> Result<Crs> {
    let epsg = candidate.epsg;
    if !epsg.is_finite() || epsg.fract() != 0.0 || epsg <= 0.0 || epsg > u32::MAX as f64 {
        return Err(Error::schema(format!(
            "CRS epsg must be a positive integer, got {}",
            epsg
        )));
    }

    let units = CrsUnits::parse(&candidate.units).ok_or_else(|| {
        Error::schema(format!(
            "CRS units must be one of meters, feet, degrees, got '{}'",
            candidate.units
        ))
    })?;

    let crs_type = CrsType::parse(&candidate.crs_type).ok_or_else(|| {
        Error::schema(format!(
            "CRS type must be one of projected, geographic, compound, got '{}'",
            candidate.crs_type
        ))
    })?;

    Ok(Crs {
        epsg: epsg as u32,
        name: candidate.name.clone(),
        units,
        crs_type,
    })
}

/// Source of named CRS records
pub trait CrsCatalog {
    /// Look up a CRS by EPSG code
    fn lookup(&self, epsg: u32) -> Option<Crs>;

    /// Look up a CRS by its exact name
    fn find_by_name(&self, name: &str) -> Option<Crs>;
}

/// Catalog of the CRS records commonly attached to lot polygons
#[derive(Debug, Clone, Default)]
pub struct BuiltinCrsCatalog;

impl BuiltinCrsCatalog {
    pub fn new() -> Self {
        Self
    }

    fn fixed() -> Vec<Crs> {
        vec![
            Crs::wgs84(),
            Crs::web_mercator(),
            Crs {
                epsg: 2227,
                name: "NAD83 / California zone 3 (ftUS)".to_string(),
                units: CrsUnits::Feet,
                crs_type: CrsType::Projected,
            },
            Crs {
                epsg: 9705,
                name: "WGS 84 + MSL height".to_string(),
                units: CrsUnits::Meters,
                crs_type: CrsType::Compound,
            },
        ]
    }
}

impl CrsCatalog for BuiltinCrsCatalog {
    fn lookup(&self, epsg: u32) -> Option<Crs> {
        match epsg {
            32601..=32660 => Crs::utm((epsg - 32600) as u8, true),
            32701..=32760 => Crs::utm((epsg - 32700) as u8, false),
            _ => Self::fixed().into_iter().find(|crs| crs.epsg == epsg),
        }
    }

    fn find_by_name(&self, name: &str) -> Option<Crs> {
        if let Some(fixed) = Self::fixed().into_iter().find(|crs| crs.name == name) {
            return Some(fixed);
        }

        // "WGS 84 / UTM zone 33N"
        let zone = name.strip_prefix("WGS 84 / UTM zone ")?;
        let hemisphere = zone.chars().last()?;
        let zone: u8 = zone[..zone.len() - hemisphere.len_utf8()].parse().ok()?;
        match hemisphere {
            'N' => Crs::utm(zone, true),
            'S' => Crs::utm(zone, false),
            _ => None,
        }
    }
}
