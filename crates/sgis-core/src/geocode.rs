//! Address geocoding parameters and results.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::api::ApiError;

/// One geocoding hit, passed through exactly as SGIS returns it.
/// Normally an object, but entries are never filtered or reshaped.
pub type GeocodeRecord = Value;

/// Default number of results per page.
pub const DEFAULT_GEOCODE_LIMIT: u32 = 5;

/// Coordinate system of the returned `x`/`y` fields. SGIS serves each one
/// from a separate endpoint with an otherwise identical contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateSystem {
    /// EPSG:4326 longitude/latitude.
    #[default]
    Wgs84,
    /// EPSG:5179 Korea 2000 / Unified CS, in metres.
    UtmK,
}

impl CoordinateSystem {
    pub(crate) fn endpoint(&self) -> &'static str {
        match self {
            CoordinateSystem::Wgs84 => "addr/geocodewgs84.json",
            CoordinateSystem::UtmK => "addr/geocode.json",
        }
    }

    pub fn epsg(&self) -> u32 {
        match self {
            CoordinateSystem::Wgs84 => 4326,
            CoordinateSystem::UtmK => 5179,
        }
    }
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinateSystem::Wgs84 => f.write_str("WGS84"),
            CoordinateSystem::UtmK => f.write_str("UTM-K"),
        }
    }
}

impl FromStr for CoordinateSystem {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wgs84" | "epsg:4326" | "4326" => Ok(CoordinateSystem::Wgs84),
            "utmk" | "utm-k" | "epsg:5179" | "5179" => Ok(CoordinateSystem::UtmK),
            other => Err(ApiError::InvalidArgument(format!(
                "unknown coordinate system {:?}",
                other
            ))),
        }
    }
}

/// Pull `resultdata` out of a geocode `result` object.
pub(crate) fn records(result: Value) -> Vec<GeocodeRecord> {
    match result {
        Value::Object(mut obj) => match obj.remove("resultdata") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
