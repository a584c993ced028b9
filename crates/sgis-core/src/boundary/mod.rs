//! Administrative boundary requests and the geometry capability they need.
//!
//! `hadmarea.geojson` is documented as WGS84 but SGIS actually returns
//! UTM-K (EPSG:5179) coordinates. The client never trusts the endpoint
//! name: boundary bodies always go through a `BoundaryTransform` that
//! reprojects them to WGS84 before they reach the caller.

#[cfg(feature = "geo")]
pub mod reproject;

use std::fmt;
use std::str::FromStr;

use crate::api::{ApiError, Result};

#[cfg(feature = "geo")]
pub use reproject::Utmk2Wgs84;

/// Oldest boundary year SGIS serves.
pub const MIN_BOUNDARY_YEAR: u16 = 2000;

/// Newest boundary year SGIS serves.
pub const MAX_BOUNDARY_YEAR: u16 = 2023;

/// Auxiliary label-point columns SGIS adds to every boundary feature.
pub const AUXILIARY_COLUMNS: [&str; 2] = ["x", "y"];

/// Turns a decoded `hadmarea.geojson` body into compact WGS84 GeoJSON.
///
/// The body arrives already parsed and past the `errCd` check, envelope
/// fields included. Implementations must treat the coordinates as
/// EPSG:5179, drop the `AUXILIARY_COLUMNS` properties, and serialize
/// without feature ids.
pub trait BoundaryTransform: Send + Sync {
    fn to_wgs84_geojson(&self, body: serde_json::Value) -> Result<String>;
}

/// The boundary transform compiled into this build, if any.
pub fn default_transform() -> Option<std::sync::Arc<dyn BoundaryTransform>> {
    #[cfg(feature = "geo")]
    {
        match Utmk2Wgs84::new() {
            Ok(t) => Some(std::sync::Arc::new(t)),
            Err(e) => {
                tracing::warn!(error = %e, "Built-in boundary transform unavailable");
                None
            }
        }
    }
    #[cfg(not(feature = "geo"))]
    {
        None
    }
}

pub(crate) fn missing_transform() -> ApiError {
    ApiError::MissingDependency(
        "boundary reprojection is not available in this build. Enable the `geo` feature of \
         sgis-core (`cargo add sgis-core --features geo`) or supply one with \
         `SgisClient::with_boundary_transform`"
            .to_string(),
    )
}

/// How many levels of child statistical units to include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LowSearch {
    /// Only the requested area.
    None,
    /// The area's direct children.
    #[default]
    One,
    /// Children and grandchildren.
    Two,
}

impl LowSearch {
    pub fn as_param(&self) -> &'static str {
        match self {
            LowSearch::None => "0",
            LowSearch::One => "1",
            LowSearch::Two => "2",
        }
    }
}

impl fmt::Display for LowSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

impl FromStr for LowSearch {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "0" => Ok(LowSearch::None),
            "1" => Ok(LowSearch::One),
            "2" => Ok(LowSearch::Two),
            other => Err(ApiError::InvalidArgument(format!(
                "low_search must be 0, 1 or 2, got {:?}",
                other
            ))),
        }
    }
}

/// Parameters for `SgisClient::hadm_area`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryRequest {
    /// Administrative area code; `None` requests the top level (provinces).
    pub adm_cd: Option<String>,
    pub low_search: LowSearch,
    /// Four digit reference year.
    pub year: String,
}

impl Default for BoundaryRequest {
    fn default() -> Self {
        Self {
            adm_cd: None,
            low_search: LowSearch::default(),
            year: MAX_BOUNDARY_YEAR.to_string(),
        }
    }
}

impl BoundaryRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn adm_cd(mut self, adm_cd: impl Into<String>) -> Self {
        self.adm_cd = Some(adm_cd.into());
        self
    }

    pub fn low_search(mut self, low_search: LowSearch) -> Self {
        self.low_search = low_search;
        self
    }

    pub fn year(mut self, year: impl Into<String>) -> Self {
        self.year = year.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        let year = self.year.as_str();
        let in_range = year.len() == 4
            && year.bytes().all(|b| b.is_ascii_digit())
            && year
                .parse::<u16>()
                .map(|y| (MIN_BOUNDARY_YEAR..=MAX_BOUNDARY_YEAR).contains(&y))
                .unwrap_or(false);
        if !in_range {
            return Err(ApiError::InvalidArgument(format!(
                "year must be between {} and {}, got {:?}",
                MIN_BOUNDARY_YEAR, MAX_BOUNDARY_YEAR, year
            )));
        }
        Ok(())
    }

    pub(crate) fn query(&self, access_token: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![("accessToken", access_token.to_string())];
        if let Some(ref adm_cd) = self.adm_cd {
            params.push(("adm_cd", adm_cd.clone()));
        }
        params.push(("low_search", self.low_search.as_param().to_string()));
        params.push(("year", self.year.clone()));
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_request() {
        let req = BoundaryRequest::default();
        assert_eq!(req.adm_cd, None);
        assert_eq!(req.low_search, LowSearch::One);
        assert_eq!(req.year, "2023");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_year_bounds() {
        assert!(BoundaryRequest::new().year("2000").validate().is_ok());
        assert!(BoundaryRequest::new().year("2023").validate().is_ok());
        assert!(BoundaryRequest::new().year("1999").validate().is_err());
        assert!(BoundaryRequest::new().year("2024").validate().is_err());
        assert!(BoundaryRequest::new().year("23").validate().is_err());
        assert!(BoundaryRequest::new().year("+202").validate().is_err());
    }

    #[test]
    fn test_query_omits_missing_adm_cd() {
        let params = BoundaryRequest::new().query("tok");
        assert!(!params.iter().any(|(k, _)| *k == "adm_cd"));

        let params = BoundaryRequest::new()
            .adm_cd("11")
            .low_search(LowSearch::None)
            .query("tok");
        assert!(params.contains(&("adm_cd", "11".to_string())));
        assert!(params.contains(&("low_search", "0".to_string())));
    }

    #[test]
    fn test_low_search_parse() {
        assert_eq!("2".parse::<LowSearch>().unwrap(), LowSearch::Two);
        assert!("3".parse::<LowSearch>().is_err());
        assert_eq!(LowSearch::None.to_string(), "0");
    }
}
