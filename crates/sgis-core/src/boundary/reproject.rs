//! Built-in UTM-K to WGS84 boundary transform.

use std::fmt;

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use proj4rs::proj::Proj;
use serde_json::Value as JsonValue;

use super::{BoundaryTransform, AUXILIARY_COLUMNS};
use crate::api::{ApiError, Result};

/// EPSG:5179, Korea 2000 / Unified CS.
const UTMK_PROJ: &str = "+proj=tmerc +lat_0=38 +lon_0=127.5 +k=0.9996 +x_0=1000000 +y_0=2000000 \
                         +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs";

/// EPSG:4326.
const WGS84_PROJ: &str = "+proj=longlat +ellps=WGS84 +datum=WGS84 +no_defs";

/// Reprojects SGIS boundary GeoJSON from EPSG:5179 to EPSG:4326.
pub struct Utmk2Wgs84 {
    from: Proj,
    to: Proj,
}

impl fmt::Debug for Utmk2Wgs84 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Utmk2Wgs84")
            .field("from", &UTMK_PROJ)
            .field("to", &WGS84_PROJ)
            .finish()
    }
}

impl Utmk2Wgs84 {
    pub fn new() -> Result<Self> {
        let from = Proj::from_proj_string(UTMK_PROJ)
            .map_err(|e| ApiError::MissingDependency(format!("UTM-K projection: {:?}", e)))?;
        let to = Proj::from_proj_string(WGS84_PROJ)
            .map_err(|e| ApiError::MissingDependency(format!("WGS84 projection: {:?}", e)))?;
        Ok(Self { from, to })
    }

    /// Reproject a feature collection in place and strip what SGIS adds.
    pub fn transform_collection(&self, collection: &mut FeatureCollection) -> Result<()> {
        collection.bbox = None;
        collection.foreign_members = None;
        for feature in collection.features.iter_mut() {
            feature.id = None;
            feature.bbox = None;
            feature.foreign_members = None;
            if let Some(ref mut properties) = feature.properties {
                for column in AUXILIARY_COLUMNS {
                    properties.remove(column);
                }
            }
            if let Some(ref mut geometry) = feature.geometry {
                self.reproject_geometry(geometry)?;
            }
        }
        Ok(())
    }

    fn reproject_geometry(&self, geometry: &mut Geometry) -> Result<()> {
        geometry.bbox = None;
        geometry.foreign_members = None;
        match geometry.value {
            Value::Point(ref mut position) => self.reproject_position(position)?,
            Value::MultiPoint(ref mut positions) | Value::LineString(ref mut positions) => {
                for position in positions.iter_mut() {
                    self.reproject_position(position)?;
                }
            }
            Value::MultiLineString(ref mut lines) | Value::Polygon(ref mut lines) => {
                for line in lines.iter_mut() {
                    for position in line.iter_mut() {
                        self.reproject_position(position)?;
                    }
                }
            }
            Value::MultiPolygon(ref mut polygons) => {
                for polygon in polygons.iter_mut() {
                    for ring in polygon.iter_mut() {
                        for position in ring.iter_mut() {
                            self.reproject_position(position)?;
                        }
                    }
                }
            }
            Value::GeometryCollection(ref mut geometries) => {
                for inner in geometries.iter_mut() {
                    self.reproject_geometry(inner)?;
                }
            }
        }
        Ok(())
    }

    fn reproject_position(&self, position: &mut [f64]) -> Result<()> {
        if position.len() < 2 {
            return Err(ApiError::Decode(format!(
                "position needs at least two coordinates, got {}",
                position.len()
            )));
        }
        let mut point = (position[0], position[1], 0.0);
        proj4rs::transform::transform(&self.from, &self.to, &mut point)
            .map_err(|e| ApiError::Decode(format!("failed to reproject ({}, {}): {:?}", position[0], position[1], e)))?;

        // proj4rs yields geographic coordinates in radians.
        let lon = point.0.to_degrees();
        let lat = point.1.to_degrees();
        if !lon.is_finite() || !lat.is_finite() {
            return Err(ApiError::Decode(format!(
                "reprojection of ({}, {}) produced non-finite coordinates",
                position[0], position[1]
            )));
        }
        position[0] = lon;
        position[1] = lat;
        Ok(())
    }
}

impl BoundaryTransform for Utmk2Wgs84 {
    fn to_wgs84_geojson(&self, body: JsonValue) -> Result<String> {
        let mut collection = match GeoJson::from_json_value(body)
            .map_err(|e| ApiError::Decode(format!("boundary body is not GeoJSON: {}", e)))?
        {
            GeoJson::FeatureCollection(fc) => fc,
            GeoJson::Feature(feature) => single(feature),
            GeoJson::Geometry(geometry) => single(Feature {
                bbox: None,
                geometry: Some(geometry),
                id: None,
                properties: None,
                foreign_members: None,
            }),
        };
        self.transform_collection(&mut collection)?;
        serde_json::to_string(&collection)
            .map_err(|e| ApiError::Decode(format!("failed to serialize boundary: {}", e)))
    }
}

fn single(feature: Feature) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: vec![feature],
        foreign_members: None,
    }
}
