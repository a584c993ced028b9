//! Client for the SGIS (statistical geographic information service) OpenAPI3.
//!
//! `SgisClient` authenticates with a consumer key/secret, keeps the access
//! token fresh, and exposes administrative boundary and geocoding lookups.
//! Boundaries come back as compact WGS84 GeoJSON; the upstream actually
//! serves UTM-K (EPSG:5179) and the client reprojects them.
//!
//! Reprojection lives behind the default `geo` feature. Without it, or
//! without a transform supplied through
//! [`SgisClient::with_boundary_transform`], boundary requests fail with
//! [`ApiError::MissingDependency`].

pub mod api;
pub mod auth;
pub mod boundary;
pub mod config;
pub mod geocode;

pub use api::{ApiError, Result, SgisClient};
pub use auth::{AuthResult, Credentials};
pub use boundary::{BoundaryRequest, BoundaryTransform, LowSearch};
pub use config::Config;
pub use geocode::{CoordinateSystem, GeocodeRecord};

#[cfg(feature = "geo")]
pub use boundary::Utmk2Wgs84;
