//! REST API client module for the SGIS OpenAPI3 services.
//!
//! This module provides the `SgisClient` for authenticating against SGIS
//! and fetching administrative boundaries and geocoding results.
//!
//! SGIS authenticates with a short-lived access token passed as a query
//! parameter, obtained from the consumer key/secret pair.

pub mod client;
pub mod envelope;
pub mod error;

pub use client::SgisClient;
pub use error::{ApiError, Result};
