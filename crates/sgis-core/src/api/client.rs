//! API client for the SGIS OpenAPI3 REST services.
//!
//! This module provides the `SgisClient` struct, which owns the consumer
//! credentials and the cached access token, and exposes the boundary and
//! geocoding operations.
//!
//! Every operation that may refresh the token takes `&mut self`. Sharing one
//! client between tasks needs external synchronization such as
//! `tokio::sync::Mutex<SgisClient>`. Separate clients each hold their own
//! token and may refresh independently.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::auth::{AuthResult, AuthToken, Credentials, Freshness, TokenState};
use crate::boundary::{self, BoundaryRequest, BoundaryTransform};
use crate::config::Config;
use crate::geocode::{self, CoordinateSystem, GeocodeRecord};

use super::envelope;
use super::{ApiError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Base URL for all SGIS OpenAPI3 endpoints
pub const DEFAULT_BASE_URL: &str = "https://sgisapi.kostat.go.kr/OpenAPI3";

/// HTTP request timeout in seconds for the default HTTP client.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

const AUTH_PATH: &str = "auth/authentication.json";
const BOUNDARY_PATH: &str = "boundary/hadmarea.geojson";

/// API client for SGIS.
pub struct SgisClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
    token: TokenState,
    boundary: Option<Arc<dyn BoundaryTransform>>,
}

impl fmt::Debug for SgisClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SgisClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .field("has_token", &self.token.token().is_some())
            .field("has_boundary_transform", &self.boundary.is_some())
            .finish()
    }
}

impl SgisClient {
    /// Create a client for the public SGIS endpoint.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Result<Self> {
        Self::with_timeout(Credentials::new(key, secret), Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    fn with_timeout(credentials: Credentials, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials,
            token: TokenState::new(),
            boundary: boundary::default_transform(),
        })
    }

    /// Create a client from loaded configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs.unwrap_or(REQUEST_TIMEOUT_SECS));
        let mut client = Self::with_timeout(config.credentials()?, timeout)?;
        if let Some(ref base_url) = config.base_url {
            client = client.with_base_url(base_url.clone());
        }
        Ok(client)
    }

    /// Use a caller-owned HTTP client, sharing its connection pool.
    /// The caller's timeout settings apply from then on.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_boundary_transform(mut self, transform: Arc<dyn BoundaryTransform>) -> Self {
        self.boundary = Some(transform);
        self
    }

    pub fn without_boundary_transform(mut self) -> Self {
        self.boundary = None;
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The cached token, without checking or refreshing it.
    pub fn cached_token(&self) -> Option<&str> {
        self.token.token()
    }

    /// Drop the cached token so the next call re-authenticates.
    pub fn invalidate_token(&mut self) {
        self.token.clear();
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn fetch(&self, path: &str, query: &[(&str, String)]) -> Result<(StatusCode, Vec<u8>)> {
        let url = self.url(path);
        debug!(url = %url, "GET");

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(url = %url, status = %status, bytes = body.len(), "Response received");
        Ok((status, body.to_vec()))
    }

    // ===== Authentication =====

    /// Fetch a new access token, replacing any cached one.
    pub async fn auth(&mut self) -> Result<AuthResult> {
        let query = [
            ("consumer_key", self.credentials.key().to_string()),
            ("consumer_secret", self.credentials.secret().to_string()),
        ];
        let (status, body) = self.fetch(AUTH_PATH, &query).await?;
        let envelope = envelope::decode(status, &body)?;

        let result = match envelope::into_result(envelope) {
            Value::Null => AuthResult::default(),
            value => serde_json::from_value::<AuthResult>(value)
                .map_err(|e| ApiError::Decode(format!("auth result: {}", e)))?,
        };

        self.token.store(AuthToken::from(&result));
        debug!(expires_at = ?result.expires_at(), "Refreshed SGIS access token");
        Ok(result)
    }

    /// A token that is valid for at least the refresh margin, refreshing first if needed.
    pub async fn access_token(&mut self) -> Result<String> {
        if let Freshness::Valid(token) = self.token.check(TokenState::now_millis()) {
            return Ok(token.to_string());
        }
        self.auth().await?;
        Ok(self.token.token().unwrap_or_default().to_string())
    }

    // ===== Data Fetching Methods =====

    /// Fetch administrative boundaries as compact WGS84 GeoJSON.
    pub async fn hadm_area(&mut self, request: &BoundaryRequest) -> Result<String> {
        let transform = self.boundary.clone().ok_or_else(boundary::missing_transform)?;
        request.validate()?;

        let token = self.access_token().await?;
        let (status, body) = self.fetch(BOUNDARY_PATH, &request.query(&token)).await?;
        let envelope = envelope::decode(status, &body)?;

        transform.to_wgs84_geojson(envelope)
    }

    /// Geocode a free-text address.
    ///
    /// `page` is zero based. Records are returned exactly as SGIS sends them;
    /// a response without `resultdata` yields an empty vector.
    pub async fn geocode(
        &mut self,
        address: &str,
        page: u32,
        limit: u32,
        coordinate_system: CoordinateSystem,
    ) -> Result<Vec<GeocodeRecord>> {
        let token = self.access_token().await?;
        let query = [
            ("accessToken", token),
            ("address", address.to_string()),
            ("pagenum", page.to_string()),
            ("resultcount", limit.to_string()),
        ];
        let (status, body) = self.fetch(coordinate_system.endpoint(), &query).await?;
        let envelope = envelope::decode(status, &body)?;

        Ok(geocode::records(envelope::into_result(envelope)))
    }

    /// Geocode with results in WGS84 longitude/latitude.
    pub async fn geocode_wgs84(&mut self, address: &str, page: u32, limit: u32) -> Result<Vec<GeocodeRecord>> {
        self.geocode(address, page, limit, CoordinateSystem::Wgs84).await
    }

    /// Geocode with results in UTM-K metres.
    pub async fn geocode_utmk(&mut self, address: &str, page: u32, limit: u32) -> Result<Vec<GeocodeRecord>> {
        self.geocode(address, page, limit, CoordinateSystem::UtmK).await
    }
}
