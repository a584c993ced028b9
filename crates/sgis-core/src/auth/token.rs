use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Refresh this long before the upstream expiry so a token fetched now is
/// still valid when the request carrying it lands.
pub const TOKEN_REFRESH_MARGIN_MILLIS: i64 = 10_000;

/// Consumer key/secret pair issued by SGIS.
#[derive(Clone)]
pub struct Credentials {
    key: String,
    secret: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"[redacted]")
            .finish()
    }
}

/// The `result` object of `/auth/authentication.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResult {
    #[serde(rename = "accessToken", default)]
    pub access_token: String,
    /// Expiry as epoch milliseconds. SGIS sends this as a string.
    #[serde(rename = "accessTimeout", default, deserialize_with = "millis_from_str_or_number")]
    pub access_timeout: i64,
}

impl AuthResult {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.access_timeout)
    }
}

fn millis_from_str_or_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Millis {
        Number(i64),
        Float(f64),
        Text(String),
    }

    match Millis::deserialize(deserializer)? {
        Millis::Number(n) => Ok(n),
        Millis::Float(f) => Ok(f as i64),
        Millis::Text(s) if s.trim().is_empty() => Ok(0),
        Millis::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub token: String,
    pub expires_at_millis: i64,
}

impl From<&AuthResult> for AuthToken {
    fn from(result: &AuthResult) -> Self {
        Self {
            token: result.access_token.clone(),
            expires_at_millis: result.access_timeout,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Freshness<'a> {
    Valid(&'a str),
    NeedsRefresh,
}

/// The one cached token a client holds. Absent until first use.
#[derive(Debug, Default)]
pub struct TokenState {
    current: Option<AuthToken>,
}

impl TokenState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether the cached token can be used at `now_millis`.
    pub fn check(&self, now_millis: i64) -> Freshness<'_> {
        match self.current {
            Some(ref t) if now_millis < t.expires_at_millis.saturating_sub(TOKEN_REFRESH_MARGIN_MILLIS) => {
                Freshness::Valid(&t.token)
            }
            _ => Freshness::NeedsRefresh,
        }
    }

    /// Replace the cached token; last write wins.
    pub fn store(&mut self, token: AuthToken) {
        self.current = Some(token);
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|t| t.token.as_str())
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn now_millis() -> i64 {
        Utc::now().timestamp_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_expiring_at(expires_at_millis: i64) -> TokenState {
        let mut state = TokenState::new();
        state.store(AuthToken {
            token: "tok".to_string(),
            expires_at_millis,
        });
        state
    }

    #[test]
    fn test_absent_needs_refresh() {
        assert_eq!(TokenState::new().check(0), Freshness::NeedsRefresh);
    }

    #[test]
    fn test_valid_before_margin() {
        let state = state_expiring_at(100_000);
        assert_eq!(state.check(89_999), Freshness::Valid("tok"));
    }

    #[test]
    fn test_margin_boundary_needs_refresh() {
        let state = state_expiring_at(100_000);
        assert_eq!(state.check(90_000), Freshness::NeedsRefresh);
        assert_eq!(state.check(150_000), Freshness::NeedsRefresh);
    }

    #[test]
    fn test_minimum_expiry_needs_refresh() {
        let result: AuthResult =
            serde_json::from_str(r#"{"accessToken":"tok","accessTimeout":"-9223372036854775808"}"#)
                .expect("Failed to parse auth result");
        let mut state = TokenState::new();
        state.store(AuthToken::from(&result));
        assert_eq!(state.check(0), Freshness::NeedsRefresh);
        assert_eq!(state.check(i64::MIN), Freshness::NeedsRefresh);
    }

    #[test]
    fn test_maximum_expiry_is_valid() {
        let state = state_expiring_at(i64::MAX);
        assert_eq!(state.check(TokenState::now_millis()), Freshness::Valid("tok"));
    }

    #[test]
    fn test_store_overwrites() {
        let mut state = state_expiring_at(100_000);
        state.store(AuthToken {
            token: "second".to_string(),
            expires_at_millis: 200_000,
        });
        assert_eq!(state.token(), Some("second"));
        state.clear();
        assert_eq!(state.token(), None);
    }

    #[test]
    fn test_auth_result_accepts_string_timeout() {
        let json = r#"{"accessToken":"abc-123","accessTimeout":"1700000000000"}"#;
        let result: AuthResult = serde_json::from_str(json).expect("Failed to parse auth result");
        assert_eq!(result.access_token, "abc-123");
        assert_eq!(result.access_timeout, 1_700_000_000_000);
        assert!(result.expires_at().is_some());
    }

    #[test]
    fn test_auth_result_accepts_numeric_timeout() {
        let json = r#"{"accessToken":"abc","accessTimeout":1700000000000}"#;
        let result: AuthResult = serde_json::from_str(json).expect("Failed to parse auth result");
        assert_eq!(result.access_timeout, 1_700_000_000_000);
    }

    #[test]
    fn test_auth_result_defaults_when_missing() {
        let result: AuthResult = serde_json::from_str("{}").expect("Failed to parse auth result");
        assert_eq!(result.access_token, "");
        assert_eq!(result.access_timeout, 0);
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = Credentials::new("key", "hunter2");
        let shown = format!("{:?}", creds);
        assert!(shown.contains("key"));
        assert!(!shown.contains("hunter2"));
    }
}
