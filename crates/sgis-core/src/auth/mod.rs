//! Authentication state for SGIS access tokens.
//!
//! This module provides:
//! - `Credentials`: the consumer key/secret pair
//! - `TokenState`: the single cached access token and its freshness check
//!
//! Tokens live only in memory and are refreshed lazily, 10 seconds before
//! the expiry SGIS reports.

pub mod token;

pub use token::{AuthResult, AuthToken, Credentials, Freshness, TokenState, TOKEN_REFRESH_MARGIN_MILLIS};
