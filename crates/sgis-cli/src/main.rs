//! sgis - command line access to the SGIS statistical geographic API.
//!
//! Credentials come from `~/.config/sgis-client/config.json`, `SGIS_*`
//! environment variables, or a `.env` file in the working directory.

use std::io;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sgis_core::geocode::DEFAULT_GEOCODE_LIMIT;
use sgis_core::{BoundaryRequest, Config, CoordinateSystem, LowSearch, SgisClient};

#[derive(Parser, Debug)]
#[command(name = "sgis", version, about = "Query the SGIS statistical geographic API")]
struct Cli {
    /// Override the API base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Authenticate and print the access token result
    Auth,

    /// Fetch administrative boundaries as WGS84 GeoJSON
    Boundary {
        /// Administrative area code (omit for the top level)
        #[arg(long)]
        adm_cd: Option<String>,

        /// Child levels to include: 0, 1 or 2
        #[arg(long, default_value = "1")]
        low_search: String,

        /// Reference year, 2000 to 2023
        #[arg(long, default_value = "2023")]
        year: String,
    },

    /// Geocode a free-text address
    Geocode {
        address: String,

        /// Zero based page index
        #[arg(long, default_value_t = 0)]
        page: u32,

        /// Results per page
        #[arg(long, default_value_t = DEFAULT_GEOCODE_LIMIT)]
        limit: u32,

        /// Return UTM-K (EPSG:5179) coordinates instead of WGS84
        #[arg(long)]
        utmk: bool,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=sgis_core=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    let cli = Cli::parse();

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(base_url) = cli.base_url {
        config.base_url = Some(base_url);
    }
    let mut client = SgisClient::from_config(&config)?;
    info!(base_url = client.base_url(), "SGIS client ready");

    match cli.command {
        Command::Auth => {
            let result = client.auth().await.context("Authentication failed")?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Boundary {
            adm_cd,
            low_search,
            year,
        } => {
            let mut request = BoundaryRequest::new()
                .low_search(low_search.parse::<LowSearch>()?)
                .year(year);
            if let Some(adm_cd) = adm_cd {
                request = request.adm_cd(adm_cd);
            }
            let geojson = client
                .hadm_area(&request)
                .await
                .context("Boundary request failed")?;
            println!("{}", geojson);
        }
        Command::Geocode {
            address,
            page,
            limit,
            utmk,
        } => {
            let coordinate_system = if utmk {
                CoordinateSystem::UtmK
            } else {
                CoordinateSystem::Wgs84
            };
            let records = client
                .geocode(&address, page, limit, coordinate_system)
                .await
                .context("Geocode request failed")?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_geocode_args() {
        let cli = Cli::parse_from(["sgis", "geocode", "세종대로 110", "--limit", "3", "--utmk"]);
        match cli.command {
            Command::Geocode {
                address,
                page,
                limit,
                utmk,
            } => {
                assert_eq!(address, "세종대로 110");
                assert_eq!(page, 0);
                assert_eq!(limit, 3);
                assert!(utmk);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_boundary_defaults() {
        let cli = Cli::parse_from(["sgis", "--base-url", "http://localhost", "boundary"]);
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost"));
        match cli.command {
            Command::Boundary {
                adm_cd,
                low_search,
                year,
            } => {
                assert_eq!(adm_cd, None);
                assert_eq!(low_search, "1");
                assert_eq!(year, "2023");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
