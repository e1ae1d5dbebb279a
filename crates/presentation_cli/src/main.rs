//! PlaceFinder CLI
//!
//! Runs place searches and reverse lookups from the command line.

#![allow(clippy::print_stdout)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use domain::SearchQuery;
use infrastructure::{AppConfig, TelemetryConfig, build_search_service, init_telemetry};

/// Places listed by `search` without `--json`
const SUMMARY_LIMIT: usize = 10;

/// PlaceFinder CLI
#[derive(Parser)]
#[command(name = "placefinder")]
#[command(author, version, about = "Find places near an address or coordinates", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (default: ./config.toml when present)
    #[arg(short, long, env = "PLACEFINDER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for places of a type around a location
    ///
    /// Example: placefinder search cafetería --location "Calle Mayor 5, Madrid"
    /// Example: placefinder search museum --lat 40.4168 --lng -3.7038 --radius 2000
    Search {
        /// Place type, e.g. "farmacia" or "park"
        query: String,

        /// Latitude of the search center
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude of the search center
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,

        /// Address to search around when no coordinates are given
        #[arg(short, long)]
        location: Option<String>,

        /// Search radius in meters (configured default when omitted)
        #[arg(short, long)]
        radius: Option<u32>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the address at a point
    Reverse {
        /// Latitude
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },

    /// Print the effective configuration as TOML
    Config,

    /// Check server health (used by Docker healthcheck)
    Health {
        /// Server URL
        #[arg(short, long, default_value = "http://localhost:3000")]
        url: String,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Format endpoint URL
fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_telemetry(&TelemetryConfig {
        log_filter: log_filter_from_verbosity(cli.verbose).to_string(),
        json: false,
    })?;

    match cli.command {
        Commands::Search {
            query,
            lat,
            lng,
            location,
            radius,
            json,
        } => {
            let config = load_config(cli.config.as_ref())?;
            let service = build_search_service(&config)?;

            let result = service
                .search(SearchQuery {
                    query,
                    lat,
                    lng,
                    location_text: location,
                    radius_meters: radius.unwrap_or(config.search.default_radius_meters),
                })
                .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!(
                    "Center: {:.5}, {:.5} (radius {} m)\n",
                    result.center.latitude(),
                    result.center.longitude(),
                    result.radius_meters
                );
                println!("{}", result.format_summary(SUMMARY_LIMIT));
            }
        },

        Commands::Reverse { lat, lng } => {
            let config = load_config(cli.config.as_ref())?;
            let service = build_search_service(&config)?;

            match service.reverse_geocode(lat, lng).await? {
                Some(address) => println!("{address}"),
                None => println!("No address known at {lat}, {lng}"),
            }
        },

        Commands::Config => {
            let config = load_config(cli.config.as_ref())?;
            println!("{}", toml::to_string_pretty(&config)?);
        },

        Commands::Health { url } => {
            let client = reqwest::Client::new();
            match client.get(endpoint_url(&url, "/health")).send().await {
                Ok(resp) if resp.status().is_success() => {
                    println!("Healthy");
                    std::process::exit(0);
                },
                Ok(resp) => {
                    println!("Unhealthy: HTTP {}", resp.status());
                    std::process::exit(1);
                },
                Err(e) => {
                    println!("Unhealthy: {e}");
                    std::process::exit(1);
                },
            }
        },
    }

    Ok(())
}
