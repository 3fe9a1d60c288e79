//! infraplan: placement analysis for public infrastructure.
//!
//! Geometry helpers, density grids and coverage analysis on top of the
//! recommendation backend, with generated data when the backend is down.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use commands::Context;
use infraplan_api_client::ApiError;
use infraplan_cli::output::Status;
use infraplan_core::config::Config;
use infraplan_core::error::exit_codes;
use infraplan_geo::{BoundingBox, FacilityType, GeoError};
use infraplan_telemetry::{LogFormat, TelemetryConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "infraplan")]
#[command(about = "Infrastructure placement analysis: coverage, density grids, recommendations")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (default: infraplan.toml, .infraplan.toml, .config/infraplan.toml)
    #[arg(short, long, global = true, env = "INFRAPLAN_CONFIG")]
    config: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log line format
    #[arg(long, global = true, default_value = "compact")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Area of interest; edges not given come from the `[area]` configuration
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct BboxArgs {
    /// Northern edge latitude
    #[arg(long, allow_hyphen_values = true)]
    north: Option<f64>,
    /// Southern edge latitude
    #[arg(long, allow_hyphen_values = true)]
    south: Option<f64>,
    /// Eastern edge longitude
    #[arg(long, allow_hyphen_values = true)]
    east: Option<f64>,
    /// Western edge longitude
    #[arg(long, allow_hyphen_values = true)]
    west: Option<f64>,
}

impl BboxArgs {
    /// Overlay the given edges on `base`
    pub fn resolve(&self, base: BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.north.unwrap_or(base.north),
            self.south.unwrap_or(base.south),
            self.east.unwrap_or(base.east),
            self.west.unwrap_or(base.west),
        )
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Great-circle distance between two points
    Distance {
        #[arg(allow_hyphen_values = true)]
        lat1: f64,
        #[arg(allow_hyphen_values = true)]
        lng1: f64,
        #[arg(allow_hyphen_values = true)]
        lat2: f64,
        #[arg(allow_hyphen_values = true)]
        lng2: f64,
    },

    /// Convert Web Mercator (EPSG:3857) meters to latitude/longitude
    Unproject {
        #[arg(allow_hyphen_values = true)]
        x: f64,
        #[arg(allow_hyphen_values = true)]
        y: f64,
        /// Clamp latitude to ±90 and wrap longitude into ±180
        #[arg(long)]
        clamp: bool,
    },

    /// Convert latitude/longitude to Web Mercator meters
    Project {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lng: f64,
    },

    /// Vertex-mean centroid of a polygon ring
    Centroid {
        /// Ring as `lat,lng;lat,lng;...`
        ring: String,
    },

    /// Test whether a point lies inside a polygon ring
    Contains {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lng: f64,
        /// Ring as `lat,lng;lat,lng;...`
        ring: String,
    },

    /// Approximate area of a bounding box in km²
    Area {
        #[command(flatten)]
        bbox: BboxArgs,
    },

    /// Coverage circles for a facility at a location
    Coverage {
        /// Facility type (school, hospital, clinic, kindergarten, college, university, fire_station)
        facility_type: String,
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lng: f64,
    },

    /// Show the coverage radius table in effect
    Radii,

    /// Density band color for a value
    Color {
        value: f64,
        /// Upper end of the scale
        #[arg(long, default_value_t = 100.0)]
        max: f64,
    },

    /// Population ranges of each density band
    Legend {
        /// Largest cell population
        max: f64,
    },

    /// Bin population points (JSON array of {lat, lng, intensity}) into hexagons
    Hexbin {
        /// Points file, `-` for stdin
        input: PathBuf,
        /// Cell size in degrees (default from configuration)
        #[arg(long)]
        cell_size: Option<f64>,
        /// Use H3 cells instead of rounded buckets
        #[arg(long)]
        h3: bool,
        /// H3 resolution (default from configuration)
        #[arg(long, requires = "h3")]
        resolution: Option<u8>,
        /// Print the cells as a GeoJSON FeatureCollection
        #[arg(long)]
        geojson: bool,
    },

    /// Summarize a GeoJSON population layer (Polygon features)
    PopulationLayer {
        /// GeoJSON file, `-` for stdin
        input: PathBuf,
        /// Print the cells as a GeoJSON FeatureCollection
        #[arg(long)]
        geojson: bool,
    },

    /// Query the recommendation backend
    Fetch {
        #[command(subcommand)]
        what: FetchCommand,
    },

    /// Coverage of the population by existing and proposed facilities
    Analyze {
        /// Facility type to analyze
        facility_type: String,
        #[command(flatten)]
        bbox: BboxArgs,
        /// Place a proposed facility at `lat,lng` (repeatable)
        #[arg(long = "add", value_name = "LAT,LNG")]
        proposed: Vec<String>,
        /// Also place the backend's recommendations
        #[arg(long)]
        with_recommendations: bool,
    },
}

#[derive(Subcommand)]
enum FetchCommand {
    /// Existing facilities of one or more types
    Facilities {
        /// Facility types
        #[arg(required = true)]
        types: Vec<String>,
        #[command(flatten)]
        bbox: BboxArgs,
    },
    /// Population density points
    Population {
        #[command(flatten)]
        bbox: BboxArgs,
    },
    /// Placement recommendations for a facility type
    Recommend {
        facility_type: String,
        #[command(flatten)]
        bbox: BboxArgs,
        /// Use the AI endpoint, which also weighs existing facilities
        #[arg(long)]
        ai: bool,
        /// Number of suggestions requested from the AI endpoint
        #[arg(long, requires = "ai")]
        count: Option<u32>,
    },
}

/// Strict facility type parse for command arguments
fn parse_type(tag: &str) -> Result<FacilityType> {
    tag.parse::<FacilityType>().map_err(|e| {
        anyhow::anyhow!(
            "{e} (expected one of: {})",
            FacilityType::ALL.map(|t| t.as_str()).join(", ")
        )
    })
}

fn run(cli: Cli) -> Result<()> {
    let telemetry = TelemetryConfig::default()
        .with_verbosity(cli.verbose)
        .with_format(cli.log_format);
    infraplan_telemetry::init_with_config(telemetry)?;

    let config = Config::load(cli.config.as_deref())?;
    tracing::debug!(
        session_id = infraplan_telemetry::session_id(),
        config = ?config.path,
        "starting"
    );
    let ctx = Context::new(config, cli.json)?;

    match cli.command {
        Commands::Distance {
            lat1,
            lng1,
            lat2,
            lng2,
        } => commands::geometry::distance(&ctx, lat1, lng1, lat2, lng2),
        Commands::Unproject { x, y, clamp } => commands::geometry::unproject(&ctx, x, y, clamp),
        Commands::Project { lat, lng } => commands::geometry::project(&ctx, lat, lng),
        Commands::Centroid { ring } => commands::geometry::centroid(&ctx, &ring),
        Commands::Contains { lat, lng, ring } => {
            commands::geometry::contains(&ctx, lat, lng, &ring)
        }
        Commands::Area { bbox } => commands::geometry::area(&ctx, &bbox),
        Commands::Coverage {
            facility_type,
            lat,
            lng,
        } => commands::grid::coverage(&ctx, FacilityType::from_tag(&facility_type), lat, lng),
        Commands::Radii => commands::grid::radii(&ctx),
        Commands::Color { value, max } => commands::grid::color(&ctx, value, max),
        Commands::Legend { max } => commands::grid::legend(&ctx, max),
        Commands::Hexbin {
            input,
            cell_size,
            h3,
            resolution,
            geojson,
        } => {
            let settings = ctx.config.schema.hexagon;
            let binning = if h3 {
                commands::grid::Binning::H3(resolution.unwrap_or(settings.h3_resolution))
            } else {
                commands::grid::Binning::Rounded(cell_size.unwrap_or(settings.cell_size_degrees))
            };
            commands::grid::hexbin(&ctx, &input, binning, geojson)
        }
        Commands::PopulationLayer { input, geojson } => {
            commands::grid::population_layer(&ctx, &input, geojson)
        }
        Commands::Fetch { what } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(async {
                match what {
                    FetchCommand::Facilities { types, bbox } => {
                        let types = types
                            .iter()
                            .map(|t| parse_type(t))
                            .collect::<Result<Vec<_>>>()?;
                        commands::backend::facilities(&ctx, &types, &bbox).await
                    }
                    FetchCommand::Population { bbox } => {
                        commands::backend::population(&ctx, &bbox).await
                    }
                    FetchCommand::Recommend {
                        facility_type,
                        bbox,
                        ai,
                        count,
                    } => {
                        let facility_type = parse_type(&facility_type)?;
                        commands::backend::recommend(&ctx, facility_type, &bbox, ai, count).await
                    }
                }
            })
        }
        Commands::Analyze {
            facility_type,
            bbox,
            proposed,
            with_recommendations,
        } => {
            let facility_type = parse_type(&facility_type)?;
            let proposed = proposed
                .iter()
                .map(|p| commands::parse_point(p))
                .collect::<Result<Vec<_>>>()?;
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(commands::backend::analyze(
                &ctx,
                facility_type,
                &bbox,
                &proposed,
                with_recommendations,
            ))
        }
    }
}

/// Report an error and pick the exit code for it
fn report(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<infraplan_core::Error>() {
        Status::report(e);
        return e.code.exit_code();
    }

    Status::error(&format!("{err:#}"));
    if let Some(e) = err.downcast_ref::<ApiError>() {
        e.exit_code()
    } else if err.downcast_ref::<GeoError>().is_some() {
        exit_codes::VALIDATION_ERROR
    } else {
        exit_codes::FAILURE
    }
}

fn main() {
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => report(&err),
    };
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_unproject_clamp_help() {
        let cmd = Cli::command();
        let unproject = cmd.find_subcommand("unproject").unwrap();
        let clamp = unproject
            .get_arguments()
            .find(|a| a.get_id() == "clamp")
            .unwrap();
        let help = clamp.get_help().unwrap().to_string();
        assert!(help.contains("±90"));
        assert!(help.contains("wrap longitude"));
    }

    #[test]
    fn test_parse_analyze_with_proposals() {
        let cli = Cli::try_parse_from([
            "infraplan",
            "analyze",
            "school",
            "--add",
            "42.87,74.59",
            "--add",
            "42.85,74.61",
            "--north",
            "42.95",
        ])
        .unwrap();
        let Commands::Analyze { proposed, bbox, .. } = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(proposed.len(), 2);
        assert_eq!(bbox.resolve(BoundingBox::BISHKEK).north, 42.95);
        assert_eq!(bbox.resolve(BoundingBox::BISHKEK).south, 42.8);
    }
}
