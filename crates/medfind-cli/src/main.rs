mod backend;
mod catalog;
mod db;
mod geo;
mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use medfind_search::SearchRequest;
use tracing_subscriber::EnvFilter;

use crate::backend::{AppGeocoder, Storage};

#[derive(Debug, Parser)]
#[command(name = "medfind")]
#[command(about = "Find and compare hospitals offering a medical service")]
struct Cli {
    /// Read hospitals from a JSON fixture instead of `DATABASE_URL`
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for hospitals offering a service near a location
    Search {
        /// Service id to search for
        #[arg(long)]
        service: i64,
        /// City name (required)
        #[arg(long)]
        city: String,
        /// Area or neighbourhood within the city
        #[arg(long)]
        area: Option<String>,
        /// Caller latitude; used only together with --lon
        #[arg(long, allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Caller longitude; used only together with --lat
        #[arg(long, allow_negative_numbers = true)]
        lon: Option<f64>,
        /// Search radius in kilometres (defaults to MEDFIND_DEFAULT_RADIUS_KM)
        #[arg(long)]
        radius: Option<f64>,
    },
    /// Compare one service across specific hospitals
    Compare {
        /// Service id to compare
        #[arg(long)]
        service: i64,
        /// Comma-separated hospital ids
        #[arg(long, value_delimiter = ',', required = true)]
        hospitals: Vec<i64>,
    },
    /// Browse the service catalog to find service ids
    Services {
        #[command(subcommand)]
        command: ServicesCommands,
    },
    /// Review average and count for one hospital
    Stats {
        /// Hospital id
        #[arg(long)]
        hospital: i64,
    },
    /// Forward-geocode a free-text query
    Geocode {
        query: String,
    },
    /// Reverse-geocode a coordinate to city and area
    Reverse {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },
    /// Inspect the area gazetteer
    Gazetteer {
        #[command(subcommand)]
        command: GazetteerCommands,
    },
    /// Database operations
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum ServicesCommands {
    /// List every service, optionally within one category
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one service
    Show { id: i64 },
    /// Find services whose name contains a keyword
    Search { keyword: String },
}

#[derive(Debug, Subcommand)]
enum GazetteerCommands {
    /// List known areas of a city
    Areas { city: String },
    /// Print the coordinate of one area
    Lookup { city: String, area: String },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending schema migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = medfind_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let json = cli.json;

    match cli.command {
        Some(Commands::Search {
            service,
            city,
            area,
            lat,
            lon,
            radius,
        }) => {
            let svc = open_service(cli.fixture.as_deref(), &config).await?;
            let request = SearchRequest {
                service_id: service,
                latitude: lat,
                longitude: lon,
                city,
                area,
                radius_km: radius,
            };
            search::run_search(&svc, &request, json).await?;
        }
        Some(Commands::Compare { service, hospitals }) => {
            let svc = open_service(cli.fixture.as_deref(), &config).await?;
            search::run_compare(&svc, service, &hospitals, json).await?;
        }
        Some(Commands::Services { command }) => {
            let svc = open_service(cli.fixture.as_deref(), &config).await?;
            match command {
                ServicesCommands::List { category } => {
                    catalog::run_services_list(&svc, category.as_deref(), json).await?;
                }
                ServicesCommands::Show { id } => catalog::run_services_show(&svc, id, json).await?,
                ServicesCommands::Search { keyword } => {
                    catalog::run_services_search(&svc, &keyword, json).await?;
                }
            }
        }
        Some(Commands::Stats { hospital }) => {
            let svc = open_service(cli.fixture.as_deref(), &config).await?;
            catalog::run_stats(&svc, hospital, json).await?;
        }
        Some(Commands::Geocode { query }) => geo::run_geocode(&config, &query, json).await?,
        Some(Commands::Reverse { lat, lon }) => geo::run_reverse(&config, lat, lon, json).await?,
        Some(Commands::Gazetteer { command }) => {
            let gazetteer = geo::load_gazetteer(&config)?;
            match command {
                GazetteerCommands::Areas { city } => geo::run_gazetteer_areas(&gazetteer, &city),
                GazetteerCommands::Lookup { city, area } => {
                    geo::run_gazetteer_lookup(&gazetteer, &city, &area)?;
                }
            }
        }
        Some(Commands::Db { command }) => match command {
            DbCommands::Ping => db::run_db_ping(&config).await?,
            DbCommands::Migrate => db::run_db_migrate(&config).await?,
        },
        None => println!("medfind ready; run `medfind --help` for commands"),
    }

    Ok(())
}

async fn open_service(
    fixture: Option<&std::path::Path>,
    config: &medfind_core::AppConfig,
) -> anyhow::Result<search::Service> {
    let gazetteer = geo::load_gazetteer(config)?;
    let storage = Storage::open(fixture, config).await?;
    let geocoder = AppGeocoder::from_config(config)?;
    Ok(search::build_service(storage, geocoder, gazetteer, config))
}
