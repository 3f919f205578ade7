//! Surveillance report CLI
//!
//! Prints surveillance views from a database file as JSON.
//!
//! Usage:
//!   surveillance-report --db <file> national
//!   surveillance-report --db <file> --role veterinarian --sector <s> ... dashboard
//!   surveillance-report --db <file> geo [--severity <s>] [--species <s>] [--mapped]
//!   surveillance-report --db <file> search-animals <query>
//!   surveillance-report --db <file> animals [--page <n>] [--limit <n>] [--search <s>]

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use surveillance_core::{
    AnimalPageQuery, Caller, Database, EngineConfig, GeoFeedFilter, PresentationStatus, Role,
    Severity, Surveillance,
};

#[derive(Parser)]
#[command(name = "surveillance-report")]
#[command(version)]
#[command(about = "Print livestock surveillance views as JSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database file
    #[arg(long)]
    db: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// User the report is run as
    #[arg(long, default_value = "cli")]
    user: String,

    /// veterinarian, admin or super_admin
    #[arg(long, default_value = "super_admin")]
    role: String,

    #[arg(long)]
    province: Option<String>,

    #[arg(long)]
    district: Option<String>,

    #[arg(long)]
    sector: Option<String>,

    /// Pretty-print output
    #[arg(long)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Country-wide rollups and trends (super_admin only)
    National,

    /// Dashboard for the caller's area
    Dashboard,

    /// Case map feed
    Geo {
        #[arg(long)]
        species: Option<String>,

        /// mild, moderate, severe or critical
        #[arg(long)]
        severity: Option<String>,

        /// active, treated, recovered or deceased
        #[arg(long)]
        status: Option<String>,

        /// Only cases with coordinates
        #[arg(long)]
        mapped: bool,
    },

    /// Search animals by tag, owner or breed
    SearchAnimals { query: String },

    /// Search cases by report id, disease or animal
    SearchCases { query: String },

    /// Distinct owner names in the caller's area
    Owners,

    /// Page through every animal (super_admin only)
    Animals {
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Page size; defaults to the configured page size
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long)]
        search: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = EngineConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let hierarchy = config.hierarchy().context("loading location hierarchy")?;
    let db = Database::open(&cli.db)
        .with_context(|| format!("opening database {}", cli.db.display()))?;

    let role = Role::parse(&cli.role).ok_or_else(|| anyhow!("unknown role {:?}", cli.role))?;
    let (province, district) = (cli.province.clone(), cli.district.clone());
    let mut caller = Caller::from_profile(cli.user, role, cli.province, cli.district, cli.sector);
    caller.scope = hierarchy
        .complete_scope(&caller.scope)
        .context("placing the caller's sector")?;
    let service = Surveillance::new(&db, &config, &hierarchy);

    let value = match cli.command {
        Commands::National => serde_json::to_value(service.get_national_overview(Some(&caller))?)?,
        Commands::Dashboard => serde_json::to_value(service.get_scoped_dashboard(Some(&caller))?)?,
        Commands::Geo {
            species,
            severity,
            status,
            mapped,
        } => {
            let filter = GeoFeedFilter {
                species,
                severity: severity
                    .map(|s| Severity::parse(&s).ok_or_else(|| anyhow!("unknown severity {:?}", s)))
                    .transpose()?,
                status: status
                    .map(|s| {
                        PresentationStatus::parse(&s).ok_or_else(|| anyhow!("unknown status {:?}", s))
                    })
                    .transpose()?,
                require_coordinates: mapped,
                ..Default::default()
            };
            serde_json::to_value(service.get_geo_feed(Some(&caller), &filter)?)?
        }
        Commands::SearchAnimals { query } => {
            serde_json::to_value(service.search_animals(Some(&caller), &query)?)?
        }
        Commands::SearchCases { query } => {
            serde_json::to_value(service.search_cases(Some(&caller), &query)?)?
        }
        Commands::Owners => serde_json::to_value(service.list_owners(Some(&caller))?)?,
        Commands::Animals {
            page,
            limit,
            search,
        } => {
            let query = AnimalPageQuery {
                page: Some(page),
                limit,
                province,
                district,
                search,
            };
            serde_json::to_value(service.list_animals_page(Some(&caller), &query)?)?
        }
    };

    let out = if cli.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    println!("{}", out);
    Ok(())
}
