//! nomad-rank command-line interface.
//!
//! Runs the same queries as the MCP server against the local cache and prints
//! JSON to stdout. Logs go to stderr.

use anyhow::Result;
use clap::{Parser, Subcommand};
use nomad_core::{AppConfig, Engine, RecommendationFilters};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "nomad", version, about = "Rank cities for remote workers by cost, visa access and internet speed")]
struct Cli {
    /// Never contact upstream sites; serve the newest snapshot on disk
    #[arg(long, global = true)]
    cache_only: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Commands {
    /// Recommend cities that fit a monthly budget
    Recommend {
        /// Monthly budget in USD, e.g. "2000" or "$2,000"
        budget: String,
        /// Minimum average internet speed in Mbps (default: 25)
        #[arg(long)]
        min_speed: Option<String>,
        /// Include cities that need a visa
        #[arg(long, default_value_t = false)]
        any_visa: bool,
        /// Region to restrict to, e.g. "Europe" (default: Global)
        #[arg(long)]
        region: Option<String>,
        /// Maximum number of results
        #[arg(long)]
        top: Option<usize>,
        /// Comma-separated cities to use instead of the configured list
        #[arg(long, value_delimiter = ',')]
        cities: Option<Vec<String>>,
    },
    /// Print the combined, scored table
    Dataset,
    /// Print cost of living per city
    Costs {
        /// Case-insensitive city substring
        query: Option<String>,
    },
    /// Print internet speeds per country
    Speeds {
        /// Case-insensitive country substring
        query: Option<String>,
    },
    /// Print visa categories for the home passport
    Visa,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    let sources = nomad_client::sources(&config)?;
    let mut engine = Engine::new(config, sources);
    if cli.cache_only {
        engine.set_cache_only(true);
    }

    match run(&mut engine, cli.command).await {
        Ok(()) => Ok(()),
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("{}", err.user_hint());
            std::process::exit(1);
        }
    }
}

async fn run(engine: &mut Engine, command: Commands) -> Result<(), nomad_core::Error> {
    match command {
        Commands::Recommend { budget, min_speed, any_visa, region, top, cities } => {
            let filters = RecommendationFilters { budget, min_speed, visa_free_only: Some(!any_visa), region };
            let mut query = filters.to_query();
            if let Some(top) = top.filter(|t| *t > 0) {
                query.top_n = top;
            }
            print_json(&engine.recommend(&query, cities.as_deref()).await?)
        }
        Commands::Dataset => print_json(&engine.combined_dataset().await?),
        Commands::Costs { query } => print_json(&engine.cost_of_living(query.as_deref()).await?),
        Commands::Speeds { query } => print_json(&engine.internet_speeds(query.as_deref()).await?),
        Commands::Visa => print_json(&engine.visa_categories().await?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), nomad_core::Error> {
    let json = serde_json::to_string_pretty(value).map_err(|e| nomad_core::Error::InvalidInput(e.to_string()))?;
    println!("{json}");
    Ok(())
}
