mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use talentmatch::config::TalentConfig;
use talentmatch::ranking::WeightProfile;
use talentmatch::TalentEngine;

#[derive(Parser)]
#[command(
    name = "talentmatch",
    version,
    about = "Profile embeddings, semantic search and candidate ranking"
)]
struct Cli {
    /// Config file (defaults to ~/.talentmatch/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import profiles from a JSON array and embed them
    Import {
        file: PathBuf,
        /// Store the profiles without computing embeddings
        #[arg(long)]
        no_embed: bool,
    },
    /// Embed profiles that have no embedding yet
    Backfill,
    /// Show embedding coverage
    Coverage {
        #[arg(long)]
        json: bool,
    },
    /// Recompute one profile's embedding now
    Refresh { profile_id: String },
    /// Semantic search over profiles
    Search {
        query: String,
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Rank candidates for a staffing request
    Rank {
        /// Free-text request
        #[arg(long)]
        query: String,
        /// Candidate profile ids, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        candidates: Vec<String>,
        /// technical-role, management-role, innovative-project or employee-recommendations
        #[arg(long, default_value = "technical-role")]
        profile: WeightProfile,
        #[arg(long)]
        json: bool,
    },
    /// Rank opportunities (JSON file) for an employee
    Recommend {
        profile_id: String,
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TalentConfig::load_from(path)?,
        None => TalentConfig::load()?,
    };

    // Log to stderr so stdout stays clean for --json output.
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let engine = match TalentEngine::open(config) {
        Ok(engine) => engine,
        Err(e) => {
            if e.is_fatal() {
                tracing::error!(error = %e, "refusing to start");
            }
            return Err(e.into());
        }
    };

    match cli.command {
        Command::Import { file, no_embed } => cli::import::import(&engine, &file, no_embed).await?,
        Command::Backfill => cli::backfill::backfill(&engine).await?,
        Command::Coverage { json } => cli::coverage::coverage(&engine, json).await?,
        Command::Refresh { profile_id } => cli::refresh::refresh(&engine, &profile_id).await?,
        Command::Search {
            query,
            threshold,
            limit,
            json,
        } => cli::search::search(&engine, &query, threshold, limit, json).await?,
        Command::Rank {
            query,
            candidates,
            profile,
            json,
        } => cli::rank::rank(&engine, &query, &candidates, profile, json).await?,
        Command::Recommend {
            profile_id,
            file,
            json,
        } => cli::recommend::recommend(&engine, &profile_id, &file, json).await?,
    }

    Ok(())
}
