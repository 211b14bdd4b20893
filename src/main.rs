use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stage_analytics::api::{build_router, state::AppState};
use stage_analytics::calculate::StageAggregator;
use stage_analytics::config::AppConfig;
use stage_analytics::fetch::GraphqlClient;
use stage_analytics::models::{CharacterId, StageResult};
use stage_analytics::sources::{FixtureSource, MatchDataSource, StartggClient, TournamentSource};

#[derive(Parser)]
#[command(name = "stage-analytics")]
#[command(about = "Rank stages by a character's tournament win rate")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank stages by win rate for a character
    Stages {
        /// start.gg character id (e.g. 1302 for Mario)
        #[arg(long)]
        character: String,

        /// Tournaments to scan
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max_tournaments: Option<u32>,

        /// Minimum games on a stage to be ranked
        #[arg(long)]
        min_games: Option<u32>,

        /// Read tournament data from a JSON snapshot instead of the API
        #[arg(long)]
        fixture: Option<PathBuf>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the tournaments a stage query would scan
    Tournaments {
        /// Number of tournaments
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        limit: Option<u32>,

        /// Read tournament data from a JSON snapshot instead of the API
        #[arg(long)]
        fixture: Option<PathBuf>,
    },

    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,

        /// Serve data from a JSON snapshot instead of the API
        #[arg(long)]
        fixture: Option<PathBuf>,
    },
}

type Sources = (Arc<dyn TournamentSource>, Arc<dyn MatchDataSource>);

/// Pick the fixture snapshot if given, otherwise the live start.gg API.
fn build_sources(config: &AppConfig, fixture: Option<&PathBuf>) -> Result<Sources> {
    if let Some(path) = fixture {
        let source = Arc::new(
            FixtureSource::from_file(path)
                .with_context(|| format!("Failed to load fixture {}", path.display()))?,
        );
        let tournaments: Arc<dyn TournamentSource> = source.clone();
        let matches: Arc<dyn MatchDataSource> = source;
        return Ok((tournaments, matches));
    }

    let fetcher_config = config.startgg.fetcher_config()?;
    if fetcher_config.auth_token.is_none() {
        tracing::warn!(
            "{} is not set; start.gg requests will be unauthenticated",
            config.startgg.token_env
        );
    }
    let client = Arc::new(StartggClient::new(GraphqlClient::new(fetcher_config)?));
    let tournaments: Arc<dyn TournamentSource> = client.clone();
    let matches: Arc<dyn MatchDataSource> = client;
    Ok((tournaments, matches))
}

fn build_aggregator(config: &AppConfig, fixture: Option<&PathBuf>) -> Result<StageAggregator> {
    let (tournaments, matches) = build_sources(config, fixture)?;
    Ok(
        StageAggregator::new(tournaments, matches, config.analysis.videogame())
            .with_sets_per_page(config.analysis.sets_per_page),
    )
}

fn print_stage_table(character: &CharacterId, results: &[StageResult], min_games: u32) {
    if results.is_empty() {
        println!(
            "No stage has at least {} games for character {}; not enough tournament data.",
            min_games, character
        );
        return;
    }

    println!("\n=== Stage win rates for character {} ===", character);
    println!(
        "{:<5} {:<28} {:>8} {:>7} {:>6}  {}",
        "Rank", "Stage", "Win %", "W-L", "Games", "Band"
    );
    for (i, result) in results.iter().enumerate() {
        println!(
            "#{:<4} {:<28} {:>7.1}% {:>7} {:>6}  {}",
            i + 1,
            result.stage_name,
            result.winrate_percent,
            format!("{}-{}", result.wins, result.losses()),
            result.total,
            result.band()
        );
    }
    println!("\n(minimum {} games per stage)", min_games);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;

    // Initialize tracing
    let log_level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting stage-analytics v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Stages {
            character,
            max_tournaments,
            min_games,
            fixture,
            json,
        } => {
            let character = CharacterId::from(character.trim());
            let max_tournaments = max_tournaments.unwrap_or(config.analysis.max_tournaments);
            let min_games = min_games.unwrap_or(config.analysis.min_games);

            let aggregator = build_aggregator(&config, fixture.as_ref())?;
            let results = aggregator
                .stage_winrates(&character, max_tournaments, min_games)
                .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_stage_table(&character, &results, min_games);
            }
        }
        Commands::Tournaments { limit, fixture } => {
            let (tournaments, _) = build_sources(&config, fixture.as_ref())?;
            let limit = limit.unwrap_or(config.analysis.max_tournaments);

            let list = tournaments
                .list_tournaments(&config.analysis.videogame(), 1, limit)
                .await?;

            println!("\n=== {} tournaments ===", list.len());
            for t in &list {
                let date = t
                    .start_at
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{:<12} {:<10} {}", t.id, date, t.name);
            }
        }
        Commands::Serve {
            host,
            port,
            fixture,
        } => {
            let aggregator = build_aggregator(&config, fixture.as_ref())?;
            let state = AppState {
                aggregator,
                analysis: config.analysis.clone(),
            };
            let app = build_router(state, &config.server.cors_origin)?;

            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("API: http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
