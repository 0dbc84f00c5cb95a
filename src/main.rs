use clap::{Parser, Subcommand};
use serde_json::json;
use sheetsense::{load_csv, Engine, EngineConfig, IndexPayload, RawHit};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Business-context profiling, query analysis and reranking for spreadsheet rows
#[derive(Parser, Debug)]
#[command(name = "sheetsense")]
#[command(about = "Business-context engine for spreadsheet rows", long_about = None)]
struct Args {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// JSON configuration file; omitted fields keep their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Profile a CSV file and print the index payload of every row
    Ingest {
        /// Path to the CSV file
        path: PathBuf,
    },
    /// Print the analysis of a query
    Analyze {
        query: String,
    },
    /// Rerank raw search hits (a JSON array) for a query
    Rank {
        #[arg(short, long)]
        query: String,

        /// JSON file holding the raw hits
        #[arg(long)]
        hits: PathBuf,

        /// Number of results to keep
        #[arg(short, long, default_value_t = 5)]
        k: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so stdout stays valid JSON
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            EngineConfig::from_json_file(path)?
        }
        None => EngineConfig::default(),
    };
    let engine = Engine::new(config)?;

    let output = match args.command {
        Command::Ingest { path } => {
            let dataset = load_csv(&path)?;
            let profiles = engine.profile(&dataset);
            let payloads: Vec<IndexPayload> = engine
                .ingest(&dataset)?
                .iter()
                .map(|record| record.payload())
                .collect();
            info!("Ingested {} rows from {:?}", payloads.len(), path);
            json!({ "profiles": profiles, "rows": payloads })
        }
        Command::Analyze { query } => serde_json::to_value(engine.analyze(&query)?)?,
        Command::Rank { query, hits, k } => {
            let raw = std::fs::read_to_string(&hits)?;
            let hits: Vec<RawHit> = serde_json::from_str(&raw)?;
            info!("Ranking {} hits for {:?}", hits.len(), query);
            serde_json::to_value(engine.analyze_and_rank(&query, k, hits)?)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
