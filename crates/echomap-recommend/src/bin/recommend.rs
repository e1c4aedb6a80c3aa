//! echomap-recommend: run one recommendation query and print the records as JSON.
//!
//! Connection settings come from the environment (a `.env` file is honoured):
//! `DATABASE_URL`, the `DATABASE_*` pool settings, `OLLAMA_BASE`,
//! `OLLAMA_EMBED_MODEL`, plus the `ECHOMAP_*` engine settings documented in
//! `echomap_recommend::config`. The embedding dimension and timeout are taken
//! from `ECHOMAP_EMBED_DIM` and `ECHOMAP_EMBED_TIMEOUT_SECS` only.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use echomap_db::{Database, PoolConfig};
use echomap_inference::{EmbeddingBackend, OllamaBackend};
use echomap_recommend::{
    CulturalRequest, EngineConfig, RecommendationEngine, ResonanceRequest, RoamingRequest,
};

#[derive(Parser)]
#[command(name = "echomap-recommend")]
#[command(author, version, about = "Context-aware audio recommendations")]
#[command(propagate_version = true)]
struct Cli {
    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL", default_value = "postgres://localhost/echomap")]
    database_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Same place, same time of day
    Resonance {
        /// Place or keywords, whitespace separated
        #[arg(default_value = "")]
        context: String,

        /// Local hour of day (0-23)
        #[arg(long)]
        hour: u32,

        /// Maximum number of records
        #[arg(short, long)]
        limit: Option<i64>,
    },

    /// Culturally evocative sounds
    Cultural {
        /// Place or keywords, whitespace separated
        #[arg(default_value = "")]
        context: String,

        /// Maximum number of records
        #[arg(short, long)]
        limit: Option<i64>,
    },

    /// Homesick or explorer sounds by distance from the place
    Roaming {
        /// Place or keywords, whitespace separated
        #[arg(default_value = "")]
        context: String,

        /// User latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// User longitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Maximum number of records
        #[arg(short, long)]
        limit: Option<i64>,
    },

    /// Most recent recordings
    Latest {
        /// Maximum number of records
        #[arg(short, long)]
        limit: Option<i64>,
    },

    /// Page through all recordings in capture order
    List {
        /// Records to skip
        #[arg(long, default_value_t = 0)]
        offset: i64,

        /// Maximum number of records
        #[arg(short, long)]
        limit: Option<i64>,
    },

    /// A single recording by id
    Show {
        /// Record id
        id: Uuid,
    },
}

fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "echomap_recommend=info")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "echomap_recommend=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("echomap-recommend.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Logs go to stderr so stdout stays valid JSON.
        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = init_tracing();
    let cli = Cli::parse();

    let db = Database::connect_with_config(&cli.database_url, PoolConfig::from_env())
        .await
        .context("connecting to record store")?;
    let config = EngineConfig::from_env();
    let embedder = OllamaBackend::from_env()
        .with_dimension(config.embed_dimension)
        .with_timeout(config.embed_timeout);
    info!(
        model = %embedder.model_name(),
        dimension = config.embed_dimension,
        "Engine ready"
    );
    let engine = RecommendationEngine::new(Arc::new(db.records.clone()), Arc::new(embedder), config);

    let output = match cli.command {
        Commands::Resonance {
            context,
            hour,
            limit,
        } => {
            let mut request = ResonanceRequest::new(context, hour);
            request.limit = limit;
            serde_json::to_value(engine.resonance(&request).await?)?
        }
        Commands::Cultural { context, limit } => {
            let mut request = CulturalRequest::new(context);
            request.limit = limit;
            serde_json::to_value(engine.cultural(&request).await?)?
        }
        Commands::Roaming {
            context,
            lat,
            lon,
            limit,
        } => {
            let mut request = RoamingRequest::new(context, lat, lon);
            request.limit = limit;
            serde_json::to_value(engine.roaming_with_mode(&request).await?)?
        }
        Commands::Latest { limit } => serde_json::to_value(engine.latest(limit).await?)?,
        Commands::List { offset, limit } => {
            serde_json::to_value(engine.list(offset, limit).await?)?
        }
        Commands::Show { id } => serde_json::to_value(engine.fetch(id).await?)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
