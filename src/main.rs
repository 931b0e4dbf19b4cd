use std::env;

use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ap89_search::config::{CorpusArgs, EngineArgs, EngineConfig, EngineKind};
use ap89_search::ingest::Pipeline;
use ap89_search::search::{open_engine, Searcher};
use ap89_search::create_app;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// CLI arguments
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Serve the AP89 search API",
    long_about = "Serves ranked, highlighted search over the AP89 index.\n\
                  With --engine local the corpus is ingested into memory at startup."
)]
struct Args {
    #[command(flatten)]
    engine: EngineArgs,

    // only ingested with the local engine
    #[command(flatten)]
    corpus: CorpusArgs,

    /// Listen address (overrides BIND_ADDR)
    #[arg(long)]
    bind: Option<String>,

    /// Verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = args.engine.apply(EngineConfig::from_env()?);
    let engine = open_engine(args.engine.engine, &config).context("Failed to set up search engine")?;

    if args.engine.engine == EngineKind::Local {
        Pipeline::new(args.corpus.into(), engine.clone(), config.index.clone())
            .run()
            .await
            .context("Failed to build in-memory index")?;
    }

    let app = create_app(Searcher::new(engine, config.index));

    let addr = match args.bind {
        Some(addr) => addr,
        None => env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
    };
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
