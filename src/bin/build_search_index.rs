//! Build the AP89 search index
//!
//! Repairs and parses the raw corpus files and writes every document into a
//! freshly created index. Any existing index of the same name is deleted
//! first.
//!
//! Usage:
//!     build_search_index
//!     build_search_index --data-dir ./data/ap89_collection --force-repair

use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ap89_search::config::{CorpusArgs, EngineArgs, EngineConfig};
use ap89_search::ingest::Pipeline;
use ap89_search::search::open_engine;

/// CLI arguments
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Build the AP89 search index from the raw corpus",
    long_about = "Deletes and recreates the index, repairs the raw corpus files into\n\
                  well-formed markup and indexes every document.\n\
                  A failure to reset the index aborts the run with a non-zero exit."
)]
struct Args {
    #[command(flatten)]
    engine: EngineArgs,

    #[command(flatten)]
    corpus: CorpusArgs,

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

    info!("Indexing {:?} into {}", args.corpus.data_dir, config.index);

    let summary = Pipeline::new(args.corpus.into(), engine, config.index.as_str())
        .run()
        .await
        .context("Failed to prepare index")?;

    info!(
        "Files: {} repaired, {} already wrapped, {} skipped, {} failed repair, {} parsed, {} failed parse",
        summary.files_repaired,
        summary.files_passed_through,
        summary.files_skipped,
        summary.files_failed_repair,
        summary.files_parsed,
        summary.files_failed_parse
    );
    info!(
        "Documents: {} indexed, {} failed, {} records rejected",
        summary.documents_indexed, summary.documents_failed, summary.records_rejected
    );

    Ok(())
}
