//! Query side: index settings, request building, engines and result assembly.

pub mod elastic;
pub mod engine;
pub mod local;
pub mod query;
pub mod result;
pub mod schema;
pub mod settings;

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::config::{EngineConfig, EngineKind};
use crate::error::EngineError;

pub use elastic::ElasticClient;
pub use engine::{RawHit, SearchEngine, SearchHits, WriteResult};
pub use local::TantivyEngine;
pub use query::{QueryError, SearchRequest, PAGE_SIZE};
pub use result::{format_score, DisplayResult};
pub use settings::IndexSettings;

/// Build the engine selected on the command line.
pub fn open_engine(
    kind: EngineKind,
    config: &EngineConfig,
) -> Result<Arc<dyn SearchEngine>, EngineError> {
    match kind {
        EngineKind::Elastic => {
            info!("Using Elasticsearch at {}", config.url);
            Ok(Arc::new(ElasticClient::new(config)?))
        }
        EngineKind::Local => {
            info!("Using in-memory Tantivy engine");
            Ok(Arc::new(TantivyEngine::new()))
        }
    }
}

/// One page of display-ready results.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub results: Vec<DisplayResult>,
    pub total_hits: u64,
}

/// Runs free-text searches against one index.
#[derive(Clone)]
pub struct Searcher {
    engine: Arc<dyn SearchEngine>,
    index: String,
}

impl Searcher {
    pub fn new(engine: Arc<dyn SearchEngine>, index: impl Into<String>) -> Self {
        Self {
            engine,
            index: index.into(),
        }
    }

    /// Search, degrading to an empty page when the engine fails.
    ///
    /// An engine outage and a query without matches look the same here; use
    /// [`Searcher::try_search`] to tell them apart.
    pub async fn search(&self, text: &str, offset: usize) -> SearchPage {
        match self.try_search(text, offset).await {
            Ok(page) => page,
            Err(e) => {
                error!("Search for {:?} failed: {}", text, e);
                SearchPage::default()
            }
        }
    }

    /// Search, reporting engine failures. Blank query text yields an empty
    /// page without contacting the engine.
    pub async fn try_search(&self, text: &str, offset: usize) -> Result<SearchPage, EngineError> {
        let request = match SearchRequest::build(text, offset) {
            Ok(request) => request,
            Err(QueryError::EmptyQuery) => return Ok(SearchPage::default()),
        };

        let found = self.engine.search(&self.index, &request).await?;
        info!(
            "Query {:?} at offset {}: {} hits of {}",
            request.text(),
            offset,
            found.hits.len(),
            found.total
        );

        Ok(SearchPage {
            results: found.hits.into_iter().map(DisplayResult::from).collect(),
            total_hits: found.total,
        })
    }
}
