//! The narrow contract the crate needs from a full-text search engine.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use crate::corpus::Document;
use crate::error::EngineError;
use crate::search::query::SearchRequest;
use crate::search::settings::IndexSettings;

/// Engine acknowledgement of a document write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    Created,
    /// Any other result the engine reported (`updated`, `noop`, ...).
    Other(String),
}

impl WriteResult {
    pub fn from_engine(result: &str) -> Self {
        match result {
            "created" => WriteResult::Created,
            other => WriteResult::Other(other.to_string()),
        }
    }
}

/// One ranked hit as returned by the engine.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RawHit {
    #[serde(rename = "_source")]
    pub document: Document,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub highlight: HashMap<String, Vec<String>>,
}

/// A page of hits plus the total number of matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHits {
    pub total: u64,
    pub hits: Vec<RawHit>,
}

#[async_trait]
pub trait SearchEngine: Send + Sync + 'static {
    async fn index_exists(&self, index: &str) -> Result<bool, EngineError>;

    /// Returns whether the engine acknowledged the deletion.
    async fn delete_index(&self, index: &str) -> Result<bool, EngineError>;

    /// Returns whether the engine acknowledged the creation.
    async fn create_index(&self, index: &str, settings: &IndexSettings)
        -> Result<bool, EngineError>;

    async fn index_document(
        &self,
        index: &str,
        document: &Document,
    ) -> Result<WriteResult, EngineError>;

    async fn search(&self, index: &str, request: &SearchRequest)
        -> Result<SearchHits, EngineError>;
}
