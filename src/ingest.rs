//! Ingestion pipeline: reset the index, repair and parse the corpus, submit
//! every document.
//!
//! Index setup is all-or-nothing and returns a [`SetupError`]. Everything
//! after that works per item: a bad file, record or write is logged, counted
//! in the [`IngestSummary`] and skipped.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::config::CorpusConfig;
use crate::corpus::{
    parse_file, raw_files, read_stopwords, repair_file, repaired_files, repaired_path, Document,
    RepairOutcome,
};
use crate::error::{ItemError, SetupError};
use crate::search::{IndexSettings, SearchEngine, WriteResult};

/// Counters for one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub files_repaired: usize,
    pub files_passed_through: usize,
    pub files_skipped: usize,
    pub files_failed_repair: usize,
    pub files_parsed: usize,
    pub files_failed_parse: usize,
    pub records_rejected: usize,
    pub documents_attempted: usize,
    pub documents_indexed: usize,
    pub documents_failed: usize,
}

pub struct Pipeline {
    corpus: CorpusConfig,
    engine: Arc<dyn SearchEngine>,
    index: String,
}

impl Pipeline {
    pub fn new(corpus: CorpusConfig, engine: Arc<dyn SearchEngine>, index: impl Into<String>) -> Self {
        Self {
            corpus,
            engine,
            index: index.into(),
        }
    }

    /// Rebuild the index from the corpus.
    pub async fn run(&self) -> Result<IngestSummary, SetupError> {
        let mut summary = IngestSummary::default();

        self.prepare_index().await?;
        self.repair_corpus(&mut summary)?;
        let documents = self.parse_corpus(&mut summary)?;
        self.submit_all(&documents, &mut summary).await;

        info!(
            "Finished indexing {} of {} documents",
            summary.documents_indexed, summary.documents_attempted
        );
        Ok(summary)
    }

    /// Delete any previous index and create a fresh one with the stopword
    /// analyzer.
    async fn prepare_index(&self) -> Result<(), SetupError> {
        let cleanup = |source| SetupError::IndexCleanup {
            index: self.index.clone(),
            source,
        };

        if self.engine.index_exists(&self.index).await.map_err(cleanup)? {
            info!("Deleting existing index {}", self.index);
            if !self.engine.delete_index(&self.index).await.map_err(cleanup)? {
                return Err(SetupError::NotAcknowledged {
                    operation: "deletion",
                    index: self.index.clone(),
                });
            }
        }

        let stopwords = read_stopwords(&self.corpus.stopwords_path);
        info!(
            "Loaded {} stopwords from {:?}",
            stopwords.len(),
            self.corpus.stopwords_path
        );
        let settings = IndexSettings::with_stopwords(stopwords);

        let acknowledged = self
            .engine
            .create_index(&self.index, &settings)
            .await
            .map_err(|source| SetupError::IndexCreation {
                index: self.index.clone(),
                source,
            })?;
        if !acknowledged {
            return Err(SetupError::NotAcknowledged {
                operation: "creation",
                index: self.index.clone(),
            });
        }

        info!("Created index {}", self.index);
        Ok(())
    }

    fn repair_corpus(&self, summary: &mut IngestSummary) -> Result<(), SetupError> {
        let corpus = &self.corpus;
        let sources = raw_files(&corpus.data_dir, &corpus.file_prefix, &corpus.repaired_suffix)
            .map_err(|source| SetupError::DataDir {
                path: corpus.data_dir.clone(),
                source,
            })?;
        info!("Repairing {} raw files", sources.len());

        for source in &sources {
            let destination = repaired_path(source, &corpus.repaired_suffix);
            match repair_file(source, &destination, !corpus.force_repair) {
                Ok(RepairOutcome::Written) => summary.files_repaired += 1,
                Ok(RepairOutcome::PassedThrough) => summary.files_passed_through += 1,
                Ok(RepairOutcome::Skipped) => summary.files_skipped += 1,
                Err(e) => {
                    warn!("{}", e);
                    summary.files_failed_repair += 1;
                }
            }
        }
        Ok(())
    }

    fn parse_corpus(&self, summary: &mut IngestSummary) -> Result<Vec<Document>, SetupError> {
        let corpus = &self.corpus;
        let files = repaired_files(&corpus.data_dir, &corpus.file_prefix, &corpus.repaired_suffix)
            .map_err(|source| SetupError::DataDir {
                path: corpus.data_dir.clone(),
                source,
            })?;

        let mut documents = Vec::new();
        for path in &files {
            match parse_file(path) {
                Ok(parsed) => {
                    // rejected records are already logged by the parser
                    summary.files_parsed += 1;
                    summary.records_rejected += parsed.rejected.len();
                    documents.extend(parsed.documents);
                }
                Err(e) => {
                    warn!("{}", e);
                    summary.files_failed_parse += 1;
                }
            }
        }

        info!("Parsed {} documents from {} files", documents.len(), files.len());
        Ok(documents)
    }

    async fn submit_all(&self, documents: &[Document], summary: &mut IngestSummary) {
        let engine = self.engine.as_ref();
        let index = self.index.as_str();

        let mut writes = stream::iter(documents)
            .map(|document| submit(engine, index, document))
            .buffer_unordered(self.corpus.submit_concurrency.max(1));

        while let Some(outcome) = writes.next().await {
            summary.documents_attempted += 1;
            match outcome {
                Ok(()) => summary.documents_indexed += 1,
                Err(e) => {
                    warn!("{}", e);
                    summary.documents_failed += 1;
                }
            }
        }
    }
}

async fn submit(engine: &dyn SearchEngine, index: &str, document: &Document) -> Result<(), ItemError> {
    match engine.index_document(index, document).await {
        Ok(WriteResult::Created) => {
            debug!("Indexed {}", document.doc_id);
            Ok(())
        }
        Ok(WriteResult::Other(result)) => Err(ItemError::NotCreated {
            doc_id: document.doc_id.clone(),
            result,
        }),
        Err(source) => Err(ItemError::Submit {
            doc_id: document.doc_id.clone(),
            source,
        }),
    }
}
