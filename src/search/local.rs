//! In-process engine backed by Tantivy in-memory indexes.
//!
//! Interprets the same [`IndexSettings`] and [`SearchRequest`] the HTTP client
//! sends, so ingestion and search can run without an external engine. Nothing
//! is persisted; indexes live as long as the engine.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tantivy::collector::{Count, TopDocs};
use tantivy::query::{BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, Query, TermQuery};
use tantivy::schema::{IndexRecordOption, Value};
use tantivy::snippet::SnippetGenerator;
use tantivy::tokenizer::{
    LowerCaser, RemoveLongFilter, SimpleTokenizer, StopWordFilter, TextAnalyzer, TokenStream,
};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, Searcher, TantivyDocument, Term};
use tokio::task;
use tracing::debug;

use crate::corpus::fields::{QueryField, QUERYABLE_FIELDS};
use crate::corpus::Document;
use crate::error::EngineError;
use crate::search::engine::{RawHit, SearchEngine, SearchHits, WriteResult};
use crate::search::query::{Highlight, MultiMatch, SearchRequest};
use crate::search::result::HighlightMap;
use crate::search::schema::{create_corpus_schema, CorpusFields};
use crate::search::settings::{IndexSettings, ANALYZER_NAME};

const WRITER_HEAP_BYTES: usize = 20_000_000;
const MAX_TOKEN_LENGTH: usize = 40;
/// Fragment size for fields that are cut into several fragments.
const FRAGMENT_CHARS: usize = 150;

type Registry = Mutex<HashMap<String, LocalIndex>>;

/// Engine holding named in-memory indexes.
#[derive(Default)]
pub struct TantivyEngine {
    indexes: Arc<Registry>,
}

struct LocalIndex {
    index: Index,
    reader: IndexReader,
    writer: IndexWriter,
    fields: CorpusFields,
    /// Documents added since the last commit.
    pending: bool,
}

/// A panic inside one call leaves the registry itself consistent.
fn lock(registry: &Registry) -> MutexGuard<'_, HashMap<String, LocalIndex>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TantivyEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against one index on the blocking pool; commits and searches
    /// are synchronous.
    async fn with_index<T, F>(&self, name: &str, f: F) -> Result<T, EngineError>
    where
        T: Send + 'static,
        F: FnOnce(&mut LocalIndex) -> Result<T, EngineError> + Send + 'static,
    {
        let registry = Arc::clone(&self.indexes);
        let name = name.to_string();

        task::spawn_blocking(move || {
            let mut indexes = lock(&registry);
            let index = indexes
                .get_mut(&name)
                .ok_or_else(|| EngineError::IndexNotFound(name.clone()))?;
            f(index)
        })
        .await
        .map_err(|e| EngineError::Local(format!("engine task failed: {e}")))?
    }
}

/// Standard-ish tokenization followed by the stop filters of the settings.
fn build_analyzer(settings: &IndexSettings) -> TextAnalyzer {
    let stopwords: Vec<String> = settings
        .stop_filters(ANALYZER_NAME)
        .into_iter()
        .flat_map(|(words, ignore_case)| {
            words.iter().map(move |w| {
                if ignore_case {
                    w.to_lowercase()
                } else {
                    w.clone()
                }
            })
        })
        .collect();

    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LENGTH))
        .filter(LowerCaser)
        .filter(StopWordFilter::remove(stopwords))
        .build()
}

/// Distinct analyzed terms of `text`, in order of appearance.
fn analyze(analyzer: &mut TextAnalyzer, text: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    let mut stream = analyzer.token_stream(text);
    while stream.advance() {
        let token = &stream.token().text;
        if !terms.contains(token) {
            terms.push(token.clone());
        }
    }
    terms
}

impl LocalIndex {
    fn create(settings: &IndexSettings) -> Result<Self, EngineError> {
        let (schema, fields) = create_corpus_schema(ANALYZER_NAME);
        let index = Index::create_in_ram(schema);
        index
            .tokenizers()
            .register(ANALYZER_NAME, build_analyzer(settings));

        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        let writer = index.writer_with_num_threads(1, WRITER_HEAP_BYTES)?;

        Ok(Self {
            index,
            reader,
            writer,
            fields,
            pending: false,
        })
    }

    fn add(&mut self, document: &Document) -> Result<(), EngineError> {
        let mut doc = TantivyDocument::new();
        doc.add_text(self.fields.doc_id, &document.doc_id);
        doc.add_text(self.fields.file_id, &document.file_id);
        for field in QUERYABLE_FIELDS {
            for value in document.values(field) {
                doc.add_text(self.fields.get(field), value);
            }
        }
        doc.add_text(self.fields.source, &serde_json::to_string(document)?);

        self.writer.add_document(doc)?;
        self.pending = true;
        Ok(())
    }

    /// Make pending writes visible to searchers.
    fn refresh(&mut self) -> Result<(), EngineError> {
        if self.pending {
            self.writer.commit()?;
            self.reader.reload()?;
            self.pending = false;
        }
        Ok(())
    }

    fn search(&mut self, request: &SearchRequest) -> Result<SearchHits, EngineError> {
        self.refresh()?;

        let multi_match = &request.query.multi_match;
        let mut analyzer = self
            .index
            .tokenizers()
            .get(&multi_match.analyzer)
            .ok_or_else(|| EngineError::Local(format!("unknown analyzer {}", multi_match.analyzer)))?;
        let terms = analyze(&mut analyzer, &multi_match.query);
        if terms.is_empty() {
            debug!("Query {:?} has no terms after analysis", multi_match.query);
            return Ok(SearchHits::default());
        }

        let query = self.build_query(multi_match, &terms);
        let searcher = self.reader.searcher();

        // The collector reserves offset + limit slots, so size it from the
        // match count rather than the requested offset.
        let total = searcher.search(&query, &Count)?;
        if request.from >= total || request.size == 0 {
            return Ok(SearchHits {
                total: total as u64,
                hits: Vec::new(),
            });
        }
        let limit = request.size.min(total - request.from);
        let top_docs = searcher.search(&query, &TopDocs::with_limit(limit).and_offset(request.from))?;

        let mut highlighters = self.highlighters(&searcher, &query, &request.highlight)?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let stored: TantivyDocument = searcher.doc(address)?;
            let source = stored
                .get_first(self.fields.source)
                .and_then(|v| v.as_str())
                .ok_or_else(|| EngineError::Local("stored document has no source".to_string()))?;
            let document: Document = serde_json::from_str(source)?;

            let mut highlight = HighlightMap::new();
            for highlighter in &mut highlighters {
                let fragments = highlighter.fragments(&document);
                if !fragments.is_empty() {
                    highlight.insert(highlighter.field.name().to_string(), fragments);
                }
            }

            hits.push(RawHit {
                document,
                score: Some(f64::from(score)),
                highlight,
            });
        }

        Ok(SearchHits {
            total: total as u64,
            hits,
        })
    }

    /// Each analyzed term matches exactly and, when long enough, fuzzily in
    /// every requested field, scaled by the field boost.
    fn build_query(&self, multi_match: &MultiMatch, terms: &[String]) -> BooleanQuery {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        for boosted in &multi_match.fields {
            let field = self.fields.get(boosted.field);
            let boost = boosted.boost as f32;

            for text in terms {
                let term = Term::from_field_text(field, text);
                let exact: Box<dyn Query> =
                    Box::new(TermQuery::new(term.clone(), IndexRecordOption::WithFreqs));
                clauses.push((Occur::Should, Box::new(BoostQuery::new(exact, boost))));

                let edits = multi_match.fuzziness.max_edits(text);
                if edits > 0 {
                    let fuzzy: Box<dyn Query> = Box::new(FuzzyTermQuery::new(term, edits, true));
                    clauses.push((Occur::Should, Box::new(BoostQuery::new(fuzzy, boost))));
                }
            }
        }

        BooleanQuery::new(clauses)
    }

    fn highlighters(
        &self,
        searcher: &Searcher,
        query: &dyn Query,
        highlight: &Highlight,
    ) -> Result<Vec<FieldHighlighter>, EngineError> {
        highlight
            .fields
            .iter()
            .map(|(field, options)| {
                let generator = SnippetGenerator::create(searcher, query, self.fields.get(*field))?;
                Ok(FieldHighlighter {
                    field: *field,
                    generator,
                    max_fragments: options.number_of_fragments,
                })
            })
            .collect()
    }
}

struct FieldHighlighter {
    field: QueryField,
    generator: SnippetGenerator,
    /// 0 highlights each value whole.
    max_fragments: usize,
}

impl FieldHighlighter {
    /// Highlighted values of the field; values without a match are left out.
    fn fragments(&mut self, document: &Document) -> Vec<String> {
        let mut fragments = Vec::new();

        for value in document.values(self.field) {
            let max_chars = if self.max_fragments == 0 {
                value.len().max(1)
            } else {
                FRAGMENT_CHARS
            };
            self.generator.set_max_num_chars(max_chars);

            let snippet = self.generator.snippet(value);
            if snippet.highlighted().is_empty() {
                continue;
            }
            fragments.push(snippet.to_html());

            if self.max_fragments > 0 && fragments.len() == self.max_fragments {
                break;
            }
        }

        fragments
    }
}

#[async_trait]
impl SearchEngine for TantivyEngine {
    async fn index_exists(&self, index: &str) -> Result<bool, EngineError> {
        Ok(lock(&self.indexes).contains_key(index))
    }

    async fn delete_index(&self, index: &str) -> Result<bool, EngineError> {
        match lock(&self.indexes).remove(index) {
            Some(_) => Ok(true),
            None => Err(EngineError::IndexNotFound(index.to_string())),
        }
    }

    async fn create_index(
        &self,
        index: &str,
        settings: &IndexSettings,
    ) -> Result<bool, EngineError> {
        let mut indexes = lock(&self.indexes);
        if indexes.contains_key(index) {
            return Err(EngineError::IndexExists(index.to_string()));
        }
        indexes.insert(index.to_string(), LocalIndex::create(settings)?);
        Ok(true)
    }

    async fn index_document(
        &self,
        index: &str,
        document: &Document,
    ) -> Result<WriteResult, EngineError> {
        let document = document.clone();
        self.with_index(index, move |local| local.add(&document))
            .await?;
        Ok(WriteResult::Created)
    }

    async fn search(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<SearchHits, EngineError> {
        let request = request.clone();
        self.with_index(index, move |local| local.search(&request))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer(words: &[&str]) -> TextAnalyzer {
        build_analyzer(&IndexSettings::with_stopwords(
            words.iter().map(|w| w.to_string()).collect(),
        ))
    }

    #[test]
    fn stopwords_are_removed_case_insensitively() {
        let mut analyzer = analyzer(&["The", "of"]);
        assert_eq!(
            analyze(&mut analyzer, "The Fall of THE Wall"),
            vec!["fall", "wall"]
        );
    }

    #[test]
    fn repeated_terms_are_collapsed() {
        let mut analyzer = analyzer(&[]);
        assert_eq!(analyze(&mut analyzer, "grain, Grain; GRAIN"), vec!["grain"]);
    }

    #[tokio::test]
    async fn missing_index_is_reported() {
        let engine = TantivyEngine::new();
        assert!(!engine.index_exists("ap89-index").await.unwrap());
        assert!(matches!(
            engine.delete_index("ap89-index").await,
            Err(EngineError::IndexNotFound(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_writes_and_searches_complete() {
        let engine = Arc::new(TantivyEngine::new());
        let settings = IndexSettings::with_stopwords(Vec::new());
        engine.create_index("ap89-index", &settings).await.unwrap();

        let writes = (0..20).map(|i| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                let document = Document {
                    doc_id: format!("AP890101-{i:04}"),
                    file_id: "AP-NR-01-01-89".to_string(),
                    text: vec!["Barley harvest".to_string()],
                    ..Document::default()
                };
                engine.index_document("ap89-index", &document).await
            })
        });
        for write in writes.collect::<Vec<_>>() {
            assert_eq!(write.await.unwrap().unwrap(), WriteResult::Created);
        }

        let request = SearchRequest::build("barley", 0).unwrap();
        let (a, b) = tokio::join!(
            engine.search("ap89-index", &request),
            engine.search("ap89-index", &request)
        );
        assert_eq!(a.unwrap().total, 20);
        assert_eq!(b.unwrap().hits.len(), 10);
    }

    #[tokio::test]
    async fn create_twice_fails() {
        let engine = TantivyEngine::new();
        let settings = IndexSettings::with_stopwords(Vec::new());
        assert!(engine.create_index("ap89-index", &settings).await.unwrap());
        assert!(matches!(
            engine.create_index("ap89-index", &settings).await,
            Err(EngineError::IndexExists(_))
        ));
    }
}
