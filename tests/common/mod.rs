#![allow(dead_code)]

use std::sync::Arc;

use ap89_search::corpus::Document;
use ap89_search::search::{IndexSettings, SearchEngine, Searcher, TantivyEngine};

pub const INDEX: &str = "ap89-index";

pub fn doc(id: &str) -> Document {
    Document {
        doc_id: id.to_string(),
        file_id: format!("AP-NR-{id}"),
        ..Document::default()
    }
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// A local engine holding `documents` in a fresh index.
pub async fn local_engine(documents: &[Document]) -> Arc<TantivyEngine> {
    let engine = Arc::new(TantivyEngine::new());
    let settings = IndexSettings::with_stopwords(strings(&["the", "a", "of", "and"]));
    assert!(engine.create_index(INDEX, &settings).await.unwrap());
    for document in documents {
        engine.index_document(INDEX, document).await.unwrap();
    }
    engine
}

pub async fn local_searcher(documents: &[Document]) -> Searcher {
    Searcher::new(local_engine(documents).await, INDEX)
}
