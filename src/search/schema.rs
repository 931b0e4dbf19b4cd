//! Tantivy schema for the in-process engine.

use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STRING,
};

use crate::corpus::fields::{QueryField, QUERYABLE_FIELDS};

/// Handles to the fields of the corpus index.
#[derive(Debug, Clone)]
pub struct CorpusFields {
    pub doc_id: Field,
    pub file_id: Field,
    /// Stored JSON of the whole document, returned as the hit source.
    pub source: Field,
    queryable: [Field; QUERYABLE_FIELDS.len()],
}

impl CorpusFields {
    pub fn get(&self, field: QueryField) -> Field {
        // QUERYABLE_FIELDS lists the variants in declaration order
        self.queryable[field as usize]
    }
}

/// Create the schema, indexing every queryable field with `tokenizer`.
pub fn create_corpus_schema(tokenizer: &str) -> (Schema, CorpusFields) {
    let mut schema_builder = Schema::builder();

    // Exact match identifiers
    let doc_id = schema_builder.add_text_field("DocNo", STRING);
    let file_id = schema_builder.add_text_field("FileId", STRING);

    let text_options = TextOptions::default().set_indexing_options(
        TextFieldIndexing::default()
            .set_tokenizer(tokenizer)
            .set_index_option(IndexRecordOption::WithFreqsAndPositions),
    );
    let queryable =
        QUERYABLE_FIELDS.map(|field| schema_builder.add_text_field(field.name(), text_options.clone()));

    let source = schema_builder.add_text_field("_source", TextOptions::default().set_stored());

    let schema = schema_builder.build();

    let fields = CorpusFields {
        doc_id,
        file_id,
        source,
        queryable,
    };

    (schema, fields)
}
