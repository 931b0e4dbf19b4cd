//! Search request construction.
//!
//! A [`SearchRequest`] is the fixed-shape body of an engine search call:
//! a fuzzy multi-field match weighted by the field table, per-field
//! highlighting, score ordering and a page of [`PAGE_SIZE`] hits.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::corpus::fields::{QueryField, QUERYABLE_FIELDS};
use crate::search::settings::ANALYZER_NAME;

/// Hits returned per search call.
pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("query text is empty")]
    EmptyQuery,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: QueryClause,
    pub sort: Vec<SortKey>,
    pub highlight: Highlight,
    pub from: usize,
    pub size: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct QueryClause {
    pub multi_match: MultiMatch,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MultiMatch {
    pub query: String,
    pub fields: Vec<BoostedField>,
    pub fuzziness: Fuzziness,
    pub analyzer: String,
}

/// A field with its ranking weight, written `Name^weight` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoostedField {
    pub field: QueryField,
    pub boost: u32,
}

impl Serialize for BoostedField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("{}^{}", self.field, self.boost))
    }
}

/// Edit-distance tolerance for query terms.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fuzziness {
    /// Scale edits with term length: exact below 3 chars, 1 edit up to 5,
    /// 2 edits beyond.
    #[serde(rename = "AUTO")]
    Auto,
}

impl Fuzziness {
    pub fn max_edits(self, term: &str) -> u8 {
        match self {
            Fuzziness::Auto => match term.chars().count() {
                0..=2 => 0,
                3..=5 => 1,
                _ => 2,
            },
        }
    }
}

/// Result ordering. Only relevance is supported.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    #[serde(rename = "_score")]
    Score,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Highlight {
    pub fields: BTreeMap<QueryField, HighlightField>,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightField {
    /// 0 asks the engine to return the whole field as a single fragment.
    pub number_of_fragments: usize,
}

impl SearchRequest {
    /// Build the request for `text`, starting at result rank `offset`.
    pub fn build(text: &str, offset: usize) -> Result<Self, QueryError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        let fields = QUERYABLE_FIELDS
            .into_iter()
            .map(|field| BoostedField {
                field,
                boost: field.boost(),
            })
            .collect();

        let highlight = QUERYABLE_FIELDS
            .into_iter()
            .map(|field| {
                let number_of_fragments = field.fragments().number_of_fragments();
                (field, HighlightField { number_of_fragments })
            })
            .collect();

        Ok(Self {
            query: QueryClause {
                multi_match: MultiMatch {
                    query: text.to_string(),
                    fields,
                    fuzziness: Fuzziness::Auto,
                    analyzer: ANALYZER_NAME.to_string(),
                },
            },
            sort: vec![SortKey::Score],
            highlight: Highlight { fields: highlight },
            from: offset,
            size: PAGE_SIZE,
        })
    }

    pub fn text(&self) -> &str {
        &self.query.multi_match.query
    }
}
