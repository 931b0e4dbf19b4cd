//! Queryable field registry shared by the query builder, the highlighter and
//! the local engine schema.

use std::fmt;

use serde::Serialize;

/// Whether matches in a field are a strong or a weak relevance signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Noise {
    Noisy,
    LessNoisy,
}

/// How the engine should cut highlight fragments for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragments {
    /// Highlight the whole field value as one unit.
    WholeField,
    /// Return at most this many fragments.
    UpTo(usize),
}

impl Fragments {
    /// Elasticsearch `number_of_fragments`; 0 means "do not fragment".
    pub fn number_of_fragments(self) -> usize {
        match self {
            Fragments::WholeField => 0,
            Fragments::UpTo(n) => n,
        }
    }
}

/// A document field that can be matched and highlighted by search.
///
/// Serializes to its name in the indexed document (see [`QueryField::name`]).
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryField {
    Note,
    Unk,
    First,
    Second,
    Head,
    Dateline,
    Text,
    Byline,
}

/// Every queryable field, in index order.
pub const QUERYABLE_FIELDS: [QueryField; 8] = [
    QueryField::Note,
    QueryField::Unk,
    QueryField::First,
    QueryField::Second,
    QueryField::Head,
    QueryField::Dateline,
    QueryField::Text,
    QueryField::Byline,
];

/// Fragment cap for the article body.
const TEXT_FRAGMENTS: usize = 5;

impl QueryField {
    /// Name of the field in the indexed JSON document.
    pub fn name(self) -> &'static str {
        match self {
            QueryField::Note => "Note",
            QueryField::Unk => "Unk",
            QueryField::First => "First",
            QueryField::Second => "Second",
            QueryField::Head => "Head",
            QueryField::Dateline => "Dateline",
            QueryField::Text => "Text",
            QueryField::Byline => "Byline",
        }
    }

    pub fn noise(self) -> Noise {
        match self {
            QueryField::Dateline | QueryField::Text | QueryField::Byline => Noise::LessNoisy,
            _ => Noise::Noisy,
        }
    }

    /// Ranking weight applied to matches in this field.
    pub fn boost(self) -> u32 {
        match self.noise() {
            Noise::LessNoisy => 2,
            Noise::Noisy => 1,
        }
    }

    pub fn fragments(self) -> Fragments {
        match self {
            QueryField::Text => Fragments::UpTo(TEXT_FRAGMENTS),
            _ => Fragments::WholeField,
        }
    }
}

impl fmt::Display for QueryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
