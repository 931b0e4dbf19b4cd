//! Extraction of [`Document`]s from repaired corpus files.

use std::fs;
use std::path::Path;

use roxmltree::Node;
use tracing::{debug, warn};

use crate::corpus::document::Document;
use crate::error::{ItemError, RecordError};

pub const RECORD_TAG: &str = "DOC";
const DOCNO_TAG: &str = "DOCNO";
const FILEID_TAG: &str = "FILEID";
const NOTE_TAG: &str = "NOTE";
const UNK_TAG: &str = "UNK";
const FIRST_TAG: &str = "FIRST";
const SECOND_TAG: &str = "SECOND";
const HEAD_TAG: &str = "HEAD";
const DATELINE_TAG: &str = "DATELINE";
const TEXT_TAG: &str = "TEXT";
const BYLINE_TAG: &str = "BYLINE";

/// Documents read from one file, plus the records that were rejected.
#[derive(Debug, Default)]
pub struct ParsedFile {
    pub documents: Vec<Document>,
    pub rejected: Vec<ItemError>,
}

/// Parse every `<DOC>` record of a repaired file.
///
/// An unreadable or malformed file is an error for the whole file; a record
/// missing a required element only drops that record.
pub fn parse_file(path: &Path) -> Result<ParsedFile, ItemError> {
    let content = fs::read_to_string(path).map_err(|source| ItemError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&content, path)
}

/// Parse already-loaded markup. `origin` is only used for error reporting.
pub fn parse_str(content: &str, origin: &Path) -> Result<ParsedFile, ItemError> {
    let tree = roxmltree::Document::parse(content).map_err(|source| ItemError::Markup {
        path: origin.to_path_buf(),
        source,
    })?;

    let mut parsed = ParsedFile::default();
    let records = tree
        .root_element()
        .descendants()
        .filter(|n| n.has_tag_name(RECORD_TAG));

    for (i, record) in records.enumerate() {
        match parse_record(record) {
            Ok(doc) => parsed.documents.push(doc),
            Err(source) => {
                let err = ItemError::Record {
                    path: origin.to_path_buf(),
                    position: i + 1,
                    source,
                };
                warn!("{}", err);
                parsed.rejected.push(err);
            }
        }
    }

    debug!(
        "Read {} documents from {:?} ({} rejected)",
        parsed.documents.len(),
        origin,
        parsed.rejected.len()
    );
    Ok(parsed)
}

/// Build one document from a `<DOC>` element.
pub fn parse_record(record: Node<'_, '_>) -> Result<Document, RecordError> {
    Ok(Document {
        doc_id: required(record, DOCNO_TAG)?,
        file_id: required(record, FILEID_TAG)?,
        note: first_text(record, NOTE_TAG),
        unk: first_text(record, UNK_TAG),
        first: first_text(record, FIRST_TAG),
        second: first_text(record, SECOND_TAG),
        head: all_text(record, HEAD_TAG),
        dateline: first_text(record, DATELINE_TAG),
        text: all_text(record, TEXT_TAG),
        byline: all_text(record, BYLINE_TAG),
    })
}

fn required(record: Node<'_, '_>, tag: &'static str) -> Result<String, RecordError> {
    let value = first_text(record, tag).ok_or(RecordError::MissingField(tag))?;
    let value = value.trim();
    if value.is_empty() {
        return Err(RecordError::EmptyField(tag));
    }
    Ok(value.to_string())
}

fn matching<'a, 'input: 'a>(
    record: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    // skip(1): descendants() starts with the record itself
    record.descendants().skip(1).filter(move |n| n.has_tag_name(tag))
}

fn first_text(record: Node<'_, '_>, tag: &'static str) -> Option<String> {
    matching(record, tag).next().map(text_content)
}

fn all_text(record: Node<'_, '_>, tag: &'static str) -> Vec<String> {
    matching(record, tag).map(text_content).collect()
}

/// Concatenated text of every text node below `node`.
fn text_content(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}
