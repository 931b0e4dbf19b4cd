//! Turns raw engine hits into display-ready results.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::corpus::fields::QueryField;
use crate::search::engine::RawHit;

const SCORE_DECIMALS: u32 = 3;

/// A search hit ready for rendering.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayResult {
    pub score: String,
    pub doc_id: String,
    pub file_id: String,
    pub head: Vec<String>,
    pub byline: Vec<String>,
    pub text: Vec<String>,
}

impl From<RawHit> for DisplayResult {
    fn from(hit: RawHit) -> Self {
        let RawHit {
            document,
            score,
            mut highlight,
        } = hit;

        let mut highlighted = |field: QueryField, stored: Vec<String>| {
            highlight
                .remove(field.name())
                .filter(|fragments| !fragments.is_empty())
                .unwrap_or(stored)
        };

        Self {
            score: format_score(score.unwrap_or(0.0)),
            head: highlighted(QueryField::Head, document.head),
            byline: highlighted(QueryField::Byline, document.byline),
            text: highlighted(QueryField::Text, document.text),
            doc_id: document.doc_id,
            file_id: document.file_id,
        }
    }
}

/// Round to three decimals, halves away from zero, always printing three
/// digits after the point.
///
/// Rounding starts from the shortest decimal form of the float, so `1.2345`
/// becomes `1.235` even though its binary value is slightly below the half.
pub fn format_score(score: f64) -> String {
    match Decimal::from_str(&score.to_string()) {
        Ok(exact) => {
            let mut rounded =
                exact.round_dp_with_strategy(SCORE_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
            rounded.rescale(SCORE_DECIMALS);
            rounded.to_string()
        }
        Err(_) => format!("{:.*}", SCORE_DECIMALS as usize, score),
    }
}

/// Field name → fragments, as produced by an engine highlighter.
pub type HighlightMap = HashMap<String, Vec<String>>;
