//! Index settings sent to the engine when the index is created.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Analyzer applied to query text.
pub const ANALYZER_NAME: &str = "standard_with_custom_stopwords";
pub const STOP_FILTER_NAME: &str = "custom_stopwords_filter";
const STANDARD_TOKENIZER: &str = "standard";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IndexSettings {
    pub analysis: Analysis,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub analyzer: BTreeMap<String, AnalyzerDef>,
    pub filter: BTreeMap<String, TokenFilterDef>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerDef {
    pub tokenizer: String,
    pub filter: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TokenFilterDef {
    Stop {
        ignore_case: bool,
        stopwords: Vec<String>,
    },
}

impl IndexSettings {
    /// One analyzer: the standard tokenizer followed by a case-insensitive
    /// stop filter over exactly `stopwords`.
    pub fn with_stopwords(stopwords: Vec<String>) -> Self {
        let analyzer = AnalyzerDef {
            tokenizer: STANDARD_TOKENIZER.to_string(),
            filter: vec![STOP_FILTER_NAME.to_string()],
        };
        let stop = TokenFilterDef::Stop {
            ignore_case: true,
            stopwords,
        };

        Self {
            analysis: Analysis {
                analyzer: BTreeMap::from([(ANALYZER_NAME.to_string(), analyzer)]),
                filter: BTreeMap::from([(STOP_FILTER_NAME.to_string(), stop)]),
            },
        }
    }

    /// Stop filters attached to `analyzer`, in filter order.
    pub fn stop_filters(&self, analyzer: &str) -> Vec<(&[String], bool)> {
        let Some(def) = self.analysis.analyzer.get(analyzer) else {
            return Vec::new();
        };
        def.filter
            .iter()
            .filter_map(|name| self.analysis.filter.get(name))
            .map(|filter| match filter {
                TokenFilterDef::Stop {
                    ignore_case,
                    stopwords,
                } => (stopwords.as_slice(), *ignore_case),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serializes_to_engine_shape() {
        let settings = IndexSettings::with_stopwords(vec!["a".into(), "the".into()]);
        assert_eq!(
            serde_json::to_value(&settings).unwrap(),
            json!({
                "analysis": {
                    "analyzer": {
                        "standard_with_custom_stopwords": {
                            "tokenizer": "standard",
                            "filter": ["custom_stopwords_filter"]
                        }
                    },
                    "filter": {
                        "custom_stopwords_filter": {
                            "type": "stop",
                            "ignore_case": true,
                            "stopwords": ["a", "the"]
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn keeps_stopword_order() {
        let words: Vec<String> = ["zeta", "alpha", "mid"].map(String::from).to_vec();
        let settings = IndexSettings::with_stopwords(words.clone());
        let filters = settings.stop_filters(ANALYZER_NAME);
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].0, words.as_slice());
        assert!(filters[0].1);
    }

    #[test]
    fn unknown_analyzer_has_no_filters() {
        let settings = IndexSettings::with_stopwords(Vec::new());
        assert!(settings.stop_filters("english").is_empty());
    }
}
