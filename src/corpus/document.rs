//! The AP89 document model.

use serde::{Deserialize, Serialize};

use crate::corpus::fields::QueryField;

/// One news-wire record, as extracted from a `<DOC>` element.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Document {
    #[serde(rename = "DocNo")]
    pub doc_id: String,
    pub file_id: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub unk: Option<String>,
    #[serde(default)]
    pub first: Option<String>,
    #[serde(default)]
    pub second: Option<String>,
    #[serde(default)]
    pub head: Vec<String>,
    #[serde(default)]
    pub dateline: Option<String>,
    #[serde(default)]
    pub text: Vec<String>,
    #[serde(default)]
    pub byline: Vec<String>,
}

impl Document {
    /// Stored values of a queryable field, in document order.
    pub fn values(&self, field: QueryField) -> Vec<&str> {
        fn scalar(v: &Option<String>) -> Vec<&str> {
            v.as_deref().into_iter().collect()
        }
        fn repeated(v: &[String]) -> Vec<&str> {
            v.iter().map(String::as_str).collect()
        }

        match field {
            QueryField::Note => scalar(&self.note),
            QueryField::Unk => scalar(&self.unk),
            QueryField::First => scalar(&self.first),
            QueryField::Second => scalar(&self.second),
            QueryField::Head => repeated(&self.head),
            QueryField::Dateline => scalar(&self.dateline),
            QueryField::Text => repeated(&self.text),
            QueryField::Byline => repeated(&self.byline),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_index_field_names() {
        let doc = Document {
            doc_id: "AP890101-0001".to_string(),
            file_id: "AP-NR-01-01-89 2358EST".to_string(),
            head: vec!["Headline".to_string()],
            ..Default::default()
        };

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["DocNo"], "AP890101-0001");
        assert_eq!(json["FileId"], "AP-NR-01-01-89 2358EST");
        assert_eq!(json["Head"][0], "Headline");
        assert!(json["Note"].is_null());
        assert_eq!(json["Byline"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn deserializes_sparse_source() {
        let doc: Document =
            serde_json::from_str(r#"{"DocNo":"AP890101-0002","FileId":"f1","Text":["a","b"]}"#)
                .unwrap();
        assert_eq!(doc.text, vec!["a", "b"]);
        assert!(doc.byline.is_empty());
        assert_eq!(doc.dateline, None);
    }

    #[test]
    fn values_follow_field_kind() {
        let doc = Document {
            dateline: Some("NEW YORK (AP)".to_string()),
            text: vec!["one".to_string(), "two".to_string()],
            ..Default::default()
        };
        assert_eq!(doc.values(QueryField::Dateline), vec!["NEW YORK (AP)"]);
        assert_eq!(doc.values(QueryField::Text), vec!["one", "two"]);
        assert!(doc.values(QueryField::Note).is_empty());
    }
}
