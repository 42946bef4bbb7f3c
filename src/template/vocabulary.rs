// src/template/vocabulary.rs
//! Nested controlled vocabularies and their flattened display form.

use serde::{
    de::{self, Deserializer},
    Deserialize, Serialize,
};

/// Indentation marker for one nesting level in a flattened vocabulary.
pub const INDENT: &str = "  ";

const ITEM_LIST_KEY: &str = "schema:ItemList";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VocabularyNode {
    pub label: String,
    pub children: Vec<VocabularyNode>,
}

impl VocabularyNode {
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }
}

/// Accepts `{"a": {"b": {}}, "c": {}}`, the older
/// `{"a": {"schema:ItemList": {"b": {}}}}` form, or a flat `["a", "c"]`.
pub fn deserialize_vocabulary<'de, D>(deserializer: D) -> Result<Vec<VocabularyNode>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    vocabulary_from_value(&value).map_err(de::Error::custom)
}

pub fn vocabulary_from_value(value: &serde_json::Value) -> Result<Vec<VocabularyNode>, String> {
    match value {
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| match item {
                serde_json::Value::String(s) => Ok(VocabularyNode::leaf(s.clone())),
                other => Err(format!("vocabulary list entries must be strings, got {}", other)),
            })
            .collect(),
        serde_json::Value::Object(map) => {
            let mut nodes = Vec::with_capacity(map.len());
            for (label, inner) in map {
                let children = match inner {
                    serde_json::Value::Object(inner_map) => match inner_map.get(ITEM_LIST_KEY) {
                        Some(list) => vocabulary_from_value(list)?,
                        None => vocabulary_from_value(inner)?,
                    },
                    other => vocabulary_from_value(other)?,
                };
                nodes.push(VocabularyNode {
                    label: label.clone(),
                    children,
                });
            }
            Ok(nodes)
        }
        other => Err(format!("unsupported vocabulary value {}", other)),
    }
}

/// Depth-first flattening; each label is prefixed with one `INDENT` per level.
pub fn flatten_vocabulary(nodes: &[VocabularyNode]) -> Vec<String> {
    let mut out = Vec::new();
    flatten_into(nodes, 0, &mut out);
    out
}

fn flatten_into(nodes: &[VocabularyNode], level: usize, out: &mut Vec<String>) {
    for node in nodes {
        out.push(format!("{}{}", INDENT.repeat(level), node.label));
        flatten_into(&node.children, level + 1, out);
    }
}

/// Nesting depth encoded in a flattened vocabulary entry.
pub fn indent_level(entry: &str) -> usize {
    let leading = entry.len() - entry.trim_start_matches(' ').len();
    leading / INDENT.len()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CaseTransform {
    Lower,
    Upper,
    Title,
}

impl<'de> Deserialize<'de> for CaseTransform {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_case_transform(&s)
            .ok_or_else(|| de::Error::custom(format!("Unknown capitalize value '{}'", s)))
    }
}

pub fn parse_case_transform(s: &str) -> Option<CaseTransform> {
    match s.trim().to_ascii_lowercase().as_str() {
        "lower" | "lowercase" => Some(CaseTransform::Lower),
        "upper" | "uppercase" => Some(CaseTransform::Upper),
        "title" | "titlecase" => Some(CaseTransform::Title),
        _ => None,
    }
}

impl CaseTransform {
    /// Applies to the label only; the indentation prefix is preserved.
    pub fn apply(self, entry: &str) -> String {
        let label = entry.trim_start_matches(' ');
        let prefix = &entry[..entry.len() - label.len()];
        let changed = match self {
            CaseTransform::Lower => label.to_lowercase(),
            CaseTransform::Upper => label.to_uppercase(),
            CaseTransform::Title => title_case(label),
        };
        format!("{}{}", prefix, changed)
    }
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flattens_depth_first_with_indentation() {
        let nodes = vocabulary_from_value(&json!({"a": {"b": {"c": {}}}, "d": {}})).unwrap();
        assert_eq!(flatten_vocabulary(&nodes), vec!["a", "  b", "    c", "d"]);
    }

    #[test]
    fn accepts_item_list_nesting_and_flat_lists() {
        let nested = vocabulary_from_value(&json!({
            "Swab": {"schema:ItemList": {"Nasal swab": {}}},
            "Blood": {}
        }))
        .unwrap();
        assert_eq!(flatten_vocabulary(&nested), vec!["Swab", "  Nasal swab", "Blood"]);

        let flat = vocabulary_from_value(&json!(["x", "y"])).unwrap();
        assert_eq!(flatten_vocabulary(&flat), vec!["x", "y"]);
        assert!(vocabulary_from_value(&json!([1])).is_err());
    }

    #[test]
    fn indent_level_counts_pairs_of_spaces() {
        assert_eq!(indent_level("root"), 0);
        assert_eq!(indent_level("  child"), 1);
        assert_eq!(indent_level("    grandchild"), 2);
    }

    #[test]
    fn case_transform_keeps_indentation() {
        assert_eq!(CaseTransform::Upper.apply("  nasal swab"), "  NASAL SWAB");
        assert_eq!(CaseTransform::Lower.apply("Blood"), "blood");
        assert_eq!(CaseTransform::Title.apply("    nasal SWAB sample"), "    Nasal Swab Sample");
        assert_eq!(parse_case_transform("UPPER"), Some(CaseTransform::Upper));
        assert_eq!(parse_case_transform("sideways"), None);
    }
}
