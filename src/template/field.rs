// src/template/field.rs
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::ops::Range;

use super::datatype::Datatype;
use super::vocabulary::CaseTransform;
use crate::error::ConfigurationError;

/// A field's regular expression, compiled once when the template is built.
#[derive(Clone)]
pub struct FieldPattern {
    source: String,
    regex: Regex,
}

impl FieldPattern {
    pub fn compile(field: &str, source: &str) -> Result<Self, ConfigurationError> {
        let regex = Regex::new(source).map_err(|e| ConfigurationError::InvalidPattern {
            field: field.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for FieldPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldPattern({:?})", self.source)
    }
}

impl PartialEq for FieldPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// One schema-defined column. Immutable once the template is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub title: String,
    pub datatype: Datatype,
    pub required: bool,
    pub recommended: bool,
    pub pattern: Option<FieldPattern>,
    /// Flattened vocabulary; nesting is encoded as leading `INDENT`s.
    pub flat_vocabulary: Vec<String>,
    /// Sentinel values ("Missing", "Not Applicable", ...) accepted in any cell.
    pub null_values: Vec<String>,
    pub multivalued: bool,
    pub capitalize: Option<CaseTransform>,
    pub source: Option<String>,
    /// Index of the owning section in `Template::sections`.
    pub section: usize,
    pub description: Option<String>,
    pub guidance: Option<String>,
    pub examples: Vec<String>,
}

impl Field {
    pub fn has_vocabulary(&self) -> bool {
        !self.flat_vocabulary.is_empty()
    }

    /// Vocabulary followed by sentinel values, as offered in dropdowns.
    pub fn permissible_values(&self) -> impl Iterator<Item = &str> {
        self.flat_vocabulary
            .iter()
            .chain(self.null_values.iter())
            .map(String::as_str)
    }

    pub fn requirement_label(&self) -> &'static str {
        if self.required {
            "required"
        } else if self.recommended {
            "recommended"
        } else {
            "optional"
        }
    }

    /// Plain-text description shown in the field help dialog.
    pub fn describe(&self) -> String {
        let mut out = format!("{} ({}, {})", self.title, self.datatype, self.requirement_label());
        if let Some(description) = &self.description {
            out.push_str(&format!("\nLabel: {}", description));
        }
        if let Some(guidance) = &self.guidance {
            out.push_str(&format!("\nGuidance: {}", guidance));
        }
        if let Some(pattern) = &self.pattern {
            out.push_str(&format!("\nPattern: {}", pattern.as_str()));
        }
        if !self.examples.is_empty() {
            out.push_str(&format!("\nExamples: {}", self.examples.join(", ")));
        }
        if self.has_vocabulary() {
            out.push_str(&format!("\nValues: {}", self.flat_vocabulary.len()));
        }
        out
    }
}

/// A titled group of contiguous columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: String,
    /// Flat column range covered by this section's fields.
    pub columns: Range<usize>,
}

impl Section {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: usize) -> bool {
        self.columns.contains(&column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_compiles_once_and_matches() {
        let pattern = FieldPattern::compile("count", "^[0-9]+$").unwrap();
        assert!(pattern.is_match("12"));
        assert!(!pattern.is_match("12a"));
        assert_eq!(pattern.as_str(), "^[0-9]+$");
    }

    #[test]
    fn bad_pattern_is_configuration_error() {
        let err = FieldPattern::compile("count", "([").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidPattern { .. }));
    }

    #[test]
    fn section_range_queries() {
        let section = Section {
            title: "A".into(),
            columns: 2..5,
        };
        assert_eq!(section.len(), 3);
        assert!(section.contains(2));
        assert!(!section.contains(5));
    }
}
