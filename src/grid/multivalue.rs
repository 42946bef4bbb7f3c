// src/grid/multivalue.rs
//! Editing adapter for multi-valued cells stored as `a; b; c`.

use crate::template::vocabulary::indent_level;
use crate::template::Field;

pub const MULTI_VALUE_DELIMITER: char = ';';
pub const MULTI_VALUE_SEPARATOR: &str = "; ";

/// Trimmed, non-empty tokens of a stored value.
pub fn split_multi_value(value: &str) -> Vec<&str> {
    value
        .split(MULTI_VALUE_DELIMITER)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn join_multi_value<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(MULTI_VALUE_SEPARATOR)
}

/// Canonical form: `"a;;  b ;"` becomes `"a; b"`. Idempotent.
pub fn normalize_multi_value(value: &str) -> String {
    join_multi_value(&split_multi_value(value))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiValueOption {
    /// Stored form: the vocabulary entry without indentation.
    pub value: String,
    pub indent_level: usize,
    pub selected: bool,
}

/// Open multi-value editor for one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiValueEdit {
    pub row: usize,
    pub col: usize,
    pub options: Vec<MultiValueOption>,
    /// Normalized value to write back right away when the stored value had
    /// stray delimiters.
    pub healed_value: Option<String>,
    /// Grid epoch the edit was opened under; set by the owning harmonizer.
    pub epoch: u64,
}

impl MultiValueEdit {
    pub fn begin(row: usize, col: usize, field: &Field, stored: &str) -> Self {
        let raw_count = if stored.is_empty() {
            0
        } else {
            stored.split(MULTI_VALUE_DELIMITER).count()
        };
        let tokens = split_multi_value(stored);
        let healed_value = (raw_count != tokens.len()).then(|| join_multi_value(&tokens));

        let options = field
            .permissible_values()
            .map(|entry| {
                let value = entry.trim().to_string();
                MultiValueOption {
                    selected: tokens.contains(&value.as_str()),
                    indent_level: indent_level(entry),
                    value,
                }
            })
            .collect();

        Self {
            row,
            col,
            options,
            healed_value,
            epoch: 0,
        }
    }

    /// Flips an option by stored value. Returns false if no option matches.
    pub fn toggle(&mut self, value: &str) -> bool {
        match self.options.iter_mut().find(|o| o.value == value.trim()) {
            Some(option) => {
                option.selected = !option.selected;
                true
            }
            None => false,
        }
    }

    pub fn select_only<S: AsRef<str>>(&mut self, values: &[S]) {
        for option in &mut self.options {
            option.selected = values.iter().any(|v| v.as_ref().trim() == option.value);
        }
    }

    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value.as_str())
    }

    /// Selected entries in vocabulary order, joined with `"; "`.
    pub fn commit(&self) -> String {
        join_multi_value(&self.selected().collect::<Vec<_>>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::test_support::template_from_json;
    use serde_json::json;

    fn symptoms() -> Field {
        let template = template_from_json(json!({
            "classes": {"T": {"is_a": "dh_interface", "slots": [
                {"name": "symptoms", "slot_group": "S", "datatype": "multiple",
                 "vocabulary": {"Fever": {}, "Respiratory": {"Cough": {}}}}
            ]}}
        }));
        template.fields[0].clone()
    }

    #[test]
    fn normalization_is_idempotent() {
        assert_eq!(normalize_multi_value("a;;  b ;"), "a; b");
        assert_eq!(normalize_multi_value("a; b"), "a; b");
        let once = normalize_multi_value(" x ;y;; ;z");
        assert_eq!(normalize_multi_value(&once), once);
        assert_eq!(normalize_multi_value(""), "");
    }

    #[test]
    fn begin_heals_malformed_delimiters() {
        let field = symptoms();
        let edit = MultiValueEdit::begin(0, 0, &field, "Fever;; Cough ;");
        assert_eq!(edit.healed_value.as_deref(), Some("Fever; Cough"));
        let clean = MultiValueEdit::begin(0, 0, &field, "Fever; Cough");
        assert_eq!(clean.healed_value, None);
        assert_eq!(MultiValueEdit::begin(0, 0, &field, "").healed_value, None);
    }

    #[test]
    fn options_carry_indent_and_preselection() {
        let field = symptoms();
        let edit = MultiValueEdit::begin(3, 1, &field, "Cough");
        let summary: Vec<(&str, usize, bool)> = edit
            .options
            .iter()
            .map(|o| (o.value.as_str(), o.indent_level, o.selected))
            .collect();
        assert_eq!(
            summary,
            vec![("Fever", 0, false), ("Respiratory", 0, false), ("Cough", 1, true)]
        );
    }

    #[test]
    fn commit_uses_vocabulary_order_and_round_trips() {
        let field = symptoms();
        let mut edit = MultiValueEdit::begin(0, 0, &field, "Cough");
        assert!(edit.toggle("Fever"));
        assert!(!edit.toggle("Sneezing"));
        let committed = edit.commit();
        assert_eq!(committed, "Fever; Cough");
        assert_eq!(normalize_multi_value(&committed), committed);
        let reopened = MultiValueEdit::begin(0, 0, &field, &committed);
        assert_eq!(reopened.selected().collect::<Vec<_>>(), vec!["Fever", "Cough"]);
    }
}
