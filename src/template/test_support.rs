// src/template/test_support.rs
//! Template fixtures shared by unit tests.

use serde_json::json;
use std::path::Path;

use super::builder::build_template;
use super::definition::Template;
use super::schema::SchemaDocument;

/// Builds the first interface class of an inline schema document.
pub(crate) fn template_from_json(value: serde_json::Value) -> Template {
    let document = SchemaDocument::from_json_str(&value.to_string(), Path::new("schema.json"))
        .expect("fixture schema parses");
    let name = document
        .default_interface()
        .expect("fixture schema has an interface class")
        .to_string();
    build_template(&document, "fixture", &name).expect("fixture template builds")
}

/// Section A = [req1 (required), opt1], section B = [req2 (required)].
pub(crate) fn two_section_template() -> Template {
    template_from_json(json!({
        "classes": {"Demo": {
            "is_a": "dh_interface",
            "sections": ["A", "B"],
            "slots": [
                {"name": "req1", "slot_group": "A", "requirement": "required"},
                {"name": "opt1", "slot_group": "A"},
                {"name": "req2", "slot_group": "B", "requirement": "required"}
            ]
        }}
    }))
}

/// One field per rule kind, plus a recommended one.
pub(crate) fn rules_template() -> Template {
    template_from_json(json!({
        "classes": {"Rules": {
            "is_a": "dh_interface",
            "slots": [
                {"name": "sample id", "slot_group": "Identity", "requirement": "required"},
                {"name": "host", "slot_group": "Identity", "datatype": "select",
                 "requirement": "recommended",
                 "vocabulary": {"Human": {"Adult": {}}, "Bat": {}},
                 "null_values": ["Missing", "Not Applicable"]},
                {"name": "symptoms", "slot_group": "Clinical", "datatype": "multiple",
                 "vocabulary": ["Fever", "Cough", "Fatigue"]},
                {"name": "collection date", "slot_group": "Clinical", "datatype": "xs:date",
                 "null_values": ["Missing"]},
                {"name": "count", "slot_group": "Clinical", "datatype": "xs:nonNegativeInteger",
                 "pattern": "^[0-9]+$"},
                {"name": "ct value", "slot_group": "Clinical", "datatype": "xs:decimal"}
            ]
        }}
    }))
}
