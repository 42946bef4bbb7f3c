// src/template/datatype.rs
use serde::{
    de::{self, Deserializer},
    Deserialize, Serialize,
};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NumericKind {
    NonNegativeInteger,
    Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum Datatype {
    Date,
    Select,
    Multiple,
    Numeric(NumericKind),
    #[default]
    Text,
}

impl Datatype {
    pub fn is_multivalued(self) -> bool {
        matches!(self, Datatype::Multiple)
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datatype::Date => write!(f, "xs:date"),
            Datatype::Select => write!(f, "select"),
            Datatype::Multiple => write!(f, "multiple"),
            Datatype::Numeric(NumericKind::NonNegativeInteger) => {
                write!(f, "xs:nonNegativeInteger")
            }
            Datatype::Numeric(NumericKind::Decimal) => write!(f, "xs:decimal"),
            Datatype::Text => write!(f, "xs:token"),
        }
    }
}

// Schemas spell datatypes several ways; anything unknown is free text.
impl<'de> Deserialize<'de> for Datatype {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = serde_json::Value::deserialize(deserializer)?;
        match v {
            serde_json::Value::String(s) => Ok(parse_datatype(&s)),
            serde_json::Value::Null => Ok(Datatype::Text),
            other => Err(de::Error::custom(format!(
                "datatype must be a string, got {}",
                other
            ))),
        }
    }
}

pub fn parse_datatype(s: &str) -> Datatype {
    let norm = s.trim();
    let bare = norm
        .strip_prefix("xs:")
        .or_else(|| norm.strip_prefix("xsd:"))
        .unwrap_or(norm);
    match bare.to_ascii_lowercase().as_str() {
        "date" => Datatype::Date,
        "select" => Datatype::Select,
        "multiple" => Datatype::Multiple,
        "nonnegativeinteger" | "integer" | "int" | "positiveinteger" => {
            Datatype::Numeric(NumericKind::NonNegativeInteger)
        }
        "decimal" | "float" | "double" | "number" => Datatype::Numeric(NumericKind::Decimal),
        _ => Datatype::Text,
    }
}
