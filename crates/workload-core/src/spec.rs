//! Declarative parameter specifications.
//!
//! A [`ParamSpec`] is the raw, file-level description of how one SQL
//! parameter is generated. All fields except the ones needed by the resolved
//! `(type, random_mode)` pair are ignored; validation happens when the
//! generator factory builds a generator from the spec.

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;

/// The value family a parameter produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Integer values
    Number,
    /// String values
    String,
    /// Formatted timestamps (strings)
    Date,
    /// Fixed-size sequences of values of another type
    Array,
}

impl ParamType {
    /// Name of this type as written in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Number => "number",
            ParamType::String => "string",
            ParamType::Date => "date",
            ParamType::Array => "array",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "number" => Ok(ParamType::Number),
            "string" => Ok(ParamType::String),
            "date" => Ok(ParamType::Date),
            "array" => Ok(ParamType::Array),
            other => Err(other.to_string()),
        }
    }
}

/// Values for the `string/set` mode.
///
/// A mapping deserializes into [`SetValues::Weighted`] (value → weight, file
/// order preserved); a list deserializes into [`SetValues::Enumerated`].
#[derive(Debug, Clone, PartialEq)]
pub enum SetValues {
    /// Value → relative weight, in declaration order
    Weighted(Vec<(String, f64)>),
    /// Plain list of candidate values
    Enumerated(Vec<String>),
}

impl SetValues {
    /// Short description of the shape, used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            SetValues::Weighted(_) => "mapping",
            SetValues::Enumerated(_) => "list",
        }
    }
}

impl<'de> Deserialize<'de> for SetValues {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SetValuesVisitor;

        impl<'de> Visitor<'de> for SetValuesVisitor {
            type Value = SetValues;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of value to weight or a list of strings")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((value, weight)) = map.next_entry::<String, f64>()? {
                    entries.push((value, weight));
                }
                Ok(SetValues::Weighted(entries))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(value) = seq.next_element::<String>()? {
                    values.push(value);
                }
                Ok(SetValues::Enumerated(values))
            }
        }

        deserializer.deserialize_any(SetValuesVisitor)
    }
}

/// Declarative generation rule for one SQL parameter.
///
/// `type` is optional at the file level because nested specs
/// (`number_config`, `element_config`) have it injected by their parent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamSpec {
    /// Value family (`number`, `string`, `date`, `array`)
    #[serde(rename = "type")]
    pub param_type: Option<String>,

    /// Distribution / construction mode within the type
    pub random_mode: Option<String>,

    // Number
    /// Minimum value (inclusive)
    pub min: Option<i64>,
    /// Maximum value (inclusive)
    pub max: Option<i64>,
    /// Power-law exponent
    pub exponent: Option<f64>,
    /// Number of buckets for `partition_power_law`
    pub partition: Option<i64>,

    // String / date
    /// `number_format` pattern or date output format
    pub format: Option<String>,
    /// Nested number spec for `number_format`
    pub number_config: Option<Box<ParamSpec>>,
    /// `weighted` or `uniform`
    pub set_mode: Option<String>,
    /// Candidate values for `set`
    pub values: Option<SetValues>,

    // Date
    /// Range start (RFC 3339 or `YYYY-MM-DD`)
    pub start_time: Option<String>,
    /// Range end (RFC 3339 or `YYYY-MM-DD`)
    pub end_time: Option<String>,

    // Array
    /// Number of elements per generated array
    pub array_size: Option<i64>,
    /// Type injected into `element_config`
    pub element_type: Option<String>,
    /// Element generation rule
    pub element_config: Option<Box<ParamSpec>>,
}

impl ParamSpec {
    /// Parse a single spec from a YAML (or JSON) snippet.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Return a copy of this spec with `type` set to `param_type`.
    pub fn with_type(&self, param_type: impl Into<String>) -> Self {
        Self {
            param_type: Some(param_type.into()),
            ..self.clone()
        }
    }
}
