//! Value representations.
//!
//! Generators produce [`GeneratedValue`]s. Binding flattens them into
//! [`BindValue`] scalars, one per final placeholder.

use std::fmt;

/// A value produced by a generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedValue {
    /// 64-bit signed integer
    Int(i64),

    /// String value
    Text(String),

    /// Ordered sequence of values (array parameters)
    Array(Vec<GeneratedValue>),
}

impl GeneratedValue {
    /// Try to get this value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as a string slice.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as an array.
    pub fn as_array(&self) -> Option<&[GeneratedValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Convert into a single bind argument. Arrays have no scalar form and bind as NULL.
    pub fn into_scalar(self) -> BindValue {
        match self {
            Self::Int(i) => BindValue::Int(i),
            Self::Text(s) => BindValue::Text(s),
            Self::Array(_) => BindValue::Null,
        }
    }
}

impl fmt::Display for GeneratedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
            Self::Array(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<i64> for GeneratedValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<String> for GeneratedValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for GeneratedValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<GeneratedValue>> for GeneratedValue {
    fn from(items: Vec<GeneratedValue>) -> Self {
        Self::Array(items)
    }
}

/// A scalar bound to exactly one placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    /// SQL NULL
    Null,

    /// 64-bit signed integer
    Int(i64),

    /// String value
    Text(String),
}

impl fmt::Display for BindValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}
