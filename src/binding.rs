//! Argument binding with array expansion.
//!
//! Templates use MySQL positional `?` placeholders, one per parameter. At bind
//! time an array value of length k replaces its placeholder with k
//! comma-joined placeholders and contributes k arguments, so
//! `IN (?)` bound to `[1, 2, 3]` becomes `IN (?,?,?)`.

use std::fmt;

use workload_core::{BindValue, GeneratedValue};

/// A statement ready to send to the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    pub sql: String,
    pub args: Vec<BindValue>,
}

impl fmt::Display for BoundStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql)?;
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(ToString::to_string).collect();
            write!(f, " -- [{}]", args.join(", "))?;
        }
        Ok(())
    }
}

/// Placeholder count and value count differ.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("SQL has {placeholders} placeholder(s) but {} value(s) were generated", .values.len())]
pub struct BindingMismatchError {
    pub sql: String,
    pub values: Vec<GeneratedValue>,
    pub placeholders: usize,
}

impl BindingMismatchError {
    /// The original SQL with one argument per value, unexpanded.
    ///
    /// Arrays have no scalar form and are sent as NULL; the driver then
    /// reports the placeholder mismatch.
    pub fn into_unexpanded(self) -> BoundStatement {
        BoundStatement {
            sql: self.sql,
            args: self
                .values
                .into_iter()
                .map(GeneratedValue::into_scalar)
                .collect(),
        }
    }
}

/// How a statement's result is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Result rows must be drained
    Read,
    /// Result summary is discarded
    Write,
}

impl StatementKind {
    /// A statement is a read when its trimmed text starts with `SELECT`
    /// (any case).
    pub fn classify(sql: &str) -> Self {
        let head = sql.trim_start().get(..6);
        match head {
            Some(head) if head.eq_ignore_ascii_case("select") => StatementKind::Read,
            _ => StatementKind::Write,
        }
    }
}

/// Byte offsets of every `?` placeholder outside quoted literals and
/// identifiers.
pub fn placeholder_positions(sql: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut quote: Option<char> = None;
    let mut chars = sql.char_indices();

    while let Some((idx, c)) = chars.next() {
        match quote {
            Some(q) => {
                // Backticks do not support backslash escapes.
                if c == '\\' && q != '`' {
                    chars.next();
                } else if c == q {
                    // A doubled quote closes and immediately reopens.
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '?' => positions.push(idx),
                _ => {}
            },
        }
    }

    positions
}

/// Number of `?` placeholders outside quoted literals.
pub fn count_placeholders(sql: &str) -> usize {
    placeholder_positions(sql).len()
}

/// Bind `values` to the placeholders of `sql`, expanding arrays.
///
/// An empty array keeps a single placeholder bound to NULL. Fails when the
/// placeholder count differs from the number of values.
pub fn bind(sql: &str, values: Vec<GeneratedValue>) -> Result<BoundStatement, BindingMismatchError> {
    let positions = placeholder_positions(sql);
    if positions.len() != values.len() {
        return Err(BindingMismatchError {
            sql: sql.to_string(),
            placeholders: positions.len(),
            values,
        });
    }

    let mut out = String::with_capacity(sql.len());
    let mut args = Vec::with_capacity(values.len());
    let mut last = 0;

    for (pos, value) in positions.into_iter().zip(values) {
        out.push_str(&sql[last..pos]);
        last = pos + 1;

        match value {
            GeneratedValue::Array(elements) if elements.is_empty() => {
                out.push('?');
                args.push(BindValue::Null);
            }
            GeneratedValue::Array(elements) => {
                let placeholders = vec!["?"; elements.len()].join(",");
                out.push_str(&placeholders);
                args.extend(elements.into_iter().map(GeneratedValue::into_scalar));
            }
            scalar => {
                out.push('?');
                args.push(scalar.into_scalar());
            }
        }
    }
    out.push_str(&sql[last..]);

    Ok(BoundStatement { sql: out, args })
}
