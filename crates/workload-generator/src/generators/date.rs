//! Timestamp value generators.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use workload_core::{GeneratedValue, ParamSpec};

use super::Generator;
use crate::error::{require, ConstructionError};
use crate::factory::GeneratorFactory;
use crate::WorkloadRng;

const TIMESTAMP_RANGE: &str = "date/timestamp_range";

/// Generate a random timestamp between `start` and `end` (both inclusive,
/// second resolution) rendered in UTC with a strftime format.
#[derive(Debug, Clone)]
pub struct TimestampRangeGenerator {
    start: i64,
    end: i64,
    format: String,
}

impl TimestampRangeGenerator {
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        format: impl Into<String>,
    ) -> Result<Self, ConstructionError> {
        let format = format.into();
        if start > end {
            return Err(ConstructionError::invalid(
                TIMESTAMP_RANGE,
                format!("start_time {start} is after end_time {end}"),
            ));
        }
        if format.is_empty() {
            return Err(ConstructionError::invalid(TIMESTAMP_RANGE, "format cannot be empty"));
        }
        let format = if format.contains('%') {
            format
        } else {
            go_layout_to_strftime(&format).ok_or_else(|| {
                ConstructionError::invalid(
                    TIMESTAMP_RANGE,
                    format!("'{format}' contains no date or time field"),
                )
            })?
        };

        let (malformed, has_field) = {
            let items: Vec<Item<'_>> = StrftimeItems::new(&format).collect();
            (
                items.iter().any(|item| matches!(item, Item::Error)),
                items
                    .iter()
                    .any(|item| matches!(item, Item::Numeric(..) | Item::Fixed(_))),
            )
        };
        if malformed {
            return Err(ConstructionError::invalid(
                TIMESTAMP_RANGE,
                format!("'{format}' is not a valid strftime format"),
            ));
        }
        if !has_field {
            return Err(ConstructionError::invalid(
                TIMESTAMP_RANGE,
                format!("'{format}' contains no date or time field"),
            ));
        }

        Ok(Self {
            start: start.timestamp(),
            end: end.timestamp(),
            format,
        })
    }

    pub fn sample(&self, rng: &mut WorkloadRng) -> DateTime<Utc> {
        let ts = rng.random_range(self.start..=self.end);
        // Both ends came from valid DateTimes, so every second in between is valid.
        DateTime::from_timestamp(ts, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }
}

impl Generator for TimestampRangeGenerator {
    fn generate(&self, rng: &mut WorkloadRng) -> GeneratedValue {
        GeneratedValue::Text(self.sample(rng).format(&self.format).to_string())
    }
}

/// Go reference-time tokens and their strftime equivalents. Longer tokens
/// come before their prefixes.
const GO_LAYOUT_TOKENS: &[(&str, &str)] = &[
    ("January", "%B"),
    ("Monday", "%A"),
    ("2006", "%Y"),
    ("-07:00", "%:z"),
    ("-0700", "%z"),
    (".000000000", "%.9f"),
    (".000000", "%.6f"),
    (".000", "%.3f"),
    ("Jan", "%b"),
    ("Mon", "%a"),
    ("MST", "%Z"),
    ("PM", "%p"),
    ("01", "%m"),
    ("02", "%d"),
    ("_2", "%e"),
    ("03", "%I"),
    ("04", "%M"),
    ("05", "%S"),
    ("06", "%y"),
    ("15", "%H"),
];

/// Translate a Go reference layout such as `2006-01-02 15:04:05` into a
/// strftime format. Returns `None` if the layout has no reference token.
///
/// Only the zero-padded tokens are recognized; a bare `1` or `2` stays
/// literal.
pub fn go_layout_to_strftime(layout: &str) -> Option<String> {
    let mut out = String::with_capacity(layout.len() * 2);
    let mut rest = layout;
    let mut translated = false;

    while let Some(c) = rest.chars().next() {
        match GO_LAYOUT_TOKENS
            .iter()
            .find(|(token, _)| rest.starts_with(token))
        {
            Some((token, strftime)) => {
                out.push_str(strftime);
                rest = &rest[token.len()..];
                translated = true;
            }
            None => {
                if c == '%' {
                    out.push_str("%%");
                } else {
                    out.push(c);
                }
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    translated.then_some(out)
}

/// Parse a timestamp string in various formats.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC 3339 / ISO 8601
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // Date only, at midnight UTC
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}

pub(crate) fn build_timestamp_range(
    _factory: &GeneratorFactory,
    spec: &ParamSpec,
) -> Result<Box<dyn Generator>, ConstructionError> {
    let start_time = require(&spec.start_time, TIMESTAMP_RANGE, "start_time")?;
    let end_time = require(&spec.end_time, TIMESTAMP_RANGE, "end_time")?;
    let format = require(&spec.format, TIMESTAMP_RANGE, "format")?;

    let start = parse_timestamp(start_time).ok_or_else(|| {
        ConstructionError::invalid(
            TIMESTAMP_RANGE,
            format!("cannot parse start_time '{start_time}'"),
        )
    })?;
    let end = parse_timestamp(end_time).ok_or_else(|| {
        ConstructionError::invalid(TIMESTAMP_RANGE, format!("cannot parse end_time '{end_time}'"))
    })?;

    Ok(Box::new(TimestampRangeGenerator::new(start, end, format.as_str())?))
}
