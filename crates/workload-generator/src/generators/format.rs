//! Integer format patterns for `number_format`.
//!
//! A pattern contains exactly one integer verb:
//! - `%d` - decimal integer
//! - `%5d` / `%-5d` / `%05d` / `%+d` - width, left-align, zero-pad, sign
//! - `%%` - literal percent sign (anywhere in the pattern)

/// An unusable pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("pattern must contain exactly one integer verb (%d)")]
    MissingVerb,

    #[error("pattern must contain exactly one integer verb, found several")]
    MultipleVerbs,

    #[error("unsupported verb '%{0}', only integer verbs (%d) are allowed")]
    UnsupportedVerb(char),

    #[error("pattern ends with a bare '%'")]
    BarePercent,

    #[error("width too large")]
    WidthOverflow,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Verb {
    left_align: bool,
    zero_pad: bool,
    plus_sign: bool,
    width: usize,
}

/// A parsed pattern: literal prefix, one integer verb, literal suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerFormat {
    prefix: String,
    verb: Verb,
    suffix: String,
}

impl IntegerFormat {
    /// Parse a pattern, requiring exactly one integer verb.
    pub fn parse(pattern: &str) -> Result<Self, FormatError> {
        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut verb: Option<Verb> = None;
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                if verb.is_some() {
                    suffix.push(c);
                } else {
                    prefix.push(c);
                }
                continue;
            }

            if chars.peek() == Some(&'%') {
                chars.next();
                if verb.is_some() {
                    suffix.push('%');
                } else {
                    prefix.push('%');
                }
                continue;
            }

            let mut spec = Verb::default();
            while let Some(&flag) = chars.peek() {
                match flag {
                    '-' => spec.left_align = true,
                    '0' => spec.zero_pad = true,
                    '+' => spec.plus_sign = true,
                    _ => break,
                }
                chars.next();
            }
            while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
                spec.width = spec
                    .width
                    .checked_mul(10)
                    .and_then(|w| w.checked_add(digit as usize))
                    .ok_or(FormatError::WidthOverflow)?;
                chars.next();
            }

            match chars.next() {
                Some('d') => {}
                Some(other) => return Err(FormatError::UnsupportedVerb(other)),
                None => return Err(FormatError::BarePercent),
            }

            if verb.is_some() {
                return Err(FormatError::MultipleVerbs);
            }
            verb = Some(spec);
        }

        let verb = verb.ok_or(FormatError::MissingVerb)?;

        Ok(Self {
            prefix,
            verb,
            suffix,
        })
    }

    /// Substitute `value` into the pattern.
    pub fn render(&self, value: i64) -> String {
        let sign = if value < 0 {
            "-"
        } else if self.verb.plus_sign {
            "+"
        } else {
            ""
        };
        let digits = value.unsigned_abs().to_string();
        let len = sign.len() + digits.len();
        let padding = self.verb.width.saturating_sub(len);

        let mut out =
            String::with_capacity(self.prefix.len() + len + padding + self.suffix.len());
        out.push_str(&self.prefix);
        if self.verb.left_align {
            out.push_str(sign);
            out.push_str(&digits);
            out.extend(std::iter::repeat(' ').take(padding));
        } else if self.verb.zero_pad {
            out.push_str(sign);
            out.extend(std::iter::repeat('0').take(padding));
            out.push_str(&digits);
        } else {
            out.extend(std::iter::repeat(' ').take(padding));
            out.push_str(sign);
            out.push_str(&digits);
        }
        out.push_str(&self.suffix);
        out
    }
}
