//! Partial-number text: the editing grammar, blur normalization, and conversion.
//!
//! Every value a numeric field can hold is described by one grammar:
//!
//! ```text
//! numeric-text := [ "-" ] digit* [ "." digit* ]
//! digit        := "0" ... "9"
//! ```
//!
//! The grammar admits the intermediate states a user passes through while typing
//! (`""`, `"-"`, `"3."`, `"-.5"`), so keystroke validation and blur normalization
//! both work from the same compiled pattern.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use thiserror::Error;

use crate::locale::NumberLocale;

/// Maximum number of characters the editing surface accepts.
pub const MAX_NUMERIC_LEN: usize = 16;

/// Preview shown for an empty field.
pub const PREVIEW_PLACEHOLDER: &str = "Input a number";

// ASCII digits only: `\d` in the regex crate is Unicode-aware.
static GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?)([0-9]*)(?:\.([0-9]*))?$").expect("numeric grammar is a valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a partial number: {0:?}")]
pub struct InvalidNumericText(pub String);

/// The pieces of a grammar match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NumericParts<'a> {
    pub negative: bool,
    pub integer: &'a str,
    /// `None` when there is no `.`; `Some("")` for a trailing `.`.
    pub fraction: Option<&'a str>,
}

impl<'a> NumericParts<'a> {
    fn from_captures(caps: &Captures<'a>) -> Self {
        Self {
            negative: caps.get(1).is_some_and(|m| !m.as_str().is_empty()),
            integer: caps.get(2).map_or("", |m| m.as_str()),
            fraction: caps.get(3).map(|m| m.as_str()),
        }
    }

    #[must_use]
    pub fn has_digits(&self) -> bool {
        !self.integer.is_empty() || self.fraction.is_some_and(|f| !f.is_empty())
    }
}

/// Returns true if `raw` is accepted by the partial-number grammar.
///
/// `""` and `"-"` are members of the grammar, so no special cases are needed.
#[must_use]
pub fn is_numeric_text(raw: &str) -> bool {
    GRAMMAR.is_match(raw)
}

/// A string that always satisfies the partial-number grammar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NumericText(String);

impl NumericText {
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidNumericText> {
        let raw = raw.into();
        if is_numeric_text(&raw) {
            Ok(Self(raw))
        } else {
            Err(InvalidNumericText(raw))
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn parts(&self) -> NumericParts<'_> {
        split(&self.0)
    }

    /// Blur-time cleanup.
    ///
    /// 1. A trailing `.` or a lone `-` is dropped. A `-` left behind by that step
    ///    (input `"-."`) is dropped too, so normalizing twice changes nothing.
    /// 2. Leading zeros are stripped from the *first* run of digits only, keeping
    ///    at least one digit (`0*(\d+)` replaced by `$1`, first match). When the
    ///    integer part is empty the first run is the fraction: `".005"` becomes
    ///    `".5"`.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut text = self.0.as_str();
        if text == "-" || text.ends_with('.') {
            text = &text[..text.len() - 1];
        }
        if text == "-" {
            text = "";
        }

        let parts = split(text);

        let mut out = String::with_capacity(text.len());
        if parts.negative {
            out.push('-');
        }
        if parts.integer.is_empty() {
            if let Some(fraction) = parts.fraction {
                out.push('.');
                out.push_str(strip_leading_zeros(fraction));
            }
        } else {
            out.push_str(strip_leading_zeros(parts.integer));
            if let Some(fraction) = parts.fraction {
                out.push('.');
                out.push_str(fraction);
            }
        }
        Self(out)
    }

    /// Numeric value of the text. Texts without digits (`""`, `"-"`, `"."`) are NaN.
    #[must_use]
    pub fn to_number(&self) -> f64 {
        if !self.parts().has_digits() {
            return f64::NAN;
        }
        self.0.parse::<f64>().unwrap_or(f64::NAN)
    }

    /// Text for the focus preview: placeholder when empty, `-` verbatim, otherwise the
    /// typed digits rounded to three fraction digits and formatted with `locale`'s separators.
    #[must_use]
    pub fn preview(&self, locale: &NumberLocale) -> String {
        match self.0.as_str() {
            "" => PREVIEW_PLACEHOLDER.to_string(),
            "-" => "-".to_string(),
            _ => {
                let parts = self.parts();
                if !parts.has_digits() {
                    return locale.format(f64::NAN);
                }
                locale.format_decimal(parts.negative, parts.integer, parts.fraction.unwrap_or(""))
            }
        }
    }
}

impl fmt::Display for NumericText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NumericText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NumericText {
    type Error = InvalidNumericText;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for NumericText {
    type Error = InvalidNumericText;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Text that does not match the grammar splits as empty.
fn split(text: &str) -> NumericParts<'_> {
    GRAMMAR
        .captures(text)
        .map_or(NumericParts::default(), |caps| NumericParts::from_captures(&caps))
}

fn strip_leading_zeros(run: &str) -> &str {
    let trimmed = run.trim_start_matches('0');
    if trimmed.is_empty() && !run.is_empty() {
        &run[run.len() - 1..]
    } else {
        trimmed
    }
}

/// Render a computed number the way the result line shows it.
///
/// Integral values print without a fraction, `-0` prints as `0`, and magnitudes
/// outside `[1e-6, 1e21)` switch to exponent notation.
#[must_use]
pub fn display_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-Infinity" } else { "Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        let exp = format!("{value:e}");
        return match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
            _ => exp,
        };
    }
    format!("{value}")
}
