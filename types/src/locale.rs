//! Locale-aware number formatting for the field preview.
//!
//! Output follows the defaults of a locale's standard decimal format: grouped
//! integer digits, at most three fraction digits, trailing fraction zeros dropped.

use thiserror::Error;

/// Fraction digits kept by the preview formatter.
const MAX_FRACTION_DIGITS: usize = 3;

const NARROW_NBSP: &str = "\u{202f}";
const NBSP: &str = "\u{a0}";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocaleError {
    #[error("locale tag is empty")]
    Empty,
    #[error("malformed locale tag: {0:?}")]
    Malformed(String),
}

/// Separator conventions for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Conventions {
    group: &'static str,
    decimal: char,
    /// Grouping only applies once the integer part has at least `3 + this` digits.
    min_grouping_digits: usize,
}

const COMMA_DOT: Conventions = Conventions {
    group: ",",
    decimal: '.',
    min_grouping_digits: 1,
};

const DOT_COMMA: Conventions = Conventions {
    group: ".",
    decimal: ',',
    min_grouping_digits: 1,
};

fn conventions_for(language: &str) -> Conventions {
    match language {
        "de" | "id" | "it" | "nl" | "tr" | "da" | "el" | "sl" | "hr" | "ro" | "pt" => DOT_COMMA,
        "es" => Conventions {
            min_grouping_digits: 2,
            ..DOT_COMMA
        },
        "fr" => Conventions {
            group: NARROW_NBSP,
            decimal: ',',
            min_grouping_digits: 1,
        },
        "ru" | "uk" | "cs" | "sk" | "fi" | "sv" | "nb" | "no" | "bg" => Conventions {
            group: NBSP,
            decimal: ',',
            min_grouping_digits: 1,
        },
        "pl" => Conventions {
            group: NBSP,
            decimal: ',',
            min_grouping_digits: 2,
        },
        // English and anything unrecognized.
        _ => COMMA_DOT,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberLocale {
    tag: String,
    conventions: Conventions,
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self::en_us()
    }
}

impl NumberLocale {
    #[must_use]
    pub fn en_us() -> Self {
        Self {
            tag: "en-US".to_string(),
            conventions: COMMA_DOT,
        }
    }

    /// Parse a BCP 47 style tag (`"pt-BR"`, `"de"`). Only the language subtag selects
    /// conventions; unknown languages format like English.
    pub fn parse(tag: &str) -> Result<Self, LocaleError> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(LocaleError::Empty);
        }
        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        let well_formed =
            (2..=3).contains(&language.len()) && language.chars().all(|c| c.is_ascii_alphabetic());
        if !well_formed {
            return Err(LocaleError::Malformed(tag.to_string()));
        }
        Ok(Self {
            tag: tag.replace('_', "-"),
            conventions: conventions_for(&language),
        })
    }

    /// Parse a POSIX locale value as found in `LANG` / `LC_NUMERIC`
    /// (`"pt_BR.UTF-8"`, `"de_DE@euro"`). `C` and `POSIX` map to `en-US`.
    pub fn from_posix(raw: &str) -> Result<Self, LocaleError> {
        let base = raw.split(['.', '@']).next().unwrap_or_default().trim();
        if base.eq_ignore_ascii_case("c") || base.eq_ignore_ascii_case("posix") {
            return Ok(Self::en_us());
        }
        Self::parse(base)
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn decimal_separator(&self) -> char {
        self.conventions.decimal
    }

    #[must_use]
    pub fn group_separator(&self) -> &'static str {
        self.conventions.group
    }

    /// Format `value` with this locale's separators.
    ///
    /// The value is taken at its shortest round-trip decimal form and then rounded
    /// like [`NumberLocale::format_decimal`], so `1.0005` becomes `1.001`.
    #[must_use]
    pub fn format(&self, value: f64) -> String {
        if value.is_nan() {
            return "NaN".to_string();
        }
        if value.is_infinite() {
            return if value < 0.0 { "-∞" } else { "∞" }.to_string();
        }

        let repr = value.abs().to_string();
        let (integer, fraction) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
        self.format_decimal(value.is_sign_negative(), integer, fraction)
    }

    /// Format a decimal given as its digit strings.
    ///
    /// The fraction is rounded half away from zero to three digits, carrying into
    /// the integer part, and trailing zeros are dropped. The sign is kept for zero.
    #[must_use]
    pub fn format_decimal(&self, negative: bool, integer: &str, fraction: &str) -> String {
        let (integer, fraction) = round_half_expand(integer, fraction);

        let mut out = String::with_capacity(integer.len() * 2 + fraction.len() + 2);
        if negative {
            out.push('-');
        }
        self.push_grouped(&mut out, &integer);
        if !fraction.is_empty() {
            out.push(self.conventions.decimal);
            out.push_str(&fraction);
        }
        out
    }

    fn push_grouped(&self, out: &mut String, digits: &str) {
        let Conventions {
            group,
            min_grouping_digits,
            ..
        } = self.conventions;
        if digits.len() < 3 + min_grouping_digits {
            out.push_str(digits);
            return;
        }
        let head = match digits.len() % 3 {
            0 => 3,
            n => n,
        };
        out.push_str(&digits[..head]);
        let mut rest = &digits[head..];
        while !rest.is_empty() {
            out.push_str(group);
            out.push_str(&rest[..3]);
            rest = &rest[3..];
        }
    }
}

/// Round `integer.fraction` to [`MAX_FRACTION_DIGITS`] places, half away from zero.
/// Returns the integer digits without leading zeros and the fraction without trailing zeros.
fn round_half_expand(integer: &str, fraction: &str) -> (String, String) {
    let (kept, dropped) = fraction.split_at(fraction.len().min(MAX_FRACTION_DIGITS));
    let mut digits: Vec<u8> = integer.bytes().chain(kept.bytes()).collect();

    if dropped.as_bytes().first().is_some_and(|d| *d >= b'5') {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - kept.len();
    let (int_digits, frac_digits) = digits.split_at(split);
    let int_digits = String::from_utf8_lossy(int_digits);
    let frac_digits = String::from_utf8_lossy(frac_digits);

    let int_digits = int_digits.trim_start_matches('0');
    let int_digits = if int_digits.is_empty() { "0" } else { int_digits };
    (
        int_digits.to_string(),
        frac_digits.trim_end_matches('0').to_string(),
    )
}
