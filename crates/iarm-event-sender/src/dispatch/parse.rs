//! Conversion of raw command-line text into typed values.

use thiserror::Error;

use super::descriptor::{ArgKind, TypedValue};

/// A raw argument that does not satisfy its declared kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{value}' is not a valid {kind}")]
pub struct ArgParseError {
    /// Offending text.
    pub value: String,
    /// Kind that was expected.
    pub kind: ArgKind,
}

/// Parses `raw` as `kind`.
///
/// Integers never fail: they follow C `atoi`, so `"abc"` is `0` and `"12ab"`
/// is `12`. Scripts on deployed boxes rely on that leniency.
///
/// # Errors
///
/// Returns [`ArgParseError`] for booleans other than `1`, `true`, `0` and
/// `false` (case-insensitive).
pub fn parse_argument(raw: &str, kind: ArgKind) -> Result<TypedValue, ArgParseError> {
    match kind {
        ArgKind::Integer => Ok(TypedValue::Integer(parse_integer(raw))),
        ArgKind::Boolean => parse_boolean(raw).map(TypedValue::Boolean),
        ArgKind::String => Ok(TypedValue::String(raw.to_owned())),
    }
}

/// C `atoi`: optional leading whitespace, an optional sign, then as many
/// decimal digits as follow. Values beyond `i32` saturate.
#[must_use]
pub fn parse_integer(raw: &str) -> i32 {
    let trimmed = raw.trim_start_matches([' ', '\t', '\n', '\r', '\u{b}', '\u{c}']);
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, trimmed.get(1..).unwrap_or_default()),
        Some(b'+') => (false, trimmed.get(1..).unwrap_or_default()),
        _ => (false, trimmed),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, digit| {
            acc.saturating_mul(10)
                .saturating_add(i64::from(digit - b'0'))
        });
    let signed = if negative { -magnitude } else { magnitude };
    i32::try_from(signed).unwrap_or(if negative { i32::MIN } else { i32::MAX })
}

/// Strict boolean parsing.
///
/// # Errors
///
/// Returns [`ArgParseError`] for anything other than the four accepted
/// spellings.
pub fn parse_boolean(raw: &str) -> Result<bool, ArgParseError> {
    if raw == "1" || raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if raw == "0" || raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ArgParseError {
            value: raw.to_owned(),
            kind: ArgKind::Boolean,
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("42", 42)]
    #[case("  -7", -7)]
    #[case("+3", 3)]
    #[case("12ab", 12)]
    #[case("0x10", 0)]
    #[case("", 0)]
    #[case("-", 0)]
    #[case("99999999999", i32::MAX)]
    #[case("-99999999999", i32::MIN)]
    fn integers_follow_atoi(#[case] raw: &str, #[case] expected: i32) {
        assert_eq!(parse_integer(raw), expected);
    }

    #[test]
    fn non_numeric_integer_is_silently_zero() {
        assert_eq!(
            parse_argument("abc", ArgKind::Integer),
            Ok(TypedValue::Integer(0))
        );
    }

    #[rstest]
    #[case("1", true)]
    #[case("TRUE", true)]
    #[case("True", true)]
    #[case("0", false)]
    #[case("false", false)]
    fn accepts_boolean_spellings(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(parse_boolean(raw), Ok(expected));
    }

    #[rstest]
    #[case("yes")]
    #[case("2")]
    #[case("")]
    #[case(" true")]
    fn rejects_other_booleans(#[case] raw: &str) {
        let error = parse_boolean(raw).expect_err("boolean should be rejected");
        assert_eq!(error.value, raw);
    }

    #[test]
    fn strings_pass_through_unchanged() {
        assert_eq!(
            parse_argument(" spaced  ", ArgKind::String),
            Ok(TypedValue::String(String::from(" spaced  ")))
        );
    }
}
