//! Price parsing
//!
//! Legacy price strings come in two flavours and are parsed by two distinct
//! rules that must not be unified: order totals truncate to whole currency
//! units, while the cart display total reads the leading decimal value.

/// Parses the leading decimal portion of a price string.
///
/// Accepts an optional sign, digits, and a single fractional part; anything
/// after the numeric prefix is ignored. Strings with no numeric prefix parse
/// to `0.0`.
#[must_use]
pub fn parse_currency_float(input: &str) -> f64 {
    let prefix = numeric_prefix(input, true);

    prefix.parse().unwrap_or(0.0)
}

/// Parses the leading whole-number portion of a price string.
///
/// Decimal prices are truncated at the first non-digit character, so
/// `"100.50"` parses to `100`. Strings with no digit prefix parse to `0`.
#[must_use]
pub fn parse_currency_integer(input: &str) -> i64 {
    let prefix = numeric_prefix(input, false);

    prefix.parse().unwrap_or(0)
}

/// Returns the longest prefix of `input` that forms a number, skipping
/// leading whitespace. With `allow_fraction` a single decimal point and the
/// digits after it are included.
fn numeric_prefix(input: &str, allow_fraction: bool) -> &str {
    let trimmed = input.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (idx, ch) in trimmed.char_indices() {
        match ch {
            '+' | '-' if idx == 0 => end = idx + ch.len_utf8(),
            '0'..='9' => {
                seen_digit = true;
                end = idx + ch.len_utf8();
            }
            '.' if allow_fraction && !seen_dot => {
                seen_dot = true;
                end = idx + ch.len_utf8();
            }
            _ => break,
        }
    }

    if seen_digit {
        trimmed.get(..end).unwrap_or("")
    } else {
        ""
    }
}
