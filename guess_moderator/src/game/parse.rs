//! Guess and target value parsing.

use regex::Regex;
use std::sync::LazyLock;

use super::errors::GuessError;

/// Optional sign, digits, optional decimal point and digits, anchored at the
/// start of the message.
static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<value>[-+]?[0-9]+\.?[0-9]*)").expect("leading number pattern is valid")
});

/// Leading numeric token of a chat message, if any.
pub fn leading_number(raw: &str) -> Option<&str> {
    LEADING_NUMBER
        .captures(raw)
        .and_then(|caps| caps.name("value"))
        .map(|m| m.as_str())
}

/// Whether a message looks like a guess (starts with a number).
pub fn is_guess(raw: &str) -> bool {
    leading_number(raw).is_some()
}

/// Parse the leading number of `raw` as a non-negative whole guess.
///
/// Anything after the number is ignored, so `"12 for sure"` is 12.
/// `"7.0"` is whole and accepted; `"7.5"` is not.
///
/// # Errors
///
/// - `NotANumber` if there is no leading number, it has a fractional part,
///   or it doesn't fit in a `u64`
/// - `NegativeValue` if the number is whole and below zero
pub fn parse_guess(raw: &str) -> Result<u64, GuessError> {
    let token = leading_number(raw).ok_or(GuessError::NotANumber)?;

    let (negative, unsigned) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token.strip_prefix('+').unwrap_or(token)),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    if fraction.bytes().any(|b| b != b'0') {
        return Err(GuessError::NotANumber);
    }

    // -0 is still zero
    if negative && whole.bytes().any(|b| b != b'0') {
        return Err(GuessError::NegativeValue);
    }

    whole.parse::<u64>().map_err(|_| GuessError::NotANumber)
}

/// Parse a scoring target. Targets may be fractional but must be finite.
pub fn parse_target(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|target| target.is_finite())
}
