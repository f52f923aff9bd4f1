//! Payload JSON decoding that tolerates non-finite numbers
//!
//! Payload producers write `NaN`, `Infinity` and `-Infinity` literals and
//! floats beyond f64 range, all of which `serde_json` rejects. Before decoding,
//! such tokens are rewritten into marked strings. Integers outside i64/u64
//! are marked as well so their exact digits survive. [`raw_number`] recognizes
//! a marked value after decoding.

use serde_json::Value;
use std::borrow::Cow;

/// Prefix of a marked number once decoded
const RAW_NUMBER_TAG: &str = "\u{0}num:";

/// The same prefix as written into JSON text
const RAW_NUMBER_ESCAPED: &str = "\\u0000num:";

/// Decode a JSON document, accepting non-finite and out-of-range numbers
pub fn from_str(text: &str) -> serde_json::Result<Value> {
    serde_json::from_str(&mark_raw_numbers(text))
}

/// Original token of a marked number, if `value` is one
pub fn raw_number(value: &Value) -> Option<&str> {
    value
        .as_str()?
        .strip_prefix(RAW_NUMBER_TAG)
        .filter(|token| is_literal(token) || is_json_number(token))
}

/// Float value of a marked number token.
///
/// Out-of-range floats become infinite. An integer too large for f64 has no
/// float value.
pub fn raw_number_value(token: &str) -> Option<f64> {
    match token {
        "NaN" => Some(f64::NAN),
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ => {
            let value = token.parse::<f64>().ok()?;
            if is_integer(token) && value.is_infinite() {
                None
            } else {
                Some(value)
            }
        }
    }
}

/// Whether a marked token is written as an integer
pub fn is_integer(token: &str) -> bool {
    token.bytes().all(|b| b == b'-' || b.is_ascii_digit())
}

fn mark_raw_numbers(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    let mut marked: Option<String> = None;
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => i = string_end(bytes, i),
            b'N' | b'I' | b'-' | b'0'..=b'9' => {
                let end = token_end(bytes, i);
                let token = &text[i..end];
                if needs_mark(token) {
                    let out = marked.get_or_insert_with(|| String::with_capacity(text.len() + 32));
                    out.push_str(&text[copied..i]);
                    out.push('"');
                    out.push_str(RAW_NUMBER_ESCAPED);
                    out.push_str(token);
                    out.push('"');
                    copied = end;
                }
                i = end;
            }
            _ => i += 1,
        }
    }

    match marked {
        Some(mut out) => {
            out.push_str(&text[copied..]);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(text),
    }
}

/// Index just past the string literal opening at `start`
fn string_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn token_end(bytes: &[u8], start: usize) -> usize {
    let len = bytes[start..]
        .iter()
        .take_while(|&&b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
        .count();
    start + len
}

fn needs_mark(token: &str) -> bool {
    if is_literal(token) {
        return true;
    }
    if !is_json_number(token) {
        return false;
    }
    if is_integer(token) {
        token.parse::<i64>().is_err() && token.parse::<u64>().is_err()
    } else {
        token.parse::<f64>().map_or(false, f64::is_infinite)
    }
}

fn is_literal(token: &str) -> bool {
    matches!(token, "NaN" | "Infinity" | "-Infinity")
}

/// `-?(0|[1-9][0-9]*)(.[0-9]+)?([eE][+-]?[0-9]+)?`
fn is_json_number(token: &str) -> bool {
    let unsigned = token.strip_prefix('-').unwrap_or(token);

    let (int, rest) = split_digits(unsigned);
    if int.is_empty() || (int.len() > 1 && int.starts_with('0')) {
        return false;
    }

    let rest = match rest.strip_prefix('.') {
        Some(frac) => {
            let (digits, rest) = split_digits(frac);
            if digits.is_empty() {
                return false;
            }
            rest
        }
        None => rest,
    };

    match rest.strip_prefix(|c: char| c == 'e' || c == 'E') {
        Some(exp) => {
            let exp = exp.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(exp);
            let (digits, rest) = split_digits(exp);
            !digits.is_empty() && rest.is_empty()
        }
        None => rest.is_empty(),
    }
}

fn split_digits(s: &str) -> (&str, &str) {
    let len = s.bytes().take_while(u8::is_ascii_digit).count();
    s.split_at(len)
}
