//! Identifier rendering
//!
//! Callers key results on the uid text they already know, so a non-string
//! uid is rendered the way the scoring service always has: `True`/`False`/
//! `None`, shortest round-trip floats with `1e-05` style exponents, exact
//! integers, and containers as `[1, 'a']` / `{'k': None}`.

use crate::types::json::{is_integer, raw_number, raw_number_value};
use serde_json::Value;

/// Render a decoded uid value as text. Strings are used verbatim.
pub fn render_uid(value: &Value) -> String {
    match value {
        Value::String(s) if raw_number(value).is_none() => s.clone(),
        other => {
            let mut out = String::new();
            write_repr(other, &mut out);
            out
        }
    }
}

fn write_repr(value: &Value, out: &mut String) {
    if let Some(token) = raw_number(value) {
        out.push_str(&raw_number_text(token));
        return;
    }

    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                out.push_str(&i.to_string());
            } else if let Some(u) = n.as_u64() {
                out.push_str(&u.to_string());
            } else {
                out.push_str(&n.as_f64().map_or_else(|| n.to_string(), float_text));
            }
        }
        Value::String(s) => write_quoted(s, out),
        Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                write_repr(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (index, (key, item)) in map.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                write_quoted(key, out);
                out.push_str(": ");
                write_repr(item, out);
            }
            out.push('}');
        }
    }
}

fn raw_number_text(token: &str) -> String {
    if is_integer(token) {
        return token.to_string();
    }
    raw_number_value(token).map_or_else(|| token.to_string(), float_text)
}

/// Shortest round-trip text of a float.
///
/// Decimal exponents in [-4, 16) print positionally with at least one
/// fractional digit; others print as `d.ddde+XX`.
pub fn float_text(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..16).contains(&exponent) {
        let positional = value.to_string();
        if positional.contains('.') {
            positional
        } else {
            format!("{}.0", positional)
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}

/// Single-quoted unless only the single quote appears in `s`
fn write_quoted(s: &str, out: &mut String) {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };

    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(quote);
}
