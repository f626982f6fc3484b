//! Value coercion helpers shared by the transformer and the inventory resolver.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Coerce a JSON number or numeric string to a non-negative integer.
///
/// Negative values clamp to 0 and fractional values are truncated. Returns
/// `None` for anything that is not numeric-like (null, bool, objects,
/// non-numeric strings, NaN).
pub fn coerce_quantity(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Some(u)
            } else if let Some(i) = n.as_i64() {
                Some(i.max(0) as u64)
            } else {
                n.as_f64().and_then(clamp_float)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                Some(i.max(0) as u64)
            } else {
                s.parse::<f64>().ok().and_then(clamp_float)
            }
        }
        _ => None,
    }
}

fn clamp_float(f: f64) -> Option<u64> {
    if !f.is_finite() {
        return None;
    }
    Some(if f <= 0.0 { 0 } else { f.trunc() as u64 })
}

/// Normalize an RFC 3339 timestamp to UTC with millisecond precision.
///
/// Unparsable values are returned unchanged; a missing value becomes the
/// empty string.
pub fn normalize_timestamp(raw: Option<&str>) -> String {
    match raw {
        None => String::new(),
        Some(raw) => DateTime::parse_from_rfc3339(raw.trim())
            .map(|dt| {
                dt.with_timezone(&Utc)
                    .to_rfc3339_opts(SecondsFormat::Millis, true)
            })
            .unwrap_or_else(|_| raw.to_string()),
    }
}

/// Build a URL slug: lowercase ASCII alphanumerics, every other run of
/// characters collapsed to one hyphen, no leading or trailing hyphen.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_quantity() {
        assert_eq!(coerce_quantity(&json!(7)), Some(7));
        assert_eq!(coerce_quantity(&json!("12")), Some(12));
        assert_eq!(coerce_quantity(&json!(" 3 ")), Some(3));
        assert_eq!(coerce_quantity(&json!(4.9)), Some(4));
        assert_eq!(coerce_quantity(&json!("2.5")), Some(2));
        assert_eq!(coerce_quantity(&json!(-5)), Some(0));
        assert_eq!(coerce_quantity(&json!("-1")), Some(0));
        assert_eq!(coerce_quantity(&json!("many")), None);
        assert_eq!(coerce_quantity(&json!(null)), None);
        assert_eq!(coerce_quantity(&json!(true)), None);
        assert_eq!(coerce_quantity(&json!({"stocked": 1})), None);
        assert_eq!(coerce_quantity(&json!("NaN")), None);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Blue T-Shirt!!"), "blue-t-shirt");
        assert_eq!(slugify("  --Hello,   World--  "), "hello-world");
        assert_eq!(slugify("Café Noir 2"), "caf-noir-2");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_normalize_timestamp() {
        assert_eq!(
            normalize_timestamp(Some("2024-03-01T10:20:30+02:00")),
            "2024-03-01T08:20:30.000Z"
        );
        assert_eq!(
            normalize_timestamp(Some("2024-03-01T10:20:30.123456Z")),
            "2024-03-01T10:20:30.123Z"
        );
        assert_eq!(normalize_timestamp(Some("yesterday")), "yesterday");
        assert_eq!(normalize_timestamp(None), "");
    }
}
