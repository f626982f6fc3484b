//! Filter expressions for index queries.
//!
//! `Filter` is a small typed AST that renders to the engine's filter syntax
//! (`attr:"value"`, `attr:min TO max`, `attr > n`, `( a OR b )`, `a AND b`)
//! and can also evaluate itself against an `IndexRecord`, which is how the
//! in-memory engine applies filters.

use std::fmt;

use product_search_shared::IndexRecord;

/// A filter over index record attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// String attribute (or any element of a list attribute) equals `value`.
    Eq { attribute: String, value: String },
    /// Numeric attribute within `min..=max`.
    Range { attribute: String, min: u64, max: u64 },
    /// Numeric attribute strictly greater than `value`.
    GreaterThan { attribute: String, value: u64 },
    /// At least one child matches. Rendered parenthesized.
    Or(Vec<Filter>),
    /// Every child matches.
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Eq {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn range(attribute: impl Into<String>, min: u64, max: u64) -> Self {
        Self::Range {
            attribute: attribute.into(),
            min,
            max,
        }
    }

    pub fn greater_than(attribute: impl Into<String>, value: u64) -> Self {
        Self::GreaterThan {
            attribute: attribute.into(),
            value,
        }
    }

    /// Membership test: the attribute equals any of `values`.
    pub fn any_of<I, S>(attribute: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Or(
            values
                .into_iter()
                .map(|value| Self::eq(attribute, value))
                .collect(),
        )
    }

    /// Evaluate the filter against a record.
    ///
    /// An empty `And` matches everything; an empty `Or` matches nothing.
    pub fn matches(&self, record: &IndexRecord) -> bool {
        match self {
            Filter::Eq { attribute, value } => record
                .string_values(attribute)
                .iter()
                .any(|candidate| candidate == value),
            Filter::Range {
                attribute,
                min,
                max,
            } => record
                .numeric_value(attribute)
                .is_some_and(|n| n >= *min && n <= *max),
            Filter::GreaterThan { attribute, value } => record
                .numeric_value(attribute)
                .is_some_and(|n| n > *value),
            Filter::Or(children) => children.iter().any(|c| c.matches(record)),
            Filter::And(children) => children.iter().all(|c| c.matches(record)),
        }
    }
}

/// Quote a string filter value, escaping backslashes and double quotes.
pub fn quote_value(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Eq { attribute, value } => write!(f, "{}:{}", attribute, quote_value(value)),
            Filter::Range {
                attribute,
                min,
                max,
            } => write!(f, "{}:{} TO {}", attribute, min, max),
            Filter::GreaterThan { attribute, value } => write!(f, "{} > {}", attribute, value),
            Filter::Or(children) => {
                let parts: Vec<String> = children.iter().map(|c| c.to_string()).collect();
                write!(f, "({})", parts.join(" OR "))
            }
            Filter::And(children) => {
                let parts: Vec<String> = children
                    .iter()
                    .map(|c| match c {
                        Filter::And(inner) if inner.len() > 1 => format!("({})", c),
                        _ => c.to_string(),
                    })
                    .collect();
                write!(f, "{}", parts.join(" AND "))
            }
        }
    }
}
