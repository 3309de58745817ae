//! Index and ordering descriptors.
//!
//! `@Index("name DESC, age")` and `@OrderBy("date DESC")` share one textual
//! form: comma-separated property names, each optionally followed by `ASC` or
//! `DESC` (case-insensitive).

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedProperty {
    pub name: String,
    pub order: IndexOrder,
}

/// Composite index declared at entity level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableIndex {
    pub name: Option<String>,
    pub properties: Vec<OrderedProperty>,
    pub is_unique: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderSpecError {
    #[error("empty property list")]
    Empty,
    #[error("empty entry at position {0}")]
    EmptyEntry(usize),
    #[error("unknown order '{order}' for property '{property}' (expected ASC or DESC)")]
    UnknownOrder { property: String, order: String },
    #[error("too many tokens in '{0}'")]
    TooManyTokens(String),
}

/// Parse `"name DESC, age"` into ordered properties.
///
/// # Errors
/// Returns `OrderSpecError` for empty lists, empty entries, unknown order
/// keywords, or entries with more than two tokens.
pub fn parse_order_spec(spec: &str) -> Result<Vec<OrderedProperty>, OrderSpecError> {
    if spec.trim().is_empty() {
        return Err(OrderSpecError::Empty);
    }

    spec.split(',')
        .enumerate()
        .map(|(position, entry)| {
            let mut tokens = entry.split_whitespace();
            let name = tokens.next().ok_or(OrderSpecError::EmptyEntry(position))?;
            let order = match tokens.next() {
                None => IndexOrder::Ascending,
                Some(token) if token.eq_ignore_ascii_case("asc") => IndexOrder::Ascending,
                Some(token) if token.eq_ignore_ascii_case("desc") => IndexOrder::Descending,
                Some(token) => {
                    return Err(OrderSpecError::UnknownOrder {
                        property: name.to_string(),
                        order: token.to_string(),
                    });
                }
            };
            if tokens.next().is_some() {
                return Err(OrderSpecError::TooManyTokens(entry.trim().to_string()));
            }
            Ok(OrderedProperty {
                name: name.to_string(),
                order,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_mixed_orders() {
        let parsed = parse_order_spec("name DESC, age").expect("valid spec");
        assert_eq!(
            parsed,
            vec![
                OrderedProperty {
                    name: "name".to_string(),
                    order: IndexOrder::Descending,
                },
                OrderedProperty {
                    name: "age".to_string(),
                    order: IndexOrder::Ascending,
                },
            ]
        );
    }

    #[test]
    fn order_keywords_are_case_insensitive() {
        let parsed = parse_order_spec("a asc,b Desc").expect("valid spec");
        assert_eq!(parsed[0].order, IndexOrder::Ascending);
        assert_eq!(parsed[1].order, IndexOrder::Descending);
    }

    #[test]
    fn rejects_malformed_specs() {
        assert_eq!(parse_order_spec("  "), Err(OrderSpecError::Empty));
        assert_eq!(parse_order_spec("a,,b"), Err(OrderSpecError::EmptyEntry(1)));
        assert!(matches!(
            parse_order_spec("a UP"),
            Err(OrderSpecError::UnknownOrder { .. })
        ));
        assert!(matches!(
            parse_order_spec("a DESC x"),
            Err(OrderSpecError::TooManyTokens(_))
        ));
    }
}
