//! In-process evaluation of filters and sort keys over JSON rows.
//!
//! Semantics follow SQL: a comparison against a missing or `null` column
//! value never matches, `LIKE` understands `%`, `_` and `\` escapes, and
//! `ILIKE` compares lowercased text.

use std::cmp::Ordering;

use serde_json::Value;
use uuid::Uuid;

use enghub_core::error::AppError;
use enghub_core::result::AppResult;
use enghub_core::traits::{Column, ColumnType, TableSchema};
use enghub_core::types::{Filter, FilterField, FilterOp, FilterValue, SortField};

/// Whether `row` satisfies every condition of `filter`.
pub(crate) fn matches(row: &Value, schema: &TableSchema, filter: Option<&Filter>) -> AppResult<bool> {
    let Some(filter) = filter else {
        return Ok(true);
    };
    for field in &filter.fields {
        if !condition(row, schema, field)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Stable sort of `rows` by `sort`; `null` orders before any value.
pub(crate) fn sort_rows(rows: &mut [&Value], schema: &TableSchema, sort: &SortField) -> AppResult<()> {
    let column = schema.require_column(&sort.field)?;
    let ascending = sort.direction.is_ascending();
    rows.sort_by(|a, b| {
        let ordering = compare_values(column, cell(a, column), cell(b, column));
        if ascending { ordering } else { ordering.reverse() }
    });
    Ok(())
}

/// Reduce `row` to the listed columns.
pub(crate) fn project(row: &Value, columns: &[&str]) -> Value {
    let object = columns
        .iter()
        .map(|name| {
            let value = row.get(*name).cloned().unwrap_or(Value::Null);
            ((*name).to_string(), value)
        })
        .collect();
    Value::Object(object)
}

fn cell<'a>(row: &'a Value, column: &Column) -> &'a Value {
    row.get(column.name).unwrap_or(&Value::Null)
}

fn condition(row: &Value, schema: &TableSchema, field: &FilterField) -> AppResult<bool> {
    let column = schema.require_column(&field.field)?;
    let actual = cell(row, column);

    match (field.op, &field.value) {
        (FilterOp::IsNull, _) | (FilterOp::Eq, FilterValue::Null) => Ok(actual.is_null()),
        (FilterOp::IsNotNull, _) | (FilterOp::Ne, FilterValue::Null) => Ok(!actual.is_null()),
        (op @ (FilterOp::Like | FilterOp::ILike), FilterValue::String(pattern)) => {
            let Some(text) = as_text(actual) else {
                return Ok(false);
            };
            Ok(if op == FilterOp::ILike {
                like(&text.to_lowercase(), &pattern.to_lowercase())
            } else {
                like(&text, pattern)
            })
        }
        (FilterOp::In, FilterValue::StringList(values)) => {
            for value in values {
                let candidate = FilterValue::String(value.clone());
                if compare(column, actual, &candidate, field)? == Some(Ordering::Equal) {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        (FilterOp::Like | FilterOp::ILike | FilterOp::In, _)
        | (_, FilterValue::Null | FilterValue::StringList(_)) => Err(mismatch(field)),
        (op, expected) => {
            let Some(ordering) = compare(column, actual, expected, field)? else {
                return Ok(false);
            };
            Ok(match op {
                FilterOp::Eq => ordering == Ordering::Equal,
                FilterOp::Ne => ordering != Ordering::Equal,
                FilterOp::Gt => ordering == Ordering::Greater,
                FilterOp::Gte => ordering != Ordering::Less,
                FilterOp::Lt => ordering == Ordering::Less,
                FilterOp::Lte => ordering != Ordering::Greater,
                _ => false,
            })
        }
    }
}

/// Order `actual` relative to `expected`, or `None` when `actual` is null.
fn compare(
    column: &Column,
    actual: &Value,
    expected: &FilterValue,
    field: &FilterField,
) -> AppResult<Option<Ordering>> {
    if actual.is_null() {
        return Ok(None);
    }
    let ordering = match (column.column_type, expected) {
        (ColumnType::Uuid, FilterValue::String(s)) => {
            let expected = Uuid::parse_str(s).map_err(|_| {
                AppError::invalid_argument(format!("'{s}' is not a valid UUID for '{}'", column.name))
            })?;
            actual
                .as_str()
                .and_then(|a| Uuid::parse_str(a).ok())
                .map(|a| a.cmp(&expected))
        }
        (ColumnType::Text, FilterValue::String(s)) => actual.as_str().map(|a| a.cmp(s.as_str())),
        (ColumnType::Boolean, FilterValue::Boolean(b)) => actual.as_bool().map(|a| a.cmp(b)),
        (ColumnType::Integer, FilterValue::Integer(n)) => actual.as_i64().map(|a| a.cmp(n)),
        (ColumnType::Integer, FilterValue::Float(n)) => {
            actual.as_f64().and_then(|a| a.partial_cmp(n))
        }
        _ => return Err(mismatch(field)),
    };
    Ok(ordering)
}

fn compare_values(column: &Column, a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => match column.column_type {
            ColumnType::Uuid => {
                let parse = |v: &Value| v.as_str().and_then(|s| Uuid::parse_str(s).ok());
                parse(a).cmp(&parse(b))
            }
            ColumnType::Text => compare_text(a.as_str(), b.as_str()),
            ColumnType::Boolean => a.as_bool().cmp(&b.as_bool()),
            ColumnType::Integer => a
                .as_f64()
                .partial_cmp(&b.as_f64())
                .unwrap_or(Ordering::Equal),
        },
    }
}

/// Case-insensitive order with a byte-order tie break, close to what a
/// PostgreSQL linguistic collation gives for Latin text. Scripts without
/// case (Arabic) still order by code point, which may differ from the
/// database collation.
fn compare_text(a: Option<&str>, b: Option<&str>) -> Ordering {
    let folded = |s: Option<&str>| s.map(str::to_lowercase);
    folded(a).cmp(&folded(b)).then_with(|| a.cmp(&b))
}

/// The `::text` rendering of a column value.
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    AnySequence,
    AnyChar,
    Literal(char),
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => Token::AnySequence,
            '_' => Token::AnyChar,
            '\\' => Token::Literal(chars.next().unwrap_or('\\')),
            other => Token::Literal(other),
        });
    }
    tokens
}

/// SQL `LIKE` match of the whole of `text` against `pattern`.
fn like(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let tokens = tokenize(pattern);
    let (mut t, mut p) = (0, 0);
    // Position after the last `%` and the text index it is retrying from.
    let mut retry: Option<(usize, usize)> = None;

    while t < text.len() {
        match tokens.get(p) {
            Some(Token::Literal(c)) if *c == text[t] => {
                t += 1;
                p += 1;
            }
            Some(Token::AnyChar) => {
                t += 1;
                p += 1;
            }
            Some(Token::AnySequence) => {
                p += 1;
                retry = Some((p, t));
            }
            _ => match retry {
                Some((after, from)) => {
                    p = after;
                    t = from + 1;
                    retry = Some((after, from + 1));
                }
                None => return false,
            },
        }
    }
    tokens[p..].iter().all(|t| *t == Token::AnySequence)
}

fn mismatch(field: &FilterField) -> AppError {
    AppError::invalid_argument(format!(
        "Operator {:?} cannot compare '{}' with {:?}",
        field.op, field.field, field.value
    ))
}
