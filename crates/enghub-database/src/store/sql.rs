//! PostgreSQL statement builders.
//!
//! Identifiers are only ever taken from a static [`TableSchema`] and are
//! quoted; every value is a bound parameter. Rows are read back as `jsonb`
//! so one decoder serves every table.

use serde_json::Value;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use enghub_core::error::AppError;
use enghub_core::result::AppResult;
use enghub_core::traits::{ChangeKind, Column, ColumnType, QuerySpec, StagedChange, TableSchema, Window};
use enghub_core::types::{FilterField, FilterOp, FilterValue};

const ALIAS: &str = "t";

pub(crate) type Statement = QueryBuilder<'static, Postgres>;

fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn qualified(column: &Column) -> String {
    format!("{ALIAS}.{}", quote(column.name))
}

fn row_expression(schema: &TableSchema, projection: Option<&[&'static str]>) -> AppResult<String> {
    let Some(columns) = projection else {
        return Ok(format!("to_jsonb({ALIAS})"));
    };
    let pairs = columns
        .iter()
        .map(|name| {
            let column = schema.require_column(name)?;
            Ok(format!("'{}', {}", column.name, qualified(column)))
        })
        .collect::<AppResult<Vec<_>>>()?;
    Ok(format!("jsonb_build_object({})", pairs.join(", ")))
}

/// `SELECT` matching rows as `jsonb`, optionally projected and windowed.
///
/// A windowed query without an explicit sort is ordered by primary key so
/// that consecutive pages do not overlap.
pub(crate) fn select(
    query: QuerySpec<'_>,
    projection: Option<&[&'static str]>,
    window: Option<Window>,
) -> AppResult<Statement> {
    let schema = &query.schema;
    let mut qb = QueryBuilder::new(format!(
        "SELECT {} AS data FROM {} {ALIAS}",
        row_expression(schema, projection)?,
        quote(schema.name)
    ));
    push_where(&mut qb, query)?;

    match query.sort {
        Some(sort) => {
            let column = schema.require_column(&sort.field)?;
            let nulls = if sort.direction.is_ascending() {
                "NULLS FIRST"
            } else {
                "NULLS LAST"
            };
            qb.push(format!(
                " ORDER BY {} {} {nulls}",
                qualified(column),
                sort.direction.as_sql()
            ));
        }
        None if window.is_some() => {
            qb.push(format!(" ORDER BY {ALIAS}.{}", quote(schema.key)));
        }
        None => {}
    }

    if let Some(window) = window {
        qb.push(" LIMIT ")
            .push_bind(i64::try_from(window.limit).unwrap_or(i64::MAX))
            .push(" OFFSET ")
            .push_bind(i64::try_from(window.offset).unwrap_or(i64::MAX));
    }
    Ok(qb)
}

/// `SELECT COUNT(*)` of matching rows.
pub(crate) fn count(query: QuerySpec<'_>) -> AppResult<Statement> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT COUNT(*) FROM {} {ALIAS}",
        quote(query.schema.name)
    ));
    push_where(&mut qb, query)?;
    Ok(qb)
}

/// `SELECT` one row by primary key.
pub(crate) fn find(schema: &TableSchema, key: Uuid) -> Statement {
    let mut qb = QueryBuilder::new(format!(
        "SELECT to_jsonb({ALIAS}) AS data FROM {} {ALIAS} WHERE {ALIAS}.{} = ",
        quote(schema.name),
        quote(schema.key)
    ));
    qb.push_bind(key);
    qb
}

/// The `INSERT`, `UPDATE` or `DELETE` statement for one staged change.
pub(crate) fn write(change: &StagedChange) -> AppResult<Statement> {
    let schema = &change.schema;
    match change.kind {
        ChangeKind::Insert => {
            let names = schema
                .columns
                .iter()
                .map(|c| quote(c.name))
                .collect::<Vec<_>>()
                .join(", ");
            let mut qb = QueryBuilder::new(format!(
                "INSERT INTO {} ({names}) VALUES (",
                quote(schema.name)
            ));
            for (i, column) in schema.columns.iter().enumerate() {
                if i > 0 {
                    qb.push(", ");
                }
                bind_row_value(&mut qb, column, &change.row)?;
            }
            qb.push(")");
            Ok(qb)
        }
        ChangeKind::Update => {
            let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", quote(schema.name)));
            let assignable = schema.columns.iter().filter(|c| c.name != schema.key);
            for (i, column) in assignable.enumerate() {
                if i > 0 {
                    qb.push(", ");
                }
                qb.push(format!("{} = ", quote(column.name)));
                bind_row_value(&mut qb, column, &change.row)?;
            }
            qb.push(format!(" WHERE {} = ", quote(schema.key)));
            qb.push_bind(change.key);
            Ok(qb)
        }
        ChangeKind::Delete => {
            let mut qb = QueryBuilder::new(format!(
                "DELETE FROM {} WHERE {} = ",
                quote(schema.name),
                quote(schema.key)
            ));
            qb.push_bind(change.key);
            Ok(qb)
        }
    }
}

fn push_where(qb: &mut Statement, query: QuerySpec<'_>) -> AppResult<()> {
    let Some(filter) = query.filter else {
        return Ok(());
    };
    for (i, field) in filter.fields.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        push_condition(qb, &query.schema, field)?;
    }
    Ok(())
}

fn push_condition(qb: &mut Statement, schema: &TableSchema, field: &FilterField) -> AppResult<()> {
    let column = schema.require_column(&field.field)?;
    let target = qualified(column);

    match (field.op, &field.value) {
        (FilterOp::IsNull, _) | (FilterOp::Eq, FilterValue::Null) => {
            qb.push(format!("{target} IS NULL"));
        }
        (FilterOp::IsNotNull, _) | (FilterOp::Ne, FilterValue::Null) => {
            qb.push(format!("{target} IS NOT NULL"));
        }
        (FilterOp::Like | FilterOp::ILike, FilterValue::String(pattern)) => {
            qb.push(format!("{target}::text {} ", field.op.as_sql()));
            qb.push_bind(pattern.clone());
        }
        (FilterOp::In, FilterValue::StringList(values)) => {
            qb.push(format!("{target} = ANY("));
            match column.column_type {
                ColumnType::Uuid => {
                    let keys = values
                        .iter()
                        .map(|v| parse_uuid(column, v))
                        .collect::<AppResult<Vec<_>>>()?;
                    qb.push_bind(keys);
                }
                ColumnType::Text => {
                    qb.push_bind(values.clone());
                }
                _ => return Err(mismatch(field)),
            }
            qb.push(")");
        }
        (FilterOp::Like | FilterOp::ILike | FilterOp::In, _)
        | (_, FilterValue::Null | FilterValue::StringList(_)) => return Err(mismatch(field)),
        (op, value) => {
            qb.push(format!("{target} {} ", op.as_sql()));
            match (column.column_type, value) {
                (ColumnType::Uuid, FilterValue::String(s)) => {
                    qb.push_bind(parse_uuid(column, s)?);
                }
                (ColumnType::Text, FilterValue::String(s)) => {
                    qb.push_bind(s.clone());
                }
                (ColumnType::Boolean, FilterValue::Boolean(b)) => {
                    qb.push_bind(*b);
                }
                (ColumnType::Integer, FilterValue::Integer(n)) => {
                    qb.push_bind(*n);
                }
                (ColumnType::Integer, FilterValue::Float(n)) => {
                    qb.push_bind(*n);
                }
                _ => return Err(mismatch(field)),
            }
        }
    }
    Ok(())
}

fn bind_row_value(qb: &mut Statement, column: &Column, row: &Value) -> AppResult<()> {
    let value = row.get(column.name).unwrap_or(&Value::Null);
    match (column.column_type, value) {
        (ColumnType::Uuid, Value::Null) => {
            qb.push_bind(None::<Uuid>);
        }
        (ColumnType::Uuid, Value::String(s)) => {
            qb.push_bind(Some(parse_uuid(column, s)?));
        }
        (ColumnType::Text, Value::Null) => {
            qb.push_bind(None::<String>);
        }
        (ColumnType::Text, Value::String(s)) => {
            qb.push_bind(Some(s.clone()));
        }
        (ColumnType::Boolean, Value::Null) => {
            qb.push_bind(None::<bool>);
        }
        (ColumnType::Boolean, Value::Bool(b)) => {
            qb.push_bind(Some(*b));
        }
        (ColumnType::Integer, Value::Null) => {
            qb.push_bind(None::<i64>);
        }
        (ColumnType::Integer, Value::Number(n)) if n.is_i64() => {
            qb.push_bind(n.as_i64());
        }
        (column_type, other) => {
            return Err(AppError::invalid_argument(format!(
                "Column '{}' expects {} but got {other}",
                column.name,
                column_type.sql_type()
            )));
        }
    }
    Ok(())
}

fn parse_uuid(column: &Column, value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| {
        AppError::invalid_argument(format!("'{value}' is not a valid UUID for '{}'", column.name))
    })
}

fn mismatch(field: &FilterField) -> AppError {
    AppError::invalid_argument(format!(
        "Operator {:?} cannot compare '{}' with {:?}",
        field.op, field.field, field.value
    ))
}
