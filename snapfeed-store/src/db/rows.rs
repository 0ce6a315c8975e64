use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Params, Row};

use snapfeed_types::parse_timestamp;

use crate::error::{StoreError, StoreResult};

/// Decode a nullable RFC 3339 column.
pub(crate) fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        parse_timestamp(&s)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

pub(crate) fn query_optional<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> StoreResult<Option<T>> {
    let mut stmt = conn.prepare(sql)?;
    Ok(stmt.query_row(params, map).optional()?)
}

pub(crate) fn query_list<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> StoreResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, map)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub(crate) fn query_count<P: Params>(conn: &Connection, sql: &str, params: P) -> StoreResult<i64> {
    Ok(conn.query_row(sql, params, |row| row.get(0))?)
}

/// Convert a failed write, logging integrity rejections.
pub(crate) fn write_error(entity: &'static str, err: rusqlite::Error) -> StoreError {
    let err = StoreError::from(err);
    if let StoreError::ConstraintViolation { kind, message } = &err {
        tracing::warn!(entity, %kind, %message, "Write rejected by constraint");
    }
    err
}

/// Map "no row changed" onto `NotFound`.
pub(crate) fn expect_affected(affected: usize, entity: &'static str, key: impl std::fmt::Display) -> StoreResult<()> {
    if affected == 0 {
        Err(StoreError::not_found(entity, key))
    } else {
        Ok(())
    }
}
