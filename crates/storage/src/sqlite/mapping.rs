use intake_core::model::{FollowupAnswer, Response, ResponseKey};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn index_to_i64(index: usize) -> Result<i64, StorageError> {
    i64::try_from(index)
        .map_err(|_| StorageError::Serialization("question_index overflow".into()))
}

fn index_from_i64(v: i64) -> Result<usize, StorageError> {
    usize::try_from(v)
        .map_err(|_| StorageError::Serialization(format!("invalid question_index: {v}")))
}

pub(crate) fn followups_to_json(followups: &[FollowupAnswer]) -> Result<String, StorageError> {
    serde_json::to_string(followups).map_err(ser)
}

pub(crate) fn map_response_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<(ResponseKey, Response), StorageError> {
    let section: String = row.try_get("section").map_err(ser)?;
    let index = index_from_i64(row.try_get::<i64, _>("question_index").map_err(ser)?)?;
    let answer: String = row.try_get("answer").map_err(ser)?;
    let followups_raw: String = row.try_get("followups").map_err(ser)?;
    let followups: Vec<FollowupAnswer> = serde_json::from_str(&followups_raw).map_err(ser)?;
    let answered_at: chrono::DateTime<chrono::Utc> = row.try_get("answered_at").map_err(ser)?;

    Ok((
        ResponseKey::new(section, index),
        Response::new(answer, followups, answered_at),
    ))
}
