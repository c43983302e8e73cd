use intake_core::model::{Response, ResponseKey};

use super::{
    SqliteRepository,
    mapping::{followups_to_json, index_to_i64, map_response_row},
};
use crate::repository::{ResponseRepository, StorageError};

#[async_trait::async_trait]
impl ResponseRepository for SqliteRepository {
    async fn save_response(
        &self,
        key: &ResponseKey,
        response: &Response,
    ) -> Result<(), StorageError> {
        let index = index_to_i64(key.index)?;
        let followups = followups_to_json(response.followups())?;

        sqlx::query(
            r"
                INSERT INTO responses (section, question_index, answer, followups, answered_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(section, question_index) DO UPDATE SET
                    answer = excluded.answer,
                    followups = excluded.followups,
                    answered_at = excluded.answered_at
            ",
        )
        .bind(key.section.as_str())
        .bind(index)
        .bind(response.answer())
        .bind(followups)
        .bind(response.answered_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        tracing::debug!(%key, "response saved");
        Ok(())
    }

    async fn load_responses(&self) -> Result<Vec<(ResponseKey, Response)>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT section, question_index, answer, followups, answered_at
                FROM responses
                ORDER BY section ASC, question_index ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_response_row).collect()
    }

    async fn clear(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM responses")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }
}
