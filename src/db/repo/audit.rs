//! Audit record and cursor operations for the repository.

use crate::domain::{AuditId, AuditRecord, EventOrderingKey};
use crate::store::StoreError;
use sqlx::Row;

use super::{from_sql_int, to_sql_int, Repository};

impl Repository {
    /// Insert an audit record unless its id already exists.
    ///
    /// Returns true if the record was inserted.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_audit_record(&self, record: &AuditRecord) -> Result<bool, StoreError> {
        let id = record.id.to_string();
        let block_number = to_sql_int(record.block_number, &id, "block_number")?;
        let block_timestamp = to_sql_int(record.block_timestamp, &id, "block_timestamp")?;

        let result = sqlx::query(
            r#"
            INSERT INTO audit_records (id, kind, params, block_number, block_timestamp, transaction_hash, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(&id)
        .bind(&record.kind)
        .bind(record.params.to_string())
        .bind(block_number)
        .bind(block_timestamp)
        .bind(record.transaction_hash.to_string())
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Load an audit record by id.
    ///
    /// # Errors
    /// Returns an error if the query fails or the stored row does not parse.
    pub async fn load_audit_record(&self, id: &AuditId) -> Result<Option<AuditRecord>, StoreError> {
        let key = id.to_string();
        let row = sqlx::query(
            r#"
            SELECT kind, params, block_number, block_timestamp, transaction_hash
            FROM audit_records
            WHERE id = ?
            "#,
        )
        .bind(&key)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let params_str: String = row.try_get("params")?;
        let params = serde_json::from_str(&params_str).map_err(|e| StoreError::Corrupt {
            key: key.clone(),
            field: "params",
            message: e.to_string(),
        })?;
        let tx_str: String = row.try_get("transaction_hash")?;
        let transaction_hash = tx_str.parse().map_err(|e: crate::domain::AddressParseError| {
            StoreError::Corrupt {
                key: key.clone(),
                field: "transaction_hash",
                message: e.to_string(),
            }
        })?;

        Ok(Some(AuditRecord {
            id: *id,
            kind: row.try_get("kind")?,
            params,
            block_number: from_sql_int(row.try_get("block_number")?, &key, "block_number")?,
            block_timestamp: from_sql_int(
                row.try_get("block_timestamp")?,
                &key,
                "block_timestamp",
            )?,
            transaction_hash,
        }))
    }

    /// Read the indexer cursor.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_cursor(&self) -> Result<Option<EventOrderingKey>, StoreError> {
        let row = sqlx::query("SELECT block_number, log_index FROM indexer_cursor WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let block_number = from_sql_int(row.try_get("block_number")?, "cursor", "block_number")?;
        let log_index: i64 = row.try_get("log_index")?;
        let log_index = u32::try_from(log_index).map_err(|_| StoreError::Corrupt {
            key: "cursor".to_string(),
            field: "log_index",
            message: format!("{} is not a valid log index", log_index),
        })?;

        Ok(Some(EventOrderingKey::new(block_number, log_index)))
    }

    /// Store the indexer cursor, replacing the previous one.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub async fn store_cursor(&self, key: EventOrderingKey) -> Result<(), StoreError> {
        let block_number = to_sql_int(key.block_number, "cursor", "block_number")?;

        sqlx::query(
            r#"
            INSERT INTO indexer_cursor (id, block_number, log_index, updated_at)
            VALUES (1, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                block_number = excluded.block_number,
                log_index = excluded.log_index,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(block_number)
        .bind(i64::from(key.log_index))
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
