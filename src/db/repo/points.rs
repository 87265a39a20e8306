//! Point entry operations for the repository.

use crate::domain::{Address, Amount, Point, SignedAmount};
use crate::store::StoreError;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::Repository;

fn corrupt(key: &str, field: &'static str, message: impl ToString) -> StoreError {
    StoreError::Corrupt {
        key: key.to_string(),
        field,
        message: message.to_string(),
    }
}

fn point_from_row(row: &SqliteRow) -> Result<Point, StoreError> {
    let address_str: String = row.try_get("address")?;
    let balance_str: String = row.try_get("balance")?;
    let in_str: String = row.try_get("time_weight_amount_in")?;
    let out_str: String = row.try_get("time_weight_amount_out")?;

    let address: Address = address_str
        .parse()
        .map_err(|e| corrupt(&address_str, "address", e))?;
    let balance = SignedAmount::from_str_canonical(&balance_str)
        .map_err(|e| corrupt(&address_str, "balance", e))?;
    let time_weight_amount_in = Amount::from_str_canonical(&in_str)
        .map_err(|e| corrupt(&address_str, "time_weight_amount_in", e))?;
    let time_weight_amount_out = Amount::from_str_canonical(&out_str)
        .map_err(|e| corrupt(&address_str, "time_weight_amount_out", e))?;

    Ok(Point {
        address,
        balance,
        time_weight_amount_in,
        time_weight_amount_out,
    })
}

impl Repository {
    /// Load the point for a canonical address.
    ///
    /// # Errors
    /// Returns an error if the query fails or the stored row does not parse.
    pub async fn load_point(&self, address: &Address) -> Result<Option<Point>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT address, balance, time_weight_amount_in, time_weight_amount_out
            FROM points
            WHERE address = ?
            "#,
        )
        .bind(address.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(point_from_row).transpose()
    }

    /// Insert or replace a point keyed by its address.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub async fn upsert_point(&self, point: &Point) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO points (address, balance, time_weight_amount_in, time_weight_amount_out, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(address) DO UPDATE SET
                balance = excluded.balance,
                time_weight_amount_in = excluded.time_weight_amount_in,
                time_weight_amount_out = excluded.time_weight_amount_out,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(point.address.to_string())
        .bind(point.balance.to_canonical_string())
        .bind(point.time_weight_amount_in.to_canonical_string())
        .bind(point.time_weight_amount_out.to_canonical_string())
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All points, ordered by address.
    ///
    /// # Errors
    /// Returns an error if the query fails or a row does not parse.
    pub async fn query_points(&self) -> Result<Vec<Point>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT address, balance, time_weight_amount_in, time_weight_amount_out
            FROM points
            ORDER BY address ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(point_from_row).collect()
    }

    /// Number of stored points.
    pub async fn count_points(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM points")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
