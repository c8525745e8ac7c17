use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::attendance::{ArrivalFilter, ArrivalKind, ArrivalRecord};
use crate::store::{ArrivalStore, StoreError};

use super::PgStore;

const COLUMNS: &str = "id, actor_id, student_id, confirmed, arrival_day, created_at, updated_at";

fn map_sqlx_error(err: sqlx::Error, what: &str) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound(what.to_string()),
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(format!(
            "{what} already exists for this actor, student and day"
        )),
        unavailable @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed) => {
            StoreError::Unavailable(unavailable.to_string())
        }
        other => StoreError::Sqlx(other),
    }
}

#[async_trait]
impl ArrivalStore for PgStore {
    async fn find_for_day(
        &self,
        kind: ArrivalKind,
        actor_id: &str,
        student_id: &str,
        day: NaiveDate,
    ) -> Result<ArrivalRecord, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM {} WHERE actor_id = $1 AND student_id = $2 AND arrival_day = $3",
            kind.table_name()
        );

        sqlx::query_as::<_, ArrivalRecord>(&sql)
            .bind(actor_id)
            .bind(student_id)
            .bind(day)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "arrival"))
    }

    async fn insert(&self, kind: ArrivalKind, record: &ArrivalRecord) -> Result<(), StoreError> {
        let sql = format!(
            "INSERT INTO {} ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            kind.table_name()
        );

        sqlx::query(&sql)
            .bind(record.id)
            .bind(&record.actor_id)
            .bind(&record.student_id)
            .bind(record.confirmed)
            .bind(record.arrival_day)
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "arrival"))?;
        Ok(())
    }

    async fn update_confirmation(
        &self,
        kind: ArrivalKind,
        id: Uuid,
        confirmed: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<ArrivalRecord, StoreError> {
        let sql = format!(
            "UPDATE {} SET confirmed = $2, updated_at = $3 WHERE id = $1 RETURNING {COLUMNS}",
            kind.table_name()
        );

        sqlx::query_as::<_, ArrivalRecord>(&sql)
            .bind(id)
            .bind(confirmed)
            .bind(updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "arrival"))
    }

    async fn list(&self, kind: ArrivalKind, filter: &ArrivalFilter) -> Result<Vec<ArrivalRecord>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM {} \
             WHERE arrival_day >= $1 AND arrival_day < $2 AND ($3::text IS NULL OR actor_id = $3) \
             ORDER BY created_at",
            kind.table_name()
        );

        sqlx::query_as::<_, ArrivalRecord>(&sql)
            .bind(filter.from)
            .bind(filter.until)
            .bind(filter.actor_id.as_deref())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "arrival"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_row_is_not_found() {
        // find_for_day relies on this to choose insert over update
        let err = map_sqlx_error(sqlx::Error::RowNotFound, "arrival");
        assert!(matches!(err, StoreError::NotFound(what) if what == "arrival"));
    }

    #[test]
    fn exhausted_pool_is_unavailable() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut, "arrival"),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolClosed, "arrival"),
            StoreError::Unavailable(_)
        ));
    }

    #[test]
    fn other_errors_pass_through() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::ColumnNotFound("arrival_day".to_string()), "arrival"),
            StoreError::Sqlx(_)
        ));
    }
}
