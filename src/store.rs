//! Storage capabilities the core depends on.
//!
//! Implemented for PostgreSQL in `database::arrivals` / `database::accounts`
//! and in memory by `database::memory::MemoryStore`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::accounts::Account;
use crate::attendance::{ArrivalFilter, ArrivalKind, ArrivalRecord};
use crate::auth::Role;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The lookup matched nothing. Never a failure on its own for the recorder.
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[async_trait]
pub trait ArrivalStore: Send + Sync {
    /// The record for `(actor_id, student_id, day)`, or [`StoreError::NotFound`].
    async fn find_for_day(
        &self,
        kind: ArrivalKind,
        actor_id: &str,
        student_id: &str,
        day: NaiveDate,
    ) -> Result<ArrivalRecord, StoreError>;

    async fn insert(&self, kind: ArrivalKind, record: &ArrivalRecord) -> Result<(), StoreError>;

    /// Set `confirmed` and `updated_at` on an existing record and return it.
    async fn update_confirmation(
        &self,
        kind: ArrivalKind,
        id: Uuid,
        confirmed: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<ArrivalRecord, StoreError>;

    /// Records matching `filter`, oldest first.
    async fn list(&self, kind: ArrivalKind, filter: &ArrivalFilter) -> Result<Vec<ArrivalRecord>, StoreError>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// The account of `role` registered under `email`, if any.
    async fn find_by_email(&self, role: Role, email: &str) -> Result<Option<Account>, StoreError>;
}
