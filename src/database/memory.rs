//! In-process store used by `serve --memory` and the test suites.
//!
//! Enforces the same once-per-day uniqueness as the PostgreSQL indexes so the
//! recorder behaves identically on either backend.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::accounts::Account;
use crate::attendance::{ArrivalFilter, ArrivalKind, ArrivalRecord};
use crate::auth::Role;
use crate::store::{AccountStore, ArrivalStore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    arrivals: RwLock<HashMap<ArrivalKind, Vec<ArrivalRecord>>>,
    accounts: RwLock<HashMap<(Role, String), Account>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a login account. Emails are matched case-insensitively.
    pub async fn add_account(&self, role: Role, email: &str, password_hash: &str) -> Account {
        let account = Account {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        };
        self.accounts
            .write()
            .await
            .insert((role, email.to_lowercase()), account.clone());
        account
    }

    pub async fn arrival_count(&self, kind: ArrivalKind) -> usize {
        self.arrivals.read().await.get(&kind).map_or(0, Vec::len)
    }
}

#[async_trait]
impl ArrivalStore for MemoryStore {
    async fn find_for_day(
        &self,
        kind: ArrivalKind,
        actor_id: &str,
        student_id: &str,
        day: NaiveDate,
    ) -> Result<ArrivalRecord, StoreError> {
        let arrivals = self.arrivals.read().await;
        arrivals
            .get(&kind)
            .and_then(|records| {
                records.iter().find(|r| {
                    r.actor_id == actor_id && r.student_id == student_id && r.arrival_day == day
                })
            })
            .cloned()
            .ok_or_else(|| StoreError::NotFound("arrival".to_string()))
    }

    async fn insert(&self, kind: ArrivalKind, record: &ArrivalRecord) -> Result<(), StoreError> {
        let mut arrivals = self.arrivals.write().await;
        let records = arrivals.entry(kind).or_default();

        let duplicate = records.iter().any(|r| {
            r.id == record.id
                || (r.actor_id == record.actor_id
                    && r.student_id == record.student_id
                    && r.arrival_day == record.arrival_day)
        });
        if duplicate {
            return Err(StoreError::Conflict(
                "arrival already exists for this actor, student and day".to_string(),
            ));
        }

        records.push(record.clone());
        Ok(())
    }

    async fn update_confirmation(
        &self,
        kind: ArrivalKind,
        id: Uuid,
        confirmed: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<ArrivalRecord, StoreError> {
        let mut arrivals = self.arrivals.write().await;
        let record = arrivals
            .get_mut(&kind)
            .and_then(|records| records.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| StoreError::NotFound(format!("arrival {id}")))?;

        record.confirmed = confirmed;
        record.updated_at = updated_at;
        Ok(record.clone())
    }

    async fn list(&self, kind: ArrivalKind, filter: &ArrivalFilter) -> Result<Vec<ArrivalRecord>, StoreError> {
        let arrivals = self.arrivals.read().await;
        let mut matched: Vec<ArrivalRecord> = arrivals
            .get(&kind)
            .map(|records| records.iter().filter(|r| filter.matches(r)).cloned().collect())
            .unwrap_or_default();
        matched.sort_by_key(|r| r.created_at);
        Ok(matched)
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_by_email(&self, role: Role, email: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&(role, email.to_lowercase())).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn record(actor: &str, student: &str, d: u32) -> ArrivalRecord {
        let now = Utc.with_ymd_and_hms(2024, 3, d, 8, 0, 0).unwrap();
        ArrivalRecord::new(actor, student, false, day(d), now)
    }

    #[tokio::test]
    async fn duplicate_day_insert_conflicts() {
        let store = MemoryStore::new();
        store.insert(ArrivalKind::School, &record("s1", "kid", 4)).await.unwrap();

        let err = store.insert(ArrivalKind::School, &record("s1", "kid", 4)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // other kind and other day are independent
        store.insert(ArrivalKind::Home, &record("s1", "kid", 4)).await.unwrap();
        store.insert(ArrivalKind::School, &record("s1", "kid", 5)).await.unwrap();
        assert_eq!(store.arrival_count(ArrivalKind::School).await, 2);
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let store = MemoryStore::new();
        let err = store.find_for_day(ArrivalKind::Home, "p", "kid", day(4)).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let err = store
            .update_confirmation(ArrivalKind::Home, Uuid::new_v4(), true, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_applies_filter() {
        let store = MemoryStore::new();
        for (actor, d) in [("a", 4), ("b", 4), ("a", 5), ("a", 11)] {
            store.insert(ArrivalKind::Home, &record(actor, "kid", d)).await.unwrap();
        }

        let filter = ArrivalFilter { actor_id: Some("a".to_string()), from: day(4), until: day(11) };
        let listed = store.list(ArrivalKind::Home, &filter).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at <= listed[1].created_at);
    }

    #[tokio::test]
    async fn account_lookup_ignores_email_case() {
        let store = MemoryStore::new();
        store.add_account(Role::Parent, "Parent@Example.com", "hash").await;

        assert!(store.find_by_email(Role::Parent, "parent@example.COM").await.unwrap().is_some());
        assert!(store.find_by_email(Role::Staff, "parent@example.com").await.unwrap().is_none());
    }
}
