//! Once-per-day arrival confirmations.
//!
//! `record_confirmation` is a read followed by a write. Two callers racing on
//! the same `(kind, actor, student, day)` would both miss the read and both
//! insert, so the whole sequence runs under an async mutex keyed by that tuple.
//! The unique index on the arrival tables rejects a duplicate that slips past
//! from another process; the recorder then re-reads that row and updates it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use super::clock::{Clock, LocalCalendar};
use super::record::{ArrivalFilter, ArrivalKind, ArrivalRecord};
use crate::store::{ArrivalStore, StoreError};

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("actor id must not be empty")]
    EmptyActorId,

    #[error("student id must not be empty")]
    EmptyStudentId,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub record: ArrivalRecord,
    pub outcome: RecordOutcome,
}

type DayKey = (ArrivalKind, String, String, NaiveDate);

/// One key's mutex plus the number of callers holding or awaiting it.
struct Slot {
    mutex: Arc<AsyncMutex<()>>,
    users: usize,
}

#[derive(Default)]
struct KeyedLocks {
    entries: Mutex<HashMap<DayKey, Slot>>,
}

impl KeyedLocks {
    fn entries(&self) -> MutexGuard<'_, HashMap<DayKey, Slot>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn lock(&self, key: DayKey) -> DayLock<'_> {
        let mutex = {
            let mut entries = self.entries();
            let slot = entries.entry(key.clone()).or_insert_with(|| Slot {
                mutex: Arc::default(),
                users: 0,
            });
            slot.users += 1;
            slot.mutex.clone()
        };

        // Registered before the first await so a cancelled waiter still releases its slot.
        let mut lock = DayLock {
            locks: self,
            key,
            guard: None,
        };
        lock.guard = Some(mutex.lock_owned().await);
        lock
    }

    fn len(&self) -> usize {
        self.entries().len()
    }
}

/// Held for the duration of one check-then-act sequence.
struct DayLock<'a> {
    locks: &'a KeyedLocks,
    key: DayKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for DayLock<'_> {
    fn drop(&mut self) {
        self.guard.take();
        let mut entries = self.locks.entries();
        if let Some(slot) = entries.get_mut(&self.key) {
            slot.users = slot.users.saturating_sub(1);
            if slot.users == 0 {
                entries.remove(&self.key);
            }
        }
    }
}

pub struct AttendanceRecorder {
    store: Arc<dyn ArrivalStore>,
    clock: Arc<dyn Clock>,
    calendar: LocalCalendar,
    locks: KeyedLocks,
}

impl AttendanceRecorder {
    pub fn new(store: Arc<dyn ArrivalStore>, clock: Arc<dyn Clock>, calendar: LocalCalendar) -> Self {
        Self {
            store,
            clock,
            calendar,
            locks: KeyedLocks::default(),
        }
    }

    /// Current local calendar day.
    pub fn today(&self) -> NaiveDate {
        self.calendar.day_of(self.clock.now())
    }

    /// Create today's record for `(actor_id, student_id)` or update the
    /// `confirmed` flag of the one that already exists.
    pub async fn record_confirmation(
        &self,
        kind: ArrivalKind,
        actor_id: &str,
        student_id: &str,
        confirmed: bool,
    ) -> Result<Recorded, RecorderError> {
        if actor_id.trim().is_empty() {
            return Err(RecorderError::EmptyActorId);
        }
        if student_id.trim().is_empty() {
            return Err(RecorderError::EmptyStudentId);
        }

        let now = self.clock.now();
        let today = self.calendar.day_of(now);
        let _day_lock = self
            .locks
            .lock((kind, actor_id.to_string(), student_id.to_string(), today))
            .await;

        match self.store.find_for_day(kind, actor_id, student_id, today).await {
            Ok(existing) => self.update_existing(kind, existing, confirmed, now).await,
            Err(StoreError::NotFound(_)) => {
                let record = ArrivalRecord::new(actor_id, student_id, confirmed, today, now);
                match self.store.insert(kind, &record).await {
                    Ok(()) => {}
                    // Another process inserted the row after our lookup
                    Err(StoreError::Conflict(_)) => {
                        warn!(
                            "Concurrent {} arrival for actor {}, student {} on {}; updating it instead",
                            kind, actor_id, student_id, today
                        );
                        let existing = self.store.find_for_day(kind, actor_id, student_id, today).await?;
                        return self.update_existing(kind, existing, confirmed, now).await;
                    }
                    Err(e) => return Err(e.into()),
                }
                info!(
                    "Created {} arrival {} (actor {}, student {}) for {}",
                    kind, record.id, actor_id, student_id, today
                );
                Ok(Recorded {
                    record,
                    outcome: RecordOutcome::Created,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_existing(
        &self,
        kind: ArrivalKind,
        existing: ArrivalRecord,
        confirmed: bool,
        now: DateTime<Utc>,
    ) -> Result<Recorded, RecorderError> {
        let record = self
            .store
            .update_confirmation(kind, existing.id, confirmed, now)
            .await?;
        info!(
            "Updated {} arrival {} (actor {}, student {}): confirmed={}",
            kind, record.id, record.actor_id, record.student_id, confirmed
        );
        Ok(Recorded {
            record,
            outcome: RecordOutcome::Updated,
        })
    }

    pub async fn query_by_actor_and_day(
        &self,
        kind: ArrivalKind,
        actor_id: &str,
        day: NaiveDate,
    ) -> Result<Vec<ArrivalRecord>, RecorderError> {
        self.list(kind, Some(actor_id), day, day.succ_opt().unwrap_or(NaiveDate::MAX))
            .await
    }

    pub async fn query_by_day(&self, kind: ArrivalKind, day: NaiveDate) -> Result<Vec<ArrivalRecord>, RecorderError> {
        self.list(kind, None, day, day.succ_opt().unwrap_or(NaiveDate::MAX)).await
    }

    /// Records in the Monday-to-Sunday week containing `day`.
    pub async fn query_week(
        &self,
        kind: ArrivalKind,
        actor_id: Option<&str>,
        day: NaiveDate,
    ) -> Result<Vec<ArrivalRecord>, RecorderError> {
        let (from, until) = self.calendar.week_of(day);
        self.list(kind, actor_id, from, until).await
    }

    async fn list(
        &self,
        kind: ArrivalKind,
        actor_id: Option<&str>,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<ArrivalRecord>, RecorderError> {
        let filter = ArrivalFilter {
            actor_id: actor_id.map(str::to_string),
            from,
            until,
        };
        let records = self.store.list(kind, &filter).await?;
        debug!("Listed {} {} arrivals for {:?}", records.len(), kind, filter);
        Ok(records)
    }
}
