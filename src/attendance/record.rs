use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Which arrival table a confirmation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrivalKind {
    /// A parent confirms the student got home.
    Home,
    /// A staff member confirms the student reached school.
    School,
}

impl ArrivalKind {
    pub fn table_name(&self) -> &'static str {
        match self {
            ArrivalKind::Home => "home_arrivals",
            ArrivalKind::School => "school_arrivals",
        }
    }
}

impl std::fmt::Display for ArrivalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArrivalKind::Home => f.write_str("home"),
            ArrivalKind::School => f.write_str("school"),
        }
    }
}

/// One confirmation per (actor, student, arrival_day).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ArrivalRecord {
    pub id: Uuid,
    pub actor_id: String,
    pub student_id: String,
    pub confirmed: bool,
    /// Local calendar day of `created_at`.
    pub arrival_day: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ArrivalRecord {
    pub fn new(
        actor_id: impl Into<String>,
        student_id: impl Into<String>,
        confirmed: bool,
        arrival_day: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor_id: actor_id.into(),
            student_id: student_id.into(),
            confirmed,
            arrival_day,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Filter for read-only listings. `until` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrivalFilter {
    pub actor_id: Option<String>,
    pub from: NaiveDate,
    pub until: NaiveDate,
}

impl ArrivalFilter {
    pub fn matches(&self, record: &ArrivalRecord) -> bool {
        record.arrival_day >= self.from
            && record.arrival_day < self.until
            && self.actor_id.as_deref().map_or(true, |actor| actor == record.actor_id)
    }
}
