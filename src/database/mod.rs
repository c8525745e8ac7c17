pub mod accounts;
pub mod arrivals;
pub mod manager;
pub mod memory;
pub mod schema;

use sqlx::PgPool;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;

/// PostgreSQL-backed implementation of the store traits.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}
