use async_trait::async_trait;

use crate::accounts::Account;
use crate::auth::Role;
use crate::store::{AccountStore, StoreError};

use super::PgStore;

fn account_table(role: Role) -> Option<&'static str> {
    match role {
        Role::Staff => Some("staff"),
        Role::Parent => Some("parents"),
        // Students do not log in
        Role::Student => None,
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn find_by_email(&self, role: Role, email: &str) -> Result<Option<Account>, StoreError> {
        let Some(table) = account_table(role) else {
            return Ok(None);
        };

        let sql = format!("SELECT id, email, password_hash FROM {table} WHERE lower(email) = lower($1)");
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }
}
