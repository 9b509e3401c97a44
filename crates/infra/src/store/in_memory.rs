use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::Utc;

use user_service_core::{Entity, NewUser, User, UserFilter, UserId, UserPatch};

use super::r#trait::{StoreError, StoreResult, UserStore};

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<UserId, User>,
    last_id: i64,
}

/// In-memory `users` table.
///
/// Intended for tests/dev. Keeps soft-deleted rows around, like the real
/// table does, so ids are never reused.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    table: RwLock<Table>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Database("in-memory table lock poisoned".to_string())
}

fn live(table: &Table, id: UserId) -> StoreResult<&User> {
    table
        .rows
        .get(&id)
        .filter(|u| !u.is_deleted())
        .ok_or(StoreError::NotFound)
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn migrate(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn list(&self, filter: &UserFilter) -> StoreResult<Vec<User>> {
        let table = self.table.read().map_err(|_| poisoned())?;
        Ok(table
            .rows
            .values()
            .filter(|u| !u.is_deleted() && filter.matches(u))
            .cloned()
            .collect())
    }

    async fn get(&self, id: UserId) -> StoreResult<User> {
        let table = self.table.read().map_err(|_| poisoned())?;
        live(&table, id).cloned()
    }

    async fn create(&self, new: NewUser) -> StoreResult<User> {
        let mut table = self.table.write().map_err(|_| poisoned())?;
        table.last_id += 1;
        let user = User::from_new(UserId::new(table.last_id), new, Utc::now());
        table.rows.insert(user.id(), user.clone());
        Ok(user)
    }

    async fn update(&self, id: UserId, patch: &UserPatch) -> StoreResult<User> {
        let mut table = self.table.write().map_err(|_| poisoned())?;
        let mut user = live(&table, id)?.clone();
        user.apply(patch);
        user.validate()?;
        user.updated_at = Utc::now();
        table.rows.insert(id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: UserId) -> StoreResult<()> {
        let mut table = self.table.write().map_err(|_| poisoned())?;
        live(&table, id)?;
        if let Some(user) = table.rows.get_mut(&id) {
            user.deleted_at = Some(Utc::now());
        }
        Ok(())
    }
}
