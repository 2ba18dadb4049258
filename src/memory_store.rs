use crate::record::{AnkleRecord, UserId};
use crate::store::RecordStore;
use crate::AnkleError;
use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

/// Process-local store. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RefCell<HashMap<UserId, BTreeMap<NaiveDate, AnkleRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn user_exists(&self, user: &UserId) -> Result<bool, AnkleError> {
        Ok(self.users.borrow().contains_key(user))
    }

    fn create_user(&self, user: &UserId) -> Result<(), AnkleError> {
        let mut users = self.users.borrow_mut();
        if users.contains_key(user) {
            return Err(AnkleError::Duplicate(user.to_string()));
        }
        users.insert(user.clone(), BTreeMap::new());
        log::info!("registered user {user}");
        Ok(())
    }

    fn upsert(&self, user: &UserId, record: &AnkleRecord) -> Result<(), AnkleError> {
        let mut users = self.users.borrow_mut();
        let days = users
            .get_mut(user)
            .ok_or_else(|| AnkleError::UnknownUser(user.to_string()))?;
        let replaced = days.insert(record.date, record.clone()).is_some();
        log::debug!("upsert {user}/{} (replaced: {replaced})", record.date);
        Ok(())
    }

    fn get_record(&self, user: &UserId, date: NaiveDate) -> Result<Option<AnkleRecord>, AnkleError> {
        Ok(self
            .users
            .borrow()
            .get(user)
            .and_then(|days| days.get(&date))
            .cloned())
    }

    fn list_records(&self, user: &UserId) -> Result<Vec<AnkleRecord>, AnkleError> {
        Ok(self
            .users
            .borrow()
            .get(user)
            .map(|days| days.values().cloned().collect())
            .unwrap_or_default())
    }

    fn delete_user(&self, user: &UserId) -> Result<usize, AnkleError> {
        let days = self
            .users
            .borrow_mut()
            .remove(user)
            .ok_or_else(|| AnkleError::UnknownUser(user.to_string()))?;
        log::info!("deleted user {user} ({} records)", days.len());
        Ok(days.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_contract() {
        crate::store::contract::run_all(&MemoryStore::new());
    }
}
