//! Employee record store
//!
//! Holds every employee record in process memory behind a single
//! reader/writer lock. Reads (`get_by_id`, `list`, `page`) share the lock;
//! writes (`create`, `update`, `delete`) take it exclusively.
//!
//! Records remember the order they were created in, so listings and pages
//! come back in a stable order across requests.

mod employee;
mod error;

pub use employee::Employee;
pub use error::StoreError;

use std::collections::HashMap;
use tokio::sync::RwLock;

/// Stored record plus its creation sequence number
struct Slot {
    seq: u64,
    employee: Employee,
}

#[derive(Default)]
struct Inner {
    records: HashMap<String, Slot>,
    next_seq: u64,
}

impl Inner {
    fn ordered(&self) -> Vec<&Slot> {
        let mut slots: Vec<&Slot> = self.records.values().collect();
        slots.sort_unstable_by_key(|slot| slot.seq);
        slots
    }
}

/// In-memory employee store
#[derive(Default)]
pub struct EmployeeStore {
    inner: RwLock<Inner>,
}

impl EmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new record; fails if its id is already taken
    pub async fn create(&self, employee: Employee) -> Result<Employee, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.records.contains_key(&employee.id) {
            return Err(StoreError::AlreadyExists(employee.id));
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.records.insert(
            employee.id.clone(),
            Slot {
                seq,
                employee: employee.clone(),
            },
        );
        Ok(employee)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Employee, StoreError> {
        let inner = self.inner.read().await;
        inner
            .records
            .get(id)
            .map(|slot| slot.employee.clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Overwrite the mutable fields of an existing record. The id never changes.
    pub async fn update(
        &self,
        id: &str,
        name: String,
        position: String,
        salary: i64,
    ) -> Result<Employee, StoreError> {
        let mut inner = self.inner.write().await;
        let slot = inner
            .records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        slot.employee.name = name;
        slot.employee.position = position;
        slot.employee.salary = salary;
        Ok(slot.employee.clone())
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .records
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Snapshot of all records in creation order
    #[cfg_attr(not(test), allow(dead_code))]
    pub async fn list(&self) -> Vec<Employee> {
        let inner = self.inner.read().await;
        inner
            .ordered()
            .into_iter()
            .map(|slot| slot.employee.clone())
            .collect()
    }

    /// Records in the `[start, end)` window of the creation-ordered listing.
    ///
    /// Both bounds are clamped to the record count, and the count and the
    /// window are read under the same lock acquisition.
    pub async fn page(&self, start: usize, end: usize) -> Vec<Employee> {
        let inner = self.inner.read().await;
        let ordered = inner.ordered();
        let end = end.min(ordered.len());
        let start = start.min(end);
        ordered[start..end]
            .iter()
            .map(|slot| slot.employee.clone())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
