// Employee record type

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single employee record as stored and as rendered on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub position: String,
    pub salary: i64,
}

impl Employee {
    /// Build a record with a freshly generated id
    pub fn new(name: String, position: String, salary: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            position,
            salary,
        }
    }
}
