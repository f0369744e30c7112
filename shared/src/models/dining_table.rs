//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Dining table entity
///
/// Read-only to the order core: orders reference a table by id, and
/// order creation fails if the table is unknown or inactive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTable {
    pub id: i64,
    /// Table number as printed on the floor plan
    pub number: i32,
    /// Seating capacity
    pub capacity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub is_active: bool,
}

impl DiningTable {
    pub fn new(id: i64, number: i32, capacity: i32) -> Self {
        Self {
            id,
            number,
            capacity,
            location: None,
            is_active: true,
        }
    }
}
