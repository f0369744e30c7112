//! Product Model

use serde::{Deserialize, Serialize};

/// Packaged product entity (drinks, desserts, retail goods)
///
/// Products attach directly to an order rather than to a suborder.
/// Stock levels are an inventory concern and not tracked here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub is_active: bool,
}

impl Product {
    pub fn new(id: i64, name: impl Into<String>, price: f64) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            is_active: true,
        }
    }
}
