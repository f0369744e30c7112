//! Dish and preparation-variant models

use serde::{Deserialize, Serialize};

/// Kitchen dish entity
///
/// `price` is the current catalog price. Line items capture it at
/// add-time; later catalog edits never alter existing orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dish {
    pub id: i64,
    pub name: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Preparation variants this dish may be ordered as
    #[serde(default)]
    pub variant_ids: Vec<i64>,
    pub is_active: bool,
}

impl Dish {
    pub fn new(id: i64, name: impl Into<String>, price: f64, variant_ids: Vec<i64>) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            description: None,
            variant_ids,
            is_active: true,
        }
    }

    /// Whether the dish offers the given preparation variant
    pub fn offers_variant(&self, variant_id: i64) -> bool {
        self.variant_ids.contains(&variant_id)
    }
}

/// Preparation-style variant for a dish (e.g. a stew or filling choice)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DishVariant {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
}

impl DishVariant {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_active: true,
        }
    }
}
