//! Order aggregate - the authoritative record shared by all stations
//!
//! The `Order` exclusively owns its suborders and product line items; a
//! suborder exclusively owns its dish line items. Dropping an order
//! drops all children.
//!
//! `subtotal`/`total` are derived values, never set by callers. The
//! engine recomputes them inside every mutation, so no caller can ever
//! observe a line-item change without the matching total update.

use serde::{Deserialize, Serialize};

use super::status::OrderStatus;
use crate::util::{new_id, now_millis};

/// Order aggregate root
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Order ID (assigned by the engine)
    pub order_id: String,
    /// Table this order bills against
    pub table_id: i64,
    /// User who created the order
    pub created_by: String,
    /// Lifecycle status
    pub status: OrderStatus,
    /// Intake completeness flag, set by the intake reviewer.
    /// Once true, line-item edits in `Pending` are rejected so a
    /// cook-ready order cannot be silently invalidated.
    #[serde(default)]
    pub validated: bool,
    /// Free-text notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Derived: sum of all line-item subtotals
    pub subtotal: f64,
    /// Derived: order total
    pub total: f64,
    /// Optimistic-concurrency version counter; bumped on every committed
    /// mutation, checked against the caller's last observed value
    pub version: u64,
    pub created_at: i64,
    pub updated_at: i64,
    /// Named dish groupings (courses)
    #[serde(default)]
    pub suborders: Vec<Suborder>,
    /// Product line items, attached directly to the order
    #[serde(default)]
    pub products: Vec<ProductLineItem>,
}

impl Order {
    /// Create a new empty order in `Pending`
    pub fn new(table_id: i64, created_by: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            order_id: new_id(),
            table_id,
            created_by: created_by.into(),
            status: OrderStatus::Pending,
            validated: false,
            notes: None,
            subtotal: 0.0,
            total: 0.0,
            version: 0,
            created_at: now,
            updated_at: now,
            suborders: Vec::new(),
            products: Vec::new(),
        }
    }

    /// Whether the order has reached `Paid` and rejects all mutation
    pub fn is_immutable(&self) -> bool {
        self.status.is_terminal()
    }

    /// Iterate all dish line items across all suborders
    pub fn dish_items(&self) -> impl Iterator<Item = &DishLineItem> {
        self.suborders.iter().flat_map(|s| s.dishes.iter())
    }

    /// Total number of line items (dishes and products)
    pub fn line_item_count(&self) -> usize {
        self.dish_items().count() + self.products.len()
    }

    /// Find a suborder by id
    pub fn find_suborder(&self, suborder_id: &str) -> Option<&Suborder> {
        self.suborders.iter().find(|s| s.suborder_id == suborder_id)
    }

    pub fn find_suborder_mut(&mut self, suborder_id: &str) -> Option<&mut Suborder> {
        self.suborders
            .iter_mut()
            .find(|s| s.suborder_id == suborder_id)
    }

    /// Whether any line item (dish or product) has the given id
    pub fn has_line_item(&self, line_item_id: &str) -> bool {
        self.dish_items().any(|d| d.line_item_id == line_item_id)
            || self.products.iter().any(|p| p.line_item_id == line_item_id)
    }

    pub fn touch(&mut self, timestamp: i64) {
        self.updated_at = timestamp;
    }
}

/// Named grouping of dish line items within an order (e.g. a course)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suborder {
    pub suborder_id: String,
    /// Human-assigned label, e.g. "drinks" or "entrées"
    pub label: String,
    #[serde(default)]
    pub dishes: Vec<DishLineItem>,
}

impl Suborder {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            suborder_id: new_id(),
            label: label.into(),
            dishes: Vec::new(),
        }
    }
}

/// Dish line item, owned by a suborder
///
/// `dish_name`/`variant_name`/`unit_price` are snapshots captured at
/// add-time; catalog edits never reach back into existing orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DishLineItem {
    pub line_item_id: String,
    pub dish_id: i64,
    pub dish_name: String,
    /// Preparation-style variant; required, never null
    pub variant_id: i64,
    pub variant_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    /// Derived: quantity × unit_price
    pub subtotal: f64,
    /// Delivery-tracking gate flag
    #[serde(default)]
    pub delivered: bool,
}

/// Product line item, owned directly by the order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductLineItem {
    pub line_item_id: String,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub subtotal: f64,
    #[serde(default)]
    pub delivered: bool,
}

/// Input for adding a dish line item to a suborder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DishItemInput {
    pub suborder_id: String,
    pub dish_id: i64,
    pub variant_id: i64,
    pub quantity: i32,
}

/// Input for adding a product line item to an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductItemInput {
    pub product_id: i64,
    pub quantity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_order_starts_pending_with_zero_total() {
        let order = Order::new(4, "user-1");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, 0.0);
        assert_eq!(order.version, 0);
        assert!(!order.validated);
        assert!(order.suborders.is_empty());
        assert!(order.products.is_empty());
    }

    #[test]
    fn dish_items_flattens_all_suborders() {
        let mut order = Order::new(1, "u");
        let mut drinks = Suborder::new("drinks");
        drinks.dishes.push(DishLineItem {
            line_item_id: "li-1".into(),
            dish_id: 1,
            dish_name: "A".into(),
            variant_id: 1,
            variant_name: "V".into(),
            quantity: 1,
            unit_price: 10.0,
            subtotal: 10.0,
            delivered: false,
        });
        let mut mains = Suborder::new("mains");
        mains.dishes.push(DishLineItem {
            line_item_id: "li-2".into(),
            dish_id: 2,
            dish_name: "B".into(),
            variant_id: 1,
            variant_name: "V".into(),
            quantity: 2,
            unit_price: 5.0,
            subtotal: 10.0,
            delivered: false,
        });
        order.suborders.push(drinks);
        order.suborders.push(mains);

        assert_eq!(order.dish_items().count(), 2);
        assert_eq!(order.line_item_count(), 2);
        assert!(order.has_line_item("li-2"));
        assert!(!order.has_line_item("li-3"));
    }
}
