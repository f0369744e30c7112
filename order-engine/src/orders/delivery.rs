//! Delivery tracker - the per-item gate for the `Ready → Delivered` move
//!
//! Dispatch marks line items delivered one by one; the order may only
//! advance once every dish and product item is flagged. Marking is
//! idempotent so a retried request is harmless.

use shared::error::OrderError;
use shared::order::Order;

/// Mark a line item delivered
///
/// Returns `Ok(true)` when the flag flipped, `Ok(false)` when the item
/// was already delivered (idempotent, not an error). Searches dish
/// items across all suborders, then product items.
pub fn mark_delivered(order: &mut Order, line_item_id: &str) -> Result<bool, OrderError> {
    for suborder in &mut order.suborders {
        if let Some(dish) = suborder
            .dishes
            .iter_mut()
            .find(|d| d.line_item_id == line_item_id)
        {
            let flipped = !dish.delivered;
            dish.delivered = true;
            return Ok(flipped);
        }
    }

    if let Some(product) = order
        .products
        .iter_mut()
        .find(|p| p.line_item_id == line_item_id)
    {
        let flipped = !product.delivered;
        product.delivered = true;
        return Ok(flipped);
    }

    Err(OrderError::LineItemNotFound(line_item_id.to_string()))
}

/// True iff every dish and product line item is delivered
///
/// An order with zero line items is vacuously fully delivered.
pub fn is_fully_delivered(order: &Order) -> bool {
    order.dish_items().all(|d| d.delivered) && order.products.iter().all(|p| p.delivered)
}

/// Line-item ids still awaiting delivery, for precondition diagnostics
pub fn undelivered(order: &Order) -> Vec<&str> {
    order
        .dish_items()
        .filter(|d| !d.delivered)
        .map(|d| d.line_item_id.as_str())
        .chain(
            order
                .products
                .iter()
                .filter(|p| !p.delivered)
                .map(|p| p.line_item_id.as_str()),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{DishLineItem, ProductLineItem, Suborder};

    fn order_with_two_items() -> Order {
        let mut order = Order::new(1, "u");
        let mut sub = Suborder::new("mains");
        sub.dishes.push(DishLineItem {
            line_item_id: "li-dish".into(),
            dish_id: 1,
            dish_name: "Dish".into(),
            variant_id: 1,
            variant_name: "V".into(),
            quantity: 1,
            unit_price: 10.0,
            subtotal: 10.0,
            delivered: false,
        });
        order.suborders.push(sub);
        order.products.push(ProductLineItem {
            line_item_id: "li-prod".into(),
            product_id: 2,
            product_name: "Soda".into(),
            quantity: 1,
            unit_price: 3.0,
            subtotal: 3.0,
            delivered: false,
        });
        order
    }

    #[test]
    fn marking_is_idempotent() {
        let mut order = order_with_two_items();
        assert_eq!(mark_delivered(&mut order, "li-dish").unwrap(), true);
        // Second call succeeds without side effect
        assert_eq!(mark_delivered(&mut order, "li-dish").unwrap(), false);
        let after_once = order.clone();
        mark_delivered(&mut order, "li-dish").unwrap();
        assert_eq!(order, after_once);
    }

    #[test]
    fn unknown_item_is_an_error() {
        let mut order = order_with_two_items();
        assert!(matches!(
            mark_delivered(&mut order, "nope"),
            Err(OrderError::LineItemNotFound(_))
        ));
    }

    #[test]
    fn fully_delivered_requires_every_item() {
        let mut order = order_with_two_items();
        assert!(!is_fully_delivered(&order));
        mark_delivered(&mut order, "li-dish").unwrap();
        assert!(!is_fully_delivered(&order));
        assert_eq!(undelivered(&order), vec!["li-prod"]);
        mark_delivered(&mut order, "li-prod").unwrap();
        assert!(is_fully_delivered(&order));
        assert!(undelivered(&order).is_empty());
    }

    #[test]
    fn empty_order_is_vacuously_delivered() {
        let order = Order::new(1, "u");
        assert!(is_fully_delivered(&order));
    }
}
