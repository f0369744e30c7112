//! Order composer - creation and line-item composition
//!
//! Pure aggregate mutations: each function validates, mutates the order
//! in place and recomputes totals before returning, so the totals
//! invariant holds at every return point. Transactionality and version
//! checks are owned by the manager.
//!
//! Composition window: line items may only change while the order is
//! `Pending` (and not yet validated by the intake reviewer) or `Intake`.
//! Once cooking has started there are no silent retroactive edits.

use shared::error::OrderError;
use shared::order::{
    DishItemInput, DishLineItem, Order, OrderStatus, ProductItemInput, ProductLineItem, Suborder,
};
use shared::util::new_id;

use super::money;
use crate::catalog::CatalogService;

/// Allocate a new order in `Pending` for an active table
pub fn create_order(
    catalog: &CatalogService,
    table_id: i64,
    created_by: &str,
) -> Result<Order, OrderError> {
    let table = catalog.active_table(table_id)?;
    Ok(Order::new(table.id, created_by))
}

/// Reject composition outside the permitted window
fn ensure_composable(order: &Order) -> Result<(), OrderError> {
    if order.is_immutable() {
        return Err(OrderError::ImmutableEntity(order.order_id.clone()));
    }
    if !order.status.allows_composition() {
        return Err(OrderError::InvalidState {
            status: order.status,
            detail: "line-item composition is only permitted before preparation begins".into(),
        });
    }
    // A validated Pending order is cook-ready; editing it would silently
    // invalidate the reviewer's sign-off. Intake itself stays editable.
    if order.status == OrderStatus::Pending && order.validated {
        return Err(OrderError::InvalidState {
            status: order.status,
            detail: "order is already validated for intake".into(),
        });
    }
    Ok(())
}

/// Attach a new labelled suborder
pub fn add_suborder(order: &mut Order, label: &str) -> Result<String, OrderError> {
    ensure_composable(order)?;
    let label = label.trim();
    if label.is_empty() {
        return Err(OrderError::Validation("suborder label must not be blank".into()));
    }

    let suborder = Suborder::new(label);
    let suborder_id = suborder.suborder_id.clone();
    order.suborders.push(suborder);
    Ok(suborder_id)
}

/// Add a dish line item to a suborder
///
/// Captures the dish's current catalog price as the immutable unit
/// price and recomputes the order total before returning.
pub fn add_dish_item(
    order: &mut Order,
    catalog: &CatalogService,
    input: &DishItemInput,
) -> Result<String, OrderError> {
    ensure_composable(order)?;
    money::validate_quantity(input.quantity)?;

    let dish = catalog.active_dish(input.dish_id)?;
    let variant = catalog.active_variant(input.variant_id)?;
    if !dish.offers_variant(variant.id) {
        return Err(OrderError::Validation(format!(
            "dish '{}' is not offered as variant '{}'",
            dish.name, variant.name
        )));
    }
    money::validate_price(dish.price, "dish")?;

    let suborder = order
        .find_suborder_mut(&input.suborder_id)
        .ok_or_else(|| OrderError::SuborderNotFound(input.suborder_id.clone()))?;

    let line_item_id = new_id();
    suborder.dishes.push(DishLineItem {
        line_item_id: line_item_id.clone(),
        dish_id: dish.id,
        dish_name: dish.name,
        variant_id: variant.id,
        variant_name: variant.name,
        quantity: input.quantity,
        unit_price: dish.price,
        subtotal: 0.0, // set by recalculate_totals below
        delivered: false,
    });

    money::recalculate_totals(order);
    Ok(line_item_id)
}

/// Add a product line item directly to the order
pub fn add_product_item(
    order: &mut Order,
    catalog: &CatalogService,
    input: &ProductItemInput,
) -> Result<String, OrderError> {
    ensure_composable(order)?;
    money::validate_quantity(input.quantity)?;

    let product = catalog.active_product(input.product_id)?;
    money::validate_price(product.price, "product")?;

    let line_item_id = new_id();
    order.products.push(ProductLineItem {
        line_item_id: line_item_id.clone(),
        product_id: product.id,
        product_name: product.name,
        quantity: input.quantity,
        unit_price: product.price,
        subtotal: 0.0,
        delivered: false,
    });

    money::recalculate_totals(order);
    Ok(line_item_id)
}

/// Remove a line item (dish or product) and recompute totals
pub fn remove_line_item(order: &mut Order, line_item_id: &str) -> Result<(), OrderError> {
    ensure_composable(order)?;

    let mut removed = false;
    for suborder in &mut order.suborders {
        let before = suborder.dishes.len();
        suborder.dishes.retain(|d| d.line_item_id != line_item_id);
        if suborder.dishes.len() < before {
            removed = true;
            break;
        }
    }
    if !removed {
        let before = order.products.len();
        order.products.retain(|p| p.line_item_id != line_item_id);
        removed = order.products.len() < before;
    }
    if !removed {
        return Err(OrderError::LineItemNotFound(line_item_id.to_string()));
    }

    money::recalculate_totals(order);
    Ok(())
}

/// Update the order's free-text notes (allowed until the order is paid)
pub fn update_notes(order: &mut Order, notes: Option<String>) -> Result<(), OrderError> {
    if order.is_immutable() {
        return Err(OrderError::ImmutableEntity(order.order_id.clone()));
    }
    order.notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    Ok(())
}

/// Intake reviewer confirms the composition is complete
///
/// Idempotent. Only meaningful while the order is still `Pending`; from
/// then on line-item edits in `Pending` are rejected.
pub fn mark_validated(order: &mut Order) -> Result<(), OrderError> {
    if order.is_immutable() {
        return Err(OrderError::ImmutableEntity(order.order_id.clone()));
    }
    if order.status != OrderStatus::Pending {
        return Err(OrderError::InvalidState {
            status: order.status,
            detail: "intake validation applies to pending orders".into(),
        });
    }
    order.validated = true;
    Ok(())
}
