//! Money calculation using rust_decimal for precision
//!
//! All subtotal/total arithmetic is done in `Decimal` and converted to
//! `f64` only at the model boundary, rounded to 2 decimal places
//! half-up. After `recalculate_totals` returns, the totals invariant
//! holds: `order.total == Σ line-item subtotals`.

use rust_decimal::prelude::*;
use shared::error::OrderError;
use shared::order::Order;

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed unit price per item
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line item
const MAX_QUANTITY: i32 = 9999;

/// Round a decimal to money precision and convert to f64
fn to_money(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// Compute a line subtotal: quantity × unit price
pub fn line_subtotal(unit_price: f64, quantity: i32) -> f64 {
    let price = Decimal::from_f64(unit_price).unwrap_or_default();
    to_money(price * Decimal::from(quantity))
}

/// Validate a unit price captured from the catalog
pub fn validate_price(price: f64, what: &str) -> Result<(), OrderError> {
    if !price.is_finite() {
        return Err(OrderError::Validation(format!(
            "{} price must be a finite number, got {}",
            what, price
        )));
    }
    if price < 0.0 {
        return Err(OrderError::Validation(format!(
            "{} price must be non-negative, got {}",
            what, price
        )));
    }
    if price > MAX_PRICE {
        return Err(OrderError::Validation(format!(
            "{} price exceeds maximum allowed ({}), got {}",
            what, MAX_PRICE, price
        )));
    }
    Ok(())
}

/// Validate a line-item quantity
pub fn validate_quantity(quantity: i32) -> Result<(), OrderError> {
    if quantity <= 0 {
        return Err(OrderError::Validation(format!(
            "quantity must be positive, got {}",
            quantity
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(OrderError::Validation(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, quantity
        )));
    }
    Ok(())
}

/// Recompute every line subtotal and the order totals
///
/// Called inside every composer mutation before the order is persisted,
/// so stale totals are never observable between mutations.
pub fn recalculate_totals(order: &mut Order) {
    let mut sum = Decimal::ZERO;

    for suborder in &mut order.suborders {
        for dish in &mut suborder.dishes {
            let price = Decimal::from_f64(dish.unit_price).unwrap_or_default();
            let line = price * Decimal::from(dish.quantity);
            dish.subtotal = to_money(line);
            sum += line;
        }
    }

    for product in &mut order.products {
        let price = Decimal::from_f64(product.unit_price).unwrap_or_default();
        let line = price * Decimal::from(product.quantity);
        product.subtotal = to_money(line);
        sum += line;
    }

    order.subtotal = to_money(sum);
    order.total = order.subtotal;
}
