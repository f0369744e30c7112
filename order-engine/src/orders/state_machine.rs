//! Order state machine
//!
//! Validates and applies status transitions along the fixed sequence
//! `Pending → Intake → Preparing → Ready → Delivered → Settled → Paid`.
//! A transition succeeds only if the actor's role is authorized for the
//! *current* status and the status-specific precondition holds. States
//! are never skipped and there is no backward move.
//!
//! Authorization failures (`ForbiddenTransition`) are distinct from
//! precondition failures (`Precondition`) so callers can render
//! different messages.

use shared::error::OrderError;
use shared::models::StaffRole;
use shared::order::{Order, OrderStatus};

use super::delivery;

/// Outcome of an advance attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Status moved to the single permitted successor
    Moved {
        from: OrderStatus,
        to: OrderStatus,
    },
    /// A `Pending` order without intake validation stays `Pending`.
    /// Not an error: the waiter keeps composing and updating notes.
    HeldPending,
}

/// Roles authorized to execute the forward transition out of `status`
pub fn allowed_roles(status: OrderStatus) -> &'static [StaffRole] {
    use StaffRole::*;
    match status {
        // Waiter intake stations
        OrderStatus::Pending | OrderStatus::Intake => &[Waiter, Supervisor, Admin],
        // Kitchen stations
        OrderStatus::Preparing | OrderStatus::Ready => &[Kitchen, Dispatcher, Admin],
        // Dispatch
        OrderStatus::Delivered => &[Dispatcher, Admin],
        // Cashier
        OrderStatus::Settled | OrderStatus::Paid => &[Waiter, Supervisor, Admin],
    }
}

/// Check that `role` may advance an order currently in `status`
pub fn authorize(status: OrderStatus, role: StaffRole) -> Result<(), OrderError> {
    if allowed_roles(status).contains(&role) {
        Ok(())
    } else {
        Err(OrderError::ForbiddenTransition { role, status })
    }
}

/// Advance the order one step along the sequence
pub fn advance(order: &mut Order, role: StaffRole) -> Result<Advance, OrderError> {
    let current = order.status;
    match current.successor() {
        Some(target) => advance_to(order, target, role),
        None => Err(OrderError::ImmutableEntity(order.order_id.clone())),
    }
}

/// Advance the order to an explicitly named target status
///
/// The external "update order status" contract names a target; anything
/// other than the exact successor of the current status is rejected, so
/// a caller can neither skip a state nor move backward.
pub fn advance_to(
    order: &mut Order,
    target: OrderStatus,
    role: StaffRole,
) -> Result<Advance, OrderError> {
    let current = order.status;

    if order.is_immutable() {
        return Err(OrderError::ImmutableEntity(order.order_id.clone()));
    }

    match current.successor() {
        Some(next) if next == target => {}
        Some(next) => {
            return Err(OrderError::InvalidState {
                status: current,
                detail: format!("cannot move to {}, only {} is permitted", target, next),
            });
        }
        None => {
            return Err(OrderError::ImmutableEntity(order.order_id.clone()));
        }
    }

    authorize(current, role)?;

    // Status-specific preconditions
    match current {
        // Intake requires the reviewer's completeness flag; without it
        // the order simply stays Pending (documented no-op, not an error)
        OrderStatus::Pending if !order.validated => {
            return Ok(Advance::HeldPending);
        }
        // The delivery gate: every dish and product item must be flagged
        OrderStatus::Ready => {
            if !delivery::is_fully_delivered(order) {
                let missing = delivery::undelivered(order);
                return Err(OrderError::Precondition(format!(
                    "{} line item(s) not yet delivered: {}",
                    missing.len(),
                    missing.join(", ")
                )));
            }
        }
        _ => {}
    }

    order.status = target;
    Ok(Advance::Moved {
        from: current,
        to: target,
    })
}
