//! Order status - the fixed lifecycle sequence
//!
//! `Pending → Intake → Preparing → Ready → Delivered → Settled → Paid`
//!
//! Orders only ever move one step forward along this sequence; there is
//! no backward transition. `Paid` is terminal and freezes the order.

use serde::{Deserialize, Serialize};

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Waiter is still composing the order
    #[default]
    Pending,
    /// Intake reviewer confirmed the composition; last chance to edit
    Intake,
    /// Visible to kitchen stations
    Preparing,
    /// Kitchen asserts the order is cooked
    Ready,
    /// Every line item handed to the table
    Delivered,
    /// Dispatch/cashier marked the order ready for payment
    Settled,
    /// Terminal; the order is immutable
    Paid,
}

impl OrderStatus {
    /// The single permitted next status, or `None` for the terminal one
    pub fn successor(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Intake),
            OrderStatus::Intake => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => Some(OrderStatus::Settled),
            OrderStatus::Settled => Some(OrderStatus::Paid),
            OrderStatus::Paid => None,
        }
    }

    /// Whether the order has reached its terminal status
    pub fn is_terminal(self) -> bool {
        self == OrderStatus::Paid
    }

    /// Statuses in which line-item composition is still permitted
    /// (before preparation begins)
    pub fn allows_composition(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Intake)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Intake => "INTAKE",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Settled => "SETTLED",
            OrderStatus::Paid => "PAID",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successor_chain_covers_every_status_once() {
        let mut status = OrderStatus::Pending;
        let mut seen = vec![status];
        while let Some(next) = status.successor() {
            status = next;
            seen.push(status);
        }
        assert_eq!(
            seen,
            vec![
                OrderStatus::Pending,
                OrderStatus::Intake,
                OrderStatus::Preparing,
                OrderStatus::Ready,
                OrderStatus::Delivered,
                OrderStatus::Settled,
                OrderStatus::Paid,
            ]
        );
    }

    #[test]
    fn paid_is_the_only_terminal() {
        assert!(OrderStatus::Paid.is_terminal());
        assert!(OrderStatus::Paid.successor().is_none());
        assert!(!OrderStatus::Settled.is_terminal());
    }

    #[test]
    fn composition_window_is_pending_and_intake() {
        assert!(OrderStatus::Pending.allows_composition());
        assert!(OrderStatus::Intake.allows_composition());
        assert!(!OrderStatus::Preparing.allows_composition());
        assert!(!OrderStatus::Paid.allows_composition());
    }

    #[test]
    fn serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&OrderStatus::Preparing).unwrap();
        assert_eq!(json, "\"PREPARING\"");
    }
}
