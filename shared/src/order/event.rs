//! Order events - change notifications emitted after committed mutations
//!
//! Events are broadcast to station views so they can refresh between
//! polls. They are notifications, not the source of truth: correctness
//! comes from version-conditioned writes, a missed event only delays a
//! view until its next poll.

use serde::{Deserialize, Serialize};

use super::status::OrderStatus;
use crate::models::Actor;
use crate::util::new_id;

/// Order change notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Event unique ID
    pub event_id: String,
    /// Global sequence number, monotone across all orders
    pub sequence: u64,
    /// Order this event belongs to
    pub order_id: String,
    /// Order version after the mutation
    pub version: u64,
    /// Server timestamp (Unix milliseconds)
    pub timestamp: i64,
    /// Operator who triggered the mutation (audit snapshot)
    pub actor: Actor,
    /// What changed
    pub kind: OrderEventKind,
}

impl OrderEvent {
    pub fn new(
        sequence: u64,
        order_id: impl Into<String>,
        version: u64,
        timestamp: i64,
        actor: Actor,
        kind: OrderEventKind,
    ) -> Self {
        Self {
            event_id: new_id(),
            sequence,
            order_id: order_id.into(),
            version,
            timestamp,
            actor,
            kind,
        }
    }
}

/// Event kind - a closed set of typed variants, one per mutation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventKind {
    OrderOpened {
        table_id: i64,
    },
    SuborderAdded {
        suborder_id: String,
        label: String,
    },
    DishItemAdded {
        suborder_id: String,
        line_item_id: String,
        dish_id: i64,
    },
    ProductItemAdded {
        line_item_id: String,
        product_id: i64,
    },
    ItemRemoved {
        line_item_id: String,
    },
    NotesUpdated,
    IntakeValidated,
    ItemDelivered {
        line_item_id: String,
    },
    StatusAdvanced {
        from: OrderStatus,
        to: OrderStatus,
    },
}

impl OrderEventKind {
    /// Statuses a view must be watching for this event to matter to it.
    /// `None` means the event is relevant to any station that can see
    /// the order at all (composition/notes changes).
    pub fn status_after(&self) -> Option<OrderStatus> {
        match self {
            OrderEventKind::OrderOpened { .. } => Some(OrderStatus::Pending),
            OrderEventKind::StatusAdvanced { to, .. } => Some(*to),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StaffRole;

    #[test]
    fn event_serializes_with_tagged_kind() {
        let event = OrderEvent::new(
            7,
            "order-1",
            3,
            1_700_000_000_000,
            Actor::new("u1", "Ana", StaffRole::Waiter),
            OrderEventKind::StatusAdvanced {
                from: OrderStatus::Pending,
                to: OrderStatus::Intake,
            },
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["sequence"], 7);
        assert_eq!(json["kind"]["type"], "STATUS_ADVANCED");
        assert_eq!(json["kind"]["from"], "PENDING");
        assert_eq!(json["kind"]["to"], "INTAKE");
    }
}
