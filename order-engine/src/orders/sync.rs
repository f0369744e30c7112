//! Station synchronization - per-station projections of the order set
//!
//! Each physical station (intake desk, kitchen screen, dispatch pass,
//! cashier, management overview) watches a fixed slice of the status
//! sequence. Stations poll for a full snapshot on an interval and may
//! additionally subscribe to the event feed to refresh early; the poll
//! is the safety net, the feed is an optimization.
//!
//! Every snapshot carries the server epoch and the global sequence
//! number. A station that sees the epoch change knows the server
//! restarted and must drop local state; a station whose last applied
//! sequence is behind the snapshot's knows it missed events.

use serde::{Deserialize, Serialize};
use shared::error::OrderError;
use shared::order::{Order, OrderEvent, OrderStatus};
use tokio::sync::broadcast;

use super::manager::OrderManager;

/// Physical station kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Station {
    /// Front desk composing and validating new orders
    Intake,
    /// Kitchen screen showing orders being prepared
    Kitchen,
    /// Dispatch pass tracking plating and delivery
    Dispatch,
    /// Cashier settling delivered orders
    Cashier,
    /// Management overview of everything still open
    Management,
}

impl Station {
    /// Statuses this station's view includes
    pub fn watched_statuses(&self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Station::Intake => &[Pending, Intake],
            Station::Kitchen => &[Preparing],
            Station::Dispatch => &[Ready, Delivered],
            Station::Cashier => &[Settled],
            Station::Management => &[Pending, Intake, Preparing, Ready, Delivered, Settled],
        }
    }

    pub fn watches(&self, status: OrderStatus) -> bool {
        self.watched_statuses().contains(&status)
    }
}

impl std::fmt::Display for Station {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Station::Intake => "INTAKE",
            Station::Kitchen => "KITCHEN",
            Station::Dispatch => "DISPATCH",
            Station::Cashier => "CASHIER",
            Station::Management => "MANAGEMENT",
        };
        write!(f, "{name}")
    }
}

/// One full snapshot for one station
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationView {
    pub station: Station,
    /// Server instance epoch; changes on restart
    pub epoch: String,
    /// Global sequence at snapshot time
    pub server_sequence: u64,
    pub orders: Vec<Order>,
}

/// Per-station synchronizer over a shared manager
pub struct StationSynchronizer {
    manager: OrderManager,
    station: Station,
}

impl StationSynchronizer {
    pub fn new(manager: OrderManager, station: Station) -> Self {
        Self { manager, station }
    }

    pub fn station(&self) -> Station {
        self.station
    }

    /// Full snapshot of the orders this station watches
    pub fn poll(&self) -> Result<StationView, OrderError> {
        let server_sequence = self.manager.current_sequence()?;
        let mut orders: Vec<Order> = self
            .manager
            .active_orders()?
            .into_iter()
            .filter(|order| self.station.watches(order.status))
            .collect();
        // Stable presentation: oldest first
        orders.sort_by_key(|order| order.created_at);

        tracing::debug!(
            station = %self.station,
            order_count = orders.len(),
            server_sequence,
            "Station poll served"
        );
        Ok(StationView {
            station: self.station,
            epoch: self.manager.epoch().to_string(),
            server_sequence,
            orders,
        })
    }

    /// Subscribe to the raw event feed. Callers filter with
    /// [`Self::is_relevant`] and fall back to [`Self::poll`] after a
    /// lagged receive.
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.manager.subscribe()
    }

    /// Whether an event should trigger a refresh of this station's view.
    ///
    /// Status-carrying events are matched against the watched slice
    /// directly. Composition and delivery events carry no status, so the
    /// order is looked up; an event for an order this station cannot see
    /// is noise. A status change is also relevant to the station the
    /// order just left, so it can drop the row.
    pub fn is_relevant(&self, event: &OrderEvent) -> Result<bool, OrderError> {
        use shared::order::OrderEventKind;

        match &event.kind {
            OrderEventKind::StatusAdvanced { from, to } => {
                Ok(self.station.watches(*from) || self.station.watches(*to))
            }
            kind => match kind.status_after() {
                Some(status) => Ok(self.station.watches(status)),
                None => match self.manager.get_order(&event.order_id) {
                    Ok(order) => Ok(self.station.watches(order.status)),
                    Err(OrderError::OrderNotFound(_)) => Ok(false),
                    Err(err) => Err(err),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shared::models::{Actor, DiningTable, Product, StaffRole};
    use shared::order::ProductItemInput;

    use super::*;
    use crate::catalog::CatalogService;

    fn test_manager() -> OrderManager {
        let catalog = CatalogService::new();
        catalog.replace_tables(vec![DiningTable::new(1, 1, 4)]);
        catalog.replace_products(vec![Product::new(9, "Agua fresca", 30.0)]);
        OrderManager::in_memory(Arc::new(catalog)).unwrap()
    }

    fn admin() -> Actor {
        Actor::new("u-0", "Root", StaffRole::Admin)
    }

    fn advance_times(manager: &OrderManager, order_id: &str, times: usize) -> Order {
        let actor = admin();
        let mut order = manager.get_order(order_id).unwrap();
        for _ in 0..times {
            let (next, _) = manager.advance(order_id, order.version, &actor).unwrap();
            order = next;
        }
        order
    }

    #[test]
    fn watched_slices_do_not_overlap_except_management() {
        use OrderStatus::*;
        for status in [Pending, Intake, Preparing, Ready, Delivered, Settled] {
            let watchers = [
                Station::Intake,
                Station::Kitchen,
                Station::Dispatch,
                Station::Cashier,
            ]
            .iter()
            .filter(|s| s.watches(status))
            .count();
            assert_eq!(watchers, 1, "{status} must have exactly one owning station");
            assert!(Station::Management.watches(status));
        }
        // Paid is invisible everywhere
        assert!(!Station::Management.watches(Paid));
    }

    #[test]
    fn poll_filters_by_station() {
        let manager = test_manager();
        let actor = admin();

        let pending = manager.create_order(1, &actor).unwrap();
        let cooking = manager.create_order(1, &actor).unwrap();
        manager
            .mark_validated(&cooking.order_id, 0, &actor)
            .unwrap();
        advance_times(&manager, &cooking.order_id, 2); // Pending → Intake → Preparing

        let intake = StationSynchronizer::new(manager.clone(), Station::Intake)
            .poll()
            .unwrap();
        assert_eq!(intake.orders.len(), 1);
        assert_eq!(intake.orders[0].order_id, pending.order_id);

        let kitchen = StationSynchronizer::new(manager.clone(), Station::Kitchen)
            .poll()
            .unwrap();
        assert_eq!(kitchen.orders.len(), 1);
        assert_eq!(kitchen.orders[0].order_id, cooking.order_id);

        let management = StationSynchronizer::new(manager.clone(), Station::Management)
            .poll()
            .unwrap();
        assert_eq!(management.orders.len(), 2);
        assert_eq!(management.epoch, manager.epoch());
        assert_eq!(
            management.server_sequence,
            manager.current_sequence().unwrap()
        );
    }

    #[test]
    fn paid_orders_leave_every_view() {
        let manager = test_manager();
        let actor = admin();
        let order = manager.create_order(1, &actor).unwrap();
        manager.mark_validated(&order.order_id, 0, &actor).unwrap();
        advance_times(&manager, &order.order_id, 6);

        for station in [
            Station::Intake,
            Station::Kitchen,
            Station::Dispatch,
            Station::Cashier,
            Station::Management,
        ] {
            let view = StationSynchronizer::new(manager.clone(), station)
                .poll()
                .unwrap();
            assert!(view.orders.is_empty(), "{station} still sees a paid order");
        }
    }

    #[test]
    fn status_events_reach_both_sides_of_the_transition() {
        let manager = test_manager();
        let actor = admin();
        let kitchen = StationSynchronizer::new(manager.clone(), Station::Kitchen);
        let dispatch = StationSynchronizer::new(manager.clone(), Station::Dispatch);
        let cashier = StationSynchronizer::new(manager.clone(), Station::Cashier);
        let mut rx = kitchen.subscribe();

        let order = manager.create_order(1, &actor).unwrap();
        manager.mark_validated(&order.order_id, 0, &actor).unwrap();
        advance_times(&manager, &order.order_id, 3); // ends Preparing → Ready

        // Drain to the Preparing → Ready event
        let event = std::iter::from_fn(|| rx.try_recv().ok())
            .last()
            .unwrap();
        assert!(kitchen.is_relevant(&event).unwrap(), "kitchen drops the row");
        assert!(dispatch.is_relevant(&event).unwrap(), "dispatch gains the row");
        assert!(!cashier.is_relevant(&event).unwrap());
    }

    #[test]
    fn composition_events_only_matter_where_the_order_is_visible() {
        let manager = test_manager();
        let actor = admin();
        let intake = StationSynchronizer::new(manager.clone(), Station::Intake);
        let kitchen = StationSynchronizer::new(manager.clone(), Station::Kitchen);
        let mut rx = intake.subscribe();

        let order = manager.create_order(1, &actor).unwrap();
        manager
            .add_product_item(
                &order.order_id,
                0,
                &ProductItemInput {
                    product_id: 9,
                    quantity: 1,
                },
                &actor,
            )
            .unwrap();

        let _opened = rx.try_recv().unwrap();
        let added = rx.try_recv().unwrap();
        assert!(intake.is_relevant(&added).unwrap());
        assert!(!kitchen.is_relevant(&added).unwrap());
    }
}
