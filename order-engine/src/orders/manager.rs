//! OrderManager - versioned mutations over one order aggregate
//!
//! Every mutation is a single logical transaction against one order:
//!
//! ```text
//! mutate(order_id, expected_version, f)
//!     ├─ 1. Begin write transaction (redb: single writer)
//!     ├─ 2. Load order
//!     ├─ 3. Version check → ConflictError on mismatch
//!     ├─ 4. Immutability check (Paid rejects everything)
//!     ├─ 5. Apply composer/state-machine function
//!     ├─ 6. Recompute totals, bump version
//!     ├─ 7. Persist order + sequence, maintain active index
//!     ├─ 8. Commit
//!     └─ 9. Broadcast event(s)
//! ```
//!
//! Mutations on different orders are independent; two writers touching
//! the same order from the same observed version resolve to exactly one
//! success and one `Conflict`. A function returning no events is a
//! documented no-op: nothing is persisted and the version stays put.

use std::sync::Arc;

use shared::error::OrderError;
use shared::models::Actor;
use shared::order::{
    DishItemInput, Order, OrderEvent, OrderEventKind, OrderStatus, ProductItemInput,
};
use shared::util::now_millis;
use tokio::sync::broadcast;

use super::composer;
use super::delivery;
use super::state_machine::{self, Advance};
use super::storage::{OrderStorage, StorageError};
use crate::catalog::CatalogService;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// Order manager: storage, catalog and the station event feed
pub struct OrderManager {
    storage: OrderStorage,
    catalog: Arc<CatalogService>,
    event_tx: broadcast::Sender<OrderEvent>,
    /// Server instance epoch, regenerated on startup. Station views use
    /// it to detect restarts and re-fetch from scratch.
    epoch: String,
}

impl OrderManager {
    pub fn new(storage: OrderStorage, catalog: Arc<CatalogService>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(epoch = %epoch, "OrderManager started with new epoch");
        Self {
            storage,
            catalog,
            event_tx,
            epoch,
        }
    }

    /// Manager over an ephemeral in-memory store (tests, demos)
    pub fn in_memory(catalog: Arc<CatalogService>) -> Result<Self, OrderError> {
        Ok(Self::new(OrderStorage::open_in_memory()?, catalog))
    }

    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    /// Subscribe to the event feed
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.event_tx.subscribe()
    }

    // ========== Mutations ==========

    /// Allocate a new order in `Pending` for an active table
    pub fn create_order(&self, table_id: i64, actor: &Actor) -> Result<Order, OrderError> {
        let order = composer::create_order(&self.catalog, table_id, &actor.id)?;

        let txn = self.storage.begin_write()?;
        let sequence = self.storage.next_sequence(&txn)?;
        let event = OrderEvent::new(
            sequence,
            order.order_id.clone(),
            order.version,
            order.created_at,
            actor.clone(),
            OrderEventKind::OrderOpened { table_id },
        );
        self.storage.store_order(&txn, &order)?;
        self.storage.mark_order_active(&txn, &order.order_id)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id = %order.order_id, table_id, "Order opened");
        self.broadcast(vec![event]);
        Ok(order)
    }

    /// Attach a new labelled suborder
    pub fn add_suborder(
        &self,
        order_id: &str,
        expected_version: u64,
        label: &str,
        actor: &Actor,
    ) -> Result<Order, OrderError> {
        self.mutate(order_id, expected_version, actor, |order| {
            let suborder_id = composer::add_suborder(order, label)?;
            Ok(vec![OrderEventKind::SuborderAdded {
                suborder_id,
                label: label.trim().to_string(),
            }])
        })
    }

    /// Add a dish line item, capturing the current catalog price
    pub fn add_dish_item(
        &self,
        order_id: &str,
        expected_version: u64,
        input: &DishItemInput,
        actor: &Actor,
    ) -> Result<Order, OrderError> {
        let catalog = Arc::clone(&self.catalog);
        self.mutate(order_id, expected_version, actor, move |order| {
            let line_item_id = composer::add_dish_item(order, &catalog, input)?;
            Ok(vec![OrderEventKind::DishItemAdded {
                suborder_id: input.suborder_id.clone(),
                line_item_id,
                dish_id: input.dish_id,
            }])
        })
    }

    /// Add a product line item directly on the order
    pub fn add_product_item(
        &self,
        order_id: &str,
        expected_version: u64,
        input: &ProductItemInput,
        actor: &Actor,
    ) -> Result<Order, OrderError> {
        let catalog = Arc::clone(&self.catalog);
        self.mutate(order_id, expected_version, actor, move |order| {
            let line_item_id = composer::add_product_item(order, &catalog, input)?;
            Ok(vec![OrderEventKind::ProductItemAdded {
                line_item_id,
                product_id: input.product_id,
            }])
        })
    }

    /// Remove a line item while composition is still open
    pub fn remove_line_item(
        &self,
        order_id: &str,
        expected_version: u64,
        line_item_id: &str,
        actor: &Actor,
    ) -> Result<Order, OrderError> {
        self.mutate(order_id, expected_version, actor, |order| {
            composer::remove_line_item(order, line_item_id)?;
            Ok(vec![OrderEventKind::ItemRemoved {
                line_item_id: line_item_id.to_string(),
            }])
        })
    }

    /// Update the order's free-text notes
    pub fn update_notes(
        &self,
        order_id: &str,
        expected_version: u64,
        notes: Option<String>,
        actor: &Actor,
    ) -> Result<Order, OrderError> {
        self.mutate(order_id, expected_version, actor, |order| {
            composer::update_notes(order, notes)?;
            Ok(vec![OrderEventKind::NotesUpdated])
        })
    }

    /// Intake reviewer confirms composition completeness (idempotent)
    pub fn mark_validated(
        &self,
        order_id: &str,
        expected_version: u64,
        actor: &Actor,
    ) -> Result<Order, OrderError> {
        self.mutate(order_id, expected_version, actor, |order| {
            if order.validated {
                return Ok(vec![]); // already signed off
            }
            composer::mark_validated(order)?;
            Ok(vec![OrderEventKind::IntakeValidated])
        })
    }

    /// Mark a line item delivered (idempotent)
    pub fn mark_delivered(
        &self,
        order_id: &str,
        expected_version: u64,
        line_item_id: &str,
        actor: &Actor,
    ) -> Result<Order, OrderError> {
        self.mutate(order_id, expected_version, actor, |order| {
            if delivery::mark_delivered(order, line_item_id)? {
                Ok(vec![OrderEventKind::ItemDelivered {
                    line_item_id: line_item_id.to_string(),
                }])
            } else {
                Ok(vec![]) // already delivered
            }
        })
    }

    /// Advance the order one step along the status sequence
    pub fn advance(
        &self,
        order_id: &str,
        expected_version: u64,
        actor: &Actor,
    ) -> Result<(Order, Advance), OrderError> {
        let role = actor.role;
        let mut outcome = Advance::HeldPending;
        let order = self.mutate(order_id, expected_version, actor, |order| {
            outcome = state_machine::advance(order, role)?;
            match outcome {
                Advance::Moved { from, to } => Ok(vec![OrderEventKind::StatusAdvanced { from, to }]),
                Advance::HeldPending => Ok(vec![]),
            }
        })?;
        Ok((order, outcome))
    }

    /// Advance the order to an explicitly named target status
    pub fn advance_to(
        &self,
        order_id: &str,
        expected_version: u64,
        target: OrderStatus,
        actor: &Actor,
    ) -> Result<(Order, Advance), OrderError> {
        let role = actor.role;
        let mut outcome = Advance::HeldPending;
        let order = self.mutate(order_id, expected_version, actor, |order| {
            outcome = state_machine::advance_to(order, target, role)?;
            match outcome {
                Advance::Moved { from, to } => Ok(vec![OrderEventKind::StatusAdvanced { from, to }]),
                Advance::HeldPending => Ok(vec![]),
            }
        })?;
        Ok((order, outcome))
    }

    // ========== Queries ==========

    pub fn get_order(&self, order_id: &str) -> Result<Order, OrderError> {
        self.storage
            .get_order(order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
    }

    /// All orders, optionally filtered by status
    pub fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, OrderError> {
        Ok(self.storage.get_orders(status)?)
    }

    /// Orders that have not reached `Paid`
    pub fn active_orders(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.storage.get_active_orders()?)
    }

    pub fn current_sequence(&self) -> Result<u64, OrderError> {
        Ok(self.storage.current_sequence()?)
    }

    // ========== Internals ==========

    /// Run one version-conditioned mutation against one order
    fn mutate(
        &self,
        order_id: &str,
        expected_version: u64,
        actor: &Actor,
        f: impl FnOnce(&mut Order) -> Result<Vec<OrderEventKind>, OrderError>,
    ) -> Result<Order, OrderError> {
        tracing::debug!(order_id, expected_version, actor = %actor.name, "Processing mutation");

        let txn = self.storage.begin_write()?;

        let mut order = self
            .storage
            .load_order(&txn, order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;

        if order.version != expected_version {
            return Err(OrderError::Conflict {
                expected: expected_version,
                actual: order.version,
            });
        }
        if order.is_immutable() {
            return Err(OrderError::ImmutableEntity(order.order_id.clone()));
        }

        let kinds = f(&mut order)?;

        // Documented no-op (held-pending advance, repeated delivery mark):
        // nothing persisted, version untouched
        if kinds.is_empty() {
            return Ok(order);
        }

        let now = now_millis();
        super::money::recalculate_totals(&mut order);
        order.version += 1;
        order.touch(now);

        let mut events = Vec::with_capacity(kinds.len());
        for kind in kinds {
            let sequence = self.storage.next_sequence(&txn)?;
            events.push(OrderEvent::new(
                sequence,
                order.order_id.clone(),
                order.version,
                now,
                actor.clone(),
                kind,
            ));
        }

        self.storage.store_order(&txn, &order)?;
        if order.status.is_terminal() {
            self.storage.mark_order_inactive(&txn, &order.order_id)?;
        }
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            order_id = %order.order_id,
            version = order.version,
            status = %order.status,
            total = order.total,
            event_count = events.len(),
            "Mutation committed"
        );
        self.broadcast(events);
        Ok(order)
    }

    /// Broadcast after a successful commit. Send only fails when no
    /// receiver is subscribed, which is fine: views catch up on poll.
    fn broadcast(&self, events: Vec<OrderEvent>) {
        for event in events {
            let _ = self.event_tx.send(event);
        }
    }
}

impl Clone for OrderManager {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            catalog: Arc::clone(&self.catalog),
            event_tx: self.event_tx.clone(),
            epoch: self.epoch.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{DiningTable, Dish, DishVariant, Product, StaffRole};

    fn test_catalog() -> Arc<CatalogService> {
        let catalog = CatalogService::new();
        catalog.replace_tables(vec![DiningTable::new(4, 4, 6)]);
        catalog.replace_dishes(vec![Dish::new(1, "Enchiladas", 120.0, vec![10])]);
        catalog.replace_variants(vec![DishVariant::new(10, "Verde")]);
        catalog.replace_products(vec![Product::new(9, "Agua fresca", 30.0)]);
        Arc::new(catalog)
    }

    fn test_manager() -> OrderManager {
        OrderManager::in_memory(test_catalog()).unwrap()
    }

    fn waiter() -> Actor {
        Actor::new("u-1", "Ana", StaffRole::Waiter)
    }

    #[test]
    fn create_then_compose_bumps_versions_and_totals() {
        let manager = test_manager();
        let actor = waiter();

        let order = manager.create_order(4, &actor).unwrap();
        assert_eq!(order.version, 0);

        let order = manager
            .add_suborder(&order.order_id, 0, "mains", &actor)
            .unwrap();
        assert_eq!(order.version, 1);
        let suborder_id = order.suborders[0].suborder_id.clone();

        let order = manager
            .add_dish_item(
                &order.order_id,
                1,
                &DishItemInput {
                    suborder_id,
                    dish_id: 1,
                    variant_id: 10,
                    quantity: 2,
                },
                &actor,
            )
            .unwrap();
        assert_eq!(order.version, 2);
        assert_eq!(order.total, 240.0);

        // Persisted copy agrees with the returned one
        let stored = manager.get_order(&order.order_id).unwrap();
        assert_eq!(stored, order);
    }

    #[test]
    fn stale_version_is_a_conflict() {
        let manager = test_manager();
        let actor = waiter();
        let order = manager.create_order(4, &actor).unwrap();

        manager
            .add_suborder(&order.order_id, 0, "mains", &actor)
            .unwrap();

        let err = manager
            .add_suborder(&order.order_id, 0, "drinks", &actor)
            .unwrap_err();
        assert_eq!(
            err,
            OrderError::Conflict {
                expected: 0,
                actual: 1
            }
        );
    }

    #[test]
    fn held_pending_advance_is_a_no_op() {
        let manager = test_manager();
        let actor = waiter();
        let order = manager.create_order(4, &actor).unwrap();

        let (after, outcome) = manager.advance(&order.order_id, 0, &actor).unwrap();
        assert_eq!(outcome, Advance::HeldPending);
        assert_eq!(after.status, OrderStatus::Pending);
        // No version bump: the caller's observed version is still valid
        assert_eq!(after.version, 0);
        let order = manager
            .update_notes(&order.order_id, 0, Some("still composing".into()), &actor)
            .unwrap();
        assert_eq!(order.version, 1);
    }

    #[test]
    fn repeated_delivery_mark_does_not_bump_version() {
        let manager = test_manager();
        let actor = waiter();
        let order = manager.create_order(4, &actor).unwrap();
        let order = manager
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
        let line_item_id = order.products[0].line_item_id.clone();

        let order = manager
            .mark_delivered(&order.order_id, 1, &line_item_id, &actor)
            .unwrap();
        assert_eq!(order.version, 2);

        let order = manager
            .mark_delivered(&order.order_id, 2, &line_item_id, &actor)
            .unwrap();
        assert_eq!(order.version, 2);
    }

    #[test]
    fn events_carry_a_monotone_global_sequence() {
        let manager = test_manager();
        let actor = waiter();
        let mut rx = manager.subscribe();

        let order = manager.create_order(4, &actor).unwrap();
        manager
            .add_suborder(&order.order_id, 0, "mains", &actor)
            .unwrap();

        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        assert!(matches!(first.kind, OrderEventKind::OrderOpened { table_id: 4 }));
        assert!(matches!(second.kind, OrderEventKind::SuborderAdded { .. }));
        assert!(second.sequence > first.sequence);
        assert_eq!(manager.current_sequence().unwrap(), second.sequence);
    }

    #[test]
    fn paid_orders_drop_out_of_the_active_set() {
        let manager = test_manager();
        let actor = waiter();
        let admin = Actor::new("u-0", "Root", StaffRole::Admin);

        let order = manager.create_order(4, &actor).unwrap();
        let order = manager.mark_validated(&order.order_id, 0, &actor).unwrap();

        let mut version = order.version;
        for _ in 0..6 {
            let (order, _) = manager.advance(&order.order_id, version, &admin).unwrap();
            version = order.version;
        }

        let stored = manager.get_order(&order.order_id).unwrap();
        assert_eq!(stored.status, OrderStatus::Paid);
        assert!(manager.active_orders().unwrap().is_empty());

        // Every further mutation is rejected as immutable
        let err = manager
            .update_notes(&order.order_id, version, Some("late".into()), &actor)
            .unwrap_err();
        assert!(matches!(err, OrderError::ImmutableEntity(_)));
    }

    #[test]
    fn unknown_order_is_not_found() {
        let manager = test_manager();
        assert!(matches!(
            manager.get_order("nope"),
            Err(OrderError::OrderNotFound(_))
        ));
        assert!(matches!(
            manager.add_suborder("nope", 0, "x", &waiter()),
            Err(OrderError::OrderNotFound(_))
        ));
    }
}
