//! Response-envelope facade over the order manager
//!
//! Transport handlers call this layer and serialize whatever comes
//! back; every method returns an [`ApiResponse`] and never an `Err`.
//!
//! Conflict handling: when a version-conditioned write loses the race,
//! the facade re-fetches the order and retries once with the fresh
//! version. That is safe for intent-explicit operations (the caller
//! said exactly which item, note or target status they want, and the
//! failed attempt wrote nothing). The bare `advance` is the exception:
//! its intent is "one step from where I looked", so a retry after a
//! concurrent advance would silently move the order two steps. It
//! surfaces the conflict instead and lets the station re-read.

use shared::error::OrderError;
use shared::models::Actor;
use shared::order::{DishItemInput, Order, OrderStatus, ProductItemInput};
use shared::response::ApiResponse;

use crate::catalog::CatalogService;
use crate::orders::{Advance, OrderManager, Station, StationSynchronizer, StationView};

/// Public entry point for transports
pub struct OrderApi {
    manager: OrderManager,
}

impl OrderApi {
    pub fn new(manager: OrderManager) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &OrderManager {
        &self.manager
    }

    // ========== Orders ==========

    pub fn create_order(&self, table_id: i64, actor: &Actor) -> ApiResponse<Order> {
        self.manager.create_order(table_id, actor).into()
    }

    pub fn get_order(&self, order_id: &str) -> ApiResponse<Order> {
        self.manager.get_order(order_id).into()
    }

    pub fn list_orders(&self, status: Option<OrderStatus>) -> ApiResponse<Vec<Order>> {
        self.manager.list_orders(status).into()
    }

    pub fn add_suborder(
        &self,
        order_id: &str,
        expected_version: u64,
        label: &str,
        actor: &Actor,
    ) -> ApiResponse<Order> {
        self.retrying(order_id, expected_version, |version| {
            self.manager.add_suborder(order_id, version, label, actor)
        })
    }

    pub fn add_dish_item(
        &self,
        order_id: &str,
        expected_version: u64,
        input: &DishItemInput,
        actor: &Actor,
    ) -> ApiResponse<Order> {
        self.retrying(order_id, expected_version, |version| {
            self.manager.add_dish_item(order_id, version, input, actor)
        })
    }

    pub fn add_product_item(
        &self,
        order_id: &str,
        expected_version: u64,
        input: &ProductItemInput,
        actor: &Actor,
    ) -> ApiResponse<Order> {
        self.retrying(order_id, expected_version, |version| {
            self.manager
                .add_product_item(order_id, version, input, actor)
        })
    }

    pub fn remove_line_item(
        &self,
        order_id: &str,
        expected_version: u64,
        line_item_id: &str,
        actor: &Actor,
    ) -> ApiResponse<Order> {
        self.retrying(order_id, expected_version, |version| {
            self.manager
                .remove_line_item(order_id, version, line_item_id, actor)
        })
    }

    pub fn update_notes(
        &self,
        order_id: &str,
        expected_version: u64,
        notes: Option<String>,
        actor: &Actor,
    ) -> ApiResponse<Order> {
        self.retrying(order_id, expected_version, |version| {
            self.manager
                .update_notes(order_id, version, notes.clone(), actor)
        })
    }

    pub fn mark_validated(
        &self,
        order_id: &str,
        expected_version: u64,
        actor: &Actor,
    ) -> ApiResponse<Order> {
        self.retrying(order_id, expected_version, |version| {
            self.manager.mark_validated(order_id, version, actor)
        })
    }

    pub fn mark_delivered(
        &self,
        order_id: &str,
        expected_version: u64,
        line_item_id: &str,
        actor: &Actor,
    ) -> ApiResponse<Order> {
        self.retrying(order_id, expected_version, |version| {
            self.manager
                .mark_delivered(order_id, version, line_item_id, actor)
        })
    }

    /// One step along the status sequence. Conflicts are NOT retried.
    pub fn advance(
        &self,
        order_id: &str,
        expected_version: u64,
        actor: &Actor,
    ) -> ApiResponse<Order> {
        match self.manager.advance(order_id, expected_version, actor) {
            Ok((order, Advance::Moved { .. })) => ApiResponse::ok(order),
            Ok((order, Advance::HeldPending)) => ApiResponse::ok_with_message(
                order,
                "order held in PENDING until intake validation",
            ),
            Err(err) => err.into(),
        }
    }

    /// Advance to an explicit target status
    pub fn advance_to(
        &self,
        order_id: &str,
        expected_version: u64,
        target: OrderStatus,
        actor: &Actor,
    ) -> ApiResponse<Order> {
        let result = self.retrying(order_id, expected_version, |version| {
            self.manager
                .advance_to(order_id, version, target, actor)
                .map(|(order, _)| order)
        });
        if result.success && result.data.as_ref().is_some_and(|o| o.status != target) {
            // Held-pending path: target was PENDING's successor but the
            // order is not validated yet
            return ApiResponse {
                message: Some("order held in PENDING until intake validation".into()),
                ..result
            };
        }
        result
    }

    // ========== Stations ==========

    pub fn station_poll(&self, station: Station) -> ApiResponse<StationView> {
        StationSynchronizer::new(self.manager.clone(), station)
            .poll()
            .into()
    }

    // ========== Catalog ==========

    /// Replace one catalog collection from raw JSON (count returned)
    pub fn apply_catalog(&self, name: &str, payload: serde_json::Value) -> ApiResponse<usize> {
        self.manager.catalog().apply_collection(name, payload).into()
    }

    pub fn catalog(&self) -> &CatalogService {
        self.manager.catalog()
    }

    // ========== Internals ==========

    /// Run an intent-explicit mutation, retrying once with the fresh
    /// version if the first attempt hits a conflict
    fn retrying<T>(
        &self,
        order_id: &str,
        expected_version: u64,
        mut op: impl FnMut(u64) -> Result<T, OrderError>,
    ) -> ApiResponse<T> {
        match op(expected_version) {
            Err(OrderError::Conflict { actual, .. }) => {
                tracing::debug!(order_id, expected_version, actual, "Retrying after conflict");
                op(actual).into()
            }
            result => result.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shared::models::{Actor, DiningTable, Product, StaffRole};

    use super::*;

    fn test_api() -> OrderApi {
        let catalog = CatalogService::new();
        catalog.replace_tables(vec![DiningTable::new(1, 1, 4)]);
        catalog.replace_products(vec![Product::new(9, "Agua fresca", 30.0)]);
        let manager = OrderManager::in_memory(Arc::new(catalog)).unwrap();
        OrderApi::new(manager)
    }

    fn waiter() -> Actor {
        Actor::new("u-1", "Ana", StaffRole::Waiter)
    }

    #[test]
    fn envelope_reports_success_and_failure() {
        let api = test_api();
        let ok = api.create_order(1, &waiter());
        assert!(ok.success);
        assert!(ok.data.is_some());
        assert!(ok.message.is_none());

        let err = api.create_order(99, &waiter());
        assert!(!err.success);
        assert!(err.data.is_none());
        assert!(err.message.is_some());
    }

    #[test]
    fn stale_composition_write_is_retried_once() {
        let api = test_api();
        let actor = waiter();
        let order = api.create_order(1, &actor).data.unwrap();

        // Another writer bumps the version behind this caller's back
        api.update_notes(&order.order_id, 0, Some("rush".into()), &actor);

        let response = api.add_product_item(
            &order.order_id,
            0, // stale
            &ProductItemInput {
                product_id: 9,
                quantity: 2,
            },
            &actor,
        );
        assert!(response.success);
        assert_eq!(response.data.unwrap().total, 60.0);
    }

    #[test]
    fn bare_advance_surfaces_the_conflict() {
        let api = test_api();
        let actor = waiter();
        let order = api.create_order(1, &actor).data.unwrap();
        api.mark_validated(&order.order_id, 0, &actor);

        // versions: 0 → 1 after validation; a concurrent advance lands first
        let first = api.advance(&order.order_id, 1, &actor);
        assert!(first.success);

        let second = api.advance(&order.order_id, 1, &actor);
        assert!(!second.success);
        assert!(second.message.unwrap().contains("conflict"));
    }

    #[test]
    fn held_pending_advance_comes_back_with_a_message() {
        let api = test_api();
        let actor = waiter();
        let order = api.create_order(1, &actor).data.unwrap();

        let response = api.advance(&order.order_id, 0, &actor);
        assert!(response.success);
        assert_eq!(response.data.unwrap().status, OrderStatus::Pending);
        assert!(response.message.unwrap().contains("held"));
    }
}
