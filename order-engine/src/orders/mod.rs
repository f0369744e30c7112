//! Order lifecycle engine
//!
//! Layering, bottom up:
//!
//! - [`money`]: decimal totals arithmetic and price/quantity bounds
//! - [`delivery`]: per-item delivery flags and the settle gate
//! - [`state_machine`]: the seven-step status sequence with role checks
//! - [`composer`]: suborder and line-item composition rules
//! - [`storage`]: redb persistence, active index, global sequence
//! - [`manager`]: version-conditioned transactions and the event feed
//! - [`sync`]: per-station projections and poll snapshots
//!
//! The pure modules (`money`, `delivery`, `state_machine`, `composer`)
//! only touch an [`Order`](shared::order::Order) in memory; everything
//! transactional goes through the manager.

pub mod composer;
pub mod delivery;
pub mod manager;
pub mod money;
pub mod state_machine;
pub mod storage;
pub mod sync;

pub use manager::OrderManager;
pub use state_machine::Advance;
pub use storage::{OrderStorage, StorageError};
pub use sync::{Station, StationSynchronizer, StationView};
