//! Order Engine - restaurant order lifecycle and composition
//!
//! # Architecture
//!
//! The engine owns everything between "a waiter opens an order" and
//! "the cashier closes it":
//!
//! - **Catalog** (`catalog`): in-memory registry of tables, dishes,
//!   variants and products that composition validates against
//! - **Orders** (`orders`): composition rules, decimal totals, the
//!   delivery gate, the status machine, redb persistence and the
//!   version-conditioned [`OrderManager`]
//! - **Stations** (`orders::sync`): per-station projections with poll
//!   snapshots and an event feed
//! - **API** (`api`): the `{success, data, message}` envelope facade
//!   transports serialize directly
//!
//! # Module structure
//!
//! ```text
//! order-engine/src/
//! ├── api.rs         # response-envelope facade
//! ├── catalog.rs     # catalog cache and JSON collection loading
//! ├── config.rs      # environment configuration
//! ├── telemetry.rs   # logging setup
//! └── orders/        # lifecycle engine (see orders::*)
//! ```

pub mod api;
pub mod catalog;
pub mod config;
pub mod orders;
pub mod telemetry;

pub use api::OrderApi;
pub use catalog::CatalogService;
pub use config::EngineConfig;
pub use orders::{Advance, OrderManager, OrderStorage, Station, StationSynchronizer, StationView};
pub use shared::error::{OrderError, OrderResult};
pub use shared::response::ApiResponse;
pub use telemetry::init_logger;
