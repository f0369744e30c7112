//! Catalog and staff models
//!
//! Catalog entities are read-only inputs to the order core. They are
//! maintained elsewhere (catalog CRUD is out of scope); the core only
//! resolves references and captures prices at add-time.

pub mod dining_table;
pub mod dish;
pub mod product;
pub mod staff;

pub use dining_table::DiningTable;
pub use dish::{Dish, DishVariant};
pub use product::Product;
pub use staff::{Actor, StaffRole};
