//! Order aggregate types
//!
//! - **status**: the fixed lifecycle sequence and its successor rule
//! - **types**: Order/Suborder/line-item entities and composer inputs
//! - **event**: change notifications broadcast after committed mutations

pub mod event;
pub mod status;
pub mod types;

pub use event::{OrderEvent, OrderEventKind};
pub use status::OrderStatus;
pub use types::{DishItemInput, DishLineItem, Order, ProductItemInput, ProductLineItem, Suborder};
