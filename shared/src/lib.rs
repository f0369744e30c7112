//! Shared types for the order lifecycle engine
//!
//! Common types used across the workspace: the order/suborder/line-item
//! entity model, the status enum, the error taxonomy, order events, and
//! the response envelope exchanged with external collaborators.

pub mod error;
pub mod models;
pub mod order;
pub mod response;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{OrderError, OrderResult};
pub use response::ApiResponse;
