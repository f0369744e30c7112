//! Error taxonomy for the order core
//!
//! Illegal transitions and rejected mutations are expected outcomes, not
//! crashes: every operation returns a discriminated result and the
//! caller decides the UI treatment. The core never swallows an error.
//!
//! Retry policy per variant:
//! - `Validation`, `InvalidState`, `ForbiddenTransition`, `Precondition`
//!   — surfaced immediately, never retried
//! - `Conflict` — recoverable; the caller re-fetches and may retry once
//! - `ImmutableEntity` — fatal, never retried
//! - transient I/O belongs to the calling collaborator, not this core

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::StaffRole;
use crate::order::OrderStatus;

/// Core error type
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// Malformed input: non-positive quantity, blank label, ...
    #[error("validation failed: {0}")]
    Validation(String),

    /// Referenced catalog entity is unknown or inactive
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("suborder not found: {0}")]
    SuborderNotFound(String),

    #[error("line item not found: {0}")]
    LineItemNotFound(String),

    /// Operation not legal in the order's current status
    #[error("operation not allowed while order is {status}: {detail}")]
    InvalidState {
        status: OrderStatus,
        detail: String,
    },

    /// Actor's role is not authorized for the current transition
    #[error("role {role} may not advance an order in {status}")]
    ForbiddenTransition {
        role: StaffRole,
        status: OrderStatus,
    },

    /// A status-specific precondition does not hold
    #[error("precondition not met: {0}")]
    Precondition(String),

    /// Optimistic-concurrency version mismatch under concurrent edit
    #[error("version conflict: expected {expected}, found {actual}")]
    Conflict { expected: u64, actual: u64 },

    /// The order is `Paid` and rejects every further mutation
    #[error("order {0} is paid and immutable")]
    ImmutableEntity(String),

    /// Storage layer failure (wrapped as a message to keep this type Clone)
    #[error("storage error: {0}")]
    Storage(String),
}

/// Wire-stable discriminant for error classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderErrorKind {
    Validation,
    InvalidReference,
    NotFound,
    InvalidState,
    ForbiddenTransition,
    Precondition,
    Conflict,
    ImmutableEntity,
    Storage,
}

impl OrderError {
    /// Classify the error for callers rendering different messages
    pub fn kind(&self) -> OrderErrorKind {
        match self {
            OrderError::Validation(_) => OrderErrorKind::Validation,
            OrderError::InvalidReference(_) => OrderErrorKind::InvalidReference,
            OrderError::OrderNotFound(_)
            | OrderError::SuborderNotFound(_)
            | OrderError::LineItemNotFound(_) => OrderErrorKind::NotFound,
            OrderError::InvalidState { .. } => OrderErrorKind::InvalidState,
            OrderError::ForbiddenTransition { .. } => OrderErrorKind::ForbiddenTransition,
            OrderError::Precondition(_) => OrderErrorKind::Precondition,
            OrderError::Conflict { .. } => OrderErrorKind::Conflict,
            OrderError::ImmutableEntity(_) => OrderErrorKind::ImmutableEntity,
            OrderError::Storage(_) => OrderErrorKind::Storage,
        }
    }

    /// Only version conflicts are worth an automatic re-fetch-and-retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, OrderError::Conflict { .. })
    }

    /// Fatal errors must never be retried, even manually
    pub fn is_fatal(&self) -> bool {
        matches!(self, OrderError::ImmutableEntity(_))
    }
}

pub type OrderResult<T> = Result<T, OrderError>;
