//! Staff roles and the acting operator

use serde::{Deserialize, Serialize};

/// Work-station role of the operator executing an operation
///
/// Each status transition is restricted to a subset of roles; see the
/// state machine's role table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffRole {
    Admin,
    Supervisor,
    Waiter,
    Dispatcher,
    Kitchen,
}

impl std::fmt::Display for StaffRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StaffRole::Admin => "ADMIN",
            StaffRole::Supervisor => "SUPERVISOR",
            StaffRole::Waiter => "WAITER",
            StaffRole::Dispatcher => "DISPATCHER",
            StaffRole::Kitchen => "KITCHEN",
        };
        write!(f, "{}", name)
    }
}

/// Operator identity recorded on every mutation (audit snapshot)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub role: StaffRole,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: StaffRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }
}
