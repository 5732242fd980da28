//! Role gate run before any ledger traffic.

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;
use crate::ledger::Identity;
use crate::role::Role;

pub const ADMIN_ACADEMY: &[Role] = &[Role::AdminAcademy];
pub const TEACHER: &[Role] = &[Role::Teacher];
pub const STUDENT: &[Role] = &[Role::Student];
pub const STAFF: &[Role] = &[Role::AdminAcademy, Role::Teacher];
pub const NON_STUDENT: &[Role] = &[Role::AdminAcademy, Role::Teacher, Role::AdminStudent];
pub const ANY: &[Role] = &[
    Role::AdminAcademy,
    Role::Teacher,
    Role::AdminStudent,
    Role::Student,
];

/// Already verified caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub username: String,
    pub role: Role,
}

impl Caller {
    pub fn new(username: impl ToString, role: Role) -> Caller {
        Caller {
            username: username.to_string(),
            role,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity::new(&self.username, self.role)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn into_result(self) -> Result<(), WorkflowError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny => Err(WorkflowError::Denied),
        }
    }
}

pub fn authorize(role: Role, required: &[Role]) -> Decision {
    if required.contains(&role) {
        Decision::Allow
    } else {
        Decision::Deny
    }
}
