//! Permission decisions

use serde::{Deserialize, Serialize};

use crate::requirement::Requirement;

/// Final (or running) authorization decision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    /// The invocation is denied
    NoPermission,
    /// The invocation is allowed
    HasPermission,
}

impl PermissionStatus {
    /// Status corresponding to a default-allow flag.
    pub fn from_default_allow(default_allow: bool) -> Self {
        if default_allow {
            PermissionStatus::HasPermission
        } else {
            PermissionStatus::NoPermission
        }
    }

    /// Get the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionStatus::NoPermission => "no_permission",
            PermissionStatus::HasPermission => "has_permission",
        }
    }
}

/// A requirement whose evaluation faulted and was counted as failed.
#[derive(Debug, Clone)]
pub struct RequirementFault {
    /// The faulted requirement
    pub requirement: Requirement,

    /// Fault description
    pub message: String,
}

/// Outcome of resolving a command's requirements for one invocation.
#[derive(Debug, Clone)]
pub struct PermissionResult {
    /// Final decision
    pub status: PermissionStatus,

    /// Requirements whose test returned false, in evaluation order
    pub failed_requirements: Vec<Requirement>,

    /// Requirements whose evaluation faulted, in evaluation order
    pub faults: Vec<RequirementFault>,
}

impl PermissionResult {
    /// A result with the given status and no diagnostics.
    pub fn new(status: PermissionStatus) -> Self {
        Self {
            status,
            failed_requirements: Vec::new(),
            faults: Vec::new(),
        }
    }

    /// The result for commands without any permission settings.
    pub fn unrestricted() -> Self {
        Self::new(PermissionStatus::HasPermission)
    }

    /// Whether the invocation is allowed.
    pub fn is_allowed(&self) -> bool {
        self.status == PermissionStatus::HasPermission
    }
}
