//! Operator authorization and pause guard
//!
//! Provides the capability checks gating every state-mutating
//! administrative call on the core.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use types::address::Address;

/// Access control roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Full platform control
    Admin,
    /// Administrative token operations (define chains, rules, locks, mint/burn)
    Operator,
}

/// Role-based access control manager.
///
/// Maps callers to their assigned roles. The admin implicitly holds the
/// operator capability.
#[derive(Debug, Clone)]
pub struct AccessControl {
    roles: HashMap<Address, Role>,
    admin: Address,
}

impl AccessControl {
    /// Create access control with an initial admin.
    pub fn new(admin: impl Into<Address>) -> Self {
        let admin = admin.into();
        let mut roles = HashMap::new();
        roles.insert(admin.clone(), Role::Admin);
        Self { roles, admin }
    }

    /// Check if a caller has the specified role.
    pub fn has_role(&self, caller: &Address, role: Role) -> bool {
        self.roles.get(caller).map_or(false, |r| *r == role)
    }

    /// Check if a caller is admin.
    pub fn is_admin(&self, caller: &Address) -> bool {
        self.has_role(caller, Role::Admin)
    }

    /// Check if a caller may perform operator actions.
    ///
    /// Admin counts as operator.
    pub fn is_operator(&self, caller: &Address) -> bool {
        self.has_role(caller, Role::Operator) || self.is_admin(caller)
    }

    /// Assign a role to a caller. Only admin can assign roles.
    pub fn grant_role(&mut self, admin_caller: &Address, target: impl Into<Address>, role: Role) -> bool {
        if !self.is_admin(admin_caller) {
            return false;
        }
        self.roles.insert(target.into(), role);
        true
    }

    /// Remove a role from a caller. Only admin can revoke.
    pub fn revoke_role(&mut self, admin_caller: &Address, target: &Address) -> bool {
        if !self.is_admin(admin_caller) {
            return false;
        }
        // Cannot revoke the primary admin
        if *target == self.admin {
            return false;
        }
        self.roles.remove(target);
        true
    }

}

/// Composable pause modifier.
///
/// When paused, protected operations must be rejected.
#[derive(Debug, Clone)]
pub struct PauseGuard {
    paused: bool,
}

impl PauseGuard {
    /// Create a new unpaused guard.
    pub fn new() -> Self {
        Self { paused: false }
    }

    /// Pause operations.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Unpause operations.
    pub fn unpause(&mut self) {
        self.paused = false;
    }

    /// Check if currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

impl Default for PauseGuard {
    fn default() -> Self {
        Self::new()
    }
}
