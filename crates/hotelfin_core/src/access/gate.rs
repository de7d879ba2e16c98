//! Access gate for ledger mutations and gated views.
//!
//! # Responsibility
//! - Hold a principal's capabilities in one structured set.
//! - Answer `allow(capabilities, action)` with a plain boolean.
//!
//! # Invariants
//! - Super-privileged sets allow every action.
//! - Absent grants deny.
//! - `allow` never panics and never returns an error.

use crate::access::capability::{parse_capability_key, Permission};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Flag key that marks a super-privileged principal in legacy maps.
pub const SUPER_PRIVILEGE_KEY: &str = "super_admin";

/// Requested mutation or gated view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CreateProject,
    UpdateProject,
    DeleteProject,
    CreateTransaction,
    UpdateTransaction,
    DeleteTransaction,
    ViewReports,
    TakeBackup,
    ManagePersonnel,
}

impl Action {
    /// Permission required to perform this action.
    pub fn permission(self) -> Permission {
        match self {
            Self::CreateProject => Permission::AddProject,
            Self::UpdateProject => Permission::EditProject,
            Self::DeleteProject => Permission::DeleteProject,
            Self::CreateTransaction => Permission::AddTransaction,
            Self::UpdateTransaction => Permission::EditTransaction,
            Self::DeleteTransaction => Permission::DeleteTransaction,
            Self::ViewReports => Permission::ViewReports,
            Self::TakeBackup => Permission::TakeBackup,
            Self::ManagePersonnel => Permission::ManagePersonnel,
        }
    }

    /// Stable name used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateProject => "create_project",
            Self::UpdateProject => "update_project",
            Self::DeleteProject => "delete_project",
            Self::CreateTransaction => "create_transaction",
            Self::UpdateTransaction => "update_transaction",
            Self::DeleteTransaction => "delete_transaction",
            Self::ViewReports => "view_reports",
            Self::TakeBackup => "take_backup",
            Self::ManagePersonnel => "manage_personnel",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured capabilities of one principal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    super_privileged: bool,
    grants: BTreeMap<Permission, bool>,
}

impl CapabilitySet {
    /// Empty set: denies everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set that bypasses every individual check.
    pub fn super_privileged() -> Self {
        Self {
            super_privileged: true,
            grants: BTreeMap::new(),
        }
    }

    /// Builder-style grant.
    pub fn with(mut self, permission: Permission) -> Self {
        self.set(permission, true);
        self
    }

    pub fn set(&mut self, permission: Permission, allowed: bool) {
        self.grants.insert(permission, allowed);
    }

    pub fn is_super_privileged(&self) -> bool {
        self.super_privileged
    }

    /// Builds a set from a stored string-keyed flag map.
    ///
    /// Bare (`add_project`) and namespaced (`finance.add_project`) keys are
    /// merged into one grant per permission; the namespaced value wins when
    /// both are present, regardless of input order. Unparseable keys are
    /// skipped with a warning.
    pub fn from_flags<K, I>(flags: I) -> Self
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, bool)>,
    {
        let mut set = Self::new();
        let mut namespaced: BTreeMap<Permission, bool> = BTreeMap::new();

        for (key, allowed) in flags {
            let key = key.as_ref();
            if key.trim() == SUPER_PRIVILEGE_KEY {
                set.super_privileged |= allowed;
                continue;
            }
            match parse_capability_key(key) {
                Ok(parsed) if parsed.is_namespaced() => {
                    namespaced.insert(parsed.permission, allowed);
                }
                Ok(parsed) => set.set(parsed.permission, allowed),
                Err(err) => {
                    warn!("event=capability_parse module=access status=ignored reason={err}");
                }
            }
        }

        set.grants.extend(namespaced);
        set
    }

    /// Whether this set allows `action`.
    pub fn allows(&self, action: Action) -> bool {
        allow(self, action)
    }
}

/// Evaluates one capability set against one requested action.
pub fn allow(capabilities: &CapabilitySet, action: Action) -> bool {
    if capabilities.super_privileged {
        return true;
    }

    let allowed = capabilities
        .grants
        .get(&action.permission())
        .copied()
        .unwrap_or(false);
    if !allowed {
        debug!(
            "event=access_check module=access status=denied action={}",
            action.as_str()
        );
    }
    allowed
}

#[cfg(test)]
mod tests {
    use super::{allow, Action, CapabilitySet};
    use crate::access::capability::Permission;

    #[test]
    fn empty_set_denies() {
        assert!(!allow(&CapabilitySet::new(), Action::CreateProject));
    }

    #[test]
    fn explicit_false_denies() {
        let set = CapabilitySet::from_flags([("add_project", false)]);
        assert!(!set.allows(Action::CreateProject));
    }

    #[test]
    fn builder_grants_only_named_permission() {
        let set = CapabilitySet::new().with(Permission::ViewReports);
        assert!(set.allows(Action::ViewReports));
        assert!(!set.allows(Action::TakeBackup));
    }
}
