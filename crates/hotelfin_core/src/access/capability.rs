//! Permission declarations and legacy flag-key parsing.
//!
//! # Responsibility
//! - Define the closed set of grantable permissions and their resource domain.
//! - Parse stored flag keys (`add_project`, `finance.add_project`) into one
//!   structured `CapabilityKey`.
//!
//! # Invariants
//! - Keys are lowercase snake_case, optionally prefixed by `<domain>.`.
//! - A namespaced key must name the permission's own domain.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static FLAG_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:([a-z][a-z_]*)\.)?([a-z][a-z_]*)$").expect("valid flag key regex")
});

/// Resource domain a permission belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceDomain {
    Finance,
    System,
    Personnel,
}

impl ResourceDomain {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Finance => "finance",
            Self::System => "system",
            Self::Personnel => "personnel",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "finance" => Some(Self::Finance),
            "system" => Some(Self::System),
            "personnel" => Some(Self::Personnel),
            _ => None,
        }
    }
}

/// Grantable permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Permission {
    AddProject,
    EditProject,
    DeleteProject,
    AddTransaction,
    EditTransaction,
    DeleteTransaction,
    ViewReports,
    TakeBackup,
    ManagePersonnel,
}

/// Every permission, in declaration order.
pub const ALL_PERMISSIONS: &[Permission] = &[
    Permission::AddProject,
    Permission::EditProject,
    Permission::DeleteProject,
    Permission::AddTransaction,
    Permission::EditTransaction,
    Permission::DeleteTransaction,
    Permission::ViewReports,
    Permission::TakeBackup,
    Permission::ManagePersonnel,
];

impl Permission {
    /// Bare flag key used in stored permission maps.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AddProject => "add_project",
            Self::EditProject => "edit_project",
            Self::DeleteProject => "delete_project",
            Self::AddTransaction => "add_transaction",
            Self::EditTransaction => "edit_transaction",
            Self::DeleteTransaction => "delete_transaction",
            Self::ViewReports => "view_reports",
            Self::TakeBackup => "take_backup",
            Self::ManagePersonnel => "manage_personnel",
        }
    }

    pub fn domain(self) -> ResourceDomain {
        match self {
            Self::TakeBackup => ResourceDomain::System,
            Self::ManagePersonnel => ResourceDomain::Personnel,
            _ => ResourceDomain::Finance,
        }
    }

    /// User-facing short description.
    pub fn description(self) -> &'static str {
        match self {
            Self::AddProject => "Create new portfolio projects.",
            Self::EditProject => "Rename or restyle existing projects.",
            Self::DeleteProject => "Delete projects together with their transactions.",
            Self::AddTransaction => "Record new income, expense or investment entries.",
            Self::EditTransaction => "Change amount or note of recorded entries.",
            Self::DeleteTransaction => "Remove recorded entries.",
            Self::ViewReports => "Open reports and export them as CSV.",
            Self::TakeBackup => "Download a full backup of the ledger.",
            Self::ManagePersonnel => "Manage personnel records.",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        ALL_PERMISSIONS
            .iter()
            .copied()
            .find(|permission| permission.as_str() == value)
    }
}

/// Parsed flag key: a permission, optionally qualified by its domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityKey {
    pub domain: Option<ResourceDomain>,
    pub permission: Permission,
}

impl CapabilityKey {
    pub fn is_namespaced(&self) -> bool {
        self.domain.is_some()
    }
}

/// Parses one stored flag key.
pub fn parse_capability_key(value: &str) -> Result<CapabilityKey, CapabilityKeyError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(CapabilityKeyError::EmptyKey);
    }

    let captures = FLAG_KEY_RE
        .captures(normalized)
        .ok_or_else(|| CapabilityKeyError::MalformedKey(normalized.to_string()))?;

    let domain = match captures.get(1) {
        Some(raw) => Some(
            ResourceDomain::parse(raw.as_str())
                .ok_or_else(|| CapabilityKeyError::UnsupportedDomain(raw.as_str().to_string()))?,
        ),
        None => None,
    };

    let raw_permission = captures.get(2).map_or("", |raw| raw.as_str());
    let permission = Permission::parse(raw_permission)
        .ok_or_else(|| CapabilityKeyError::UnsupportedPermission(raw_permission.to_string()))?;

    if let Some(domain) = domain {
        if domain != permission.domain() {
            return Err(CapabilityKeyError::DomainMismatch { domain, permission });
        }
    }

    Ok(CapabilityKey { domain, permission })
}

/// Flag key parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityKeyError {
    EmptyKey,
    MalformedKey(String),
    UnsupportedDomain(String),
    UnsupportedPermission(String),
    DomainMismatch {
        domain: ResourceDomain,
        permission: Permission,
    },
}

impl Display for CapabilityKeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyKey => write!(f, "permission key must not be empty"),
            Self::MalformedKey(value) => write!(f, "permission key is malformed: {value}"),
            Self::UnsupportedDomain(value) => {
                write!(f, "permission domain is unsupported: {value}")
            }
            Self::UnsupportedPermission(value) => {
                write!(f, "permission is unsupported: {value}")
            }
            Self::DomainMismatch { domain, permission } => write!(
                f,
                "permission `{}` does not belong to domain `{}`",
                permission.as_str(),
                domain.as_str()
            ),
        }
    }
}

impl Error for CapabilityKeyError {}
